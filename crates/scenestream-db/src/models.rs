//! Rust models matching the database schema.

use chrono::{DateTime, Utc};
use scenestream_common::{MediaFileId, SceneId};
use scenestream_engine::{AudioCodec, Container, MediaFile, Resolution, VideoCodec};
use serde::{Deserialize, Serialize};

/// Scene record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    pub id: SceneId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Media file row. Codec and container columns hold probe output verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaFileRecord {
    pub id: MediaFileId,
    pub scene_id: SceneId,
    pub file_path: String,
    pub container: String,
    pub video_codec: String,
    pub audio_codec: Option<String>,
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
    pub bit_rate: u64,
    pub file_size: u64,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl MediaFileRecord {
    /// Probe metadata in the shape the endpoint resolver consumes.
    pub fn to_media_file(&self) -> MediaFile {
        MediaFile {
            id: self.id,
            container: Container::from(self.container.as_str()),
            video_codec: VideoCodec::from(self.video_codec.as_str()),
            audio_codec: self
                .audio_codec
                .as_deref()
                .filter(|codec| !codec.trim().is_empty())
                .map(AudioCodec::from),
            resolution: Resolution::new(self.width, self.height),
            duration_secs: self.duration_secs,
            bit_rate: self.bit_rate,
            file_size: self.file_size,
        }
    }
}

/// Probe results for a file being registered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMediaFile {
    pub file_path: String,
    pub container: String,
    pub video_codec: String,
    pub audio_codec: Option<String>,
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
    pub bit_rate: u64,
    pub file_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_converts_to_engine_file() {
        let record = MediaFileRecord {
            id: MediaFileId::new(3).unwrap(),
            scene_id: SceneId::new(1).unwrap(),
            file_path: "/media/a.mkv".into(),
            container: "matroska,webm".into(),
            video_codec: "h264".into(),
            audio_codec: Some("".into()),
            width: 1920,
            height: 1080,
            duration_secs: 12.5,
            bit_rate: 4_000_000,
            file_size: 1024,
            is_primary: true,
            created_at: Utc::now(),
        };

        let file = record.to_media_file();
        assert_eq!(file.id.get(), 3);
        assert_eq!(file.container, Container::Mkv);
        assert_eq!(file.video_codec, VideoCodec::H264);
        assert_eq!(file.audio_codec, None);
        assert_eq!(file.resolution, Resolution::new(1920, 1080));
    }
}
