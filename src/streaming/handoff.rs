//! Transcode executors reachable from the HTTP layer.

use scenestream_common::{Error, Result};
use scenestream_engine::{HandoffTicket, MediaFile, StreamRequest, TranscodeHandoff};

/// Used when no executor is configured. Every submission fails as unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableHandoff;

impl TranscodeHandoff for UnavailableHandoff {
    fn submit(&self, request: &StreamRequest, _file: &MediaFile) -> Result<HandoffTicket> {
        tracing::warn!(job = %request.job_key(), "no transcode executor configured");
        Err(Error::unavailable(format!(
            "no transcode executor for {}",
            request.target.mode
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenestream_common::{MediaFileId, SceneId};
    use scenestream_engine::{
        AudioCodec, Container, QualityTier, Resolution, StreamFormat, StreamTarget, VideoCodec,
    };

    #[test]
    fn unavailable_handoff_rejects() {
        let file = MediaFile {
            id: MediaFileId::new(1).unwrap(),
            container: Container::Mkv,
            video_codec: VideoCodec::Hevc,
            audio_codec: Some(AudioCodec::Aac),
            resolution: Resolution::new(1920, 1080),
            duration_secs: 60.0,
            bit_rate: 6_000_000,
            file_size: 45_000_000,
        };
        let request = StreamRequest::new(
            SceneId::new(5).unwrap(),
            StreamTarget::adaptive(StreamFormat::Hls, QualityTier::StandardHd),
        );

        let err = UnavailableHandoff.submit(&request, &file).unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
    }
}
