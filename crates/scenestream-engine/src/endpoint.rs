//! Stream endpoint types returned to clients.

use scenestream_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::handoff::StreamTarget;
use crate::media::{AudioCodec, Container, Resolution, VideoCodec};
use crate::policy::QualityTier;

// ---------------------------------------------------------------------------
// DeliveryMode
// ---------------------------------------------------------------------------

/// How the bytes behind an endpoint are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// The file itself, unmodified.
    Direct,
    /// Same streams, new container.
    Remux,
    /// Segmented re-encode (HLS, DASH).
    TranscodeAdaptive,
    /// Progressive re-encode at one quality.
    TranscodeFixedQuality,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Remux => "remux",
            Self::TranscodeAdaptive => "transcode_adaptive",
            Self::TranscodeFixedQuality => "transcode_fixed_quality",
        }
    }

    /// Whether serving this mode needs an external executor.
    pub fn needs_executor(&self) -> bool {
        !matches!(self, Self::Direct)
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StreamFormat
// ---------------------------------------------------------------------------

/// Wire format of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamFormat {
    Direct,
    Hls,
    Dash,
    Mp4,
    #[serde(rename = "webm")]
    WebM,
}

impl StreamFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Hls => "hls",
            Self::Dash => "dash",
            Self::Mp4 => "mp4",
            Self::WebM => "webm",
        }
    }

    /// Name shown in endpoint labels.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Direct => "Direct",
            Self::Hls => "HLS",
            Self::Dash => "DASH",
            Self::Mp4 => "MP4",
            Self::WebM => "WebM",
        }
    }

    /// Segmented formats with a playlist or manifest.
    pub fn is_adaptive(&self) -> bool {
        matches!(self, Self::Hls | Self::Dash)
    }

    /// Single-file formats usable for remux and fixed-quality output.
    pub fn is_progressive(&self) -> bool {
        matches!(self, Self::Mp4 | Self::WebM)
    }

    /// URL suffix of the playlist, manifest or file.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::Direct => None,
            Self::Hls => Some("m3u8"),
            Self::Dash => Some("mpd"),
            Self::Mp4 => Some("mp4"),
            Self::WebM => Some("webm"),
        }
    }

    /// Parse a URL suffix back into a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "m3u8" => Some(Self::Hls),
            "mpd" => Some(Self::Dash),
            "mp4" => Some(Self::Mp4),
            "webm" => Some(Self::WebM),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Direct => "application/octet-stream",
            Self::Hls => "application/vnd.apple.mpegurl",
            Self::Dash => "application/dash+xml",
            Self::Mp4 => "video/mp4",
            Self::WebM => "video/webm",
        }
    }

    /// Container, video and audio codec a transcode to this format produces.
    pub fn transcode_output(&self) -> Option<(Container, VideoCodec, AudioCodec)> {
        match self {
            Self::Direct => None,
            Self::Hls => Some((Container::MpegTs, VideoCodec::H264, AudioCodec::Aac)),
            Self::Dash => Some((Container::WebM, VideoCodec::Vp9, AudioCodec::Opus)),
            Self::Mp4 => Some((Container::Mp4, VideoCodec::H264, AudioCodec::Aac)),
            Self::WebM => Some((Container::WebM, VideoCodec::Vp9, AudioCodec::Opus)),
        }
    }

    /// Progressive format matching a remux target container.
    pub fn for_container(container: &Container) -> Option<Self> {
        match container {
            Container::Mp4 | Container::M4v => Some(Self::Mp4),
            Container::WebM => Some(Self::WebM),
            _ => None,
        }
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "hls" => Ok(Self::Hls),
            "dash" => Ok(Self::Dash),
            "mp4" => Ok(Self::Mp4),
            "webm" => Ok(Self::WebM),
            other => Err(Error::invalid_input(format!("unknown stream format: {other:?}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// StreamEndpoint
// ---------------------------------------------------------------------------

/// One playable option for a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEndpoint {
    pub mode: DeliveryMode,
    pub format: StreamFormat,
    pub label: String,
    pub container: Container,
    pub video_codec: VideoCodec,
    pub audio_codec: Option<AudioCodec>,
    pub mime_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Bits per second.
    pub bitrate: Option<u64>,
    pub tier: Option<QualityTier>,
    pub url: String,
}

impl StreamEndpoint {
    pub fn resolution(&self) -> Option<Resolution> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(Resolution::new(w, h)),
            _ => None,
        }
    }

    /// The semantic tuple this endpoint's URL encodes.
    pub fn target(&self) -> StreamTarget {
        StreamTarget {
            mode: self.mode,
            format: self.format,
            tier: self.tier,
        }
    }
}

// ---------------------------------------------------------------------------
// EndpointSet
// ---------------------------------------------------------------------------

/// Ordered endpoints for one file, most preferred first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointSet(Vec<StreamEndpoint>);

impl EndpointSet {
    pub fn new(endpoints: Vec<StreamEndpoint>) -> Self {
        Self(endpoints)
    }

    /// Endpoint serving `target`, if this set offers it.
    pub fn find(&self, target: &StreamTarget) -> Option<&StreamEndpoint> {
        self.0.iter().find(|e| e.target() == *target)
    }

    pub fn into_vec(self) -> Vec<StreamEndpoint> {
        self.0
    }
}

impl Deref for EndpointSet {
    type Target = [StreamEndpoint];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for EndpointSet {
    type Item = StreamEndpoint;
    type IntoIter = std::vec::IntoIter<StreamEndpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a EndpointSet {
    type Item = &'a StreamEndpoint;
    type IntoIter = std::slice::Iter<'a, StreamEndpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
