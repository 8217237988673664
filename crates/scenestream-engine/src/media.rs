//! Media-domain vocabulary: containers, codecs and the media file record.
//!
//! Container and codec names come from probe output and grow ad hoc, so each
//! enum is an open set: [`FromStr`] never fails and anything unrecognized is
//! kept verbatim in an `Other` variant. Parsing is case-insensitive and folds
//! the common aliases (`matroska`, `avc`, `hevc`, ...).

use scenestream_common::MediaFileId;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// Container format of a media file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Container {
    Mp4,
    M4v,
    WebM,
    Mkv,
    Mov,
    Avi,
    MpegTs,
    Flv,
    Wmv,
    Other(String),
}

impl Container {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mp4 => "mp4",
            Self::M4v => "m4v",
            Self::WebM => "webm",
            Self::Mkv => "mkv",
            Self::Mov => "mov",
            Self::Avi => "avi",
            Self::MpegTs => "mpegts",
            Self::Flv => "flv",
            Self::Wmv => "wmv",
            Self::Other(name) => name,
        }
    }

    /// MIME type used when the file is served as-is.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp4 | Self::M4v => "video/mp4",
            Self::WebM => "video/webm",
            Self::Mkv => "video/x-matroska",
            Self::Mov => "video/quicktime",
            Self::Avi => "video/x-msvideo",
            Self::MpegTs => "video/mp2t",
            Self::Flv => "video/x-flv",
            Self::Wmv => "video/x-ms-wmv",
            Self::Other(_) => "application/octet-stream",
        }
    }

    /// Container from an ffprobe `format_name`, disambiguated by file extension.
    ///
    /// ffprobe reports demuxer groups such as `"matroska,webm"`, which parse as
    /// [`Container::Mkv`]. When the extension names one member of the group,
    /// that member wins, so a `.webm` file is [`Container::WebM`].
    pub fn from_format_name(format_name: &str, extension: Option<&str>) -> Self {
        let parsed = Self::from(format_name);
        let Some(ext) = extension.map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        else {
            return parsed;
        };

        let in_group = format_name.contains(',')
            && format_name
                .split(',')
                .any(|name| name.trim().eq_ignore_ascii_case(&ext));
        match Self::from(ext.as_str()) {
            hinted if in_group && !matches!(hinted, Self::Other(_)) => hinted,
            _ => parsed,
        }
    }
}

/// Parses extensions and ffprobe format names.
///
/// The ambiguous ffprobe group `"matroska,webm"` parses as [`Container::Mkv`];
/// callers holding a file path should use [`Container::from_format_name`].
impl FromStr for Container {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Ok(match lower.as_str() {
            "mp4" | "mpeg4" | "mpeg-4" | "mov,mp4,m4a,3gp,3g2,mj2" => Self::Mp4,
            "m4v" => Self::M4v,
            "webm" => Self::WebM,
            "mkv" | "matroska" | "matroska,webm" => Self::Mkv,
            "mov" | "quicktime" => Self::Mov,
            "avi" => Self::Avi,
            "ts" | "m2ts" | "mts" | "mpegts" => Self::MpegTs,
            "flv" => Self::Flv,
            "wmv" | "asf" => Self::Wmv,
            _ => Self::Other(lower),
        })
    }
}

// ---------------------------------------------------------------------------
// VideoCodec
// ---------------------------------------------------------------------------

/// Video codec of the primary video stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VideoCodec {
    H264,
    Hevc,
    Vp8,
    Vp9,
    Av1,
    Mpeg2,
    Mpeg4,
    Wmv,
    Other(String),
}

impl VideoCodec {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::H264 => "h264",
            Self::Hevc => "hevc",
            Self::Vp8 => "vp8",
            Self::Vp9 => "vp9",
            Self::Av1 => "av1",
            Self::Mpeg2 => "mpeg2video",
            Self::Mpeg4 => "mpeg4",
            Self::Wmv => "wmv",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for VideoCodec {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Ok(match lower.as_str() {
            "h264" | "h.264" | "avc" | "avc1" | "x264" => Self::H264,
            "hevc" | "h265" | "h.265" | "hvc1" | "hev1" | "x265" => Self::Hevc,
            "vp8" => Self::Vp8,
            "vp9" | "vp09" => Self::Vp9,
            "av1" | "av01" => Self::Av1,
            "mpeg2" | "mpeg2video" => Self::Mpeg2,
            "mpeg4" | "xvid" | "divx" => Self::Mpeg4,
            "wmv" | "wmv1" | "wmv2" | "wmv3" | "vc1" => Self::Wmv,
            _ => Self::Other(lower),
        })
    }
}

// ---------------------------------------------------------------------------
// AudioCodec
// ---------------------------------------------------------------------------

/// Audio codec of the primary audio stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AudioCodec {
    Aac,
    Mp3,
    Opus,
    Vorbis,
    Flac,
    Ac3,
    Eac3,
    Dts,
    TrueHd,
    Pcm,
    Other(String),
}

impl AudioCodec {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Aac => "aac",
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Vorbis => "vorbis",
            Self::Flac => "flac",
            Self::Ac3 => "ac3",
            Self::Eac3 => "eac3",
            Self::Dts => "dts",
            Self::TrueHd => "truehd",
            Self::Pcm => "pcm",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for AudioCodec {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Ok(match lower.as_str() {
            "aac" | "mp4a" => Self::Aac,
            "mp3" | "mp3float" => Self::Mp3,
            "opus" => Self::Opus,
            "vorbis" => Self::Vorbis,
            "flac" => Self::Flac,
            "ac3" | "ac-3" => Self::Ac3,
            "eac3" | "e-ac-3" => Self::Eac3,
            "dts" | "dca" => Self::Dts,
            "truehd" => Self::TrueHd,
            pcm if pcm.starts_with("pcm") => Self::Pcm,
            _ => Self::Other(lower),
        })
    }
}

macro_rules! string_codec_impls {
    ($($ty:ty),+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl From<&str> for $ty {
                fn from(s: &str) -> Self {
                    match s.parse() {
                        Ok(v) => v,
                        Err(never) => match never {},
                    }
                }
            }

            impl Serialize for $ty {
                fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(self.as_str())
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let s = String::deserialize(deserializer)?;
                    Ok(Self::from(s.as_str()))
                }
            }
        )+
    };
}

string_codec_impls!(Container, VideoCodec, AudioCodec);

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Pixel dimensions of a video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Zero in either dimension means the probe did not report a size.
    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// The shorter side; quality tiers are named after it.
    pub fn short_side(&self) -> u32 {
        self.width.min(self.height)
    }

    pub fn long_side(&self) -> u32 {
        self.width.max(self.height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// MediaFile
// ---------------------------------------------------------------------------

/// Probe metadata for a scene's primary file, as consumed by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    pub id: MediaFileId,
    pub container: Container,
    pub video_codec: VideoCodec,
    /// `None` for files without an audio stream.
    pub audio_codec: Option<AudioCodec>,
    pub resolution: Resolution,
    pub duration_secs: f64,
    /// Average bitrate in bits per second, 0 when unknown.
    pub bit_rate: u64,
    pub file_size: u64,
}
