//! Browser playback capability model.
//!
//! Decides whether a (container, video codec, audio codec) triple can be sent
//! to a web client untouched, only needs a new container, or must be
//! re-encoded. The rules mirror what HTML5 `<video>` handles across current
//! browsers:
//!
//! - MP4/M4V: H.264, VP9, AV1 video with AAC, MP3, Opus audio
//! - WebM: VP8, VP9, AV1 video with Opus, Vorbis audio
//!
//! Anything the model does not recognize falls back to
//! [`Playability::TranscodeRequired`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::media::{AudioCodec, Container, VideoCodec};

/// How a file can be delivered to a browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Playability {
    /// Bytes can be sent as-is.
    DirectPlayable,
    /// Codecs are fine, the container is not.
    RemuxOnly,
    /// At least one stream must be re-encoded.
    TranscodeRequired,
}

impl fmt::Display for Playability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectPlayable => write!(f, "direct_playable"),
            Self::RemuxOnly => write!(f, "remux_only"),
            Self::TranscodeRequired => write!(f, "transcode_required"),
        }
    }
}

/// Classify a file's streams for web playback.
///
/// Total over its inputs: unknown names never error, they just end up as
/// [`Playability::TranscodeRequired`].
pub fn classify(
    container: &Container,
    video: &VideoCodec,
    audio: Option<&AudioCodec>,
) -> Playability {
    if !is_web_video(video) || !audio.map_or(true, is_web_audio) {
        return Playability::TranscodeRequired;
    }

    if container_carries(container, video, audio) {
        return Playability::DirectPlayable;
    }

    if is_remuxable(container) && remux_container(video, audio).is_some() {
        Playability::RemuxOnly
    } else {
        Playability::TranscodeRequired
    }
}

/// Web container a remux of these codecs should be written to.
///
/// MP4 is preferred; WebM is used for VP8 or Vorbis. `None` when no web
/// container can hold the pair (e.g. VP8 with AAC).
pub fn remux_container(video: &VideoCodec, audio: Option<&AudioCodec>) -> Option<Container> {
    [Container::Mp4, Container::WebM]
        .into_iter()
        .find(|target| container_carries(target, video, audio))
}

fn is_web_video(codec: &VideoCodec) -> bool {
    matches!(
        codec,
        VideoCodec::H264 | VideoCodec::Vp8 | VideoCodec::Vp9 | VideoCodec::Av1
    )
}

fn is_web_audio(codec: &AudioCodec) -> bool {
    matches!(
        codec,
        AudioCodec::Aac | AudioCodec::Mp3 | AudioCodec::Opus | AudioCodec::Vorbis
    )
}

/// Whether a web container can legally hold both streams.
fn container_carries(container: &Container, video: &VideoCodec, audio: Option<&AudioCodec>) -> bool {
    match container {
        Container::Mp4 | Container::M4v => {
            matches!(video, VideoCodec::H264 | VideoCodec::Vp9 | VideoCodec::Av1)
                && audio.map_or(true, |a| {
                    matches!(a, AudioCodec::Aac | AudioCodec::Mp3 | AudioCodec::Opus)
                })
        }
        Container::WebM => {
            matches!(video, VideoCodec::Vp8 | VideoCodec::Vp9 | VideoCodec::Av1)
                && audio.map_or(true, |a| matches!(a, AudioCodec::Opus | AudioCodec::Vorbis))
        }
        _ => false,
    }
}

/// Containers the remuxer knows how to demux.
fn is_remuxable(container: &Container) -> bool {
    !matches!(container, Container::Other(_))
}
