//! Boundary toward the transcode/remux executor.
//!
//! Every non-direct endpoint URL encodes a [`StreamRequest`]. When a client
//! follows such a URL, the server rebuilds the request and passes it to a
//! [`TranscodeHandoff`]. The executor owns admission control, process
//! lifetime and cancellation; it must run at most one job per
//! [`StreamRequest::job_key`].

use scenestream_common::{Error, Result, SceneId};
use serde::{Deserialize, Serialize};

use crate::endpoint::{DeliveryMode, StreamFormat};
use crate::media::MediaFile;
use crate::policy::QualityTier;

/// What to produce, independent of which scene it is produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamTarget {
    pub mode: DeliveryMode,
    pub format: StreamFormat,
    pub tier: Option<QualityTier>,
}

impl StreamTarget {
    pub fn direct() -> Self {
        Self {
            mode: DeliveryMode::Direct,
            format: StreamFormat::Direct,
            tier: None,
        }
    }

    pub fn remux(format: StreamFormat) -> Self {
        Self {
            mode: DeliveryMode::Remux,
            format,
            tier: None,
        }
    }

    pub fn adaptive(format: StreamFormat, tier: QualityTier) -> Self {
        Self {
            mode: DeliveryMode::TranscodeAdaptive,
            format,
            tier: Some(tier),
        }
    }

    pub fn fixed(format: StreamFormat, tier: QualityTier) -> Self {
        Self {
            mode: DeliveryMode::TranscodeFixedQuality,
            format,
            tier: Some(tier),
        }
    }

    /// Reject combinations no endpoint can carry, e.g. a tiered direct stream.
    pub fn validate(&self) -> Result<()> {
        let ok = match self.mode {
            DeliveryMode::Direct => self.format == StreamFormat::Direct && self.tier.is_none(),
            DeliveryMode::Remux => self.format.is_progressive() && self.tier.is_none(),
            DeliveryMode::TranscodeAdaptive => self.format.is_adaptive() && self.tier.is_some(),
            DeliveryMode::TranscodeFixedQuality => {
                self.format.is_progressive() && self.tier.is_some()
            }
        };
        if ok {
            Ok(())
        } else {
            Err(Error::invalid_input(format!(
                "{} stream cannot be delivered as {}{}",
                self.mode,
                self.format,
                self.tier.map(|t| format!(" at {t}")).unwrap_or_default()
            )))
        }
    }
}

/// A target bound to a scene; the full tuple an endpoint URL encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamRequest {
    pub scene: SceneId,
    #[serde(flatten)]
    pub target: StreamTarget,
}

impl StreamRequest {
    pub fn new(scene: SceneId, target: StreamTarget) -> Self {
        Self { scene, target }
    }

    /// Deduplication key: equal keys must share one running job.
    pub fn job_key(&self) -> String {
        let tier = self.target.tier.map_or("source", |t| t.name());
        format!(
            "scene-{}/{}/{}/{}",
            self.scene, self.target.mode, self.target.format, tier
        )
    }
}

/// Result of a handoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffTicket {
    pub job_key: String,
    /// True when an already running job was reused.
    pub reused: bool,
}

/// Executor that starts, or joins, the job behind a stream request.
pub trait TranscodeHandoff: Send + Sync {
    fn submit(&self, request: &StreamRequest, file: &MediaFile) -> Result<HandoffTicket>;
}
