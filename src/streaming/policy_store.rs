//! Live transcode policy.

use parking_lot::RwLock;
use scenestream_common::Result;
use scenestream_engine::TranscodePolicy;
use std::sync::Arc;

/// Read accessor for the current policy.
pub trait PolicySource: Send + Sync {
    /// Snapshot taken once per resolution.
    fn current(&self) -> Arc<TranscodePolicy>;
}

/// Process-wide policy that can be replaced at runtime.
///
/// Readers get an `Arc` snapshot; a replacement swaps the whole value, so a
/// resolution never sees two policy generations.
#[derive(Debug, Default)]
pub struct PolicyStore {
    policy: RwLock<Arc<TranscodePolicy>>,
}

impl PolicyStore {
    pub fn new(policy: TranscodePolicy) -> Self {
        Self {
            policy: RwLock::new(Arc::new(policy)),
        }
    }

    /// Validate and install a new policy, returning the previous one.
    pub fn replace(&self, policy: TranscodePolicy) -> Result<Arc<TranscodePolicy>> {
        policy.validate()?;
        let previous = std::mem::replace(&mut *self.policy.write(), Arc::new(policy));
        tracing::info!(policy = ?self.current(), "transcode policy updated");
        Ok(previous)
    }
}

impl PolicySource for PolicyStore {
    fn current(&self) -> Arc<TranscodePolicy> {
        self.policy.read().clone()
    }
}
