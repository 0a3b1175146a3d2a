//! Runtime configuration for a controller.

use crate::error::FsmError;
use serde::{Deserialize, Serialize};

/// Default bound on nested controller operations.
///
/// Sized so that a runaway cascade fails well within a 512 KiB thread stack in
/// unoptimized builds, where a single nested operation costs a few KiB. Raise
/// it only on threads whose stack grows with it.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Controller settings.
///
/// Serializable so hosts can keep it alongside the rest of their
/// configuration. Missing fields fall back to their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsmConfig {
    /// Maximum number of controller operations (`transition_to`,
    /// `fire_event`) that may be active on the call stack at once. The
    /// operation that would exceed it fails with a `RecursionLimit` error
    /// without mutating the machine.
    ///
    /// The guard only helps while the bound fits the host thread's stack:
    /// budget several KiB per level in debug builds and lower this on
    /// small-stack threads.
    pub max_depth: usize,
}

impl FsmConfig {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn validate(&self) -> Result<(), FsmError> {
        if self.max_depth == 0 {
            return Err(FsmError::invalid_argument("max_depth must be at least 1"));
        }
        Ok(())
    }
}

impl Default for FsmConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
