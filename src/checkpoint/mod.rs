//! Checkpoint and resume support for machines.
//!
//! A [`Checkpoint`] captures a controller's current state and transition
//! history by state name, so a host can store it with its own task record and
//! restart a lifecycle from the last recorded state after a crash. Hooks and
//! handlers are not serializable; resuming maps names back onto the host's
//! state graph.
//!
//! # Example
//!
//! ```rust
//! use microfsm::checkpoint::Checkpoint;
//! use microfsm::core::State;
//! use microfsm::Fsm;
//!
//! let new = State::builder().name("NEW").build().unwrap();
//! let in_progress = State::builder().name("IN_PROGRESS").build().unwrap();
//!
//! let mut fsm = Fsm::new();
//! fsm.set_initial_state(new.clone()).unwrap();
//! fsm.transition_to(in_progress.clone()).unwrap();
//!
//! let json = fsm.checkpoint().to_json().unwrap();
//!
//! // After a restart
//! let checkpoint = Checkpoint::from_json(&json).unwrap();
//! let graph = [new, in_progress.clone()];
//! let resume_at = checkpoint.resume_state(&graph).unwrap();
//! assert_eq!(resume_at, Some(in_progress));
//! ```

use crate::core::State;
use crate::machine::Fsm;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// One recorded transition, by state name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: Option<String>,
    pub to: String,
}

/// Serializable snapshot of a machine.
/// Does NOT include hooks or handlers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: Uuid,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Name of the current state, if the machine was initialized
    pub current_state: Option<String>,

    /// Complete transition history
    pub history: Vec<TransitionRecord>,
}

impl Checkpoint {
    /// Capture the current state and history of `fsm`.
    pub fn capture(fsm: &Fsm) -> Self {
        let history = fsm
            .transitions()
            .iter()
            .map(|t| TransitionRecord {
                from: t.from().map(|s| s.name().to_string()),
                to: t.to().name().to_string(),
            })
            .collect();

        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            current_state: fsm.current_state().map(|s| s.name().to_string()),
            history,
        }
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    /// Decode and validate a JSON checkpoint.
    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    /// Decode and validate a binary checkpoint.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    /// Check the version and that the history forms one connected chain
    /// ending at the current state.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        let mut previous: Option<&str> = None;
        for (index, record) in self.history.iter().enumerate() {
            if record.from.as_deref() != previous {
                return Err(CheckpointError::ValidationFailed(format!(
                    "transition {index} starts at {:?}, expected {:?}",
                    record.from, previous
                )));
            }
            previous = Some(record.to.as_str());
        }

        if self.current_state.as_deref() != previous {
            return Err(CheckpointError::ValidationFailed(format!(
                "current state {:?} does not match last recorded state {:?}",
                self.current_state, previous
            )));
        }
        Ok(())
    }

    /// Find the recorded current state in `states`.
    ///
    /// Returns `Ok(None)` for a checkpoint of an uninitialized machine. The
    /// host installs the returned state with [`Fsm::set_initial_state`] on a
    /// fresh controller, which runs its entry hook again.
    pub fn resume_state(&self, states: &[State]) -> Result<Option<State>, CheckpointError> {
        let Some(name) = &self.current_state else {
            return Ok(None);
        };
        states
            .iter()
            .find(|s| s.name() == name)
            .cloned()
            .map(Some)
            .ok_or_else(|| CheckpointError::UnknownState(name.clone()))
    }
}
