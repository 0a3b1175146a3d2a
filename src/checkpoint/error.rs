//! Errors raised while encoding, decoding, or resuming from a checkpoint.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The snapshot could not be encoded as JSON or bincode
    #[error("Could not encode checkpoint: {0}")]
    SerializationFailed(String),

    /// The input is not a well-formed JSON or bincode snapshot
    #[error("Could not decode checkpoint: {0}")]
    DeserializationFailed(String),

    #[error("Checkpoint format {found} cannot be read, expected format {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The recorded names do not form one chain ending at the current state
    #[error("Inconsistent checkpoint history: {0}")]
    ValidationFailed(String),

    /// The recorded current state has no counterpart, by name, in the host's graph
    #[error("Cannot resume: no state named '{0}' in the provided graph")]
    UnknownState(String),
}
