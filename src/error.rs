//! Errors raised by the state machine runtime.

use thiserror::Error;

/// Coarse classification of [`FsmError`] variants.
///
/// Callers that only care about the category of a failure (for example to
/// decide whether a state graph is misconfigured or whether a hook cascade ran
/// away) can match on this instead of the concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required identity or value was missing or malformed.
    InvalidArgument,

    /// The controller was asked to do something its current state does not allow.
    InvalidState,

    /// A cascade of nested hooks and handlers exceeded the configured depth.
    ResourceExhaustion,
}

/// Errors that can occur while building states or driving a machine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FsmError {
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Machine is not in any state, did you forget to set an initial state?")]
    NoActiveState,

    #[error("No handler for event '{event}' in state '{state}'. Try adding a handler")]
    UnhandledEvent { event: String, state: String },

    #[error("Nested transitions exceeded the maximum depth of {limit}")]
    RecursionLimit { limit: usize },
}

impl FsmError {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::NoActiveState | Self::UnhandledEvent { .. } => ErrorKind::InvalidState,
            Self::RecursionLimit { .. } => ErrorKind::ResourceExhaustion,
        }
    }
}
