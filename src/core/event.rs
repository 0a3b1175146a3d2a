//! Named stimuli used as dispatch keys.

use crate::error::FsmError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named stimulus that a [`State`](crate::core::State) may handle.
///
/// Events are plain values: two events are equal exactly when their names are
/// equal, so an event created twice from the same name selects the same
/// handler.
///
/// # Example
///
/// ```rust
/// use microfsm::core::Event;
///
/// let start = Event::of("START_TASK").unwrap();
/// assert_eq!(start, Event::of("START_TASK").unwrap());
/// assert!(Event::of("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Event {
    name: String,
}

impl Event {
    /// Create an event from its name.
    ///
    /// Fails with an `InvalidArgument` error if the name is empty.
    pub fn of(name: impl Into<String>) -> Result<Self, FsmError> {
        let name = name.into();
        if name.is_empty() {
            return Err(FsmError::invalid_argument("event name cannot be empty"));
        }
        Ok(Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl TryFrom<String> for Event {
    type Error = FsmError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::of(name)
    }
}

impl From<Event> for String {
    fn from(event: Event) -> Self {
        event.name
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
