//! Recorded state changes.

use crate::core::State;
use std::fmt;

/// Record of a single state change.
///
/// `from` is `None` for the transition that installed the first state of a
/// machine. Equality compares the `(from, to)` pair using state names.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Transition {
    from: Option<State>,
    to: State,
}

impl Transition {
    pub fn of(from: Option<State>, to: State) -> Self {
        Self { from, to }
    }

    pub fn from(&self) -> Option<&State> {
        self.from.as_ref()
    }

    pub fn to(&self) -> &State {
        &self.to
    }

    /// Whether this transition installed a state into an uninitialized machine.
    pub fn is_initial(&self) -> bool {
        self.from.is_none()
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.from {
            Some(from) => write!(f, "{} -> {}", from, self.to),
            None => write!(f, "<none> -> {}", self.to),
        }
    }
}
