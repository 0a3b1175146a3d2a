//! Transition history tracking.
//!
//! A controller records every state change it performs, in call order. The
//! history is append-only: no operation reorders or removes entries.

use crate::core::{State, Transition};

/// Ordered, append-only history of transitions.
///
/// # Example
///
/// ```rust
/// use microfsm::core::State;
/// use microfsm::Fsm;
///
/// let first = State::builder().name("first").build().unwrap();
/// let second = State::builder().name("second").build().unwrap();
///
/// let mut fsm = Fsm::new();
/// fsm.set_initial_state(first).unwrap();
/// fsm.transition_to(second).unwrap();
///
/// let history = fsm.history();
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.path(), vec!["first", "second"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    transitions: Vec<Transition>,
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    /// All recorded transitions, oldest first.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transition> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// The most recent transition.
    pub fn last(&self) -> Option<&Transition> {
        self.transitions.last()
    }

    /// Names of the states visited, in order.
    ///
    /// The path starts with the target of the first transition, since the
    /// first transition of a machine has no source state.
    pub fn path(&self) -> Vec<&str> {
        self.transitions.iter().map(|t| t.to().name()).collect()
    }

    /// The state most recently entered, if any.
    pub fn last_state(&self) -> Option<&State> {
        self.last().map(Transition::to)
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Transition;
    type IntoIter = std::slice::Iter<'a, Transition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
