//! Builder for constructing states.

use crate::core::{Event, Hook, State};
use crate::error::FsmError;
use crate::machine::Fsm;
use std::collections::HashMap;
use std::sync::Arc;

/// Builder for constructing [`State`] values with a fluent API.
///
/// Nothing registered here runs during construction; hooks and handlers are
/// only invoked by a controller.
pub struct StateBuilder {
    name: Option<String>,
    on_entry: Option<Hook>,
    on_exit: Option<Hook>,
    handlers: HashMap<Event, Hook>,
}

impl StateBuilder {
    /// Create a new state builder.
    pub fn new() -> Self {
        Self {
            name: None,
            on_entry: None,
            on_exit: None,
            handlers: HashMap::new(),
        }
    }

    /// Set the state name (required).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the hook run on every entry into the state (optional).
    pub fn on_entry<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Fsm) -> Result<(), FsmError> + Send + Sync + 'static,
    {
        self.on_entry = Some(Arc::new(hook));
        self
    }

    /// Set the hook run on every exit from the state (optional).
    pub fn on_exit<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Fsm) -> Result<(), FsmError> + Send + Sync + 'static,
    {
        self.on_exit = Some(Arc::new(hook));
        self
    }

    /// Register the handler for `event`.
    /// A later registration for the same event replaces the earlier one.
    pub fn on_event<F>(mut self, event: Event, handler: F) -> Self
    where
        F: Fn(&mut Fsm) -> Result<(), FsmError> + Send + Sync + 'static,
    {
        self.handlers.insert(event, Arc::new(handler));
        self
    }

    /// Build the state, freezing its hooks and handlers.
    pub fn build(self) -> Result<State, FsmError> {
        let name = self
            .name
            .ok_or_else(|| FsmError::invalid_argument("state name not specified. Call .name()"))?;
        if name.is_empty() {
            return Err(FsmError::invalid_argument("state name cannot be empty"));
        }

        Ok(State::from_parts(
            name,
            self.on_entry,
            self.on_exit,
            self.handlers,
        ))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
