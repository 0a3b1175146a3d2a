//! Immutable named states carrying lifecycle hooks and event handlers.

use crate::builder::StateBuilder;
use crate::core::Event;
use crate::error::FsmError;
use crate::machine::Fsm;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A procedure invoked by the controller: an entry hook, an exit hook, or an
/// event handler.
///
/// Hooks receive the controller itself and may call
/// [`Fsm::transition_to`] or [`Fsm::fire_event`] before returning. Any error
/// they return is propagated to the caller of the outermost controller
/// operation.
pub type Hook = Arc<dyn Fn(&mut Fsm) -> Result<(), FsmError> + Send + Sync>;

struct StateInner {
    name: String,
    on_entry: Option<Hook>,
    on_exit: Option<Hook>,
    handlers: HashMap<Event, Hook>,
}

/// A named node of a state machine.
///
/// States are immutable once built: their hooks and handler table never
/// change. Cloning is cheap and shares the same definition, so a graph of
/// states can be built once and installed into any number of controllers.
///
/// Equality and hashing use the name only. Two states with the same name are
/// interchangeable even if their hooks differ, so names must be unique within
/// one machine.
///
/// # Example
///
/// ```rust
/// use microfsm::core::{Event, State};
///
/// let done = Event::of("DONE").unwrap();
/// let finished = State::builder().name("finished").build().unwrap();
///
/// let target = finished.clone();
/// let working = State::builder()
///     .name("working")
///     .on_event(done.clone(), move |fsm| fsm.transition_to(target.clone()))
///     .build()
///     .unwrap();
///
/// assert!(working.handles(&done));
/// assert!(!finished.handles(&done));
/// ```
#[derive(Clone)]
pub struct State {
    inner: Arc<StateInner>,
}

impl State {
    /// Start building a new state.
    pub fn builder() -> StateBuilder {
        StateBuilder::new()
    }

    pub(crate) fn from_parts(
        name: String,
        on_entry: Option<Hook>,
        on_exit: Option<Hook>,
        handlers: HashMap<Event, Hook>,
    ) -> Self {
        Self {
            inner: Arc::new(StateInner {
                name,
                on_entry,
                on_exit,
                handlers,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Hook run every time the machine enters this state.
    pub fn on_entry(&self) -> Option<&Hook> {
        self.inner.on_entry.as_ref()
    }

    /// Hook run every time the machine leaves this state.
    pub fn on_exit(&self) -> Option<&Hook> {
        self.inner.on_exit.as_ref()
    }

    /// Look up the handler registered for `event`.
    pub fn handler(&self, event: &Event) -> Option<&Hook> {
        self.inner.handlers.get(event)
    }

    pub fn handles(&self, event: &Event) -> bool {
        self.inner.handlers.contains_key(event)
    }

    /// Events this state has handlers for, in no particular order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.inner.handlers.keys()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.inner.name == other.inner.name
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.name.hash(state);
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut events: Vec<&str> = self.events().map(Event::name).collect();
        events.sort_unstable();
        f.debug_struct("State")
            .field("name", &self.inner.name)
            .field("on_entry", &self.inner.on_entry.is_some())
            .field("on_exit", &self.inner.on_exit.is_some())
            .field("events", &events)
            .finish()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}
