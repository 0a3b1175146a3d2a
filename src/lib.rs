//! Microfsm: a minimal embeddable finite state machine
//!
//! A host application describes named states with optional entry and exit
//! hooks and a table of event handlers, then drives them through a single
//! controller. Hooks and handlers run synchronously and receive the
//! controller, so a lifecycle can progress on its own: an entry hook fires
//! the next event, whose handler moves to the next state, and so on.
//!
//! # Core Concepts
//!
//! - **Event**: a named stimulus, equal to any other event with the same name
//! - **State**: an immutable named node with hooks and handlers
//! - **Transition**: a recorded `(from, to)` state change
//! - **Fsm**: the controller holding the current state and the history
//!
//! Legality of a move is decided per dispatch: an event is accepted exactly
//! when the current state has a handler for it.
//!
//! # Recursion
//!
//! A state graph whose hooks keep firing events that lead back into
//! themselves never terminates on its own. The controller bounds the number
//! of nested operations (see [`FsmConfig`]) and fails with
//! [`FsmError::RecursionLimit`] instead of overflowing the stack. The default
//! bound fits a 512 KiB thread stack in debug builds; a larger `max_depth`
//! needs a correspondingly larger stack, or the process still aborts.
//!
//! # Example
//!
//! ```rust
//! use microfsm::core::{Event, State, Transition};
//! use microfsm::Fsm;
//!
//! let start_task = Event::of("START_TASK").unwrap();
//!
//! let in_progress = State::builder().name("IN_PROGRESS").build().unwrap();
//!
//! let target = in_progress.clone();
//! let fire = start_task.clone();
//! let new = State::builder()
//!     .name("NEW")
//!     .on_entry(move |fsm| fsm.fire_event(&fire))
//!     .on_event(start_task, move |fsm| fsm.transition_to(target.clone()))
//!     .build()
//!     .unwrap();
//!
//! let mut fsm = Fsm::new();
//! fsm.set_initial_state(new.clone()).unwrap();
//!
//! assert_eq!(
//!     fsm.transitions(),
//!     &[
//!         Transition::of(None, new.clone()),
//!         Transition::of(Some(new), in_progress),
//!     ]
//! );
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod error;
pub mod machine;

// Re-export commonly used types
pub use builder::StateBuilder;
pub use checkpoint::{Checkpoint, CheckpointError};
pub use crate::core::{Event, History, Hook, State, Transition};
pub use error::{ErrorKind, FsmError};
pub use machine::{Fsm, FsmConfig};
