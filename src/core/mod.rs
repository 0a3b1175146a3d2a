//! Core state machine data model.
//!
//! This module contains the values a host uses to describe a machine:
//! - `Event`: named stimuli used as dispatch keys
//! - `State`: immutable named nodes with hooks and handlers
//! - `Transition` and `History`: the record of state changes
//!
//! Nothing here runs hooks; that is the controller's job.

mod event;
mod history;
mod state;
mod transition;

pub use event::Event;
pub use history::History;
pub use state::{Hook, State};
pub use transition::Transition;
