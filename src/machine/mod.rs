//! The state machine controller.
//!
//! `Fsm` holds the current state and the transition history, and performs
//! transitions and event dispatch. Everything runs synchronously on the
//! caller's thread: hooks and handlers may call back into the controller,
//! so one external call can cascade through many transitions before it
//! returns.

mod config;
mod fsm;

pub use config::{FsmConfig, DEFAULT_MAX_DEPTH};
pub use fsm::Fsm;
