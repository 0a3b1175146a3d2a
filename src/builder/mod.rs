//! Builder API for ergonomic state construction.
//!
//! States are assembled with a fluent builder and frozen on `build()`, after
//! which their hooks and handler table can no longer change.

pub mod state;

pub use state::StateBuilder;
