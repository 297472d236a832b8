//! Structured logging with run context.
//!
//! Provides a context prefix carrying the run id, run tag and active identity
//! key for every pipeline log message.

pub mod structured;

pub use structured::*;
