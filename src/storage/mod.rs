//! Storage module.
//!
//! Per-identity scan history on top of an injected key-value backend.
//! Backends only move opaque JSON blobs; ordering and recovery rules live
//! in `history`.

pub mod backend;
pub mod history;
pub mod models;

pub use backend::*;
pub use history::*;
pub use models::*;
