//! Identity keying module.
//!
//! Turns a free-form login identifier into:
//! - a storage key that partitions scan history
//! - a human display name

pub mod keying;

pub use keying::*;
