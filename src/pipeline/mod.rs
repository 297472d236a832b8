//! Pipeline orchestration module.
//!
//! Scan pipeline that coordinates:
//! - Image loading
//! - Remote detection
//! - Findings summarization
//! - Remote analysis
//! - Severity classification
//! - History persistence
//! - Status notification

pub mod context;
pub mod image;
pub mod observable;
pub mod orchestrator;
pub mod result;
pub mod status;
pub mod summary;

pub use context::*;
pub use image::*;
pub use observable::*;
pub use orchestrator::*;
pub use result::*;
pub use status::*;
pub use summary::*;
