//! Remote analysis module.
//!
//! Submits a findings summary and receives a traffic-light report:
//! - `models` - request/report wire shapes
//! - `service` - the `AnalysisService` seam
//! - `http` - JSON POST over reqwest

pub mod http;
pub mod models;
pub mod service;

pub use http::*;
pub use models::*;
pub use service::*;
