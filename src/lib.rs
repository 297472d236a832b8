//! Argos Core - ULD damage inspection scan pipeline
//!
//! This crate drives one inspection run from a captured (or simulated)
//! finding to a classified, persisted result. The implementation prioritizes:
//!
//! 1. **Availability** - Remote and storage failures end a run, never the client
//! 2. **Logging** - Every pipeline step logged with run and user context
//! 3. **Ordering** - One run at a time, status updates observed in emission order
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `pipeline` - Run orchestrator, status channel and observables
//! - `detection` - Remote object detection and label normalization
//! - `analysis` - Remote traffic-light analysis
//! - `severity` - Status to display metadata mapping
//! - `identity` - Storage keys and display names for users
//! - `storage` - Per-identity history over pluggable backends
//! - `logging` - Structured logging with run context

pub mod analysis;
pub mod config;
pub mod detection;
pub mod error;
pub mod identity;
pub mod logging;
pub mod pipeline;
pub mod severity;
pub mod storage;
pub mod transport;

pub use config::ClientConfig;
pub use error::{ScanError, StorageError};
pub use identity::Identity;
pub use pipeline::{
    Collaborators, ImageLoader, ImageRef, ScanOrchestrator, ScanResult, ScanStatus, Subscription,
};
pub use severity::{SeverityKey, SeverityMeta};
pub use storage::{HistoryItem, HistoryStore, KeyValueStore};

/// Initialize the process-wide logger.
///
/// Safe to call repeatedly; only the first call installs the logger.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}
