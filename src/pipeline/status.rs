//! Scan status channel.
//!
//! The four-state contract observed by the presentation layer. Any state may
//! follow any other; this is a notification channel, not a guarded protocol.

use std::fmt;

use super::observable::{Observable, Subscription};
use super::result::ScanResult;

/// Progress of the pipeline as seen by observers.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanStatus {
    Idle,
    Processing { message: String },
    Success { result: ScanResult },
    Error { message: String },
}

impl ScanStatus {
    pub fn processing(message: impl Into<String>) -> Self {
        ScanStatus::Processing {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ScanStatus::Error {
            message: message.into(),
        }
    }

    /// Whether this status ends a run.
    pub fn is_terminal(&self) -> bool {
        match self {
            ScanStatus::Success { .. } | ScanStatus::Error { .. } => true,
            ScanStatus::Idle | ScanStatus::Processing { .. } => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Idle => "idle",
            ScanStatus::Processing { .. } => "processing",
            ScanStatus::Success { .. } => "success",
            ScanStatus::Error { .. } => "error",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStatus::Idle => f.write_str("idle"),
            ScanStatus::Processing { message } => write!(f, "processing: {}", message),
            ScanStatus::Success { result } => write!(f, "success: {} {}", result.id, result.severity_key),
            ScanStatus::Error { message } => write!(f, "error: {}", message),
        }
    }
}

/// Holder of the single current `ScanStatus`.
pub struct StatusChannel {
    observable: Observable<ScanStatus>,
}

impl StatusChannel {
    pub fn new() -> Self {
        Self {
            observable: Observable::new(ScanStatus::Idle),
        }
    }

    pub fn current(&self) -> ScanStatus {
        self.observable.get()
    }

    pub fn subscribe(&self) -> Subscription<ScanStatus> {
        self.observable.subscribe()
    }

    pub(crate) fn emit(&self, status: ScanStatus) {
        log::debug!("STATUS_TRANSITION status={}", status.as_str());
        self.observable.set(status);
    }

    /// Acknowledge a finished run. Does not stop one in flight.
    pub fn reset(&self) {
        self.emit(ScanStatus::Idle);
    }
}

impl Default for StatusChannel {
    fn default() -> Self {
        Self::new()
    }
}
