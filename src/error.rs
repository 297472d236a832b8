//! Error taxonomy for scan runs and history persistence.
//!
//! Every variant is terminal for the current run only. The orchestrator turns
//! a `ScanError` into `ScanStatus::Error` and keeps serving later runs.

use thiserror::Error;

/// Failure of a single scan run or of orchestrator setup.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Remote call unreachable, timed out, or failed below HTTP.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Remote service answered with a non-success status.
    #[error("API Error: {code} {message}")]
    RemoteRejection { code: u16, message: String },

    /// Success status but the body could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The captured image could not be turned into an upload payload.
    #[error("failed to decode image {image}: {reason}")]
    Decode { image: String, reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The worker queue is gone (worker thread exited).
    #[error("scan worker is not running")]
    WorkerUnavailable,

    #[error("failed to start scan worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

impl ScanError {
    /// Message shown to observers through `ScanStatus::Error`.
    ///
    /// Remote rejections are reported verbatim; everything else is prefixed
    /// with the kind of run that failed.
    pub fn status_message(&self, prefix: &str) -> String {
        match self {
            ScanError::RemoteRejection { .. } => self.to_string(),
            other => format!("{}: {}", prefix, other),
        }
    }
}

/// Failure of the key-value backend behind the history store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}
