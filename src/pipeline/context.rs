//! Pipeline context management.
//!
//! Provides the per-run context used for logging and the immutable snapshot
//! threaded through the submit/classify/persist steps.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::logging::structured::LogContext;

use super::image::ImageRef;

/// Prefix of locally generated run ids for capture runs.
pub const CAPTURE_RUN_PREFIX: &str = "ULD-PHOTO-";

/// How a run was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Capture,
    Simulated,
}

impl RunKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Capture => "capture",
            RunKind::Simulated => "simulated",
        }
    }

    /// Prefix of `Error` messages for failures other than remote rejections.
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            RunKind::Capture => "Processing failed",
            RunKind::Simulated => "Simulation failed",
        }
    }
}

/// Context for a single run.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Id submitted to the analysis service.
    pub run_id: String,
    /// Random tag telling apart runs that share a wall-clock id.
    pub tag: String,
    pub kind: RunKind,
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    /// Context for a capture run.
    ///
    /// The id is derived from the wall clock only, so two runs started in the
    /// same millisecond share it.
    pub fn capture(started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: format!("{}{}", CAPTURE_RUN_PREFIX, started_at.timestamp_millis()),
            tag: new_tag(),
            kind: RunKind::Capture,
            started_at,
        }
    }

    /// Context for a simulated run with a caller-supplied id.
    pub fn simulated(run_id: &str, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: run_id.to_string(),
            tag: new_tag(),
            kind: RunKind::Simulated,
            started_at,
        }
    }

    pub fn log_context(&self, user_key: &str) -> LogContext {
        LogContext::for_run(self.run_id.as_str())
            .tagged(self.tag.as_str())
            .for_user(user_key)
    }
}

fn new_tag() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Everything the submit step needs, captured once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSnapshot {
    pub run_id: String,
    pub findings_text: String,
    /// Consumed by the result of this run only.
    pub image: Option<ImageRef>,
}
