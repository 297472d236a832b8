//! Structured logging utilities.
//!
//! Every pipeline log line starts with a `LogContext` so that the lines of
//! one run can be grepped together, even when two runs share a run id.

use std::fmt;

/// Correlation fields for one run, rendered as `[run=.. tag=.. user=..]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    pub run_id: String,
    /// Random per-run tag; run ids alone are not unique.
    pub tag: Option<String>,
    /// Identity key active when the run started.
    pub user_key: Option<String>,
}

impl LogContext {
    pub fn for_run(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            tag: None,
            user_key: None,
        }
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn for_user(mut self, user_key: impl Into<String>) -> Self {
        self.user_key = Some(user_key.into());
        self
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[run={}", self.run_id)?;
        if let Some(tag) = &self.tag {
            write!(f, " tag={}", tag)?;
        }
        if let Some(user) = &self.user_key {
            write!(f, " user={}", user)?;
        }
        f.write_str("]")
    }
}
