//! Client configuration.
//!
//! Defaults match the deployed detection and analysis services; every
//! value can be overridden from the environment with `from_env`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DETECTION_URL: &str = "ARGOS_DETECTION_URL";
pub const ENV_ANALYSIS_URL: &str = "ARGOS_ANALYSIS_URL";
pub const ENV_CONNECT_TIMEOUT: &str = "ARGOS_CONNECT_TIMEOUT_SECS";
pub const ENV_REQUEST_TIMEOUT: &str = "ARGOS_REQUEST_TIMEOUT_SECS";
pub const ENV_HISTORY_DIR: &str = "ARGOS_HISTORY_DIR";

/// Endpoints, timeouts and storage location for a scan client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub detection_base_url: String,
    pub detection_path: String,
    pub analysis_base_url: String,
    pub analysis_path: String,
    pub connect_timeout: Duration,
    /// Whole-request timeout. The core itself never times out a run.
    pub request_timeout: Duration,
    pub history_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            detection_base_url: "https://lima-wu-my-yolo-hackathon.hf.space/".to_string(),
            detection_path: "detect".to_string(),
            analysis_base_url: "http://10.0.2.2:8000/".to_string(),
            analysis_path: "/api/ai/analyze".to_string(),
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            history_dir: PathBuf::from("argos_history"),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by any `ARGOS_*` variables present.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| env::var(name).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in production).
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_DETECTION_URL) {
            self.detection_base_url = url;
        }
        if let Some(url) = lookup(ENV_ANALYSIS_URL) {
            self.analysis_base_url = url;
        }
        if let Some(secs) = lookup(ENV_CONNECT_TIMEOUT).and_then(|v| parse_secs(ENV_CONNECT_TIMEOUT, &v)) {
            self.connect_timeout = secs;
        }
        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT).and_then(|v| parse_secs(ENV_REQUEST_TIMEOUT, &v)) {
            self.request_timeout = secs;
        }
        if let Some(dir) = lookup(ENV_HISTORY_DIR) {
            self.history_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn detection_url(&self) -> String {
        join_url(&self.detection_base_url, &self.detection_path)
    }

    pub fn analysis_url(&self) -> String {
        join_url(&self.analysis_base_url, &self.analysis_path)
    }
}

fn parse_secs(name: &str, value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(e) => {
            log::warn!("CONFIG_IGNORED var={} value={:?} error={}", name, value, e);
            None
        }
    }
}

/// Join base and path with exactly one `/` between them.
fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
