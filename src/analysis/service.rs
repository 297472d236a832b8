//! Analysis service seam.

use crate::error::ScanError;

use super::models::{AnalysisReport, AnalysisRequest};

/// Submits findings for classification.
///
/// Implementations report unreachable services as `Transport` and non-2xx
/// answers as `RemoteRejection`. They own any timeout policy.
pub trait AnalysisService: Send + Sync {
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, ScanError>;
}
