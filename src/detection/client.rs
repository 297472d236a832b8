//! Detection client.
//!
//! Calls the detection transport and maps raw detections to domain
//! `Detection`s. Any failure is logged and reported as "no detections".

use std::sync::Arc;

use crate::error::ScanError;
use crate::logging::structured::LogContext;

use super::models::{Detection, RemoteDetectionResponse};

/// Labels for the class ids the deployed model was trained on, by index.
pub const KNOWN_LABELS: [&str; 3] = ["normal", "squash", "breach"];

/// Raw access to the remote detection service.
pub trait DetectionTransport: Send + Sync {
    /// Upload one JPEG and return the decoded response body.
    fn detect(&self, jpeg: &[u8]) -> Result<RemoteDetectionResponse, ScanError>;
}

/// Normalizing front of a `DetectionTransport`.
#[derive(Clone)]
pub struct DetectionClient {
    transport: Arc<dyn DetectionTransport>,
}

impl DetectionClient {
    pub fn new(transport: Arc<dyn DetectionTransport>) -> Self {
        Self { transport }
    }

    /// Detect damage on a JPEG payload.
    ///
    /// Transport failures, timeouts and rejections all yield an empty list.
    pub fn detect(&self, jpeg: &[u8], ctx: &LogContext) -> Vec<Detection> {
        log::debug!("{} DETECTION_START bytes={}", ctx, jpeg.len());

        match self.transport.detect(jpeg) {
            Ok(response) => {
                let detections = map_detections(response);
                log::info!("{} DETECTION_COMPLETE count={}", ctx, detections.len());
                detections
            }
            Err(e) => {
                log::warn!("{} DETECTION_FAILED error={}", ctx, e);
                Vec::new()
            }
        }
    }
}

/// Map a response body to domain detections, skipping null entries.
pub fn map_detections(response: RemoteDetectionResponse) -> Vec<Detection> {
    response
        .detections
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .map(|raw| Detection {
            label: resolve_label(raw.class_id, raw.label.as_deref()),
            confidence: raw.confidence,
            bbox: raw.bbox(),
        })
        .collect()
}

/// Resolve the label for a class id.
///
/// Known ids win over the service label; a blank service label falls back
/// to `class_<id>`.
pub fn resolve_label(class_id: i64, service_label: Option<&str>) -> String {
    if let Some(label) = usize::try_from(class_id)
        .ok()
        .and_then(|idx| KNOWN_LABELS.get(idx))
    {
        return label.to_string();
    }

    match service_label {
        Some(label) if !label.trim().is_empty() => label.to_string(),
        _ => format!("class_{}", class_id),
    }
}
