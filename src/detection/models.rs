//! Detection models.
//!
//! Wire shapes returned by the detection service and the normalized
//! `Detection` handed to the pipeline.

use serde::{Deserialize, Serialize};

/// One labeled box, normalized for the pipeline. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub label: String,
    /// Passed through from the service without clamping.
    pub confidence: f32,
    /// Normalized `[x1, y1, x2, y2]`, absent when the service sent none.
    pub bbox: Option<[f32; 4]>,
}

impl Detection {
    pub fn new(label: &str, confidence: f32, bbox: Option<[f32; 4]>) -> Self {
        Self {
            label: label.to_string(),
            confidence,
            bbox,
        }
    }
}

/// Body of a successful detection response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteDetectionResponse {
    /// Null entries are tolerated and skipped during mapping.
    #[serde(default)]
    pub detections: Option<Vec<Option<RemoteDetection>>>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// A single raw detection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteDetection {
    #[serde(default)]
    pub box_norm: Option<Vec<f32>>,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub class_id: i64,
    #[serde(default)]
    pub label: Option<String>,
}

impl RemoteDetection {
    /// The normalized box, if it has exactly four coordinates.
    pub fn bbox(&self) -> Option<[f32; 4]> {
        match self.box_norm.as_deref() {
            Some(&[x1, y1, x2, y2]) => Some([x1, y1, x2, y2]),
            _ => None,
        }
    }
}
