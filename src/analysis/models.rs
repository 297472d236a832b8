//! Analysis wire models.

use serde::{Deserialize, Serialize};

/// Findings submitted for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(rename = "uld_id")]
    pub id: String,
    #[serde(rename = "yolo_findings")]
    pub findings_text: String,
}

impl AnalysisRequest {
    pub fn new(id: &str, findings_text: &str) -> Self {
        Self {
            id: id.to_string(),
            findings_text: findings_text.to_string(),
        }
    }
}

/// Report returned by the analysis service. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(rename = "uld_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub damage_category: Option<String>,
    #[serde(default)]
    pub maintenance_suggestion: Option<String>,
}

impl AnalysisReport {
    /// Report carrying only a status, as a partial service answer would.
    pub fn with_status(status: &str) -> Self {
        Self {
            status: Some(status.to_string()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_names() {
        let request = AnalysisRequest::new("ULD-1", "severe puncture");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({"uld_id": "ULD-1", "yolo_findings": "severe puncture"}));
    }

    #[test]
    fn test_partial_report() {
        let report: AnalysisReport = serde_json::from_str(r#"{"status": "RED"}"#).unwrap();
        assert_eq!(report, AnalysisReport::with_status("RED"));
        assert!(report.id.is_none());
        assert!(report.damage_category.is_none());
    }

    #[test]
    fn test_full_report() {
        let report: AnalysisReport = serde_json::from_value(json!({
            "uld_id": "AKE-CPA100",
            "status": "yellow",
            "damage_category": "Dent on base rail",
            "maintenance_suggestion": "Schedule repair",
            "timestamp": "ignored"
        }))
        .unwrap();
        assert_eq!(report.id.as_deref(), Some("AKE-CPA100"));
        assert_eq!(report.maintenance_suggestion.as_deref(), Some("Schedule repair"));
    }
}
