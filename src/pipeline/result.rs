//! Completed scan results.

use serde::Serialize;

use crate::analysis::AnalysisReport;
use crate::severity::{classify, normalize_status, SeverityKey};

use super::context::RunSnapshot;
use super::image::ImageRef;

/// One finding of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DamageDetail {
    pub title: String,
    pub severity_key: SeverityKey,
    pub severity_label: String,
    pub suggestion: String,
}

/// Outcome of one completed run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    pub id: String,
    pub severity_key: SeverityKey,
    pub severity_label: String,
    pub severity_description: String,
    pub primary_damage_title: String,
    pub primary_suggestion: String,
    pub findings_summary: String,
    pub image: Option<ImageRef>,
    pub timestamp_millis: i64,
    /// Currently always the primary finding alone.
    pub damage_details: Vec<DamageDetail>,
}

impl ScanResult {
    /// Resolve a possibly partial report against the severity table.
    ///
    /// Missing fields fall back to the tier defaults; a missing id falls back
    /// to the run id.
    pub fn from_report(snapshot: RunSnapshot, report: AnalysisReport, timestamp_millis: i64) -> Self {
        let status = normalize_status(report.status.as_deref());
        let meta = classify(&status);

        let primary_damage = report
            .damage_category
            .unwrap_or_else(|| meta.default_damage_label.to_string());
        let suggestion = report
            .maintenance_suggestion
            .unwrap_or_else(|| meta.default_suggestion.to_string());
        let id = report.id.unwrap_or(snapshot.run_id);

        let detail = DamageDetail {
            title: primary_damage.clone(),
            severity_key: meta.key,
            severity_label: meta.label.to_string(),
            suggestion: suggestion.clone(),
        };

        Self {
            id,
            severity_key: meta.key,
            severity_label: meta.label.to_string(),
            severity_description: meta.description.to_string(),
            primary_damage_title: primary_damage,
            primary_suggestion: suggestion,
            findings_summary: snapshot.findings_text,
            image: snapshot.image,
            timestamp_millis,
            damage_details: vec![detail],
        }
    }
}
