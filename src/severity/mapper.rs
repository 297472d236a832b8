//! Severity lookup table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse outcome of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityKey {
    Green,
    Yellow,
    Red,
    Unknown,
}

impl SeverityKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityKey::Green => "green",
            SeverityKey::Yellow => "yellow",
            SeverityKey::Red => "red",
            SeverityKey::Unknown => "unknown",
        }
    }

    /// Exact match against the lower-case keys; anything else is `Unknown`.
    pub fn from_status(status: &str) -> Self {
        match status {
            "green" => SeverityKey::Green,
            "yellow" => SeverityKey::Yellow,
            "red" => SeverityKey::Red,
            _ => SeverityKey::Unknown,
        }
    }
}

impl fmt::Display for SeverityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display metadata and defaults for one severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityMeta {
    pub key: SeverityKey,
    pub label: &'static str,
    pub description: &'static str,
    pub default_damage_label: &'static str,
    pub default_suggestion: &'static str,
}

pub const GREEN: SeverityMeta = SeverityMeta {
    key: SeverityKey::Green,
    label: "Serviceable",
    description: "ULD is ready for service",
    default_damage_label: "No visible damage",
    default_suggestion: "Continue regular inspections",
};

pub const YELLOW: SeverityMeta = SeverityMeta {
    key: SeverityKey::Yellow,
    label: "Maintenance required",
    description: "Plan maintenance as soon as possible",
    default_damage_label: "Minor damage detected",
    default_suggestion: "Contact the maintenance team",
};

pub const RED: SeverityMeta = SeverityMeta {
    key: SeverityKey::Red,
    label: "Out of service",
    description: "Severe damage detected, stop operation",
    default_damage_label: "Major structural damage",
    default_suggestion: "Remove from service and notify maintenance",
};

pub const UNKNOWN: SeverityMeta = SeverityMeta {
    key: SeverityKey::Unknown,
    label: "Unknown status",
    description: "Please rescan to confirm",
    default_damage_label: "Status unclear",
    default_suggestion: "Run another inspection",
};

/// Normalize a raw report status for `classify`.
///
/// Absent statuses become `"unknown"`; everything else is lower-cased.
pub fn normalize_status(status: Option<&str>) -> String {
    match status {
        Some(s) => s.to_lowercase(),
        None => SeverityKey::Unknown.as_str().to_string(),
    }
}

/// Look up the metadata for an already-normalized status.
///
/// Total: unrecognized input maps to `UNKNOWN`.
pub fn classify(status: &str) -> &'static SeverityMeta {
    match SeverityKey::from_status(status) {
        SeverityKey::Green => &GREEN,
        SeverityKey::Yellow => &YELLOW,
        SeverityKey::Red => &RED,
        SeverityKey::Unknown => &UNKNOWN,
    }
}
