//! Persisted history records.
//!
//! One JSON array of these per identity. Every field tolerates being absent
//! or null so that older or hand-edited blobs still load.

use serde::{Deserialize, Deserializer, Serialize};

use crate::pipeline::result::ScanResult;
use crate::severity::SeverityKey;

/// Persisted projection of a `ScanResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub uld_id: String,
    #[serde(default = "unknown_key", deserialize_with = "null_as_unknown")]
    pub severity_key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub severity_label: String,
    /// Severity description of the run.
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub damage_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestion: String,
    /// Image reference string, `""` when the run had no image.
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_uri: String,
    /// Unix millis.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: i64,
}

impl From<&ScanResult> for HistoryItem {
    fn from(result: &ScanResult) -> Self {
        Self {
            uld_id: result.id.clone(),
            severity_key: result.severity_key.as_str().to_string(),
            severity_label: result.severity_label.clone(),
            summary: result.severity_description.clone(),
            damage_title: result.primary_damage_title.clone(),
            suggestion: result.primary_suggestion.clone(),
            image_uri: result
                .image
                .as_ref()
                .map(|image| image.to_string())
                .unwrap_or_default(),
            timestamp: result.timestamp_millis,
        }
    }
}

fn unknown_key() -> String {
    SeverityKey::Unknown.as_str().to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown_key))
}
