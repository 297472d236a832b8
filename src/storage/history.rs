//! Identity-partitioned scan history.
//!
//! Each identity key owns one blob holding its items newest-first. Items are
//! only ever prepended; nothing here removes, reorders or deduplicates.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::StorageError;

use super::backend::KeyValueStore;
use super::models::HistoryItem;

/// Prefix of every history blob key.
pub const HISTORY_KEY_PREFIX: &str = "history_";

/// History persistence over a `KeyValueStore`.
pub struct HistoryStore {
    backend: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write in `append`
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// Backend key for an identity key.
    pub fn storage_key(identity_key: &str) -> String {
        format!("{}{}", HISTORY_KEY_PREFIX, identity_key)
    }

    /// Load the history of an identity, newest first.
    ///
    /// Missing, unreadable or malformed data all yield an empty history.
    pub fn load(&self, identity_key: &str) -> Vec<HistoryItem> {
        let key = Self::storage_key(identity_key);

        match self.backend.get(&key) {
            Ok(raw) => parse_blob(&key, raw.as_deref()),
            Err(e) => {
                log::warn!("HISTORY_READ_FAILED key={} error={}", key, e);
                Vec::new()
            }
        }
    }

    /// Prepend an item and persist the whole sequence before returning it.
    ///
    /// A failed read aborts without writing. Only malformed stored data is
    /// replaced by a fresh sequence.
    pub fn append(
        &self,
        identity_key: &str,
        item: HistoryItem,
    ) -> Result<Vec<HistoryItem>, StorageError> {
        let _guard = self.write_lock.lock();
        let key = Self::storage_key(identity_key);

        let raw = self.backend.get(&key)?;
        let current = parse_blob(&key, raw.as_deref());
        let mut updated = Vec::with_capacity(current.len() + 1);
        updated.push(item);
        updated.extend(current);

        let blob = serde_json::to_string(&updated)?;
        self.backend.put(&key, &blob)?;

        log::info!("HISTORY_APPENDED key={} items={}", key, updated.len());
        Ok(updated)
    }
}

/// Decode a stored blob. Absent, blank or malformed blobs are empty.
fn parse_blob(key: &str, raw: Option<&str>) -> Vec<HistoryItem> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Vec::new(),
    };

    match serde_json::from_str::<Vec<HistoryItem>>(raw) {
        Ok(items) => {
            log::debug!("HISTORY_LOADED key={} items={}", key, items.len());
            items
        }
        Err(e) => {
            log::warn!("HISTORY_MALFORMED key={} error={}", key, e);
            Vec::new()
        }
    }
}
