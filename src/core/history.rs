//! Append-only conversion history, persisted under the `history` key.

use crate::core::currency::CurrencyCode;
use crate::core::storage::{self, KeyValueStorage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const HISTORY_KEY: &str = "history";

/// A recorded conversion. `amounts[i]` is the result for `targets[i]`;
/// `None` marks a target whose rate was unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub from: CurrencyCode,
    #[serde(rename = "tos")]
    pub targets: Vec<CurrencyCode>,
    pub amounts: Vec<Option<f64>>,
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn is_aligned(&self) -> bool {
        self.targets.len() == self.amounts.len()
    }
}

pub struct History {
    entries: Vec<HistoryEntry>,
    storage: Arc<dyn KeyValueStorage>,
}

impl History {
    /// Loads history from `storage`. Missing or corrupt data yields an empty
    /// log. Individual entries that fail to parse, or whose targets and
    /// amounts differ in length, are dropped.
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let raw: Vec<serde_json::Value> = storage::load_or_default(storage.as_ref(), HISTORY_KEY);
        let mut entries: Vec<HistoryEntry> = Vec::with_capacity(raw.len());
        for item in raw {
            match serde_json::from_value::<HistoryEntry>(item) {
                Ok(entry) if entry.is_aligned() => entries.push(entry),
                Ok(entry) => warn!(
                    from = %entry.from,
                    "Dropping stored history entry with mismatched targets and amounts"
                ),
                Err(e) => warn!(error = %e, "Dropping stored history entry"),
            }
        }
        debug!("Loaded {} history entries", entries.len());
        Self { entries, storage }
    }

    /// Appends `entry` and persists the whole log.
    pub fn append(&mut self, entry: HistoryEntry) {
        debug!(
            from = %entry.from,
            targets = entry.targets.len(),
            "Appending history entry"
        );
        self.entries.push(entry);
        storage::persist(self.storage.as_ref(), HISTORY_KEY, &self.entries);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
