// src/models/snapshot.rs

//! Snapshot listing records.

use chrono::{DateTime, NaiveDate, Utc};

/// One stored snapshot as reported by a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    /// Object key within the bucket
    pub key: String,

    /// Last modification time reported by the store
    pub last_modified: DateTime<Utc>,
}

impl SnapshotEntry {
    pub fn new(key: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            last_modified,
        }
    }
}

/// Object key for the snapshot written on `date`.
pub fn snapshot_key(date: NaiveDate) -> String {
    format!("{}.json", date.format("%Y-%m-%d"))
}

/// Most recently modified entry.
///
/// Ties resolve to the entry listed first.
pub fn select_latest(entries: &[SnapshotEntry]) -> Option<&SnapshotEntry> {
    entries.iter().fold(None, |latest, entry| match latest {
        Some(current) if current.last_modified >= entry.last_modified => Some(current),
        _ => Some(entry),
    })
}
