//! Snapshot persistence.
//!
//! Each run that detects a change writes one snapshot named after the UTC
//! date. Comparison always reads back the most recently modified object.
//!
//! ## Bucket Layout
//!
//! ```text
//! {bucket}/
//! ├── 2026-10-17.json
//! ├── 2026-10-18.json
//! └── 2026-10-19.json      # latest, compared against the next run
//! ```

pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::error::{AppError, Result};
use crate::models::{SnapshotEntry, TopicSet, select_latest, snapshot_key};

// Re-export for convenience
pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;
#[cfg(feature = "s3")]
pub use s3::S3ObjectStore;

/// Flat key/value object store holding snapshots.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List every object in the store.
    async fn list(&self) -> Result<Vec<SnapshotEntry>>;

    /// Read an object, returning `None` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write an object, replacing any existing object with the same key.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;

    /// Human-readable location for log messages.
    fn location(&self) -> String;
}

/// Daily snapshot bookkeeping on top of an [`ObjectStore`].
pub struct SnapshotStore {
    store: Arc<dyn ObjectStore>,
}

impl SnapshotStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// List stored snapshots.
    ///
    /// Failures are logged and reported as an empty store.
    pub async fn list_snapshots(&self) -> Vec<SnapshotEntry> {
        match self.store.list().await {
            Ok(entries) => {
                if entries.is_empty() {
                    log::info!("Bucket {} is empty", self.store.location());
                }
                entries
            }
            Err(e) => {
                log::error!("Failed to access bucket {}: {}", self.store.location(), e);
                Vec::new()
            }
        }
    }

    /// Content of the most recently modified snapshot in `entries`.
    pub async fn latest_snapshot(&self, entries: &[SnapshotEntry]) -> Result<Option<String>> {
        let Some(latest) = select_latest(entries) else {
            log::warn!("No snapshots found");
            return Ok(None);
        };

        log::debug!(
            "Latest snapshot is {} (modified {})",
            latest.key,
            latest.last_modified
        );
        let bytes = self.store.get(&latest.key).await?.ok_or_else(|| {
            AppError::storage(format!(
                "Snapshot {} was listed but could not be retrieved",
                latest.key
            ))
        })?;

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| AppError::storage(format!("Snapshot {} is not UTF-8: {e}", latest.key)))
    }

    /// Whether `current` differs from the latest stored snapshot.
    ///
    /// Quote characters are ignored on both sides, since stored topics are
    /// unquoted while `current` holds display-formatted ones.
    pub async fn has_changed(&self, current: &TopicSet) -> Result<bool> {
        log::info!("Checking if current bundle is new...");
        let entries = self.list_snapshots().await;
        if entries.is_empty() {
            return Ok(true);
        }

        let latest = self
            .latest_snapshot(&entries)
            .await?
            .ok_or_else(|| AppError::storage("Snapshots found but error retrieving latest one"))?;

        let current = current.to_canonical_json()?;
        Ok(strip_quote_chars(&current) != strip_quote_chars(&latest))
    }

    /// Save `topics` as today's snapshot.
    pub async fn save_snapshot(&self, topics: Option<&TopicSet>) -> bool {
        self.save_snapshot_on(topics, Utc::now().date_naive()).await
    }

    /// Save `topics` as the snapshot for `date`, overwriting any existing one.
    ///
    /// Returns `false` for `None` or when the upload fails.
    pub async fn save_snapshot_on(&self, topics: Option<&TopicSet>, date: NaiveDate) -> bool {
        let Some(topics) = topics else {
            return false;
        };

        log::info!("Uploading today's topics to bucket...");
        let key = snapshot_key(date);
        let result = match topics.to_canonical_json() {
            Ok(json) => self.store.put(&key, json.into_bytes()).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                log::info!(
                    "Created topics file {} in bucket {}",
                    key,
                    self.store.location()
                );
                true
            }
            Err(e) => {
                log::error!(
                    "Failed to save topics in bucket {}: {}",
                    self.store.location(),
                    e
                );
                log::debug!("{e:?}");
                false
            }
        }
    }
}

fn strip_quote_chars(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '\'' | '"')).collect()
}
