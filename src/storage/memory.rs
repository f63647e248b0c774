//! In-process object store.
//!
//! Keeps objects in a map ordered by key, the way a bucket listing is
//! ordered. Used for dry runs and tests.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::SnapshotEntry;
use crate::storage::ObjectStore;

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    last_modified: DateTime<Utc>,
}

/// Object store backed by a map in memory.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object with an explicit modification time.
    pub fn insert(&self, key: impl Into<String>, bytes: Vec<u8>, last_modified: DateTime<Utc>) {
        self.objects().insert(
            key.into(),
            StoredObject {
                bytes,
                last_modified,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }

    fn objects(&self) -> MutexGuard<'_, BTreeMap<String, StoredObject>> {
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list(&self) -> Result<Vec<SnapshotEntry>> {
        Ok(self
            .objects()
            .iter()
            .map(|(key, object)| SnapshotEntry::new(key.clone(), object.last_modified))
            .collect())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.objects().get(key).map(|object| object.bytes.clone()))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.insert(key, bytes, Utc::now());
        Ok(())
    }

    fn location(&self) -> String {
        "memory://".to_string()
    }
}
