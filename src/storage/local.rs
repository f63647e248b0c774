//! Local filesystem object store.
//!
//! A directory stands in for the bucket so the canary can run on a
//! workstation. Production deployments should use `S3ObjectStore`.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── 2026-10-18.json
//! └── 2026-10-19.json
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::SnapshotEntry;
use crate::storage::ObjectStore;

const TMP_EXTENSION: &str = "tmp";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root_dir: PathBuf,
}

impl LocalObjectStore {
    /// Create a new store rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a key.
    fn path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(AppError::storage(format!("Invalid object key: {key:?}")));
        }
        Ok(self.root_dir.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn list(&self) -> Result<Vec<SnapshotEntry>> {
        let mut dir = match tokio::fs::read_dir(&self.root_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == TMP_EXTENSION) {
                continue;
            }
            let Some(key) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let last_modified: DateTime<Utc> = metadata.modified()?.into();
            entries.push(SnapshotEntry::new(key, last_modified));
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.path(key)?;
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let tmp = path.with_extension(TMP_EXTENSION);
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    fn location(&self) -> String {
        self.root_dir.display().to_string()
    }
}
