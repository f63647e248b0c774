// src/testing.rs

//! In-process collaborators for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::SnapshotEntry;
use crate::services::{PageFetcher, PublishReceipt, Publisher};
use crate::storage::{MemoryObjectStore, ObjectStore};

/// Serves fixed pages and records every requested URL.
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(format!("404 Not Found: {url}")))
    }
}

/// Records published messages and answers with a fixed status.
pub struct RecordingPublisher {
    status_code: Option<u16>,
    fail: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingPublisher {
    pub fn with_status(status_code: Option<u16>) -> Self {
        Self {
            status_code,
            fail: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_status(None)
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, topic: &str, message: &str) -> Result<PublishReceipt> {
        if self.fail {
            return Err(AppError::fetch("connection reset by peer"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((topic.to_string(), message.to_string()));
        Ok(PublishReceipt {
            status_code: self.status_code,
            message_id: Some("msg-1".to_string()),
        })
    }
}

/// Memory store whose operations can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryObjectStore,
    fail_list: AtomicBool,
    fail_get: AtomicBool,
    fail_put: AtomicBool,
}

impl FlakyStore {
    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_put(&self, fail: bool) {
        self.fail_put.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for FlakyStore {
    async fn list(&self) -> Result<Vec<SnapshotEntry>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(AppError::storage("AccessDenied"));
        }
        self.inner.list().await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(AppError::storage(format!("InternalError reading {key}")));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(AppError::storage(format!("SlowDown writing {key}")));
        }
        self.inner.put(key, bytes).await
    }

    fn location(&self) -> String {
        "flaky://".to_string()
    }
}
