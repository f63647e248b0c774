// src/models/mod.rs

//! Domain models for the canary.
//!
//! Topics live only for the duration of a run; snapshots are what survives
//! between runs.

mod snapshot;
mod topic;

// Re-export all public types
pub use snapshot::{SnapshotEntry, select_latest, snapshot_key};
pub use topic::{Category, TopicSet};
