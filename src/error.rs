// src/error.rs

//! Unified error handling for the canary.

use std::fmt;

use thiserror::Error;

/// Result type alias for canary operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
///
/// Each variant is one error kind; callers branch on the variant and log
/// the detail string.
#[derive(Error, Debug)]
pub enum AppError {
    /// Page could not be fetched or the request was malformed
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Snapshot storage could not be listed, read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Required configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// The run produced something that must not be delivered
    #[error("Policy violation: {0}")]
    Policy(String),

    /// Publishing to the dispatch service failed
    #[error("Notification error: {message}")]
    Notify {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AppError {
    /// Create a fetch error.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a policy violation error.
    pub fn policy(message: impl Into<String>) -> Self {
        Self::Policy(message.into())
    }

    /// Create a notification error with its underlying cause.
    pub fn notify<E>(message: impl fmt::Display, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Notify {
            message: message.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Fetch(err.to_string())
    }
}
