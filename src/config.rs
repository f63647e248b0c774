// src/config.rs

//! Canary configuration.
//!
//! Configuration comes from three layers, lowest first: built-in defaults,
//! an optional TOML file (CLI only), and environment variables.
//!
//! ## Environment Variables
//!
//! - `S3_BUCKET`: bucket holding daily snapshots (default: `humble-bundle-canary`)
//! - `SNS_TOPIC_ARN`: topic notifications are published to (no default)
//! - `CANARY_TIMEOUT_SECS`: HTTP request timeout
//! - `CANARY_USER_AGENT`: User-Agent header for page requests

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::Category;

/// Longest notification that can go out as a single SMS.
pub const MAX_MESSAGE_LENGTH: usize = 160;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP and scraping behavior settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Bucket holding the daily snapshots
    #[serde(default = "defaults::bucket")]
    pub bucket: String,

    /// Pub/sub topic notifications are published to
    #[serde(default)]
    pub topic_arn: Option<String>,

    /// Start page for each category
    #[serde(default)]
    pub start_urls: StartUrls,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Build configuration from defaults and the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Override fields from environment-style variables.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bucket) = var("S3_BUCKET") {
            self.bucket = bucket;
        }

        if let Some(arn) = var("SNS_TOPIC_ARN") {
            self.topic_arn = Some(arn);
        }

        if let Some(timeout) = var("CANARY_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => self.scraper.timeout_secs = secs,
                Err(_) => log::warn!("Ignoring invalid CANARY_TIMEOUT_SECS: {}", timeout),
            }
        }

        if let Some(agent) = var("CANARY_USER_AGENT") {
            self.scraper.user_agent = agent;
        }
    }

    /// Start URL for a category.
    pub fn start_url(&self, category: Category) -> &str {
        match category {
            Category::Games => &self.start_urls.games,
            Category::Books => &self.start_urls.books,
        }
    }

    /// Validate configuration values for basic sanity.
    ///
    /// A missing topic is not a validation failure; it only fails at send time.
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(AppError::config("bucket is empty"));
        }
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::config("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::config("scraper.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.scraper.base_url)
            .map_err(|e| AppError::config(format!("scraper.base_url is invalid: {e}")))?;
        for category in Category::ALL {
            if self.start_url(category).trim().is_empty() {
                return Err(AppError::config(format!(
                    "start URL for {} is empty",
                    category
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            bucket: defaults::bucket(),
            topic_arn: None,
            start_urls: StartUrls::default(),
        }
    }
}

/// HTTP client and scraping behavior settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Origin that relative subtab links are resolved against
    #[serde(default = "defaults::base_url")]
    pub base_url: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            base_url: defaults::base_url(),
        }
    }
}

/// Category start pages.
#[derive(Debug, Clone, Deserialize)]
pub struct StartUrls {
    #[serde(default = "defaults::games_url")]
    pub games: String,

    #[serde(default = "defaults::books_url")]
    pub books: String,
}

impl Default for StartUrls {
    fn default() -> Self {
        Self {
            games: defaults::games_url(),
            books: defaults::books_url(),
        }
    }
}

mod defaults {
    pub fn bucket() -> String {
        "humble-bundle-canary".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; bundle-canary/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn base_url() -> String {
        "https://www.humblebundle.com".into()
    }
    pub fn games_url() -> String {
        "https://www.humblebundle.com".into()
    }
    pub fn books_url() -> String {
        "https://www.humblebundle.com/books".into()
    }
}
