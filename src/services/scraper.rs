// src/services/scraper.rs

//! Page scraper.
//!
//! Fetches a bundle page and collects its headings. When asked to follow
//! links, the page's other subtabs are scraped first (one level deep, never
//! followed further) and the page's own headings are appended last.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::error::{AppError, Result};
use crate::services::extractor::PageExtract;
use crate::utils::resolve_url;

/// Source of page bodies.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return the response body.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Scrapes bundle headings from pages served by a [`PageFetcher`].
pub struct PageScraper {
    fetcher: Arc<dyn PageFetcher>,
    base_url: Url,
}

impl PageScraper {
    /// Create a scraper resolving subtab links against `base_url`.
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::config(format!("Invalid base URL {base_url}: {e}")))?;
        Ok(Self { fetcher, base_url })
    }

    /// Scrape headings from `url`, optionally including its subtabs.
    ///
    /// A page that cannot be fetched contributes nothing; only an empty
    /// `url` is an error.
    pub async fn scrape(&self, url: &str, follow_links: bool) -> Result<Vec<String>> {
        if url.trim().is_empty() {
            return Err(AppError::fetch("No URL provided"));
        }

        let Some(page) = self.load(url).await else {
            return Ok(Vec::new());
        };

        if !follow_links {
            return Ok(page.titles);
        }

        let mut topics = Vec::new();
        for link in &page.links {
            match resolve_url(&self.base_url, link) {
                Some(target) => {
                    log::debug!("Following subtab {} from {}", target, url);
                    if let Some(subpage) = self.load(&target).await {
                        topics.extend(subpage.titles);
                    }
                }
                None => log::warn!("Skipping unresolvable subtab link {:?} on {}", link, url),
            }
        }
        topics.extend(page.titles);

        log::info!("Scraped {} topics from {}", topics.len(), url);
        Ok(topics)
    }

    async fn load(&self, url: &str) -> Option<PageExtract> {
        match self.fetcher.fetch(url).await {
            Ok(body) => Some(PageExtract::from_html(&body)),
            Err(e) => {
                log::error!("Failed to fetch URL {}: {}", url, e);
                None
            }
        }
    }
}
