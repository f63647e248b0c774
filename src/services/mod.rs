//! Service layer for the canary.
//!
//! This module contains the business logic for:
//! - Markup queries on bundle pages (`extractor`)
//! - Page fetching and subtab following (`PageScraper`)
//! - Topic cleanup (`format_topic`)
//! - Notification dispatch (`Notifier`)

pub mod extractor;
mod formatter;
mod notifier;
mod scraper;

pub use extractor::PageExtract;
pub use formatter::{MAX_TOPIC_LENGTH, format_topic, strip_quotes};
#[cfg(feature = "sns")]
pub use notifier::SnsPublisher;
pub use notifier::{ConsolePublisher, Notifier, PublishReceipt, Publisher};
pub use scraper::{PageFetcher, PageScraper};
