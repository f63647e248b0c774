// src/pipeline/canary.rs

//! A single canary run.
//!
//! 1. Scrape every category and format its topics
//! 2. Compare against the latest snapshot
//! 3. If changed, text the new topics and save them as today's snapshot

use std::sync::Arc;

use crate::config::{Config, MAX_MESSAGE_LENGTH};
use crate::error::{AppError, Result};
use crate::models::{Category, TopicSet};
use crate::services::{Notifier, PageFetcher, PageScraper, Publisher, format_topic, strip_quotes};
use crate::storage::{ObjectStore, SnapshotStore};

/// Topics and message a run would send, without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub topics: TopicSet,
    pub message: String,
}

/// Wires the scraper, snapshot store and notifier into one run.
pub struct Canary {
    config: Config,
    scraper: PageScraper,
    snapshots: SnapshotStore,
    notifier: Notifier,
}

impl Canary {
    pub fn new(
        config: Config,
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn ObjectStore>,
        publisher: Arc<dyn Publisher>,
    ) -> Result<Self> {
        let scraper = PageScraper::new(fetcher, &config.scraper.base_url)?;
        let notifier = Notifier::new(publisher, config.topic_arn.clone());
        Ok(Self {
            config,
            scraper,
            snapshots: SnapshotStore::new(store),
            notifier,
        })
    }

    /// Scrape and format the topics of every category.
    pub async fn todays_topics(&self) -> Result<TopicSet> {
        log::info!("Retrieving today's bundle...");
        let mut topics = TopicSet::new();
        for category in Category::ALL {
            let raw = self
                .scraper
                .scrape(self.config.start_url(category), true)
                .await?;
            topics.insert(category, raw.iter().map(|t| format_topic(t)).collect());
        }
        Ok(topics)
    }

    /// Scrape and build the message without touching storage or the publisher.
    pub async fn preview(&self) -> Result<Preview> {
        let topics = self.todays_topics().await?;
        let message = build_message(&topics);
        Ok(Preview { topics, message })
    }

    /// Execute one run. Returns whether it completed successfully.
    ///
    /// Never fails: every error is logged and reported as `false`.
    pub async fn run(&self) -> bool {
        let topics = match self.todays_topics().await {
            Ok(topics) => topics,
            Err(e) => return failed("Failed to retrieve today's topics", &e),
        };

        let is_new = match self.snapshots.has_changed(&topics).await {
            Ok(is_new) => is_new,
            Err(e) => return failed("Failed to check topics recency status", &e),
        };

        if !is_new {
            log::info!("Notification unsent: bundles unchanged.");
            return true;
        }

        log::info!("New bundles found. Creating notification...");
        let message = build_message(&topics);
        log::info!(
            "Notification: {} Length: {}",
            message,
            message.chars().count()
        );

        if let Err(e) = check_message(&message) {
            return failed("Notification unsent", &e);
        }

        let sent = match self.notifier.send(&message).await {
            Ok(sent) => sent,
            Err(e) => return failed("Failed to send notification", &e),
        };
        if !sent {
            log::error!("Notification was not accepted by the dispatch service");
        }

        let unquoted = topics.map_topics(|t| strip_quotes(t).to_string());
        let saved = self.snapshots.save_snapshot(Some(&unquoted)).await;

        sent && saved
    }
}

/// `BOOKS: 'C'. GAMES: 'A', 'B'.`
///
/// Categories are separated by a single space with nothing after the last
/// one, so the full 160 characters are available to topics.
pub fn build_message(topics: &TopicSet) -> String {
    topics
        .iter()
        .map(|(category, items)| {
            format!(
                "{}: {}.",
                category.name().to_uppercase(),
                items.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reject messages that are empty or do not fit in one SMS.
pub fn check_message(message: &str) -> Result<()> {
    let length = message.chars().count();
    if length == 0 {
        return Err(AppError::policy("notification body empty"));
    }
    if length > MAX_MESSAGE_LENGTH {
        return Err(AppError::policy(format!(
            "notification is {length} characters, limit is {MAX_MESSAGE_LENGTH}"
        )));
    }
    Ok(())
}

fn failed(context: &str, err: &AppError) -> bool {
    log::error!("{context}: {err}");
    log::debug!("{err:?}");
    false
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::storage::MemoryObjectStore;
    use crate::testing::{FlakyStore, RecordingPublisher, StaticFetcher};

    const GAMES_URL: &str = "https://www.humblebundle.com";
    const BOOKS_URL: &str = "https://www.humblebundle.com/books";
    const TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:canary";

    fn page(links: &[&str], titles: &[String]) -> String {
        let anchors: String = links
            .iter()
            .map(|href| format!(r#"<a href="{href}">tab</a>"#))
            .collect();
        let headings: String = titles
            .iter()
            .map(|t| format!("<h2 class=\"bundle-info-heading\">\n  {t}\n</h2>"))
            .collect();
        format!(
            r#"<html><body><div id="subtab-container"><a id="active-subtab" href="/">Games</a>{anchors}</div>{headings}</body></html>"#
        )
    }

    fn titles(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn site(games: Vec<String>, books: Vec<String>) -> StaticFetcher {
        StaticFetcher::default()
            .with_page(GAMES_URL, page(&["/rpg"], &games[1..]))
            .with_page(format!("{GAMES_URL}/rpg"), page(&[], &games[..1]))
            .with_page(BOOKS_URL, page(&[], &books))
    }

    fn default_site() -> StaticFetcher {
        site(
            titles(&[
                "The Humble RPG Bundle: Game One presented by Studio X",
                "Game Two",
            ]),
            titles(&["The Humble Book Bundle: Sci-Fi Classics"]),
        )
    }

    fn config() -> Config {
        Config {
            topic_arn: Some(TOPIC.into()),
            ..Config::default()
        }
    }

    fn canary(
        config: Config,
        fetcher: StaticFetcher,
        store: Arc<dyn ObjectStore>,
        publisher: &Arc<RecordingPublisher>,
    ) -> Canary {
        Canary::new(config, Arc::new(fetcher), store, publisher.clone()).unwrap()
    }

    #[test]
    fn test_build_message() {
        let mut topics = TopicSet::new();
        topics.insert(Category::Books, titles(&["'C'"]));
        topics.insert(Category::Games, titles(&["'A'", "'B'"]));
        assert_eq!(build_message(&topics), "BOOKS: 'C'. GAMES: 'A', 'B'.");
    }

    #[test]
    fn test_check_message_boundaries() {
        assert!(check_message(&"x".repeat(MAX_MESSAGE_LENGTH)).is_ok());
        assert!(matches!(
            check_message(&"x".repeat(MAX_MESSAGE_LENGTH + 1)),
            Err(AppError::Policy(_))
        ));
        assert!(matches!(check_message(""), Err(AppError::Policy(_))));
    }

    #[tokio::test]
    async fn test_preview_has_no_side_effects() {
        let store = Arc::new(MemoryObjectStore::new());
        let publisher = Arc::new(RecordingPublisher::with_status(Some(200)));
        let canary = canary(config(), default_site(), store.clone(), &publisher);

        let preview = canary.preview().await.unwrap();
        assert_eq!(
            preview.topics.get(Category::Games),
            Some(&titles(&["'Game One'", "'Game Two'"])[..])
        );
        assert_eq!(
            preview.message,
            "BOOKS: 'Sci-Fi Classics'. GAMES: 'Game One', 'Game Two'."
        );
        assert!(store.is_empty());
        assert!(publisher.sent().is_empty());
    }

    #[tokio::test]
    async fn test_consecutive_runs_with_same_content() {
        let store = Arc::new(FlakyStore::default());
        let publisher = Arc::new(RecordingPublisher::with_status(Some(200)));

        let first = canary(config(), default_site(), store.clone(), &publisher);
        assert!(first.run().await);
        assert_eq!(publisher.sent().len(), 1);
        assert_eq!(store.inner.len(), 1);

        // A second save attempt would fail the run.
        store.fail_put(true);
        let second = canary(config(), default_site(), store.clone(), &publisher);
        assert!(second.run().await);
        assert_eq!(publisher.sent().len(), 1);
        assert_eq!(store.inner.len(), 1);
    }

    #[tokio::test]
    async fn test_saved_snapshot_is_unquoted() {
        let store = Arc::new(MemoryObjectStore::new());
        let publisher = Arc::new(RecordingPublisher::with_status(Some(200)));
        assert!(canary(config(), default_site(), store.clone(), &publisher).run().await);

        let entries = store.list().await.unwrap();
        let body = store.get(&entries[0].key).await.unwrap().unwrap();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            r#"{"books": ["Sci-Fi Classics"], "games": ["Game One", "Game Two"]}"#
        );
    }

    #[tokio::test]
    async fn test_changed_content_is_sent() {
        let store = Arc::new(MemoryObjectStore::new());
        store.insert(
            "2026-10-18.json",
            br#"{"games": ["Old Game"], "books": ["Old Book"]}"#.to_vec(),
            Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap(),
        );
        let publisher = Arc::new(RecordingPublisher::with_status(Some(200)));

        assert!(canary(config(), default_site(), store.clone(), &publisher).run().await);
        assert_eq!(
            publisher.sent(),
            vec![(
                TOPIC.to_string(),
                "BOOKS: 'Sci-Fi Classics'. GAMES: 'Game One', 'Game Two'.".to_string()
            )]
        );
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_books_first_snapshot_is_unchanged() {
        let store = Arc::new(MemoryObjectStore::new());
        store.insert(
            "2026-10-18.json",
            br#"{"books": ["Sci-Fi Classics"], "games": ["Game One", "Game Two"]}"#.to_vec(),
            Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap(),
        );
        let publisher = Arc::new(RecordingPublisher::with_status(Some(200)));

        assert!(canary(config(), default_site(), store.clone(), &publisher).run().await);
        assert!(publisher.sent().is_empty());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_snapshot_aborts_run() {
        let store = Arc::new(FlakyStore::default());
        store.inner.insert(
            "2026-10-18.json",
            b"{}".to_vec(),
            Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap(),
        );
        store.fail_get(true);
        let publisher = Arc::new(RecordingPublisher::with_status(Some(200)));

        assert!(!canary(config(), default_site(), store.clone(), &publisher).run().await);
        assert!(publisher.sent().is_empty());
        assert_eq!(store.inner.len(), 1);
    }

    /// Four 26-character games, one 18-character game, and one book title
    /// of `book_len` characters. With a one-character book this is exactly
    /// 160 characters of message; no space follows the last category.
    fn boundary_site(book_len: usize) -> StaticFetcher {
        let mut games: Vec<String> = (0..4u8)
            .map(|i| format!("{}{}", (b'a' + i) as char, "x".repeat(25)))
            .collect();
        games.push("y".repeat(18));
        site(games, vec!["b".repeat(book_len)])
    }

    #[tokio::test]
    async fn test_message_at_limit_is_sent() {
        let store = Arc::new(MemoryObjectStore::new());
        let publisher = Arc::new(RecordingPublisher::with_status(Some(200)));

        assert!(canary(config(), boundary_site(1), store.clone(), &publisher).run().await);
        let sent = publisher.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.chars().count(), MAX_MESSAGE_LENGTH);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_message_over_limit_is_rejected() {
        let store = Arc::new(MemoryObjectStore::new());
        let publisher = Arc::new(RecordingPublisher::with_status(Some(200)));

        assert!(!canary(config(), boundary_site(2), store.clone(), &publisher).run().await);
        assert!(publisher.sent().is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_missing_topic_fails_without_saving() {
        let store = Arc::new(MemoryObjectStore::new());
        let publisher = Arc::new(RecordingPublisher::with_status(Some(200)));

        assert!(!canary(Config::default(), default_site(), store.clone(), &publisher).run().await);
        assert!(publisher.sent().is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_publish_error_skips_save() {
        let store = Arc::new(MemoryObjectStore::new());
        let publisher = Arc::new(RecordingPublisher::failing());

        assert!(!canary(config(), default_site(), store.clone(), &publisher).run().await);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_send_still_saves_but_fails() {
        let store = Arc::new(MemoryObjectStore::new());
        let publisher = Arc::new(RecordingPublisher::with_status(Some(500)));

        assert!(!canary(config(), default_site(), store.clone(), &publisher).run().await);
        assert_eq!(publisher.sent().len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_save_failure_fails_run() {
        let store = Arc::new(FlakyStore::default());
        store.fail_put(true);
        let publisher = Arc::new(RecordingPublisher::with_status(Some(200)));

        assert!(!canary(config(), default_site(), store.clone(), &publisher).run().await);
        assert_eq!(publisher.sent().len(), 1);
    }
}
