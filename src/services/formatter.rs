// src/services/formatter.rs

//! Turns raw bundle headings into short display topics.

use std::sync::LazyLock;

use regex::Regex;

/// Topics longer than this are ellipsized.
pub const MAX_TOPIC_LENGTH: usize = 30;

/// Characters kept from an ellipsized topic.
const TRUNCATED_LENGTH: usize = 27;

const ELLIPSIS: char = '…';

static PRESENTED_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" presented by [\w\s]+$").expect("valid regex"));

static HUMBLE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^The Humble [\w\s]+ Bundle: ").expect("valid regex"));

/// Clean, shorten and quote a raw bundle heading.
///
/// ```
/// use bundle_canary::services::format_topic;
///
/// assert_eq!(
///     format_topic("The Humble RPG Bundle: Game One presented by Studio X"),
///     "'Game One'"
/// );
/// ```
pub fn format_topic(raw: &str) -> String {
    let topic = PRESENTED_BY.replace(raw.trim(), "");
    let topic = HUMBLE_PREFIX.replace(&topic, "");

    let topic: String = if topic.chars().count() > MAX_TOPIC_LENGTH {
        topic
            .chars()
            .take(TRUNCATED_LENGTH)
            .chain(std::iter::once(ELLIPSIS))
            .collect()
    } else {
        topic.into_owned()
    };

    format!("'{topic}'")
}

/// Remove the quotes added by [`format_topic`].
pub fn strip_quotes(topic: &str) -> &str {
    topic.trim_matches('\'')
}
