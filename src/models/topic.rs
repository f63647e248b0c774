// src/models/topic.rs

//! Categories and the per-run topic set.

use std::fmt;
use std::io;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::ser::Formatter;

use crate::error::{AppError, Result};

/// A bundle category watched by the canary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Books,
    Games,
}

impl Category {
    /// Every category, in the order used for messages and snapshots.
    pub const ALL: [Category; 2] = [Category::Books, Category::Games];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Books => "books",
            Category::Games => "games",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Topics grouped by category, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicSet {
    categories: Vec<(Category, Vec<String>)>,
}

impl TopicSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the topics for a category, replacing any previous entry in place.
    pub fn insert(&mut self, category: Category, topics: Vec<String>) {
        match self.categories.iter_mut().find(|(c, _)| *c == category) {
            Some((_, existing)) => *existing = topics,
            None => self.categories.push((category, topics)),
        }
    }

    pub fn get(&self, category: Category) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, topics)| topics.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.categories
            .iter()
            .map(|(category, topics)| (*category, topics.as_slice()))
    }

    /// Total number of topics across categories.
    pub fn len(&self) -> usize {
        self.categories.iter().map(|(_, topics)| topics.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `f` to every topic, keeping categories and order.
    pub fn map_topics<F>(&self, f: F) -> TopicSet
    where
        F: Fn(&str) -> String,
    {
        TopicSet {
            categories: self
                .categories
                .iter()
                .map(|(category, topics)| (*category, topics.iter().map(|t| f(t)).collect()))
                .collect(),
        }
    }

    /// Serialize to the canonical snapshot text.
    ///
    /// Uses `", "` and `": "` separators and escapes non-ASCII as `\uXXXX`,
    /// the layout of the snapshots already in the bucket.
    pub fn to_canonical_json(&self) -> Result<String> {
        let mut ser = serde_json::Serializer::with_formatter(Vec::new(), CanonicalFormatter);
        self.serialize(&mut ser)?;
        String::from_utf8(ser.into_inner())
            .map_err(|e| AppError::storage(format!("snapshot is not valid UTF-8: {e}")))
    }
}

impl Serialize for TopicSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (category, topics) in &self.categories {
            map.serialize_entry(category.name(), topics)?;
        }
        map.end()
    }
}

struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut rest = fragment;
        while let Some(pos) = rest.find(|c: char| !c.is_ascii()) {
            writer.write_all(rest[..pos].as_bytes())?;
            let ch = rest[pos..].chars().next().unwrap_or_default();
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            rest = &rest[pos + ch.len_utf8()..];
        }
        writer.write_all(rest.as_bytes())
    }
}
