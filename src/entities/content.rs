//! Portfolio content items and the candidate pool they are ranked from.
//!
//! A [`ContentItem`] is the generic "project" record the data layer hands us:
//! stable id, category, optional venue/year and an ordered tag list.
//! A [`ContentPool`] owns a list of items plus a revision stamp so that
//! derived results (see `core::relevance::RelatedCache`) can be memoized per
//! pool revision instead of per pointer.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide source of pool revisions. Never hands out the same value twice.
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Single portfolio entry (project, article, tutorial...).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub tags: Vec<String>,
}

impl ContentItem {
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Venue if present and non-empty.
    pub fn venue(&self) -> Option<&str> {
        self.venue.as_deref().filter(|v| !v.is_empty())
    }

    /// Title for display, falls back to id.
    pub fn display_name(&self) -> &str {
        if self.title.is_empty() { &self.id } else { &self.title }
    }
}

/// Owned candidate pool with a revision stamp.
///
/// `version` is unique across every pool in the process: construction,
/// `clone` and every mutation take a fresh one. Two pools with the same
/// version therefore hold the same items, which makes
/// `(current.id, version, limit)` a valid memo key.
#[derive(Debug)]
pub struct ContentPool {
    items: Vec<ContentItem>,
    version: u64,
}

impl ContentPool {
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self {
            items,
            version: next_revision(),
        }
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ContentItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Insert or replace (by id).
    pub fn upsert(&mut self, item: ContentItem) {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
        self.version = next_revision();
    }

    pub fn remove(&mut self, id: &str) -> Option<ContentItem> {
        let pos = self.items.iter().position(|item| item.id == id)?;
        self.version = next_revision();
        Some(self.items.remove(pos))
    }

    /// Replace all items in one step (a fresh fetch from the data layer).
    pub fn replace_all(&mut self, items: Vec<ContentItem>) {
        self.items = items;
        self.version = next_revision();
    }

    /// Load a pool from a JSON array of items.
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read content pool: {}", path.display()))?;
        let items: Vec<ContentItem> = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse content pool: {}", path.display()))?;
        debug!("Loaded {} content items from {}", items.len(), path.display());
        Ok(Self::new(items))
    }

    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.items).context("Failed to serialize content pool")?;
        fs::write(path, json).with_context(|| format!("Failed to write content pool: {}", path.display()))?;
        Ok(())
    }
}

impl Clone for ContentPool {
    // A clone may diverge from its source, so it gets its own revision
    fn clone(&self) -> Self {
        Self::new(self.items.clone())
    }
}

impl Default for ContentPool {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<ContentItem>> for ContentPool {
    fn from(items: Vec<ContentItem>) -> Self {
        Self::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let item: ContentItem = serde_json::from_str(r#"{"id":"p9","category":"Scenic Design"}"#).unwrap();
        assert_eq!(item.id, "p9");
        assert_eq!(item.venue, None);
        assert_eq!(item.year, None);
        assert!(item.tags.is_empty());
        assert_eq!(item.display_name(), "p9");

        let titled = item.with_title("Desert Songs");
        assert_eq!(titled.display_name(), "Desert Songs");
    }

    #[test]
    fn test_empty_venue_is_absent() {
        let item = ContentItem::new("p1", "X").with_venue("");
        assert_eq!(item.venue(), None);
    }

    #[test]
    fn test_pool_version_changes_on_mutation() {
        let mut pool = ContentPool::new(vec![ContentItem::new("a", "X")]);
        let v0 = pool.version();

        pool.upsert(ContentItem::new("b", "Y"));
        let v1 = pool.version();
        assert_ne!(v1, v0);
        assert_eq!(pool.len(), 2);

        // Replace existing by id
        pool.upsert(ContentItem::new("a", "Z"));
        let v2 = pool.version();
        assert_ne!(v2, v1);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get("a").map(|i| i.category.as_str()), Some("Z"));

        assert!(pool.remove("missing").is_none());
        assert_eq!(pool.version(), v2);
        assert!(pool.remove("b").is_some());
        assert_ne!(pool.version(), v2);

        let v3 = pool.version();
        pool.replace_all(vec![ContentItem::new("c", "X")]);
        assert_ne!(pool.version(), v3);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_versions_unique_across_pools_and_clones() {
        let a = ContentPool::new(vec![ContentItem::new("a", "X")]);
        let b = ContentPool::new(vec![ContentItem::new("a", "X")]);
        assert_ne!(a.version(), b.version());

        let c = a.clone();
        assert_eq!(c.items(), a.items());
        assert_ne!(c.version(), a.version());
        assert_ne!(ContentPool::default().version(), ContentPool::default().version());
    }

    #[test]
    fn test_pool_json_file() {
        let dir = std::env::temp_dir().join("folio_test_pool_json");
        let _ = fs::create_dir_all(&dir);
        let path = dir.join("pool.json");

        let pool = ContentPool::new(vec![
            ContentItem::new("p1", "Scenic Design").with_year(2024).with_tags(["western"]),
        ]);
        pool.to_json(&path).unwrap();

        let loaded = ContentPool::from_json(&path).unwrap();
        assert_eq!(loaded.items(), pool.items());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_pool_json_missing_file_errors() {
        let err = ContentPool::from_json("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read content pool"));
    }
}
