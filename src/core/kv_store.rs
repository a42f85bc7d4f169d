//! Key-value store collaborator and the content cache built on it.
//!
//! Views cache fetched content pools so that moving between project pages
//! does not refetch. The storage itself (browser session storage, a file,
//! memory) is injected through [`KvStore`]; [`ContentCache`] only knows
//! string keys and JSON values under its own prefix.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::entities::ContentItem;

/// Prefix for every key the content cache writes
pub const CONTENT_CACHE_PREFIX: &str = "folio:content:";

pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    /// Remove all keys starting with `prefix`; returns how many were removed.
    fn clear(&self, prefix: &str) -> usize;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
    }

    fn clear(&self, prefix: &str) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }
}

/// Hit/miss counters
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses();
        if total == 0 { 0.0 } else { self.hits() as f64 / total as f64 }
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

/// JSON cache of content lists keyed by query name ("all", "category:X"...).
pub struct ContentCache {
    store: Arc<dyn KvStore>,
    stats: CacheStats,
}

impl ContentCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            stats: CacheStats::default(),
        }
    }

    fn full_key(key: &str) -> String {
        format!("{CONTENT_CACHE_PREFIX}{key}")
    }

    /// Cached items for `key`. An undecodable entry counts as a miss.
    pub fn get(&self, key: &str) -> Option<Vec<ContentItem>> {
        let Some(raw) = self.store.get(&Self::full_key(key)) else {
            self.stats.record_miss();
            return None;
        };
        match serde_json::from_str(&raw) {
            Ok(items) => {
                self.stats.record_hit();
                Some(items)
            }
            Err(e) => {
                warn!("ContentCache: dropping corrupt entry {}: {}", key, e);
                self.stats.record_miss();
                None
            }
        }
    }

    pub fn put(&self, key: &str, items: &[ContentItem]) -> Result<()> {
        let json = serde_json::to_string(items)
            .with_context(|| format!("Failed to serialize cache entry {key}"))?;
        self.store.set(&Self::full_key(key), json);
        debug!("ContentCache: stored {} item(s) under {}", items.len(), key);
        Ok(())
    }

    /// Cached value, or `fetch()` stored and returned.
    pub fn get_or_fetch<F>(&self, key: &str, fetch: F) -> Result<Vec<ContentItem>>
    where
        F: FnOnce() -> Result<Vec<ContentItem>>,
    {
        if let Some(items) = self.get(key) {
            return Ok(items);
        }
        let items = fetch()?;
        self.put(key, &items)?;
        Ok(items)
    }

    /// Drop every content entry (after an admin edit, for example).
    pub fn invalidate(&self) -> usize {
        let removed = self.store.clear(CONTENT_CACHE_PREFIX);
        debug!("ContentCache: invalidated {} entr(ies)", removed);
        removed
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<ContentItem> {
        vec![
            ContentItem::new("p1", "Scenic Design").with_tags(["western"]),
            ContentItem::new("p2", "Experiential Design").with_year(2023),
        ]
    }

    #[test]
    fn test_memory_store_clear_prefix() {
        let store = MemoryStore::new();
        store.set("a:1", "x".into());
        store.set("a:2", "y".into());
        store.set("b:1", "z".into());

        assert_eq!(store.clear("a:"), 2);
        assert_eq!(store.get("a:1"), None);
        assert_eq!(store.get("b:1").as_deref(), Some("z"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_or_fetch_fetches_once() {
        let cache = ContentCache::new(Arc::new(MemoryStore::new()));
        let mut calls = 0;

        let first = cache
            .get_or_fetch("all", || {
                calls += 1;
                Ok(items())
            })
            .unwrap();
        let second = cache
            .get_or_fetch("all", || {
                calls += 1;
                Ok(Vec::new())
            })
            .unwrap();

        assert_eq!(calls, 1);
        assert_eq!(first, second);
        assert_eq!(cache.stats().hits(), 1);
        assert_eq!(cache.stats().misses(), 1);
    }

    #[test]
    fn test_fetch_error_not_cached() {
        let cache = ContentCache::new(Arc::new(MemoryStore::new()));
        let result = cache.get_or_fetch("all", || anyhow::bail!("backend down"));
        assert!(result.is_err());
        assert!(cache.get("all").is_none());
    }

    #[test]
    fn test_invalidate_only_touches_own_prefix() {
        let store = Arc::new(MemoryStore::new());
        store.set("session:user", "u1".into());
        let cache = ContentCache::new(store.clone());
        cache.put("all", &items()).unwrap();
        cache.put("category:Scenic Design", &items()[..1]).unwrap();

        assert_eq!(cache.invalidate(), 2);
        assert!(cache.get("all").is_none());
        assert_eq!(store.get("session:user").as_deref(), Some("u1"));
    }

    #[test]
    fn test_corrupt_entry_is_miss() {
        let store = Arc::new(MemoryStore::new());
        store.set(&format!("{CONTENT_CACHE_PREFIX}all"), "{not json".into());
        let cache = ContentCache::new(store);
        assert!(cache.get("all").is_none());
        assert_eq!(cache.stats().misses(), 1);
        assert_eq!(cache.stats().hit_rate(), 0.0);
    }
}
