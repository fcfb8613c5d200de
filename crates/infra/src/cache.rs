//! TTL cache for source fetch results.
//!
//! The consolidation logic never depends on this cache: it always operates
//! on whatever event lists it is handed. Caching happens strictly on the
//! adapter side, as a decorator around a feed provider.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use staysync_core::{CalendarFeedProvider, Clock, FeedSource};
use staysync_domain::{Result, SourceEvent};
use tracing::debug;

/// Entry stored in the cache alongside its fetch time.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    fetched_at: NaiveDateTime,
}

/// Key → (value, fetch-time) map with TTL expiry against an injected clock.
pub struct FetchCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> FetchCache<V> {
    pub fn new(ttl_seconds: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(ttl_seconds as i64),
            clock,
        }
    }

    /// Get a fresh value, removing it when the TTL has lapsed.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().ok()?;
        let entry = entries.get(key)?;
        if self.clock.now() - entry.fetched_at >= self.ttl {
            entries.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.into(), CacheEntry { value, fetched_at: self.clock.now() });
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

/// Feed provider decorator that answers repeat fetches from the cache.
pub struct CachedFeedProvider {
    inner: Arc<dyn CalendarFeedProvider>,
    cache: FetchCache<Vec<SourceEvent>>,
}

impl CachedFeedProvider {
    pub fn new(
        inner: Arc<dyn CalendarFeedProvider>,
        ttl_seconds: u64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { inner, cache: FetchCache::new(ttl_seconds, clock) }
    }
}

#[async_trait]
impl CalendarFeedProvider for CachedFeedProvider {
    async fn fetch_events(&self, feed: &FeedSource) -> Result<Vec<SourceEvent>> {
        let key = feed.identifier();
        if let Some(events) = self.cache.get(&key) {
            debug!(feed = %key, "serving calendar feed from cache");
            return Ok(events);
        }

        let events = self.inner.fetch_events(feed).await?;
        self.cache.insert(key, events.clone());
        Ok(events)
    }
}
