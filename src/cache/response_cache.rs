//! In-memory cache of GET response bodies.
//!
//! Cache key is the request path followed by the JSON serialization of its
//! query parameters. Entries remember the wall-clock time they were stored;
//! the only automatic eviction is the age sweep (see [`super::CacheSweeper`]).
//! There is no size bound and no LRU.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

/// Default age after which the sweep drops an entry (5 minutes).
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(5 * 60);

/// Query parameters of a request.
///
/// Ordered so that the same parameter set always serializes to the same key,
/// whatever order the caller inserted them in.
pub type QueryParams = BTreeMap<String, String>;

/// A single cached response body.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The raw response body, replayed verbatim on a hit.
    pub payload: Value,
    /// When the body was stored. Only a real re-fetch moves this forward.
    pub stored_at: DateTime<Utc>,
}

/// Shared response cache. Construct once and hand out through `Arc`.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the cache key for `path` + `params`.
    ///
    /// Empty params serialize as `{}`, giving `/posts{}`.
    pub fn cache_key(path: &str, params: &QueryParams) -> String {
        let serialized = serde_json::to_string(params).unwrap_or_else(|_| "{}".to_string());
        format!("{}{}", path, serialized)
    }

    /// Look up a cached body. A hit does not touch `stored_at`.
    pub fn get(&self, key: &str) -> Option<Value> {
        let found = self.lock().get(key).map(|e| e.payload.clone());
        match found {
            Some(payload) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Response cache hit");
                Some(payload)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Response cache miss");
                None
            }
        }
    }

    /// Inspect an entry without counting it as a hit.
    pub fn peek(&self, key: &str) -> Option<CacheEntry> {
        self.lock().get(key).cloned()
    }

    /// Store a body, replacing any previous entry for the key.
    pub fn insert(&self, key: String, payload: Value) {
        self.insert_at(key, payload, Utc::now());
    }

    /// Store a body as of `now`.
    ///
    /// `stored_at` never moves backwards for a key, even if the wall clock does.
    pub(crate) fn insert_at(&self, key: String, payload: Value, now: DateTime<Utc>) {
        let mut entries = self.lock();
        let stored_at = match entries.get(&key) {
            Some(prev) if prev.stored_at > now => prev.stored_at,
            _ => now,
        };
        debug!(key = %key, "Storing response in cache");
        entries.insert(key, CacheEntry { payload, stored_at });
    }

    /// Remove exactly one entry. Returns `false` if it was absent.
    pub fn remove(&self, key: &str) -> bool {
        let removed = self.lock().remove(key).is_some();
        if removed {
            debug!(key = %key, "Evicted cache entry");
        }
        removed
    }

    /// Remove the entries for `path` under any query parameters.
    pub fn remove_path(&self, path: &str) -> usize {
        let prefix = format!("{}{{", path);
        self.remove_where(|key| key.starts_with(&prefix))
    }

    /// Remove the entries for `path` and every path beneath it
    /// (`/messages` also drops `/messages/42` and `/messages/unread`).
    pub fn remove_subtree(&self, path: &str) -> usize {
        let exact = format!("{}{{", path);
        let nested = format!("{}/", path.trim_end_matches('/'));
        self.remove_where(|key| key.starts_with(&exact) || key.starts_with(&nested))
    }

    fn remove_where<F: Fn(&str) -> bool>(&self, pred: F) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !pred(key));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "Evicted cache entries");
        }
        removed
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut entries = self.lock();
        let count = entries.len();
        entries.clear();
        debug!(count, "Cleared response cache");
    }

    /// Drop entries older than `max_age`. Returns how many were removed.
    pub fn invalidate_older_than(&self, max_age: Duration) -> usize {
        self.invalidate_at(Utc::now(), max_age)
    }

    /// Drop entries whose age at `now` is strictly greater than `max_age`.
    pub fn invalidate_at(&self, now: DateTime<Utc>, max_age: Duration) -> usize {
        let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, e| now.signed_duration_since(e.stored_at) <= max_age);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "Swept stale cache entries");
        }
        removed
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of entry count and hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    // A panic while holding the lock leaves the map itself consistent
    // (every mutation is a single HashMap call), so recover from poison.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Aggregate cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries currently cached.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that fell through to the network.
    pub misses: u64,
}
