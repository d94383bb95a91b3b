//! TTL response cache with a FIFO size bound.
//!
//! Sits between the route handlers and the upstream ranking API. Keys are
//! derived from an endpoint prefix plus the sanitized request parameters,
//! sorted so that logically identical requests collide regardless of
//! query-string order. Entries expire lazily on lookup; when the store is
//! full, the oldest-inserted entries are evicted first.

use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default TTL for cached upstream responses.
pub const DEFAULT_TTL: Duration = Duration::from_millis(60_000);

/// Default entry bound before FIFO eviction kicks in.
pub const MAX_CACHE_SIZE: usize = 1000;

/// Build a cache key from an endpoint prefix and its parameters.
///
/// Parameters are sorted by name, so two requests that differ only in
/// query-string order produce the same key. Values must already be
/// sanitized by the validation layer — no re-sanitizing happens here.
pub fn cache_key(prefix: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return prefix.to_string();
    }

    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let rendered = sorted
        .iter()
        .map(|(key, value)| format!("{key}:{value}"))
        .collect::<Vec<_>>()
        .join("|");

    format!("{prefix}|{rendered}")
}

/// A cached upstream response. Replace-only: never mutated after insert.
#[derive(Clone, Debug)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    /// Insertion order for FIFO eviction. May hold keys already removed by
    /// lazy expiry or invalidation; eviction skips those.
    order: VecDeque<String>,
}

/// Thread-safe TTL cache shared across request handlers.
///
/// Eviction is true FIFO — insertion order, not access order. Overwriting
/// an existing key keeps its original queue position.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Arc<Mutex<CacheInner>>,
    max_entries: usize,
    default_ttl: Duration,
}

impl ResponseCache {
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            })),
            max_entries,
            default_ttl,
        }
    }

    /// The TTL applied when an endpoint has no specific one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Look up a fresh entry. Expired entries are removed on the spot
    /// (lazy expiry — there is no background sweep).
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut inner = self.lock();

        if let Some(entry) = inner.entries.get(key) {
            if Instant::now() < entry.expires_at {
                debug!("cache HIT for {}", key);
                return Some(entry.value.clone());
            }
            // Stale — drop it so the store shrinks, then report a miss
            inner.entries.remove(key);
            debug!("cache EXPIRED for {}", key);
            return None;
        }

        debug!("cache MISS for {}", key);
        None
    }

    /// Insert or overwrite an entry with `expires_at = now + ttl`.
    ///
    /// Inserting a new key at capacity evicts oldest-first until the
    /// post-insert size lands exactly on `max_entries`.
    pub fn set(&self, key: &str, value: Value, ttl: Duration) {
        let mut inner = self.lock();

        if !inner.entries.contains_key(key) {
            while inner.entries.len() + 1 > self.max_entries {
                let Some(oldest) = inner.order.pop_front() else {
                    break;
                };
                // Queue entries removed earlier by expiry or invalidation
                // are skipped; only live removals shrink the store.
                if inner.entries.remove(&oldest).is_some() {
                    debug!("cache EVICT for {}", oldest);
                }
            }
            inner.order.push_back(key.to_string());
        }

        inner.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Delete every entry whose key satisfies the predicate. Returns the
    /// number of entries removed.
    ///
    /// Used after upstream failures to purge a whole endpoint family: one
    /// failure casts doubt on every cached response for that family.
    pub fn invalidate<F>(&self, predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let mut inner = self.lock();
        let before = inner.entries.len();

        let CacheInner { entries, order } = &mut *inner;
        entries.retain(|key, _| !predicate(key));
        order.retain(|key| entries.contains_key(key));

        before - inner.entries.len()
    }

    /// Number of live entries (expired-but-unvisited entries count until
    /// their next lookup).
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(MAX_CACHE_SIZE, DEFAULT_TTL)
    }
}
