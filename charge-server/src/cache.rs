//! In-process TTL cache for upstream POI responses.
//!
//! Entries are fresh while `now - inserted_at < ttl`. Stale entries are not
//! removed when read. Instead, `store` sweeps out every stale entry once the
//! map grows past a fixed threshold, so memory stays bounded without a
//! background task. An absolute ceiling evicts the oldest entries when even
//! fresh entries pile up (e.g. a client varying the radius on every request).

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

/// TTL for nearby-station queries.
pub const POINT_QUERY_TTL: Duration = Duration::from_secs(5 * 60);

/// TTL for regional snapshots.
pub const REGIONAL_TTL: Duration = Duration::from_secs(60 * 60);

/// Cardinality above which `store` sweeps stale entries.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 100;

/// Default absolute entry ceiling.
pub const DEFAULT_MAX_CAPACITY: usize = 10_000;

/// Configuration for a [`QuantizedCache`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long an entry stays fresh.
    pub ttl: Duration,

    /// Sweep stale entries once the map holds more than this many entries.
    pub sweep_threshold: usize,

    /// Hard limit on entries. Never below `sweep_threshold`.
    pub max_capacity: usize,
}

impl CacheConfig {
    /// Create a config with the given TTL and default bounds.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
            max_capacity: DEFAULT_MAX_CAPACITY,
        }
    }

    /// Set the sweep threshold.
    pub fn with_sweep_threshold(mut self, n: usize) -> Self {
        self.sweep_threshold = n;
        self
    }

    /// Set the absolute ceiling.
    pub fn with_max_capacity(mut self, n: usize) -> Self {
        self.max_capacity = n;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(POINT_QUERY_TTL)
    }
}

/// A cached payload. Replaced wholesale on re-store, never mutated.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    pub key: K,
    pub payload: V,
    pub inserted_at: Instant,
}

impl<K, V> CacheEntry<K, V> {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inserted_at) < ttl
    }
}

/// Hit/miss counters, for monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// TTL keyed store with lazy, threshold-triggered eviction.
///
/// Payloads are cloned out on lookup, so `V` is normally an `Arc`.
pub struct QuantizedCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<K, V>>>,
    ttl: Duration,
    sweep_threshold: usize,
    max_capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> QuantizedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: config.ttl,
            sweep_threshold: config.sweep_threshold,
            max_capacity: config.max_capacity.max(config.sweep_threshold),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a fresh payload.
    pub async fn lookup(&self, key: &K) -> Option<V> {
        self.lookup_at(key, Instant::now()).await
    }

    /// Look up a payload as of `now`.
    pub async fn lookup_at(&self, key: &K, now: Instant) -> Option<V> {
        let entries = self.entries.read().await;
        let found = entries
            .get(key)
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.payload.clone());

        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);

        found
    }

    /// Store a payload, replacing any previous entry for `key`.
    pub async fn store(&self, key: K, payload: V) {
        self.store_at(key, payload, Instant::now()).await;
    }

    /// Store a payload as of `now`, then run the eviction check.
    pub async fn store_at(&self, key: K, payload: V, now: Instant) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.clone(),
            CacheEntry {
                key,
                payload,
                inserted_at: now,
            },
        );

        if entries.len() > self.sweep_threshold {
            let before = entries.len();
            entries.retain(|_, entry| entry.is_fresh(now, self.ttl));
            debug!(
                removed = before - entries.len(),
                remaining = entries.len(),
                "swept stale cache entries"
            );
        }

        if entries.len() > self.max_capacity {
            let excess = entries.len() - self.max_capacity;
            let mut by_age: Vec<(Instant, K)> = entries
                .values()
                .map(|entry| (entry.inserted_at, entry.key.clone()))
                .collect();
            by_age.sort_by_key(|(inserted_at, _)| *inserted_at);
            for (_, key) in by_age.into_iter().take(excess) {
                entries.remove(&key);
            }
            debug!(evicted = excess, "cache at capacity, evicted oldest entries");
        }
    }

    /// Number of entries, fresh or stale.
    pub async fn size(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Current counters.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.size().await,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
