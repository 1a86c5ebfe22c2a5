//! Response caching with TTL for tool executions and tool listings
//!
//! Thread-safe TTL cache keyed by `execute:{server}:{tool}` for executions
//! and `tools:{server}` for listings. Expiry is lazy: an expired entry
//! behaves exactly like an absent one and is evicted on lookup. Caching is
//! strictly best-effort — a disabled cache is always-miss and never fails
//! the surrounding call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

use crate::config::CacheConfig;

/// Thread-safe response cache with TTL expiry
pub struct ResponseCache {
    /// Cache entries
    entries: DashMap<String, CachedResponse>,
    /// Cache statistics
    stats: CacheStats,
    /// When false, every get misses and every put is a no-op
    enabled: bool,
}

/// A cached response with TTL metadata
struct CachedResponse {
    /// The cached JSON value
    value: Value,
    /// When this entry was cached
    cached_at: Instant,
    /// Time-to-live duration
    ttl: Duration,
}

impl CachedResponse {
    /// Check if this entry has expired
    fn is_expired(&self) -> bool {
        Instant::now().duration_since(self.cached_at) > self.ttl
    }
}

/// Cache statistics tracked atomically
#[derive(Debug)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStats {
    fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }
}

impl ResponseCache {
    /// Create a new empty cache
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            stats: CacheStats::new(),
            enabled: config.enabled,
        }
    }

    /// Get a cached value if it exists and hasn't expired
    ///
    /// Returns `None` if the cache is disabled, the key doesn't exist, or
    /// the entry has expired. Expired entries are evicted on lookup.
    pub fn get(&self, key: &str) -> Option<Value> {
        if !self.enabled {
            return None;
        }

        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                drop(entry);
                self.entries.remove(key);
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            } else {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
        } else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Store a value with the given TTL, overwriting any existing entry
    pub fn put(&self, key: &str, value: Value, ttl: Duration) {
        if !self.enabled {
            return;
        }

        let entry = CachedResponse {
            value,
            cached_at: Instant::now(),
            ttl,
        };
        self.entries.insert(key.to_string(), entry);
    }

    /// Clear all cached entries
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStatsSnapshot {
        let hits = self.stats.hits.load(Ordering::Relaxed);
        let misses = self.stats.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        #[allow(clippy::cast_precision_loss)]
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };
        CacheStatsSnapshot {
            hits,
            misses,
            evictions: self.stats.evictions.load(Ordering::Relaxed),
            size: self.entries.len(),
            hit_rate,
        }
    }

    /// Cache key for a tool execution
    #[must_use]
    pub fn execute_key(server: &str, tool: &str) -> String {
        format!("execute:{server}:{tool}")
    }

    /// Cache key for a backend's tool listing
    #[must_use]
    pub fn tools_key(server: &str) -> String {
        format!("tools:{server}")
    }
}

/// Snapshot of cache statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStatsSnapshot {
    /// Total cache hits
    pub hits: u64,
    /// Total cache misses
    pub misses: u64,
    /// Total evictions
    pub evictions: u64,
    /// Current number of entries
    pub size: usize,
    /// Hit rate (0.0-1.0)
    pub hit_rate: f64,
}
