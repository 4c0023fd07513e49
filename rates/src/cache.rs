//! Snapshot caching with TTL expiry.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use kursbot_common::SourceKind;
use tracing::debug;

use crate::snapshot::PriceSnapshot;

/// Cached snapshot entry.
#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: PriceSnapshot,
    cached_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn new(snapshot: PriceSnapshot, ttl: Duration) -> Self {
        Self {
            snapshot,
            cached_at: Utc::now(),
            ttl,
        }
    }

    fn is_valid(&self) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age < self.ttl
    }
}

/// Configuration for the snapshot cache.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    /// How long a snapshot stays servable after insertion.
    pub ttl: Duration,
    /// Maximum number of entries.
    pub max_entries: usize,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(60),
            max_entries: 100,
        }
    }
}

/// Thread-safe snapshot cache with TTL.
///
/// Expiry is lazy: an entry is dropped when a reader observes it past its
/// TTL or when the capacity bound forces an eviction sweep. Nothing
/// refreshes in the background.
pub struct RateCache {
    cache: DashMap<SourceKind, CacheEntry>,
    config: RateCacheConfig,
}

impl RateCache {
    /// Create a cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(RateCacheConfig::default())
    }

    /// Create a cache with custom configuration.
    pub fn with_config(config: RateCacheConfig) -> Self {
        Self {
            cache: DashMap::new(),
            config,
        }
    }

    /// Get a snapshot if present and still fresh.
    pub fn get(&self, kind: SourceKind) -> Option<PriceSnapshot> {
        if let Some(entry) = self.cache.get(&kind) {
            if entry.is_valid() {
                debug!(source = %kind, "Cache hit");
                return Some(entry.snapshot.clone());
            }
            debug!(source = %kind, "Cache entry expired");
            drop(entry);
            self.cache.remove(&kind);
        }

        debug!(source = %kind, "Cache miss");
        None
    }

    /// Insert a snapshot, replacing any previous one for the same source.
    pub fn insert(&self, snapshot: PriceSnapshot) {
        self.insert_with_ttl(snapshot, self.config.ttl);
    }

    /// Insert a snapshot with a custom TTL.
    pub fn insert_with_ttl(&self, snapshot: PriceSnapshot, ttl: Duration) {
        if self.cache.len() >= self.config.max_entries {
            self.evict_expired();
        }

        let entry = CacheEntry::new(snapshot, ttl);
        self.cache.insert(entry.snapshot.kind, entry);
    }

    /// Remove a source's snapshot.
    pub fn remove(&self, kind: SourceKind) {
        self.cache.remove(&kind);
    }

    /// Clear all cached snapshots.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Get the number of entries in cache.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Evict entries past their TTL.
    pub fn evict_expired(&self) {
        self.cache.retain(|_, entry| entry.is_valid());
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let total = self.cache.len();
        let valid = self.cache.iter().filter(|e| e.is_valid()).count();

        CacheStats {
            total_entries: total,
            valid_entries: valid,
            expired_entries: total - valid,
        }
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
}
