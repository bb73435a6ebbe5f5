//! Bounded cache of computed metadata items.
//!
//! Items are keyed by instance identifier and evicted least-recently-used
//! first once the configured capacity is reached. Hit, miss, put and eviction
//! counters are kept for diagnostics.

use lru::LruCache;
use serde::Serialize;
use std::fmt;
use std::num::NonZeroUsize;

use super::{MetadataId, SharedItem};

/// Counters describing cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    pub puts: u64,
    pub evictions: u64,
}

impl CacheStatistics {
    /// Hit rate as a percentage of all lookups.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits: {}, misses: {}, puts: {}, evictions: {}, hit rate: {:.1}%",
            self.hits,
            self.misses,
            self.puts,
            self.evictions,
            self.hit_rate()
        )
    }
}

/// LRU cache from instance identifier to item.
pub struct MetadataCache {
    entries: LruCache<MetadataId, SharedItem>,
    stats: CacheStatistics,
}

impl MetadataCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStatistics::default(),
        }
    }

    /// Look up an item, counting the hit or miss and refreshing its recency.
    pub fn get(&mut self, id: &MetadataId) -> Option<SharedItem> {
        match self.entries.get(id) {
            Some(item) => {
                self.stats.hits += 1;
                tracing::trace!("Metadata cache hit for {id}");
                Some(item.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Look up an item without touching counters or recency.
    pub fn peek(&self, id: &MetadataId) -> Option<SharedItem> {
        self.entries.peek(id).cloned()
    }

    pub fn contains(&self, id: &MetadataId) -> bool {
        self.entries.contains(id)
    }

    /// Store an item, evicting the least recently used entry when full.
    pub fn put(&mut self, id: MetadataId, item: SharedItem) {
        self.stats.puts += 1;
        if let Some((displaced, _)) = self.entries.push(id.clone(), item)
            && displaced != id
        {
            self.stats.evictions += 1;
            tracing::debug!("Metadata cache full, evicted {displaced}");
        }
    }

    /// Remove an item, returning whether it was cached.
    pub fn evict(&mut self, id: &MetadataId) -> bool {
        let removed = self.entries.pop(id).is_some();
        if removed {
            self.stats.evictions += 1;
        }
        removed
    }

    /// Remove every cached item of the given class identifier.
    pub fn evict_class(&mut self, class_id: &MetadataId) -> usize {
        let doomed: Vec<MetadataId> = self
            .entries
            .iter()
            .filter(|(id, _)| id.class_id() == *class_id)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &doomed {
            self.evict(id);
        }
        doomed.len()
    }

    pub fn clear(&mut self) {
        self.stats.evictions += self.entries.len() as u64;
        self.entries.clear();
    }

    /// Change the capacity, evicting least recently used entries if shrinking.
    pub fn resize(&mut self, capacity: NonZeroUsize) {
        let before = self.entries.len();
        self.entries.resize(capacity);
        self.stats.evictions += (before - self.entries.len()) as u64;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn statistics(&self) -> CacheStatistics {
        self.stats
    }
}
