//! Bounded memo table for single (query, document) scores.
//!
//! Keys are [`hash_pair`] digests of the exact text pair, values are scores. The cache
//! is owned by one reranker instance and evicts least-recently-used entries once
//! capacity is reached.

#[cfg(test)]
mod tests;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;

use crate::hashing::hash_pair;

/// In-memory LRU cache of pair scores.
pub struct PairScoreCache {
    entries: Cache<[u8; 32], f32>,
    capacity: u64,
}

impl std::fmt::Debug for PairScoreCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairScoreCache")
            .field("capacity", &self.capacity)
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl PairScoreCache {
    /// Creates a cache holding at most `capacity` pairs.
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .eviction_policy(EvictionPolicy::lru())
                .build(),
            capacity,
        }
    }

    #[inline]
    pub fn get(&self, query: &str, document: &str) -> Option<f32> {
        self.entries.get(&hash_pair(query, document))
    }

    #[inline]
    pub fn insert(&self, query: &str, document: &str, score: f32) {
        self.entries.insert(hash_pair(query, document), score);
    }

    #[inline]
    pub fn contains(&self, query: &str, document: &str) -> bool {
        self.entries.contains_key(&hash_pair(query, document))
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Approximate entry count; call [`run_pending_tasks`](Self::run_pending_tasks) first
    /// for an exact figure.
    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    #[inline]
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Runs any pending maintenance tasks (eviction, counters) in the underlying cache.
    #[inline]
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }
}
