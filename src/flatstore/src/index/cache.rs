//! LRU cache for index shards.
//!
//! Bounded by shard count rather than bytes: shards are few and of similar
//! size, and the capacity is injected so tests can inspect eviction directly.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tracing::debug;

use super::shard::IndexShard;

/// LRU cache mapping shard keys (key prefixes) to loaded shards.
///
/// Empty shards are cached like any other so a missing shard document is not
/// fetched again on every lookup.
///
/// # Example
///
/// ```rust,ignore
/// let mut cache = ShardCache::new(3);
///
/// if let Some(shard) = cache.get("07") {
///     return shard.offset_of(key);
/// }
///
/// let shard = Arc::new(IndexShard::from_json("07", &bytes)?);
/// cache.insert("07".into(), shard);
/// ```
pub struct ShardCache {
    cache: LruCache<String, Arc<IndexShard>>,
}

impl ShardCache {
    /// Create a cache holding at most `capacity` shards (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
        }
    }

    /// Get a shard and mark it most-recently-used.
    pub fn get(&mut self, shard_key: &str) -> Option<Arc<IndexShard>> {
        self.cache.get(shard_key).cloned()
    }

    /// Check if a shard is cached without promoting it.
    pub fn contains(&self, shard_key: &str) -> bool {
        self.cache.contains(shard_key)
    }

    /// Insert a shard, evicting the least-recently-used one when full.
    ///
    /// Returns the evicted shard key, if any. Re-inserting an existing key
    /// replaces it without eviction.
    pub fn insert(&mut self, shard_key: String, shard: Arc<IndexShard>) -> Option<String> {
        match self.cache.push(shard_key.clone(), shard) {
            Some((evicted, _)) if evicted != shard_key => {
                debug!(%evicted, inserted = %shard_key, "shard evicted");
                Some(evicted)
            }
            _ => None,
        }
    }

    /// Cached shard keys, most-recently-used first.
    pub fn keys(&self) -> Vec<String> {
        self.cache.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Drop every cached shard.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Number of cached shards.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// True when no shard is cached.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Maximum number of cached shards.
    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}
