//! Prefix-sharded offset index backed by the object store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::cache::ShardCache;
use super::resolver::OffsetResolver;
use super::shard::IndexShard;
use crate::config::StoreConfig;
use crate::source::CorpusSource;

/// Leading `len` characters of `key`, or the whole key when shorter.
pub(crate) fn shard_prefix(key: &str, len: usize) -> &str {
    match key.char_indices().nth(len) {
        Some((end, _)) => &key[..end],
        None => key,
    }
}

/// Index shard store.
///
/// Shards are fetched lazily on first reference to their prefix and kept in
/// a [`ShardCache`]. The cache lock is never held across a fetch, so two
/// concurrent misses on the same prefix may both fetch; the second insert
/// simply replaces the first.
///
/// A shard document that is missing, malformed, or unreachable is cached as
/// an empty shard. Lookups under that prefix then report "not indexed"
/// until the cache entry is evicted or [`invalidate`](Self::invalidate) is
/// called.
pub struct ShardedIndex {
    source: Arc<dyn CorpusSource>,
    config: StoreConfig,
    cache: Mutex<ShardCache>,
}

impl ShardedIndex {
    /// Create an index with a cache sized from `config.shard_cache_capacity`.
    pub fn new(source: Arc<dyn CorpusSource>, config: &StoreConfig) -> Self {
        Self::with_cache(source, config, ShardCache::new(config.shard_cache_capacity))
    }

    /// Create an index that owns the given cache.
    pub fn with_cache(
        source: Arc<dyn CorpusSource>,
        config: &StoreConfig,
        cache: ShardCache,
    ) -> Self {
        Self {
            source,
            config: config.clone(),
            cache: Mutex::new(cache),
        }
    }

    /// Shard key for a record key.
    pub fn shard_key_for<'a>(&self, key: &'a str) -> &'a str {
        shard_prefix(key, self.config.shard_prefix_len)
    }

    /// Get the shard for `prefix`, loading it on a cache miss.
    pub async fn shard(&self, prefix: &str) -> Arc<IndexShard> {
        if let Some(shard) = self.cache.lock().await.get(prefix) {
            debug!(%prefix, "shard cache hit");
            return shard;
        }

        debug!(%prefix, "shard cache miss");
        let shard = Arc::new(self.load_shard(prefix).await);
        self.cache.lock().await.insert(prefix.to_string(), shard.clone());
        shard
    }

    /// Fetch and decode one shard document, degrading every failure to empty.
    async fn load_shard(&self, prefix: &str) -> IndexShard {
        let shard_key = self.config.shard_key(prefix);
        let data = match self.source.fetch_object(&shard_key).await {
            Ok(data) => data,
            Err(e) if e.is_not_found() => {
                debug!(%shard_key, "shard document missing, caching empty shard");
                return IndexShard::empty(prefix);
            }
            Err(e) => {
                warn!(%shard_key, error = %e, "shard fetch failed, caching empty shard");
                return IndexShard::empty(prefix);
            }
        };

        match IndexShard::from_json(prefix, &data) {
            Ok(shard) => {
                debug!(%shard_key, entries = shard.len(), "shard loaded");
                shard
            }
            Err(e) => {
                warn!(%shard_key, error = %e, "malformed shard document, caching empty shard");
                IndexShard::empty(prefix)
            }
        }
    }

    /// Cached shard keys, most-recently-used first.
    pub async fn cached_shards(&self) -> Vec<String> {
        self.cache.lock().await.keys()
    }

    /// Drop every cached shard, including cached empty ones.
    pub async fn invalidate(&self) {
        self.cache.lock().await.clear();
    }
}

#[async_trait]
impl OffsetResolver for ShardedIndex {
    async fn lookup_offset(&self, key: &str) -> Option<u64> {
        let prefix = self.shard_key_for(key);
        self.shard(prefix).await.offset_of(key)
    }
}
