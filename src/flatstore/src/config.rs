//! Configuration for the record store.
//!
//! This module defines where the corpus and its index shards live, how the
//! shard cache is bounded, and the limits applied to lookups and scans.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default corpus object key.
pub const DEFAULT_CORPUS_KEY: &str = "reniec.txt";

/// Default prefix under which shard documents are stored.
pub const DEFAULT_INDEX_PREFIX: &str = "index";

/// Default number of leading key characters that select a shard.
pub const DEFAULT_SHARD_PREFIX_LEN: usize = 2;

/// Default number of shards kept in memory.
pub const DEFAULT_SHARD_CACHE_CAPACITY: usize = 3;

/// Default byte window fetched after an indexed offset (enough for several records).
pub const DEFAULT_LOOKUP_WINDOW_BYTES: u64 = 4096;

/// Default chunk size hint for streaming scans (64 KiB).
pub const DEFAULT_STREAM_CHUNK_BYTES: usize = 64 * 1024;

/// Default longest line a scan will reassemble (1 MiB).
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// How the lookup engine turns a key into a corpus offset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OffsetStrategy {
    /// Exact offsets from per-prefix JSON shards.
    Sharded,

    /// Offsets estimated from a fixed line stride.
    ///
    /// `offset ≈ (key - first_key) * line_bytes`, moved back by `slack_bytes`
    /// so the fetched window starts before the real line.
    Stride {
        /// Numeric value of the first key in the corpus.
        first_key: u64,
        /// Assumed average line length in bytes, newline included.
        line_bytes: u64,
        /// Bytes to back off from the estimate.
        slack_bytes: u64,
    },
}

/// Configuration for the record store.
///
/// # Example
///
/// ```rust,ignore
/// let config = StoreConfig::new("https://data.example.net")
///     .with_corpus_key("reniec.txt")
///     .with_shard_cache_capacity(8)
///     .with_lookup_window(8 * 1024);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Origin of the object store, e.g. `https://data.example.net`.
    pub base_url: String,

    /// Object key of the corpus file.
    pub corpus_key: String,

    /// Prefix for shard documents.
    ///
    /// Shards are stored at: `{index_prefix}/{prefix}.json`
    pub index_prefix: String,

    /// Number of leading key characters used as the shard key.
    pub shard_prefix_len: usize,

    /// Maximum number of shards held in memory.
    pub shard_cache_capacity: usize,

    /// Bytes fetched starting at an indexed offset.
    pub lookup_window_bytes: u64,

    /// Chunk size hint passed to the source when streaming.
    pub stream_chunk_bytes: usize,

    /// Lines longer than this are dropped during scans.
    pub max_line_bytes: usize,

    /// Timeout for range and shard fetches.
    pub request_timeout_secs: u64,

    /// Timeout for each chunk read of a streaming scan.
    pub stream_read_timeout_secs: u64,

    /// Skip the first line of the corpus during scans.
    pub has_header: bool,

    /// Exact length of a valid key.
    pub key_length: usize,

    /// Limit used when the caller does not give one.
    pub default_search_limit: usize,

    /// Upper clamp for search limits.
    pub max_search_limit: usize,

    /// Minimum number of non-blank characters in a search query.
    pub min_query_chars: usize,

    /// Offset resolution strategy.
    pub offset_strategy: OffsetStrategy,
}

impl StoreConfig {
    /// Create a new configuration with defaults.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file, or use defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let config: StoreConfig = serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engines cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.shard_prefix_len == 0 {
            return Err(Error::Config("shard_prefix_len must be positive".into()));
        }
        if self.shard_cache_capacity == 0 {
            return Err(Error::Config("shard_cache_capacity must be positive".into()));
        }
        if self.lookup_window_bytes == 0 {
            return Err(Error::Config("lookup_window_bytes must be positive".into()));
        }
        if self.stream_chunk_bytes == 0 {
            return Err(Error::Config("stream_chunk_bytes must be positive".into()));
        }
        if self.max_line_bytes == 0 {
            return Err(Error::Config("max_line_bytes must be positive".into()));
        }
        if self.max_search_limit == 0 {
            return Err(Error::Config("max_search_limit must be positive".into()));
        }
        if let OffsetStrategy::Stride { line_bytes: 0, .. } = self.offset_strategy {
            return Err(Error::Config("stride line_bytes must be positive".into()));
        }
        Ok(())
    }

    /// Set the corpus object key.
    pub fn with_corpus_key(mut self, corpus_key: impl Into<String>) -> Self {
        self.corpus_key = corpus_key.into();
        self
    }

    /// Set the shard document prefix.
    pub fn with_index_prefix(mut self, index_prefix: impl Into<String>) -> Self {
        self.index_prefix = index_prefix.into();
        self
    }

    /// Set the shard cache capacity.
    pub fn with_shard_cache_capacity(mut self, capacity: usize) -> Self {
        self.shard_cache_capacity = capacity;
        self
    }

    /// Set the lookup window.
    pub fn with_lookup_window(mut self, bytes: u64) -> Self {
        self.lookup_window_bytes = bytes;
        self
    }

    /// Set the streaming chunk size hint.
    pub fn with_stream_chunk_bytes(mut self, bytes: usize) -> Self {
        self.stream_chunk_bytes = bytes;
        self
    }

    /// Set the longest line a scan will reassemble.
    pub fn with_max_line_bytes(mut self, bytes: usize) -> Self {
        self.max_line_bytes = bytes;
        self
    }

    /// Set the per-chunk read timeout for scans.
    pub fn with_stream_read_timeout(mut self, secs: u64) -> Self {
        self.stream_read_timeout_secs = secs;
        self
    }

    /// Mark the corpus as starting with a header line.
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set the offset strategy.
    pub fn with_offset_strategy(mut self, strategy: OffsetStrategy) -> Self {
        self.offset_strategy = strategy;
        self
    }

    /// Generate the object key of a shard document.
    ///
    /// # Returns
    ///
    /// Key in format: `{index_prefix}/{prefix}.json`
    pub fn shard_key(&self, prefix: &str) -> String {
        if self.index_prefix.is_empty() {
            format!("{}.json", prefix)
        } else {
            format!("{}/{}.json", self.index_prefix.trim_end_matches('/'), prefix)
        }
    }

    /// Timeout for range and shard fetches.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Timeout for each chunk read during a scan.
    pub fn stream_read_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_read_timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            corpus_key: DEFAULT_CORPUS_KEY.to_string(),
            index_prefix: DEFAULT_INDEX_PREFIX.to_string(),
            shard_prefix_len: DEFAULT_SHARD_PREFIX_LEN,
            shard_cache_capacity: DEFAULT_SHARD_CACHE_CAPACITY,
            lookup_window_bytes: DEFAULT_LOOKUP_WINDOW_BYTES,
            stream_chunk_bytes: DEFAULT_STREAM_CHUNK_BYTES,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            request_timeout_secs: 30,
            stream_read_timeout_secs: 30,
            has_header: false,
            key_length: 8,
            default_search_limit: 10,
            max_search_limit: 50,
            min_query_chars: 2,
            offset_strategy: OffsetStrategy::Sharded,
        }
    }
}
