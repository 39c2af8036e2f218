//! Offset resolution strategies.

use std::sync::Arc;

use async_trait::async_trait;

use super::sharded::ShardedIndex;
use crate::config::{OffsetStrategy, StoreConfig};
use crate::source::CorpusSource;

/// Resolves a record key to a corpus offset near its line.
///
/// `None` means the key is not indexed, which callers treat as not found.
#[async_trait]
pub trait OffsetResolver: Send + Sync {
    async fn lookup_offset(&self, key: &str) -> Option<u64>;
}

/// Guesses offsets assuming every line has roughly the same length and keys
/// are dense and ascending.
///
/// The estimate is moved back by `slack_bytes`; the lookup window must be
/// large enough to cover the slack on both sides plus one line.
#[derive(Clone, Debug)]
pub struct StrideEstimator {
    first_key: u64,
    line_bytes: u64,
    slack_bytes: u64,
}

impl StrideEstimator {
    /// Create an estimator; see [`OffsetStrategy::Stride`](crate::config::OffsetStrategy::Stride).
    pub fn new(first_key: u64, line_bytes: u64, slack_bytes: u64) -> Self {
        Self {
            first_key,
            line_bytes,
            slack_bytes,
        }
    }

    /// Estimated offset for `key`, or `None` for non-numeric or out-of-range keys.
    pub fn estimate(&self, key: &str) -> Option<u64> {
        let n: u64 = key.parse().ok()?;
        let ordinal = n.checked_sub(self.first_key)?;
        let offset = ordinal.checked_mul(self.line_bytes)?;
        Some(offset.saturating_sub(self.slack_bytes))
    }
}

#[async_trait]
impl OffsetResolver for StrideEstimator {
    async fn lookup_offset(&self, key: &str) -> Option<u64> {
        self.estimate(key)
    }
}

/// Build the resolver selected by `config.offset_strategy`.
pub fn resolver_from_config(
    source: Arc<dyn CorpusSource>,
    config: &StoreConfig,
) -> Arc<dyn OffsetResolver> {
    match config.offset_strategy {
        OffsetStrategy::Sharded => Arc::new(ShardedIndex::new(source, config)),
        OffsetStrategy::Stride {
            first_key,
            line_bytes,
            slack_bytes,
        } => Arc::new(StrideEstimator::new(first_key, line_bytes, slack_bytes)),
    }
}
