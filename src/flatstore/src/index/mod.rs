//! # Offset Index
//!
//! Maps a record identifier to an approximate byte offset in the corpus.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 dyn OffsetResolver                       │
//! ├───────────────────────────────┬──────────────────────────┤
//! │  ShardedIndex                 │  StrideEstimator         │
//! │  key[0..P] → shard → offset   │  (key - first) * stride  │
//! ├───────────────────────────────┤                          │
//! │  ShardCache (LRU, N shards)   │  no I/O                  │
//! ├───────────────────────────────┤                          │
//! │  On the object store:         │                          │
//! │  {index_prefix}/{P chars}.json│                          │
//! └───────────────────────────────┴──────────────────────────┘
//! ```
//!
//! Both resolvers may return offsets that do not point exactly at the start
//! of the wanted line; the lookup engine scans the fetched window for the
//! line whose leading field matches.

mod cache;
mod resolver;
mod shard;
mod sharded;

pub use cache::ShardCache;
pub use resolver::{resolver_from_config, OffsetResolver, StrideEstimator};
pub use shard::IndexShard;
pub use sharded::ShardedIndex;
