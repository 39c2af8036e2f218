//! # Flatstore
//!
//! Point lookup and substring search over a very large, append-only,
//! `|`-delimited flat file that lives in a remote object store. The file is
//! never loaded whole: lookups use byte-range requests guided by an offset
//! index, searches stream the file in bounded chunks.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        RecordStore                           │
//! │          (validation, limit clamping, result pages)          │
//! ├──────────────────────────────┬───────────────────────────────┤
//! │  LookupEngine                │  ScanEngine                   │
//! │  resolver → 1 range request  │  chunk stream → LineAssembler │
//! │  → first line with key       │  → AND-of-terms → early exit  │
//! ├──────────────────────────────┤                               │
//! │  OffsetResolver              │                               │
//! │  ShardedIndex + ShardCache   │                               │
//! │  or StrideEstimator          │                               │
//! ├──────────────────────────────┴───────────────────────────────┤
//! │               Record codec (parse one line)                  │
//! ├──────────────────────────────────────────────────────────────┤
//! │     dyn CorpusSource (HttpCorpusSource over reqwest)         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Remote Layout
//!
//! ```text
//! {base_url}/{corpus_key}                   one record per line
//! {base_url}/{index_prefix}/{prefix}.json   {"<id>": <byte offset>, ...}
//! ```
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let store = RecordStore::connect(
//!     StoreConfig::new("https://data.example.net").with_shard_cache_capacity(8),
//! )?;
//!
//! let record = store.get("00000001").await?;
//! println!("{}", record.get(Field::GivenNames));
//!
//! let page = store.search(&SearchRequest::new("juan garcia").with_limit(10)).await?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod lookup;
pub mod record;
pub mod request;
pub mod scan;
pub mod source;
pub mod store;

pub use config::{OffsetStrategy, StoreConfig};
pub use error::{Error, Result, SourceError, SourceResult};
pub use index::{IndexShard, OffsetResolver, ShardCache, ShardedIndex, StrideEstimator};
pub use lookup::LookupEngine;
pub use record::{Field, Record, FIELD_COUNT, SCHEMA};
pub use request::SearchRequest;
pub use scan::{LineAssembler, MatchScope, ScanEngine, SearchQuery};
pub use source::{ChunkStream, CorpusSource, HttpCorpusSource};
pub use store::{RecordStore, SearchPage};
