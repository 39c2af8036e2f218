//! Remote corpus source.
//!
//! The engines only see the [`CorpusSource`] trait. [`HttpCorpusSource`] talks
//! to an object store over HTTP range requests; tests use an in-memory mock.

mod client;
mod http;

pub use client::{ChunkStream, CorpusSource};
pub use http::HttpCorpusSource;

#[cfg(test)]
pub(crate) mod mock_client;
