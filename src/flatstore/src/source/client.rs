//! Corpus source trait for abstracting object store reads.
//!
//! This module defines the [`CorpusSource`] trait which abstracts the two
//! read paths the engines need: byte-range fetches and whole-object streams.

use std::ops::Range;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::SourceResult;

/// One-pass sequence of byte chunks covering an object in file order.
///
/// Dropping the stream releases the underlying connection.
pub type ChunkStream = BoxStream<'static, SourceResult<Bytes>>;

/// Abstraction over read-only object store access.
///
/// # Example Implementation
///
/// ```rust,ignore
/// struct LocalDirSource { root: PathBuf }
///
/// #[async_trait]
/// impl CorpusSource for LocalDirSource {
///     async fn fetch_range(&self, key: &str, range: Range<u64>) -> SourceResult<Bytes> {
///         let data = tokio::fs::read(self.root.join(key))
///             .await
///             .map_err(|e| SourceError::unavailable("fetch_range", key, e.to_string()))?;
///         // ...
///     }
///     // ... other methods
/// }
/// ```
#[async_trait]
pub trait CorpusSource: Send + Sync {
    /// Read a byte range from an object.
    ///
    /// # Arguments
    ///
    /// * `key` - Object key
    /// * `range` - Byte range to read (start inclusive, end exclusive)
    ///
    /// # Returns
    ///
    /// The bytes starting at `range.start`. The remote may return more than
    /// requested, or fewer when the range runs past the end of the object.
    ///
    /// # Errors
    ///
    /// - [`SourceError::NotFound`](crate::error::SourceError::NotFound) if the object doesn't exist
    /// - [`SourceError::Unavailable`](crate::error::SourceError::Unavailable) on transport failure
    ///   or an unexpected status
    /// - [`SourceError::RangeNotSatisfiable`](crate::error::SourceError::RangeNotSatisfiable) if
    ///   the range starts at or past the end of the object
    /// - [`SourceError::Timeout`](crate::error::SourceError::Timeout) when the request timed out
    async fn fetch_range(&self, key: &str, range: Range<u64>) -> SourceResult<Bytes>;

    /// Get the full content of a small object, such as an index shard.
    async fn fetch_object(&self, key: &str) -> SourceResult<Bytes>;

    /// Open a chunked stream over a whole object.
    ///
    /// `chunk_size_hint` is advisory; chunk boundaries are arbitrary and may
    /// split lines.
    async fn open_stream(&self, key: &str, chunk_size_hint: usize) -> SourceResult<ChunkStream>;
}
