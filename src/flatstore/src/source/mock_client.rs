//! Mock corpus source for testing.
//!
//! This module provides an in-memory [`CorpusSource`] that counts every call
//! so tests can assert on network behavior.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};

use super::client::{ChunkStream, CorpusSource};
use crate::error::{SourceError, SourceResult};

/// In-memory mock source.
///
/// # Example
///
/// ```rust,ignore
/// let source = MockCorpusSource::new()
///     .with_object("reniec.txt", "00000001|GARCIA\n")
///     .with_object("index/00.json", r#"{"00000001": 0}"#);
///
/// let data = source.fetch_range("reniec.txt", 0..8).await?;
/// assert_eq!(&data[..], b"00000001");
/// assert_eq!(source.range_calls(), 1);
/// ```
#[derive(Default)]
pub struct MockCorpusSource {
    /// Storage for objects: key -> data
    objects: RwLock<HashMap<String, Bytes>>,
    /// Explicit chunk boundaries for streams: key -> chunks
    chunk_plans: HashMap<String, Vec<Bytes>>,
    /// Keys whose every request fails with `Unavailable`.
    failing: HashSet<String>,
    /// Extra bytes returned past the end of each range.
    range_overshoot: u64,
    /// Yield an error after this many chunks.
    fail_stream_after: Option<usize>,
    /// Never yield after this many chunks.
    stall_stream_after: Option<usize>,

    range_calls: AtomicUsize,
    object_calls: AtomicUsize,
    stream_calls: AtomicUsize,
    chunks_served: Arc<AtomicUsize>,
    streams_dropped: Arc<AtomicUsize>,
}

/// Lives inside an open stream; counts the stream as closed when dropped.
struct StreamTracker {
    chunks_served: Arc<AtomicUsize>,
    streams_dropped: Arc<AtomicUsize>,
}

impl StreamTracker {
    fn counter(&self) -> Arc<AtomicUsize> {
        self.chunks_served.clone()
    }
}

impl Drop for StreamTracker {
    fn drop(&mut self) {
        self.streams_dropped.fetch_add(1, Ordering::SeqCst);
    }
}

impl MockCorpusSource {
    /// Create a new empty mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object.
    pub fn with_object(self, key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.objects.write().unwrap().insert(key.into(), data.into());
        self
    }

    /// Stream `key` using exactly these chunks instead of splitting by size hint.
    pub fn with_chunks<B>(mut self, key: impl Into<String>, chunks: Vec<B>) -> Self
    where
        B: Into<Bytes>,
    {
        let key = key.into();
        let chunks: Vec<Bytes> = chunks.into_iter().map(Into::into).collect();
        let data: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
        self.objects.write().unwrap().insert(key.clone(), Bytes::from(data));
        self.chunk_plans.insert(key, chunks);
        self
    }

    /// Make every request for `key` fail.
    pub fn with_failing(mut self, key: impl Into<String>) -> Self {
        self.failing.insert(key.into());
        self
    }

    /// Return this many extra bytes past the end of every range.
    pub fn with_range_overshoot(mut self, bytes: u64) -> Self {
        self.range_overshoot = bytes;
        self
    }

    /// Fail every stream after it has served `chunks` chunks.
    pub fn with_stream_failure_after(mut self, chunks: usize) -> Self {
        self.fail_stream_after = Some(chunks);
        self
    }

    /// Stall every stream forever after it has served `chunks` chunks.
    pub fn with_stream_stall_after(mut self, chunks: usize) -> Self {
        self.stall_stream_after = Some(chunks);
        self
    }

    /// Number of `fetch_range` calls.
    pub fn range_calls(&self) -> usize {
        self.range_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_object` calls.
    pub fn object_calls(&self) -> usize {
        self.object_calls.load(Ordering::SeqCst)
    }

    /// Number of `open_stream` calls.
    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    /// Chunks handed out across all streams.
    pub fn chunks_served(&self) -> usize {
        self.chunks_served.load(Ordering::SeqCst)
    }

    /// Streams that have been dropped by their consumer.
    pub fn streams_dropped(&self) -> usize {
        self.streams_dropped.load(Ordering::SeqCst)
    }

    /// Total calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.range_calls() + self.object_calls() + self.stream_calls()
    }

    fn lookup(&self, operation: &str, key: &str) -> SourceResult<Bytes> {
        if self.failing.contains(key) {
            return Err(SourceError::unavailable(operation, key, "injected failure"));
        }
        self.objects
            .read()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| SourceError::NotFound { key: key.to_string() })
    }
}

#[async_trait]
impl CorpusSource for MockCorpusSource {
    async fn fetch_range(&self, key: &str, range: Range<u64>) -> SourceResult<Bytes> {
        self.range_calls.fetch_add(1, Ordering::SeqCst);
        let data = self.lookup("fetch_range", key)?;

        let len = data.len() as u64;
        if range.start >= len {
            return Err(SourceError::RangeNotSatisfiable { key: key.to_string() });
        }
        let end = (range.end + self.range_overshoot).min(len);
        Ok(data.slice(range.start as usize..end as usize))
    }

    async fn fetch_object(&self, key: &str) -> SourceResult<Bytes> {
        self.object_calls.fetch_add(1, Ordering::SeqCst);
        self.lookup("fetch_object", key)
    }

    async fn open_stream(&self, key: &str, chunk_size_hint: usize) -> SourceResult<ChunkStream> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        let data = self.lookup("open_stream", key)?;

        let chunks: Vec<Bytes> = match self.chunk_plans.get(key) {
            Some(plan) => plan.clone(),
            None => {
                let size = chunk_size_hint.max(1);
                (0..data.len())
                    .step_by(size)
                    .map(|start| data.slice(start..(start + size).min(data.len())))
                    .collect()
            }
        };

        let tracker = StreamTracker {
            chunks_served: self.chunks_served.clone(),
            streams_dropped: self.streams_dropped.clone(),
        };
        let fail_after = self.fail_stream_after;
        let stall_after = self.stall_stream_after;
        let key = key.to_string();

        let served = stream::iter(chunks.into_iter().enumerate()).then(move |(i, chunk)| {
            let counter = tracker.counter();
            let key = key.clone();
            async move {
                if fail_after == Some(i) {
                    return Err(SourceError::unavailable("read_chunk", key, "connection reset"));
                }
                if stall_after == Some(i) {
                    futures::future::pending::<()>().await;
                }
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(chunk)
            }
        });
        Ok(served.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_range_request() {
        let source = MockCorpusSource::new().with_object("corpus.txt", "hello world");

        let data = source.fetch_range("corpus.txt", 0..5).await.unwrap();
        assert_eq!(&data[..], b"hello");

        // Past the end is truncated, not an error
        let data = source.fetch_range("corpus.txt", 6..100).await.unwrap();
        assert_eq!(&data[..], b"world");

        let err = source.fetch_range("corpus.txt", 11..20).await.unwrap_err();
        assert!(err.is_range_not_satisfiable());
        assert_eq!(source.range_calls(), 3);
    }

    #[tokio::test]
    async fn test_mock_overshoot() {
        let source = MockCorpusSource::new()
            .with_object("corpus.txt", "hello world")
            .with_range_overshoot(3);
        let data = source.fetch_range("corpus.txt", 0..5).await.unwrap();
        assert_eq!(&data[..], b"hello wo");
    }

    #[tokio::test]
    async fn test_mock_not_found_and_failure() {
        let source = MockCorpusSource::new().with_failing("broken.json");

        let err = source.fetch_object("missing.json").await.unwrap_err();
        assert!(err.is_not_found());

        let err = source.fetch_object("broken.json").await.unwrap_err();
        assert!(matches!(err, SourceError::Unavailable { .. }));
        assert_eq!(source.object_calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_stream_is_lazy() {
        let source = MockCorpusSource::new().with_object("corpus.txt", "abcdefghij");

        let mut stream = source.open_stream("corpus.txt", 4).await.unwrap();
        assert_eq!(source.chunks_served(), 0);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(&first[..], b"abcd");
        assert_eq!(source.chunks_served(), 1);

        let rest: Vec<_> = stream.collect().await;
        assert_eq!(rest.len(), 2);
        assert_eq!(source.chunks_served(), 3);
        assert_eq!(source.streams_dropped(), 1);
    }

    #[tokio::test]
    async fn test_mock_stream_drop_is_counted() {
        let source = MockCorpusSource::new().with_object("corpus.txt", "abcdefghij");

        let mut stream = source.open_stream("corpus.txt", 4).await.unwrap();
        stream.next().await.unwrap().unwrap();
        assert_eq!(source.streams_dropped(), 0);

        drop(stream);
        assert_eq!(source.streams_dropped(), 1);
        assert_eq!(source.chunks_served(), 1);
    }

    #[tokio::test]
    async fn test_mock_explicit_chunks() {
        let source = MockCorpusSource::new().with_chunks("corpus.txt", vec!["ab", "c", "def"]);
        let chunks: Vec<_> = source
            .open_stream("corpus.txt", 1024)
            .await
            .unwrap()
            .map(|c| c.unwrap())
            .collect()
            .await;
        assert_eq!(chunks, vec![Bytes::from("ab"), Bytes::from("c"), Bytes::from("def")]);
    }
}
