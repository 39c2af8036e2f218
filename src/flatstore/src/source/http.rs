//! HTTP object store source.
//!
//! Works against any store that serves objects at `{base_url}/{key}` and
//! honours `Range: bytes=start-end` (CDN pull zones, S3-compatible gateways,
//! plain static file servers).

use std::ops::Range;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::client::{ChunkStream, CorpusSource};
use crate::config::StoreConfig;
use crate::error::{SourceError, SourceResult};

/// [`CorpusSource`] backed by `reqwest`.
///
/// Range and object fetches carry `request_timeout` end to end. Streams only
/// bound the wait for response headers here; per-chunk read deadlines are
/// enforced by the scan engine.
pub struct HttpCorpusSource {
    base_url: String,
    client: reqwest::Client,
    request_timeout: Duration,
}

impl HttpCorpusSource {
    /// Create a new source with an explicit origin and timeout.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> SourceResult<Self> {
        let base_url = base_url.into();
        let client = reqwest::Client::builder()
            .connect_timeout(request_timeout)
            .user_agent(concat!("flatstore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::unavailable("build_client", &base_url, e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            request_timeout,
        })
    }

    /// Create a source from store configuration.
    pub fn from_config(config: &StoreConfig) -> SourceResult<Self> {
        Self::new(config.base_url.clone(), config.request_timeout())
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }

    /// Map a transport error, keeping timeouts distinguishable.
    fn transport_error(operation: &str, key: &str, e: reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::timeout(operation, key)
        } else {
            SourceError::unavailable(operation, key, e.to_string())
        }
    }

    fn check_status(operation: &str, key: &str, status: StatusCode) -> SourceResult<()> {
        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound { key: key.to_string() });
        }
        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            return Err(SourceError::RangeNotSatisfiable { key: key.to_string() });
        }
        if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
            let message = format!("HTTP {}", status);
            return Err(SourceError::unavailable(operation, key, message));
        }
        Ok(())
    }

    async fn get_bytes(
        &self,
        operation: &str,
        key: &str,
        range: Option<Range<u64>>,
    ) -> SourceResult<Bytes> {
        let url = self.object_url(key);
        let mut request = self.client.get(&url).timeout(self.request_timeout);
        if let Some(range) = &range {
            let range_header = format!("bytes={}-{}", range.start, range.end.saturating_sub(1));
            request = request.header(reqwest::header::RANGE, range_header);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::transport_error(operation, key, e))?;
        debug!(%url, status = %response.status(), "{}: response received", operation);
        Self::check_status(operation, key, response.status())?;

        match range {
            Some(range) if response.status() == StatusCode::OK => {
                warn!(%url, "server ignored Range header, slicing the full body");
                Self::slice_body(operation, key, response, range).await
            }
            _ => response
                .bytes()
                .await
                .map_err(|e| Self::transport_error(operation, key, e)),
        }
    }

    /// Read `range` out of a full-object body without buffering the rest.
    ///
    /// Bytes before `range.start` are discarded as they arrive and the body
    /// is dropped as soon as the range is filled.
    async fn slice_body(
        operation: &str,
        key: &str,
        response: reqwest::Response,
        range: Range<u64>,
    ) -> SourceResult<Bytes> {
        let wanted = range.end.saturating_sub(range.start) as usize;
        let mut to_skip = range.start;
        let mut out = BytesMut::with_capacity(wanted);
        let mut body = response.bytes_stream();

        while out.len() < wanted {
            let Some(chunk) = body.next().await else {
                break;
            };
            let mut chunk = chunk.map_err(|e| Self::transport_error(operation, key, e))?;
            if to_skip > 0 {
                let skipped = to_skip.min(chunk.len() as u64);
                chunk = chunk.slice(skipped as usize..);
                to_skip -= skipped;
            }
            let take = (wanted - out.len()).min(chunk.len());
            out.extend_from_slice(&chunk[..take]);
        }

        if to_skip > 0 {
            // The object ended before the range began
            return Err(SourceError::RangeNotSatisfiable { key: key.to_string() });
        }
        Ok(out.freeze())
    }
}

#[async_trait]
impl CorpusSource for HttpCorpusSource {
    async fn fetch_range(&self, key: &str, range: Range<u64>) -> SourceResult<Bytes> {
        if range.start >= range.end {
            return Ok(Bytes::new());
        }
        self.get_bytes("fetch_range", key, Some(range)).await
    }

    async fn fetch_object(&self, key: &str) -> SourceResult<Bytes> {
        self.get_bytes("fetch_object", key, None).await
    }

    async fn open_stream(
        &self,
        key: &str,
        _chunk_size_hint: usize,
    ) -> SourceResult<ChunkStream> {
        let url = self.object_url(key);
        let send = self.client.get(&url).send();
        let response = tokio::time::timeout(self.request_timeout, send)
            .await
            .map_err(|_| SourceError::timeout("open_stream", key))?
            .map_err(|e| Self::transport_error("open_stream", key, e))?;
        debug!(%url, status = %response.status(), "open_stream: response received");
        Self::check_status("open_stream", key, response.status())?;

        let key = key.to_string();
        let stream = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| Self::transport_error("read_chunk", &key, e)))
            .boxed();
        Ok(stream)
    }
}
