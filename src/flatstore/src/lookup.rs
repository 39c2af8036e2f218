//! Point lookup engine.
//!
//! ## Lookup Flow
//!
//! ```text
//! 1. Resolve key → offset (sharded index or stride estimate)
//! 2. Not indexed? → None, no corpus request
//! 3. One range request: [offset, offset + window)
//! 4. First complete line whose leading field == key → Record
//! 5. No such line (stale index, approximate offset) → None
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::index::{resolver_from_config, OffsetResolver};
use crate::record::{leading_field, Record};
use crate::source::CorpusSource;

/// Resolves keys to records with at most one corpus range request each.
///
/// Absence from the index is final: the engine never falls back to a full
/// scan. Use [`ScanEngine::find_key`](crate::scan::ScanEngine::find_key) when
/// that trade is wanted.
pub struct LookupEngine {
    source: Arc<dyn CorpusSource>,
    resolver: Arc<dyn OffsetResolver>,
    corpus_key: String,
    window_bytes: u64,
}

impl LookupEngine {
    /// Create an engine using the resolver selected by `config`.
    pub fn new(source: Arc<dyn CorpusSource>, config: &StoreConfig) -> Self {
        let resolver = resolver_from_config(source.clone(), config);
        Self::with_resolver(source, resolver, config)
    }

    /// Create an engine with an explicit resolver.
    pub fn with_resolver(
        source: Arc<dyn CorpusSource>,
        resolver: Arc<dyn OffsetResolver>,
        config: &StoreConfig,
    ) -> Self {
        Self {
            source,
            resolver,
            corpus_key: config.corpus_key.clone(),
            window_bytes: config.lookup_window_bytes,
        }
    }

    /// The offset resolver in use.
    pub fn resolver(&self) -> &Arc<dyn OffsetResolver> {
        &self.resolver
    }

    /// Look up one record by its identifier.
    ///
    /// The key is expected to be validated by the caller.
    ///
    /// # Errors
    ///
    /// [`Error::SourceUnavailable`] when the corpus range request fails.
    /// Index problems never error; they yield `Ok(None)`. That includes an
    /// offset past the end of the corpus.
    pub async fn lookup_by_key(&self, key: &str) -> Result<Option<Record>> {
        let Some(offset) = self.resolver.lookup_offset(key).await else {
            debug!(%key, "key not indexed");
            return Ok(None);
        };

        let end = offset.saturating_add(self.window_bytes);
        let window = match self.source.fetch_range(&self.corpus_key, offset..end).await {
            Ok(window) => window,
            Err(e) if e.is_range_not_satisfiable() => {
                debug!(%key, offset, "indexed offset is past the end of the corpus");
                return Ok(None);
            }
            Err(e) => return Err(Error::source_unavailable(&self.corpus_key, e)),
        };
        debug!(%key, offset, fetched = window.len(), "lookup window fetched");

        let reached_eof = (window.len() as u64) < self.window_bytes;
        let record = find_in_window(&window, key, reached_eof);
        if record.is_none() {
            debug!(%key, offset, "no matching line in window");
        }
        Ok(record)
    }
}

/// First complete line in `window` whose leading field equals `key`.
///
/// The bytes after the last newline are a truncated line unless the window
/// reached the end of the corpus.
pub(crate) fn find_in_window(window: &[u8], key: &str, reached_eof: bool) -> Option<Record> {
    let complete_end = if reached_eof {
        window.len()
    } else {
        window.iter().rposition(|&b| b == b'\n')?
    };

    window[..complete_end]
        .split(|&b| b == b'\n')
        .find(|line| leading_field(line) == key.as_bytes())
        .map(Record::parse_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::StrideEstimator;
    use crate::record::Field;
    use crate::source::mock_client::MockCorpusSource;

    const CORPUS: &str = concat!(
        "00000001|GARCIA|LOPEZ|JUAN\n",
        "00000002|PEREZ|TORRES|MARIA\n",
        "00000003|QUISPE|MAMANI|ROSA\n",
    );

    fn engine(
        source: MockCorpusSource,
        config: StoreConfig,
    ) -> (Arc<MockCorpusSource>, LookupEngine) {
        let source = Arc::new(source);
        let engine = LookupEngine::new(source.clone(), &config);
        (source, engine)
    }

    #[test]
    fn test_find_in_window_skips_partial_first_line() {
        let window = b"LOPEZ|JUAN\n00000002|PEREZ|TORRES|MARIA\n00000003|QUI";
        let record = find_in_window(window, "00000002", false).unwrap();
        assert_eq!(record.get(Field::GivenNames), "MARIA");
    }

    #[test]
    fn test_find_in_window_ignores_truncated_tail() {
        let window = b"00000002|PEREZ|TORRES|MARIA\n00000003|QUI";
        assert!(find_in_window(window, "00000003", false).is_none());

        // At end of corpus the unterminated tail is a whole line
        let record = find_in_window(window, "00000003", true).unwrap();
        assert_eq!(record.get(Field::PaternalSurname), "QUI");
    }

    #[test]
    fn test_find_in_window_requires_exact_leading_field() {
        let window = b"000000021|X\n00000002\r\n";
        let record = find_in_window(window, "00000002", false).unwrap();
        assert_eq!(record.id(), "00000002");
        assert!(find_in_window(b"x|00000002|y\n", "00000002", false).is_none());
    }

    #[tokio::test]
    async fn test_lookup_exact_offset() {
        let (source, engine) = engine(
            MockCorpusSource::new()
                .with_object("reniec.txt", CORPUS)
                .with_object("index/00.json", r#"{"00000001": 0, "00000002": 27}"#),
            StoreConfig::default(),
        );

        let record = engine.lookup_by_key("00000002").await.unwrap().unwrap();
        assert_eq!(record.id(), "00000002");
        assert_eq!(record.get(Field::MaternalSurname), "TORRES");
        assert_eq!(source.object_calls(), 1);
        assert_eq!(source.range_calls(), 1);
    }

    #[tokio::test]
    async fn test_lookup_unindexed_key_makes_no_corpus_request() {
        let (source, engine) = engine(
            MockCorpusSource::new()
                .with_object("reniec.txt", CORPUS)
                .with_object("index/00.json", r#"{"00000001": 0}"#),
            StoreConfig::default(),
        );

        assert!(engine.lookup_by_key("00000003").await.unwrap().is_none());
        assert!(engine.lookup_by_key("99000003").await.unwrap().is_none());
        assert_eq!(source.range_calls(), 0);
    }

    #[tokio::test]
    async fn test_lookup_stale_offset_returns_none() {
        let (_, engine) = engine(
            MockCorpusSource::new()
                .with_object("reniec.txt", CORPUS)
                .with_object("index/00.json", r#"{"00000001": 54}"#),
            StoreConfig::default(),
        );
        assert!(engine.lookup_by_key("00000001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_offset_past_end_returns_none() {
        let (source, engine) = engine(
            MockCorpusSource::new()
                .with_object("reniec.txt", CORPUS)
                .with_object("index/00.json", r#"{"00000001": 5000}"#),
            StoreConfig::default(),
        );
        assert!(engine.lookup_by_key("00000001").await.unwrap().is_none());
        assert_eq!(source.range_calls(), 1);
    }

    #[tokio::test]
    async fn test_lookup_small_window_misses_long_line() {
        let (_, engine) = engine(
            MockCorpusSource::new()
                .with_object("reniec.txt", CORPUS)
                .with_object("index/00.json", r#"{"00000001": 0}"#),
            StoreConfig::default().with_lookup_window(10),
        );
        assert!(engine.lookup_by_key("00000001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_tolerates_overshoot() {
        let (_, engine) = engine(
            MockCorpusSource::new()
                .with_object("reniec.txt", CORPUS)
                .with_object("index/00.json", r#"{"00000003": 55}"#)
                .with_range_overshoot(100),
            StoreConfig::default().with_lookup_window(8),
        );
        let record = engine.lookup_by_key("00000003").await.unwrap().unwrap();
        assert_eq!(record.get(Field::GivenNames), "ROSA");
    }

    #[tokio::test]
    async fn test_lookup_with_stride_estimate() {
        let source = Arc::new(MockCorpusSource::new().with_object("reniec.txt", CORPUS));
        // Lines are 27-28 bytes; guess 27 and back off one line.
        let resolver = Arc::new(StrideEstimator::new(1, 27, 27));
        let engine = LookupEngine::with_resolver(source.clone(), resolver, &StoreConfig::default());

        let record = engine.lookup_by_key("00000003").await.unwrap().unwrap();
        assert_eq!(record.get(Field::PaternalSurname), "QUISPE");
        assert_eq!(source.object_calls(), 0);
        assert_eq!(source.range_calls(), 1);
    }

    #[tokio::test]
    async fn test_lookup_corpus_failure_is_fatal() {
        let (_, engine) = engine(
            MockCorpusSource::new()
                .with_failing("reniec.txt")
                .with_object("index/00.json", r#"{"00000001": 0}"#),
            StoreConfig::default(),
        );
        let err = engine.lookup_by_key("00000001").await.unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
    }
}
