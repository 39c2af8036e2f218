//! Streaming scan engine.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tracing::debug;

use super::lines::{complete_lines, LineAssembler};
use crate::config::StoreConfig;
use crate::error::{Error, Result, SourceError};
use crate::record::{leading_field, Field, Record};
use crate::source::CorpusSource;

/// Where query terms must occur.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MatchScope {
    /// Anywhere in the raw line.
    #[default]
    Line,
    /// Each term in at least one of these fields.
    Fields(Vec<Field>),
}

/// A multi-term substring query.
///
/// Terms are lower-cased whitespace tokens; a line matches when every term
/// occurs in it (logical AND, any order).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    terms: Vec<String>,
    limit: usize,
    skip: usize,
    scope: MatchScope,
}

impl SearchQuery {
    /// Tokenize free text on whitespace.
    pub fn new(text: &str, limit: usize) -> Self {
        Self::from_terms(text.split_whitespace(), limit)
    }

    /// Build a query from pre-split terms; blanks and duplicates are dropped.
    pub fn from_terms<I, S>(terms: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() && !normalized.contains(&term) {
                normalized.push(term);
            }
        }
        Self {
            terms: normalized,
            limit,
            skip: 0,
            scope: MatchScope::Line,
        }
    }

    /// Skip this many matches before collecting results.
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Restrict matching to the given fields. An empty list means the whole line.
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.scope = if fields.is_empty() {
            MatchScope::Line
        } else {
            MatchScope::Fields(fields)
        };
        self
    }

    /// Normalized terms, in first-seen order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Maximum number of records returned.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Matches skipped before collecting.
    pub fn skip(&self) -> usize {
        self.skip
    }

    /// Where terms must occur.
    pub fn scope(&self) -> &MatchScope {
        &self.scope
    }

    /// True when no usable terms remain.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Parse `line` if it satisfies the query.
    pub fn evaluate(&self, line: &str) -> Option<Record> {
        match &self.scope {
            MatchScope::Line => {
                let lower = line.to_lowercase();
                self.terms
                    .iter()
                    .all(|term| lower.contains(term.as_str()))
                    .then(|| Record::parse(line))
            }
            MatchScope::Fields(fields) => {
                let record = Record::parse(line);
                let values: Vec<String> =
                    fields.iter().map(|f| record.get(*f).to_lowercase()).collect();
                self.terms
                    .iter()
                    .all(|term| values.iter().any(|v| v.contains(term.as_str())))
                    .then_some(record)
            }
        }
    }
}

/// Walks the corpus stream once per call.
pub struct ScanEngine {
    source: Arc<dyn CorpusSource>,
    corpus_key: String,
    chunk_bytes: usize,
    max_line_bytes: usize,
    read_timeout: Duration,
    has_header: bool,
}

impl ScanEngine {
    /// Create an engine over the configured corpus.
    pub fn new(source: Arc<dyn CorpusSource>, config: &StoreConfig) -> Self {
        Self {
            source,
            corpus_key: config.corpus_key.clone(),
            chunk_bytes: config.stream_chunk_bytes,
            max_line_bytes: config.max_line_bytes,
            read_timeout: config.stream_read_timeout(),
            has_header: config.has_header,
        }
    }

    /// Override the per-chunk read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Return up to `query.limit()` matching records in corpus order.
    ///
    /// An empty query returns immediately without touching the source.
    /// A final line without a trailing newline is not considered.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Record>> {
        if query.is_empty() || query.limit() == 0 {
            return Ok(Vec::new());
        }

        let mut results = Vec::new();
        let mut matched = 0usize;
        self.scan(|line| {
            let Some(record) = query.evaluate(line) else {
                return ControlFlow::Continue(());
            };
            matched += 1;
            if matched > query.skip() {
                results.push(record);
                if results.len() >= query.limit() {
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        })
        .await?;

        debug!(terms = ?query.terms(), found = results.len(), "search finished");
        Ok(results)
    }

    /// Stream the corpus until a line whose leading field equals `key`.
    pub async fn find_key(&self, key: &str) -> Result<Option<Record>> {
        let mut found = None;
        self.scan(|line| {
            if leading_field(line.as_bytes()) == key.as_bytes() {
                found = Some(Record::parse(line));
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        })
        .await?;
        Ok(found)
    }

    /// Feed every complete, non-blank line to `visit` until it breaks or the
    /// stream ends.
    async fn scan<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&str) -> ControlFlow<()>,
    {
        let key = self.corpus_key.as_str();
        let mut stream = self
            .source
            .open_stream(key, self.chunk_bytes)
            .await
            .map_err(|e| Error::source_unavailable(key, e))?;

        let mut assembler = LineAssembler::with_max_line_bytes(self.max_line_bytes);
        let mut header_pending = self.has_header;
        let mut chunks = 0usize;

        loop {
            let next = tokio::time::timeout(self.read_timeout, stream.next())
                .await
                .map_err(|_| {
                    Error::source_unavailable(key, SourceError::timeout("read_chunk", key))
                })?;
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk.map_err(|e| Error::source_unavailable(key, e))?;
            chunks += 1;

            let Some(block) = assembler.push(&chunk) else {
                continue;
            };
            for raw in complete_lines(&block) {
                if header_pending {
                    header_pending = false;
                    continue;
                }
                let line = String::from_utf8_lossy(raw);
                if line.trim().is_empty() {
                    continue;
                }
                if visit(&line).is_break() {
                    debug!(chunks, "scan stopped early");
                    return Ok(());
                }
            }
        }

        if !assembler.pending().is_empty() {
            debug!(bytes = assembler.pending().len(), "unterminated final line dropped");
        }
        debug!(chunks, "scan reached end of corpus");
        Ok(())
    }
}
