//! Record store facade.
//!
//! Pairs the lookup and scan engines over one source and applies request
//! validation first, so every entry point has the same error behavior.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::lookup::LookupEngine;
use crate::record::Record;
use crate::request::{validate_key, SearchRequest};
use crate::scan::ScanEngine;
use crate::source::{CorpusSource, HttpCorpusSource};

/// One page of search results.
#[derive(Clone, Debug, Serialize)]
pub struct SearchPage {
    /// The query as received.
    pub query: String,
    /// Number of records in this page.
    pub total: usize,
    pub records: Vec<Record>,
}

/// Entry point for lookups and searches against one corpus.
///
/// # Example
///
/// ```rust,ignore
/// let store = RecordStore::connect(StoreConfig::new("https://data.example.net"))?;
///
/// let record = store.get("00000001").await?;
/// let page = store.search(&SearchRequest::new("juan garcia").with_limit(20)).await?;
/// ```
pub struct RecordStore {
    config: StoreConfig,
    lookup: LookupEngine,
    scan: ScanEngine,
}

impl RecordStore {
    /// Create a store over an existing source.
    pub fn new(source: Arc<dyn CorpusSource>, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let lookup = LookupEngine::new(source.clone(), &config);
        let scan = ScanEngine::new(source, &config);
        Ok(Self { config, lookup, scan })
    }

    /// Create a store reading from `config.base_url` over HTTP.
    pub fn connect(config: StoreConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(Error::Config("base_url is required".into()));
        }
        let source =
            HttpCorpusSource::from_config(&config).map_err(|e| Error::Config(e.to_string()))?;
        info!(base_url = %config.base_url, corpus = %config.corpus_key, "record store connected");
        Self::new(Arc::new(source), config)
    }

    /// The validated configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The index-backed lookup engine.
    pub fn lookup_engine(&self) -> &LookupEngine {
        &self.lookup
    }

    /// The streaming scan engine.
    pub fn scan_engine(&self) -> &ScanEngine {
        &self.scan
    }

    /// Fetch a record through the index.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for a malformed key, [`Error::NotFound`] when the
    /// index or the fetched window has no such record, and
    /// [`Error::SourceUnavailable`] when the corpus cannot be read.
    pub async fn get(&self, key: &str) -> Result<Record> {
        let key = validate_key(key, self.config.key_length)?;
        self.lookup.lookup_by_key(key).await?.ok_or_else(|| Error::NotFound {
            key: key.to_string(),
        })
    }

    /// Fetch a record by streaming the corpus, without the index.
    pub async fn scan_for_key(&self, key: &str) -> Result<Record> {
        let key = validate_key(key, self.config.key_length)?;
        self.scan.find_key(key).await?.ok_or_else(|| Error::NotFound {
            key: key.to_string(),
        })
    }

    /// Run a validated, clamped search.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        let query = request.to_query(&self.config)?;
        let records = self.scan.search(&query).await?;
        Ok(SearchPage {
            query: request.query.clone(),
            total: records.len(),
            records,
        })
    }
}
