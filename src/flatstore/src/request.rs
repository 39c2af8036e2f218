//! Request validation.
//!
//! Shape checks that run before either engine is invoked. Nothing here does
//! I/O; a rejected request never reaches the source.

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::record::Field;
use crate::scan::SearchQuery;

/// Check that `key` is exactly `length` ASCII digits.
pub fn validate_key(key: &str, length: usize) -> Result<&str> {
    if key.len() != length || !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::validation(format!("key must be exactly {} digits", length)));
    }
    Ok(key)
}

/// Clamp a requested limit to `[1, max]`, using `default` when absent.
pub fn clamp_limit(limit: Option<usize>, default: usize, max: usize) -> usize {
    limit.unwrap_or(default).clamp(1, max.max(1))
}

/// Parse a comma-separated list of field names.
pub fn parse_fields(list: &str) -> Result<Vec<Field>> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            Field::from_name(name)
                .ok_or_else(|| Error::validation(format!("unknown field '{}'", name)))
        })
        .collect()
}

/// A free-text search as received from a caller.
#[derive(Clone, Debug, Default)]
pub struct SearchRequest {
    /// Whitespace-separated search terms.
    pub query: String,
    /// Requested result cap; clamped to the configured maximum.
    pub limit: Option<usize>,
    /// Matches to skip before collecting.
    pub skip: usize,
    /// Restrict matching to these fields (empty = whole line).
    pub fields: Vec<Field>,
}

impl SearchRequest {
    /// Create a request with default limit, no skip and whole-line scope.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Set the requested result cap.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip this many matches first.
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Restrict matching to these fields.
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    /// Validate and turn the request into a scan query.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyQuery`] when the query is blank
    /// - [`Error::Validation`] when it has fewer than `min_query_chars` characters
    pub fn to_query(&self, config: &StoreConfig) -> Result<SearchQuery> {
        let trimmed = self.query.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyQuery);
        }
        if trimmed.chars().count() < config.min_query_chars {
            return Err(Error::validation(format!(
                "query must have at least {} characters",
                config.min_query_chars
            )));
        }

        let limit = clamp_limit(self.limit, config.default_search_limit, config.max_search_limit);
        Ok(SearchQuery::new(trimmed, limit)
            .with_skip(self.skip)
            .with_fields(self.fields.clone()))
    }
}
