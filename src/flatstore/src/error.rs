//! Error types for record store operations.
//!
//! Two layers are kept apart: [`SourceError`] describes
//! what went wrong talking to the remote object store, while [`Error`] is the
//! caller-facing taxonomy. Shard fetch failures never reach [`Error`]; they are
//! absorbed by the index and logged.

use thiserror::Error;

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for remote source operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Errors raised by a [`CorpusSource`](crate::source::CorpusSource).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The remote resource does not exist (HTTP 404).
    #[error("object not found: {key}")]
    NotFound {
        /// The resource key that was not found.
        key: String,
    },

    /// Transport failure or an unexpected status code.
    #[error("{operation} failed for '{key}': {message}")]
    Unavailable {
        /// Operation that failed (`fetch_range`, `fetch_object`, `open_stream`, `read_chunk`).
        operation: String,
        /// The resource key involved.
        key: String,
        /// The underlying error message.
        message: String,
    },

    /// The requested range starts past the end of the object (HTTP 416).
    #[error("range not satisfiable for '{key}'")]
    RangeNotSatisfiable {
        /// The resource key involved.
        key: String,
    },

    /// The remote did not answer within the configured timeout.
    #[error("{operation} timed out for '{key}'")]
    Timeout {
        /// Operation that timed out.
        operation: String,
        /// The resource key involved.
        key: String,
    },
}

impl SourceError {
    /// Create an unavailable error.
    pub fn unavailable(
        operation: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        SourceError::Unavailable {
            operation: operation.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, key: impl Into<String>) -> Self {
        SourceError::Timeout {
            operation: operation.into(),
            key: key.into(),
        }
    }

    /// Whether the remote reported the resource as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound { .. })
    }

    /// Whether a range request started past the end of the object.
    pub fn is_range_not_satisfiable(&self) -> bool {
        matches!(self, SourceError::RangeNotSatisfiable { .. })
    }
}

/// Errors surfaced to callers of the lookup and scan engines.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed key or query, rejected before any I/O.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The query contained no usable search terms.
    #[error("query has no search terms")]
    EmptyQuery,

    /// Key absent from the index or from the fetched window.
    #[error("record not found: {key}")]
    NotFound {
        /// The key that was looked up.
        key: String,
    },

    /// The main corpus could not be reached. Fatal to the current request.
    #[error("source unavailable for '{resource}': {source}")]
    SourceUnavailable {
        /// The corpus resource key.
        resource: String,
        /// The underlying source failure.
        #[source]
        source: SourceError,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Wrap a source failure on the main corpus.
    pub fn source_unavailable(resource: impl Into<String>, source: SourceError) -> Self {
        Error::SourceUnavailable {
            resource: resource.into(),
            source,
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
