//! Index shard documents.
//!
//! A shard is a JSON object mapping record identifiers to byte offsets into
//! the corpus, holding only identifiers that share the shard's prefix:
//!
//! ```text
//! index/07.json
//! {"07000001": 0, "07000002": 181, "07000010": 362}
//! ```

use std::collections::HashMap;

use tracing::debug;

/// Key → corpus offset mapping for one key prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexShard {
    prefix: String,
    offsets: HashMap<String, u64>,
}

impl IndexShard {
    /// A shard with no entries, used for missing or unreadable documents.
    pub fn empty(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            offsets: HashMap::new(),
        }
    }

    /// Build a shard from an in-memory mapping, keeping only keys under `prefix`.
    pub fn from_offsets(prefix: impl Into<String>, offsets: HashMap<String, u64>) -> Self {
        let prefix = prefix.into();
        let total = offsets.len();
        let offsets: HashMap<String, u64> = offsets
            .into_iter()
            .filter(|(key, _)| key.starts_with(prefix.as_str()))
            .collect();
        if offsets.len() != total {
            debug!(%prefix, dropped = total - offsets.len(), "shard keys outside prefix dropped");
        }
        Self { prefix, offsets }
    }

    /// Decode a shard document.
    ///
    /// Offsets must be non-negative integers; anything else is a format error.
    pub fn from_json(prefix: impl Into<String>, data: &[u8]) -> serde_json::Result<Self> {
        let offsets: HashMap<String, u64> = serde_json::from_slice(data)?;
        Ok(Self::from_offsets(prefix, offsets))
    }

    /// Corpus offset recorded for `key`.
    pub fn offset_of(&self, key: &str) -> Option<u64> {
        self.offsets.get(key).copied()
    }

    /// Key prefix this shard covers.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of indexed keys.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// True for a shard with no keys.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}
