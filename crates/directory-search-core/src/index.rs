//! Prefix index over the indexed record fields.
//!
//! Maps every prefix of every token to the set of record ids whose
//! indexed fields contain that token.
//!
//! # Algorithm
//!
//! 1. For each record, take `name`, `username`, `email`, and `company.name`.
//! 2. Lowercase each value and split it on whitespace into tokens.
//! 3. For each token, register every leading substring (1 to full length,
//!    counted in characters) against the record id.
//!
//! Only whitespace separates tokens: `"Romaguera-Crona"` is the single
//! token `"romaguera-crona"`, so `"cr"` is not one of its prefixes.
//!
//! A token of length `L` contributes `L` entries. The index is built once
//! per collection snapshot and never patched; any change to the collection
//! requires a fresh [`PrefixIndex::build`].
//!
//! # Example
//!
//! ```rust
//! use directory_search_core::index::PrefixIndex;
//! use directory_search_core::models::Record;
//!
//! let records = vec![Record::new(1, "Leanne Graham", "Bret", "Sincere@april.biz", "Romaguera-Crona")];
//! let index = PrefixIndex::build(&records);
//! assert!(index.contains("gra", 1));
//! assert!(!index.contains("cr", 1));
//! ```

use std::collections::{HashMap, HashSet};

use crate::models::{Record, RecordId};

/// Mapping from prefix to the ids of records holding a token with that prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixIndex {
    entries: HashMap<String, HashSet<RecordId>>,
}

impl PrefixIndex {
    /// Build the index for a whole collection.
    pub fn build(records: &[Record]) -> Self {
        let mut entries: HashMap<String, HashSet<RecordId>> = HashMap::new();
        for record in records {
            for field in record.indexed_fields() {
                for token in tokenize(field) {
                    for prefix in prefixes(&token) {
                        entries
                            .entry(prefix.to_string())
                            .or_default()
                            .insert(record.id);
                    }
                }
            }
        }
        Self { entries }
    }

    /// Ids registered under exactly `prefix`.
    pub fn get(&self, prefix: &str) -> Option<&HashSet<RecordId>> {
        self.entries.get(prefix)
    }

    pub fn contains(&self, prefix: &str, id: RecordId) -> bool {
        self.entries.get(prefix).is_some_and(|ids| ids.contains(&id))
    }

    /// Number of distinct prefixes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lowercase `field` and split it into whitespace-delimited tokens.
pub fn tokenize(field: &str) -> Vec<String> {
    field
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Every non-empty leading substring of `token`, shortest first.
///
/// Cuts on `char` boundaries so multi-byte characters stay intact.
pub fn prefixes(token: &str) -> impl Iterator<Item = &str> {
    token
        .char_indices()
        .map(move |(i, c)| &token[..i + c.len_utf8()])
}
