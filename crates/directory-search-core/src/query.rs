//! Query engine: multi-word prefix filtering over a [`PrefixIndex`].
//!
//! The engine is a boolean membership filter. It never reorders and never
//! scores; it returns a subsequence of the collection it was given.
//!
//! # Algorithm
//!
//! 1. A term that is empty after trimming matches the whole collection.
//! 2. Otherwise the term is lowercased, trimmed, and split on runs of
//!    whitespace into words.
//! 3. Each word is looked up by its exact key. A missing key is the
//!    empty set.
//! 4. The per-word sets are intersected.
//! 5. The collection is filtered to ids in the intersection, in order.
//!
//! Records that share an id share one index entry, so they always match
//! or miss together and all of them appear in the result.

use std::collections::HashSet;

use crate::index::PrefixIndex;
use crate::models::{Record, RecordCollection, RecordId};

/// Lowercase, trim, and split a raw term into query words.
pub fn normalize_words(term: &str) -> Vec<String> {
    term.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Ids matching every word of `term`.
///
/// Returns `None` when the term has no words, meaning "no filter".
pub fn matching_ids(term: &str, index: &PrefixIndex) -> Option<HashSet<RecordId>> {
    let words = normalize_words(term);
    let mut words = words.iter();
    let first = words.next()?;

    let mut ids = index.get(first).cloned().unwrap_or_default();
    for word in words {
        if ids.is_empty() {
            break;
        }
        match index.get(word) {
            Some(candidates) => ids.retain(|id| candidates.contains(id)),
            None => ids.clear(),
        }
    }
    Some(ids)
}

/// Run `term` against `index` and return the matching records of `collection`.
pub fn query(term: &str, index: &PrefixIndex, collection: &[Record]) -> RecordCollection {
    match matching_ids(term, index) {
        None => collection.to_vec(),
        Some(ids) => collection
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect(),
    }
}
