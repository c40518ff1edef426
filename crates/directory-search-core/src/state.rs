//! Session state and its event transitions.
//!
//! [`SearchState`] bundles the record store, the prefix index derived from
//! it, the raw search term, and the filtered view. It changes only through
//! the `on_*` transitions, each of which computes the new index and view
//! before assigning anything, so a caller holding the state behind a lock
//! publishes whole snapshots.
//!
//! Once [`tear_down`](SearchState::tear_down) has run, every transition is
//! a no-op and reports `false`.

use serde::Serialize;

use crate::index::PrefixIndex;
use crate::models::{Record, RecordCollection};
use crate::query::query;
use crate::store::{LoadError, RecordStore};

/// Flags reported to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub loading: bool,
    pub error: Option<String>,
    pub result_count: usize,
}

/// Everything the presentation layer renders, captured at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub search_term: String,
    pub results: RecordCollection,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SearchState {
    store: RecordStore,
    index: PrefixIndex,
    term: String,
    view: RecordCollection,
    live: bool,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            store: RecordStore::new(),
            index: PrefixIndex::default(),
            term: String::new(),
            view: Vec::new(),
            live: true,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn index(&self) -> &PrefixIndex {
        &self.index
    }

    pub fn search_term(&self) -> &str {
        &self.term
    }

    pub fn view(&self) -> &[Record] {
        &self.view
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            loading: self.store.is_loading(),
            error: self.store.error().map(str::to_string),
            result_count: self.view.len(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            search_term: self.term.clone(),
            results: self.view.clone(),
            loading: self.store.is_loading(),
            error: self.store.error().map(str::to_string),
        }
    }

    /// Store the raw term as typed. The view is left alone.
    pub fn set_search_term(&mut self, term: &str) -> bool {
        if !self.live {
            return false;
        }
        self.term = term.to_string();
        true
    }

    pub fn on_load_started(&mut self) -> bool {
        if !self.live {
            return false;
        }
        self.store.begin_load();
        true
    }

    /// Replace the collection, rebuild the index, and re-run the current term.
    pub fn on_load_completed(&mut self, records: RecordCollection) -> bool {
        if !self.live {
            return false;
        }
        let index = PrefixIndex::build(&records);
        let view = query(&self.term, &index, &records);
        self.store.complete_load(records);
        self.index = index;
        self.view = view;
        true
    }

    /// Record the failure; collection, index, and view are kept.
    pub fn on_load_failed(&mut self, err: &LoadError) -> bool {
        if !self.live {
            return false;
        }
        self.store.fail_load(err);
        true
    }

    /// A debounced query fired with `term`.
    pub fn on_query_fired(&mut self, term: &str) -> bool {
        if !self.live {
            return false;
        }
        self.view = query(term, &self.index, self.store.records());
        true
    }

    /// Disarm the state. Later transitions do nothing.
    pub fn tear_down(&mut self) {
        self.live = false;
    }
}
