//! In-memory [`RecordSource`] implementation for testing and embedding.
//!
//! Serves a fixed collection, or a fixed failure. Every call returns an
//! immediately-ready future and counts itself.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::models::RecordCollection;

use super::{LoadError, RecordSource};

/// In-memory source for tests and offline use.
pub struct InMemorySource {
    result: Result<RecordCollection, LoadError>,
    calls: AtomicUsize,
}

impl InMemorySource {
    pub fn new(records: RecordCollection) -> Self {
        Self {
            result: Ok(records),
            calls: AtomicUsize::new(0),
        }
    }

    /// A source whose every fetch fails with `err`.
    pub fn failing(err: LoadError) -> Self {
        Self {
            result: Err(err),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times [`fetch_all`](RecordSource::fetch_all) ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSource for InMemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_all(&self) -> Result<RecordCollection, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
