//! Record loading abstraction and the record store.
//!
//! The [`RecordSource`] trait is the single seam to the outside world: one
//! "fetch all records" operation. [`RecordStore`] holds the most recently
//! loaded collection together with the loading flag and error message.
//! Loads may overlap; the flag stays raised until every started load has
//! completed or failed.
//!
//! Implementations of [`RecordSource`] must be `Send + Sync` to work with
//! async runtimes.

pub mod memory;

use async_trait::async_trait;

use crate::models::{Record, RecordCollection};

/// Broad category of a load failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// Transport error or non-success response.
    FetchFailure,
    /// Payload did not parse into the expected record shape.
    DecodeFailure,
}

/// Why a load failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("{message}")]
    Fetch { message: String },
    #[error("Network response was not ok: {status}")]
    Status { status: u16 },
    #[error("{message}")]
    Decode { message: String },
}

impl LoadError {
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            LoadError::Fetch { .. } | LoadError::Status { .. } => LoadErrorKind::FetchFailure,
            LoadError::Decode { .. } => LoadErrorKind::DecodeFailure,
        }
    }

    /// Message shown to the user. Falls back to a generic text when the
    /// underlying cause carried none.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            "An unknown error occurred".to_string()
        } else {
            message
        }
    }
}

/// Decode a JSON array of records.
pub fn decode_records(body: &[u8]) -> Result<RecordCollection, LoadError> {
    serde_json::from_slice::<Vec<Record>>(body).map_err(|e| LoadError::Decode {
        message: format!("Invalid records payload: {e}"),
    })
}

/// A remote (or local) provider of the full record collection.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use directory_search_core::models::Record;
/// use directory_search_core::store::{LoadError, RecordSource};
///
/// struct Fixed;
///
/// #[async_trait]
/// impl RecordSource for Fixed {
///     fn name(&self) -> &str { "fixed" }
///
///     async fn fetch_all(&self) -> Result<Vec<Record>, LoadError> {
///         Ok(vec![Record::new(1, "Leanne Graham", "Bret", "Sincere@april.biz", "Romaguera-Crona")])
///     }
/// }
/// ```
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Short label used in logs (e.g. the endpoint URL).
    fn name(&self) -> &str;

    /// Retrieve every record, in source order.
    async fn fetch_all(&self) -> Result<RecordCollection, LoadError>;
}

/// Authoritative record collection plus fetch status.
///
/// Mutated only through [`begin_load`](Self::begin_load),
/// [`complete_load`](Self::complete_load), and
/// [`fail_load`](Self::fail_load). A successful load replaces the whole
/// collection; a failed one keeps the last good collection.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: RecordCollection,
    in_flight: usize,
    error: Option<String>,
    generation: u64,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// True while at least one started load has not finished.
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Number of successful replacements so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a load. Any error from an earlier attempt is cleared.
    pub fn begin_load(&mut self) {
        self.in_flight += 1;
        self.error = None;
    }

    pub fn complete_load(&mut self, records: RecordCollection) {
        self.records = records;
        self.error = None;
        self.in_flight = self.in_flight.saturating_sub(1);
        self.generation += 1;
    }

    pub fn fail_load(&mut self, err: &LoadError) {
        self.error = Some(err.user_message());
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}
