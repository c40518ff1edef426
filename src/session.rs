//! Search session: the coordinator behind the search box.
//!
//! A [`SearchSession`] owns the [`SearchState`] (records, prefix index,
//! search term, filtered view, status) and applies the three events that
//! may change it:
//!
//! | Event | Transition |
//! |-------|-----------|
//! | record load completed | replace collection, rebuild index, re-run current term |
//! | record load failed | set error, keep collection |
//! | debounce timer fired | run the query engine for the debounced term |
//!
//! Each transition runs under one lock and is followed by publishing a
//! [`Snapshot`] on a `watch` channel, so subscribers never observe a
//! half-applied event.
//!
//! # Teardown
//!
//! Detached tasks (the startup load and debounce timers) hold only a weak
//! reference to the session state. After [`shutdown`](SearchSession::shutdown)
//! or drop, a late fetch completion or timer fire finds the state gone or
//! torn down and does nothing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use directory_search_core::models::{duplicate_ids, RecordCollection};
use directory_search_core::state::{SearchState, SessionStatus, Snapshot};
use directory_search_core::store::{LoadError, RecordSource};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::debounce::Debouncer;
use crate::source::HttpRecordSource;

struct Shared {
    state: Mutex<SearchState>,
    published: watch::Sender<Snapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply one transition and publish the result if it took effect.
    fn apply<F>(&self, transition: F) -> bool
    where
        F: FnOnce(&mut SearchState) -> bool,
    {
        let mut state = self.lock();
        let applied = transition(&mut state);
        if applied {
            self.published.send_replace(state.snapshot());
        }
        applied
    }
}

pub struct SearchSession {
    shared: Arc<Shared>,
    source: Arc<dyn RecordSource>,
    debouncer: Debouncer<String>,
}

impl SearchSession {
    /// Create an idle session. Nothing is loaded until
    /// [`load`](Self::load) or [`spawn_load`](Self::spawn_load) runs.
    pub fn new(source: Arc<dyn RecordSource>, debounce: Duration) -> Self {
        let (published, _) = watch::channel(Snapshot::default());
        let shared = Arc::new(Shared {
            state: Mutex::new(SearchState::new()),
            published,
        });

        let weak = Arc::downgrade(&shared);
        let debouncer = Debouncer::new(debounce, move |term: String| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let applied = shared.apply(|state| state.on_query_fired(&term));
            if applied {
                tracing::debug!(term = %term, results = shared.lock().view().len(), "debounced query fired");
            }
        });

        Self {
            shared,
            source,
            debouncer,
        }
    }

    /// Create a session and start the initial load in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(source: Arc<dyn RecordSource>, debounce: Duration) -> Self {
        let session = Self::new(source, debounce);
        session.spawn_load();
        session
    }

    /// Build an HTTP-backed session from configuration and start loading.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let source = HttpRecordSource::new(&config.source)?;
        Ok(Self::start(Arc::new(source), config.search.debounce()))
    }

    /// Fetch the records and apply the outcome. Resolves once the session
    /// state reflects the result. After shutdown no fetch is made.
    pub async fn load(&self) {
        if !self.shared.apply(SearchState::on_load_started) {
            return;
        }
        let result = fetch(self.source.as_ref()).await;
        finish_load(&Arc::downgrade(&self.shared), result);
    }

    /// Start a load on a detached task.
    ///
    /// The loading flag is raised before this returns. If the session is
    /// gone when the fetch completes, the result is discarded. After
    /// shutdown the returned task finishes without fetching.
    pub fn spawn_load(&self) -> JoinHandle<()> {
        if !self.shared.apply(SearchState::on_load_started) {
            tracing::debug!("session shut down, skipping load");
            return tokio::spawn(async {});
        }
        let weak = Arc::downgrade(&self.shared);
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            let result = fetch(source.as_ref()).await;
            finish_load(&weak, result);
        })
    }

    /// Input-change entry point.
    ///
    /// The term is stored immediately; the filtered view follows once the
    /// debounce interval passes without another call.
    pub fn set_search_term(&self, term: &str) {
        if self.shared.apply(|state| state.set_search_term(term)) {
            self.debouncer.schedule(term.to_string());
        }
    }

    /// Set the term and query right away, skipping the debounce interval.
    ///
    /// Any pending debounced query is cancelled so it cannot overwrite
    /// this result with an older term.
    pub fn submit(&self, term: &str) {
        self.debouncer.cancel();
        self.shared.apply(|state| state.set_search_term(term) && state.on_query_fired(term));
    }

    pub fn search_term(&self) -> String {
        self.shared.lock().search_term().to_string()
    }

    /// Records matching the most recently completed query.
    pub fn current_view(&self) -> RecordCollection {
        self.shared.lock().view().to_vec()
    }

    pub fn status(&self) -> SessionStatus {
        self.shared.lock().status()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.lock().snapshot()
    }

    /// Total records currently loaded.
    pub fn record_count(&self) -> usize {
        self.shared.lock().store().records().len()
    }

    /// Receive a fresh [`Snapshot`] after every applied event.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.published.subscribe()
    }

    /// Disarm the pending timer and make any in-flight load a no-op.
    pub fn shutdown(&self) {
        self.debouncer.cancel();
        self.shared.lock().tear_down();
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn fetch(source: &dyn RecordSource) -> Result<RecordCollection, LoadError> {
    let started = Instant::now();
    tracing::debug!(source = source.name(), "loading records");
    let result = source.fetch_all().await;
    tracing::debug!(
        source = source.name(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        ok = result.is_ok(),
        "record fetch finished"
    );
    result
}

fn finish_load(weak: &Weak<Shared>, result: Result<RecordCollection, LoadError>) {
    let Some(shared) = weak.upgrade() else {
        tracing::debug!("session dropped before load finished, discarding result");
        return;
    };

    match result {
        Ok(records) => {
            let dups = duplicate_ids(&records);
            if !dups.is_empty() {
                tracing::warn!(ids = ?dups, "source returned duplicate record ids");
            }
            let count = records.len();
            if shared.apply(|state| state.on_load_completed(records)) {
                let state = shared.lock();
                tracing::info!(
                    records = count,
                    prefixes = state.index().len(),
                    results = state.view().len(),
                    "records loaded, index rebuilt"
                );
            }
        }
        Err(err) => {
            if shared.apply(|state| state.on_load_failed(&err)) {
                tracing::warn!(kind = ?err.kind(), error = %err, "record load failed");
            }
        }
    }
}
