//! Session-level tests: load/query coordination, debouncing, and teardown.
//!
//! All tests run on a paused tokio clock, so debounce intervals elapse
//! instantly and deterministically.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use directory_search::session::SearchSession;
use directory_search_core::models::{Record, RecordCollection, RecordId};
use directory_search_core::store::memory::InMemorySource;
use directory_search_core::store::{LoadError, RecordSource};
use tokio::sync::{Notify, Semaphore};
use tokio::time::sleep;

const DEBOUNCE: Duration = Duration::from_millis(300);

fn directory() -> RecordCollection {
    vec![
        Record::new(1, "Leanne Graham", "Bret", "Sincere@april.biz", "Romaguera-Crona"),
        Record::new(2, "Ervin Howell", "Antonette", "Shanna@melissa.tv", "Deckow-Crist"),
    ]
}

fn ids(records: &[Record]) -> Vec<RecordId> {
    records.iter().map(|r| r.id).collect()
}

// ─── Test Sources ───────────────────────────────────────────────────

/// Holds the fetch open until the test releases the gate.
struct GatedSource {
    gate: Arc<Notify>,
    records: RecordCollection,
}

#[async_trait]
impl RecordSource for GatedSource {
    fn name(&self) -> &str {
        "gated"
    }

    async fn fetch_all(&self) -> Result<RecordCollection, LoadError> {
        self.gate.notified().await;
        Ok(self.records.clone())
    }
}

/// Each fetch waits for its own permit, so concurrent loads finish one at
/// a time as the test hands permits out.
struct ThrottledSource {
    permits: Arc<Semaphore>,
    records: RecordCollection,
}

#[async_trait]
impl RecordSource for ThrottledSource {
    fn name(&self) -> &str {
        "throttled"
    }

    async fn fetch_all(&self) -> Result<RecordCollection, LoadError> {
        self.permits
            .acquire()
            .await
            .map_err(|e| LoadError::Fetch {
                message: e.to_string(),
            })?
            .forget();
        Ok(self.records.clone())
    }
}

/// First fetch fails with a 500; later fetches wait for the gate.
struct FailsOnceSource {
    gate: Arc<Notify>,
    failed: AtomicBool,
}

#[async_trait]
impl RecordSource for FailsOnceSource {
    fn name(&self) -> &str {
        "fails-once"
    }

    async fn fetch_all(&self) -> Result<RecordCollection, LoadError> {
        if !self.failed.swap(true, Ordering::SeqCst) {
            return Err(LoadError::Status { status: 500 });
        }
        self.gate.notified().await;
        Ok(directory())
    }
}

/// Replays a fixed sequence of outcomes, one per fetch.
struct ScriptedSource {
    outcomes: Mutex<VecDeque<Result<RecordCollection, LoadError>>>,
}

impl ScriptedSource {
    fn new(outcomes: Vec<Result<RecordCollection, LoadError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
        }
    }
}

#[async_trait]
impl RecordSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_all(&self) -> Result<RecordCollection, LoadError> {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LoadError::Fetch {
                message: "script exhausted".to_string(),
            }))
    }
}

async fn loaded() -> SearchSession {
    let session = SearchSession::new(Arc::new(InMemorySource::new(directory())), DEBOUNCE);
    session.load().await;
    session
}

// ─── Loading ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn start_loads_in_background() {
    let source = Arc::new(InMemorySource::new(directory()));
    let session = SearchSession::start(source.clone(), DEBOUNCE);
    assert!(session.status().loading);
    assert!(session.current_view().is_empty());

    sleep(Duration::from_millis(1)).await;
    let status = session.status();
    assert!(!status.loading);
    assert_eq!(status.error, None);
    assert_eq!(status.result_count, 2);
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn late_load_reapplies_current_term() {
    let gate = Arc::new(Notify::new());
    let mut records = directory();
    records[1] = Record::new(3, "Clementine Bauch", "Samantha", "Nathan@yesenia.net", "Abernathy Group");
    let session = SearchSession::new(
        Arc::new(GatedSource {
            gate: gate.clone(),
            records,
        }),
        DEBOUNCE,
    );

    let handle = session.spawn_load();
    session.set_search_term("ab");
    assert_eq!(session.search_term(), "ab");
    assert!(session.status().loading);
    assert!(session.current_view().is_empty());

    gate.notify_one();
    handle.await.unwrap();

    assert!(!session.status().loading);
    assert_eq!(ids(&session.current_view()), vec![3]);
}

#[tokio::test(start_paused = true)]
async fn failed_reload_keeps_previous_collection() {
    let source = ScriptedSource::new(vec![Ok(directory()), Err(LoadError::Status { status: 500 })]);
    let session = SearchSession::new(Arc::new(source), DEBOUNCE);

    session.load().await;
    assert_eq!(session.record_count(), 2);

    session.load().await;
    let status = session.status();
    assert!(!status.loading);
    assert_eq!(status.error.as_deref(), Some("Network response was not ok: 500"));
    assert_eq!(session.record_count(), 2);
    assert_eq!(status.result_count, 2);
}

#[tokio::test(start_paused = true)]
async fn successful_reload_clears_error() {
    let source = ScriptedSource::new(vec![
        Err(LoadError::Fetch {
            message: "connection reset".to_string(),
        }),
        Ok(directory()),
    ]);
    let session = SearchSession::new(Arc::new(source), DEBOUNCE);

    session.load().await;
    assert_eq!(session.status().error.as_deref(), Some("connection reset"));
    assert!(session.current_view().is_empty());

    session.load().await;
    assert_eq!(session.status().error, None);
    assert_eq!(session.current_view().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn first_load_decode_failure() {
    let source = InMemorySource::failing(LoadError::Decode {
        message: "Invalid records payload: expected a sequence".to_string(),
    });
    let session = SearchSession::new(Arc::new(source), DEBOUNCE);
    session.load().await;

    let status = session.status();
    assert!(!status.loading);
    assert!(status.error.unwrap().starts_with("Invalid records payload"));
    assert_eq!(status.result_count, 0);
}

#[tokio::test(start_paused = true)]
async fn overlapping_loads_keep_loading_until_both_finish() {
    let permits = Arc::new(Semaphore::new(0));
    let session = SearchSession::new(
        Arc::new(ThrottledSource {
            permits: permits.clone(),
            records: directory(),
        }),
        DEBOUNCE,
    );

    let first = session.spawn_load();
    let second = session.spawn_load();
    sleep(Duration::from_millis(1)).await;
    assert!(session.status().loading);

    permits.add_permits(1);
    sleep(Duration::from_millis(1)).await;
    assert_eq!(session.record_count(), 2);
    assert!(session.status().loading, "one fetch is still outstanding");

    permits.add_permits(1);
    first.await.unwrap();
    second.await.unwrap();
    let status = session.status();
    assert!(!status.loading);
    assert_eq!(status.result_count, 2);
}

#[tokio::test(start_paused = true)]
async fn reload_clears_error_while_in_flight() {
    let gate = Arc::new(Notify::new());
    let session = SearchSession::new(
        Arc::new(FailsOnceSource {
            gate: gate.clone(),
            failed: AtomicBool::new(false),
        }),
        DEBOUNCE,
    );
    session.load().await;
    assert_eq!(
        session.status().error.as_deref(),
        Some("Network response was not ok: 500")
    );

    let handle = session.spawn_load();
    let status = session.status();
    assert!(status.loading);
    assert_eq!(status.error, None);

    gate.notify_one();
    handle.await.unwrap();
    assert_eq!(session.status().error, None);
    assert_eq!(session.record_count(), 2);
}

// ─── Debounced Queries ──────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn burst_updates_view_once_after_quiescence() {
    let session = loaded().await;
    let mut updates = session.subscribe();

    session.set_search_term("l");
    session.set_search_term("le");
    session.set_search_term("lea");
    assert_eq!(session.search_term(), "lea");
    assert_eq!(session.current_view().len(), 2);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(session.current_view().len(), 2);

    sleep(Duration::from_millis(150)).await;
    assert_eq!(ids(&session.current_view()), vec![1]);

    assert!(updates.has_changed().unwrap());
    let snapshot = updates.borrow_and_update().clone();
    assert_eq!(snapshot.search_term, "lea");
    assert_eq!(ids(&snapshot.results), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn multi_word_term_intersects() {
    let session = loaded().await;
    session.set_search_term("ervin  how");
    sleep(Duration::from_millis(301)).await;
    assert_eq!(ids(&session.current_view()), vec![2]);

    session.set_search_term("ervin graham");
    sleep(Duration::from_millis(301)).await;
    assert!(session.current_view().is_empty());

    session.set_search_term("   ");
    sleep(Duration::from_millis(301)).await;
    assert_eq!(session.current_view().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn hyphenated_company_is_one_token() {
    let session = loaded().await;
    session.set_search_term("cr");
    sleep(Duration::from_millis(301)).await;
    assert!(session.current_view().is_empty());
    assert_eq!(session.status().error, None);
}

#[tokio::test(start_paused = true)]
async fn submit_skips_debounce_and_cancels_pending() {
    let session = loaded().await;
    session.set_search_term("ervin");
    session.submit("bret");
    assert_eq!(ids(&session.current_view()), vec![1]);
    assert_eq!(session.search_term(), "bret");

    sleep(Duration::from_millis(500)).await;
    assert_eq!(ids(&session.current_view()), vec![1]);
}

// ─── Teardown ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn shutdown_discards_pending_query() {
    let session = loaded().await;
    session.set_search_term("bret");
    session.shutdown();

    sleep(Duration::from_millis(500)).await;
    assert_eq!(session.current_view().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn shutdown_ignores_late_load() {
    let gate = Arc::new(Notify::new());
    let session = SearchSession::new(
        Arc::new(GatedSource {
            gate: gate.clone(),
            records: directory(),
        }),
        DEBOUNCE,
    );
    let handle = session.spawn_load();
    session.shutdown();

    gate.notify_one();
    handle.await.unwrap();
    assert_eq!(session.record_count(), 0);
    assert!(session.current_view().is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_skips_fetch() {
    let source = Arc::new(InMemorySource::new(directory()));
    let session = SearchSession::new(source.clone(), DEBOUNCE);
    session.shutdown();

    session.load().await;
    session.spawn_load().await.unwrap();
    assert_eq!(source.calls(), 0);
    assert!(!session.status().loading);
    assert_eq!(session.record_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropped_session_ignores_late_load() {
    let gate = Arc::new(Notify::new());
    let source = Arc::new(GatedSource {
        gate: gate.clone(),
        records: directory(),
    });
    let session = SearchSession::new(source.clone(), DEBOUNCE);
    let mut updates = session.subscribe();
    let handle = session.spawn_load();
    session.set_search_term("bret");
    assert_eq!(updates.borrow_and_update().search_term, "bret");
    drop(session);

    gate.notify_one();
    handle.await.unwrap();
    sleep(Duration::from_millis(500)).await;

    assert!(updates.has_changed().is_err(), "session state should be gone");
    assert!(updates.borrow().results.is_empty());
    assert!(updates.borrow().loading);
    assert_eq!(Arc::strong_count(&source), 1);
}
