//! Trailing-edge debounce scheduler.
//!
//! [`Debouncer::schedule`] arms a single timer carrying the latest value.
//! Scheduling again before the timer fires aborts the pending timer and
//! drops its value, so a burst of calls produces exactly one callback with
//! the last value, `delay` after the last call.
//!
//! Every arm takes a ticket from a shared generation counter. A timer only
//! fires if its ticket is still current when it wakes, which covers the
//! window where an abort arrives after the sleep already completed.
//!
//! Timers run as tokio tasks, so `schedule` must be called from within a
//! tokio runtime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

pub struct Debouncer<T> {
    delay: Duration,
    on_fire: Arc<dyn Fn(T) + Send + Sync>,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, on_fire: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            on_fire: Arc::new(on_fire),
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the timer with `value`, superseding any pending one.
    pub fn schedule(&self, value: T) {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let on_fire = Arc::clone(&self.on_fire);
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) == ticket {
                on_fire(value);
            }
        });

        if let Some(previous) = self.lock_pending().replace(handle) {
            previous.abort();
        }
    }

    /// Disarm the pending timer, if any.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = self.lock_pending().take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}
