//! Periodic reconciliation against the authoritative backend.
//!
//! There is no push channel: the poller refetches the active filter scope on
//! a fixed interval and merges the response into the task store. Every fetch
//! is tagged with a generation assigned at request time; a response whose
//! generation is not newer than the highest already applied is discarded, so
//! out-of-order completions and responses for an abandoned filter scope
//! never overwrite fresher state. That discard rule is load-bearing and must
//! survive even if a push transport ever replaces polling.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::board::domain::Task;
use crate::board::ports::{BackendError, BoardBackend, TaskFilters};
use crate::board::services::store::TaskStore;

/// Result of one poll attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The response was authoritative and merged into the store.
    Merged {
        /// Generation of the merged response.
        generation: u64,
        /// Number of tasks the fetch returned.
        task_count: usize,
    },
    /// The response was older than state already applied and was discarded.
    Stale {
        /// Generation of the discarded response.
        generation: u64,
    },
    /// A fetch was still in flight; this tick was skipped, not queued.
    Skipped,
    /// The filter scope changed while a debounced refetch was waiting.
    Invalidated,
}

/// Polls the backend for the active filter scope and merges responses.
///
/// At most one fetch is in flight per poller; a tick that fires while the
/// previous fetch is unresolved is skipped and the schedule continues from
/// the next tick. Cloning yields another handle onto the same poller state.
#[derive(Debug)]
pub struct SyncPoller<B> {
    store: TaskStore,
    backend: Arc<B>,
    interval: Duration,
    state: Arc<Mutex<PollerState>>,
}

impl<B> Clone for SyncPoller<B> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            backend: Arc::clone(&self.backend),
            interval: self.interval,
            state: Arc::clone(&self.state),
        }
    }
}

#[derive(Debug)]
struct PollerState {
    filters: TaskFilters,
    next_generation: u64,
    applied_generation: u64,
    filter_epoch: u64,
    fetch_in_flight: bool,
}

/// Clears the in-flight flag when a fetch resolves or is cancelled.
#[derive(Debug)]
struct FetchGuard {
    state: Arc<Mutex<PollerState>>,
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fetch_in_flight = false;
    }
}

/// One admitted fetch: its generation, the filter scope captured at request
/// time, and the guard releasing the single-fetch slot.
#[derive(Debug)]
struct PollTicket {
    generation: u64,
    filters: TaskFilters,
    _guard: FetchGuard,
}

impl<B> SyncPoller<B>
where
    B: BoardBackend,
{
    /// Creates a poller over the given store, backend, and schedule.
    #[must_use]
    pub fn new(store: TaskStore, backend: Arc<B>, interval: Duration, filters: TaskFilters) -> Self {
        Self {
            store,
            backend,
            interval,
            state: Arc::new(Mutex::new(PollerState {
                filters,
                next_generation: 0,
                applied_generation: 0,
                filter_epoch: 0,
                fetch_in_flight: false,
            })),
        }
    }

    /// Returns the store this poller merges into.
    #[must_use]
    pub const fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Returns the poll interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    fn lock_state(&self) -> MutexGuard<'_, PollerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the active filter scope.
    #[must_use]
    pub fn filters(&self) -> TaskFilters {
        self.lock_state().filters.clone()
    }

    /// Replaces the active filter scope.
    ///
    /// Pending debounced refetches are invalidated and every outstanding
    /// poll for the old scope becomes stale by generation, so its response
    /// is discarded on arrival. In-flight persistence calls for moves are
    /// unaffected; their commit or rollback applies by task id regardless.
    pub fn set_filters(&self, filters: TaskFilters) {
        let mut state = self.lock_state();
        state.filters = filters;
        state.filter_epoch += 1;
        state.applied_generation = state.next_generation;
    }

    /// Admits a fetch if none is in flight, assigning its generation.
    fn begin_poll(&self) -> Option<PollTicket> {
        let mut state = self.lock_state();
        if state.fetch_in_flight {
            return None;
        }
        state.fetch_in_flight = true;
        state.next_generation += 1;
        Some(PollTicket {
            generation: state.next_generation,
            filters: state.filters.clone(),
            _guard: FetchGuard {
                state: Arc::clone(&self.state),
            },
        })
    }

    /// Resolves a fetched response against the generation watermark.
    pub(crate) fn complete_poll(&self, generation: u64, tasks: Vec<Task>) -> PollOutcome {
        let mut state = self.lock_state();
        if generation <= state.applied_generation {
            debug!(
                generation,
                applied = state.applied_generation,
                "discarding stale poll response"
            );
            return PollOutcome::Stale { generation };
        }
        state.applied_generation = generation;
        drop(state);

        let task_count = tasks.len();
        self.store.merge(tasks);
        debug!(generation, task_count, "merged poll response");
        PollOutcome::Merged {
            generation,
            task_count,
        }
    }

    /// Fetches the active scope once and merges the response.
    ///
    /// Skips (without queueing) when the previous fetch is still unresolved.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the fetch fails; the store is left
    /// untouched and the schedule is expected to retry on its next tick.
    pub async fn poll_once(&self) -> Result<PollOutcome, BackendError> {
        let Some(ticket) = self.begin_poll() else {
            debug!("previous fetch still in flight; skipping poll");
            return Ok(PollOutcome::Skipped);
        };

        let fetched = self.backend.fetch_tasks(&ticket.filters).await;
        match fetched {
            Ok(tasks) => Ok(self.complete_poll(ticket.generation, tasks)),
            Err(err) => {
                warn!(generation = ticket.generation, error = %err, "poll fetch failed");
                Err(err)
            }
        }
    }

    /// Waits out a debounce, then polls unless the filter scope changed in
    /// the meantime.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the underlying poll fetch fails.
    pub async fn refetch_after(&self, debounce: Duration) -> Result<PollOutcome, BackendError> {
        let epoch = self.lock_state().filter_epoch;
        tokio::time::sleep(debounce).await;
        if self.lock_state().filter_epoch != epoch {
            debug!("debounced refetch invalidated by filter change");
            return Ok(PollOutcome::Invalidated);
        }
        self.poll_once().await
    }

    /// Runs the poll schedule until the shutdown signal flips to true.
    ///
    /// Fetch failures are logged and the schedule continues on the same
    /// interval indefinitely; no sync failure is fatal to the session.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.poll_once().await {
                        warn!(error = %err, "scheduled poll failed; retrying next tick");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }
}
