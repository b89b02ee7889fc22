//! Optimistic move orchestration.
//!
//! A move runs through a per-task state machine: Idle, Validating,
//! OptimisticallyApplied, Persisting, then Committed or RolledBack and back
//! to Idle. The local status flips before the backend confirms, so the next
//! projection reflects the move immediately; a persistence failure restores
//! the exact pre-move status. Moves on the same task are serialized through
//! the store's in-flight mark, moves on different tasks interleave freely.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::board::domain::{
    ColumnRef, MoveDecision, RejectReason, StatusCode, TaskId, User, validate,
};
use crate::board::ports::{BackendError, BoardBackend};
use crate::board::services::store::{StoreError, TaskStore};

/// Capacity of the move-event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A request to move one task into one column.
///
/// Intents are abstract: pointer drags, keyboard commands, and programmatic
/// calls all reduce to the same triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveIntent {
    /// Task to move.
    pub task_id: TaskId,
    /// Destination column.
    pub destination: ColumnRef,
    /// User performing the move.
    pub user: User,
}

impl MoveIntent {
    /// Creates a move intent.
    #[must_use]
    pub const fn new(task_id: TaskId, destination: ColumnRef, user: User) -> Self {
        Self {
            task_id,
            destination,
            user,
        }
    }
}

/// Observable state changes emitted while a move is processed.
#[derive(Debug, Clone)]
pub enum MoveEvent {
    /// The intent entered validation.
    Validating {
        /// Task being validated.
        task_id: TaskId,
    },
    /// The intent was queued behind an in-flight move for the same task.
    Queued {
        /// Task the intent waits on.
        task_id: TaskId,
    },
    /// Validation rejected the intent; nothing was mutated or sent.
    Rejected {
        /// Task that stayed put.
        task_id: TaskId,
        /// Why the move was rejected.
        reason: RejectReason,
    },
    /// The new status was applied locally, ahead of confirmation.
    Applied {
        /// Task that moved.
        task_id: TaskId,
        /// Status applied optimistically.
        status: StatusCode,
    },
    /// The backend confirmed the move; the local value stands.
    Committed {
        /// Task that moved.
        task_id: TaskId,
        /// Confirmed status.
        status: StatusCode,
    },
    /// Persistence failed; the pre-move status was restored.
    RolledBack {
        /// Task that was reverted.
        task_id: TaskId,
        /// The persistence failure.
        reason: BackendError,
        /// Status the task reverted to.
        restored: StatusCode,
    },
}

/// Final outcome of a move request, as seen by the caller.
#[derive(Debug, Clone)]
pub enum MoveOutcome {
    /// Queued behind an in-flight move; the eventual result is observable
    /// through move events.
    Queued,
    /// Rejected synchronously; no mutation, no network call.
    Rejected(RejectReason),
    /// Destination equals the current status; treated as a no-op.
    NoChange,
    /// Applied and confirmed with the given status.
    Committed(StatusCode),
    /// Applied, then reverted after a persistence failure. Retryable by a
    /// fresh intent.
    RolledBack(BackendError),
}

/// Errors returned by move requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoveError {
    /// The intent names a task the store does not hold.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),

    /// The store refused the mutation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestrates moves: validate, apply locally, persist, commit or roll back.
///
/// Cloning yields another handle onto the same machine.
#[derive(Debug)]
pub struct OptimisticMutator<B> {
    store: TaskStore,
    backend: Arc<B>,
    queued: Arc<Mutex<HashMap<TaskId, MoveIntent>>>,
    events: broadcast::Sender<MoveEvent>,
}

impl<B> Clone for OptimisticMutator<B> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            backend: Arc::clone(&self.backend),
            queued: Arc::clone(&self.queued),
            events: self.events.clone(),
        }
    }
}

impl<B> OptimisticMutator<B>
where
    B: BoardBackend,
{
    /// Creates a mutator over the given store and backend.
    #[must_use]
    pub fn new(store: TaskStore, backend: Arc<B>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            backend,
            queued: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }

    /// Returns the store this mutator operates on.
    #[must_use]
    pub const fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Subscribes to move events.
    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<MoveEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: MoveEvent) {
        // Send only fails when nobody subscribes, which is fine.
        self.events.send(event).ok();
    }

    fn queue_intent(&self, intent: MoveIntent) {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(intent.task_id, intent);
    }

    fn take_queued(&self, task_id: TaskId) -> Option<MoveIntent> {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&task_id)
    }

    /// Entry point of the move state machine.
    ///
    /// If another move for the same task is awaiting persistence, the intent
    /// is queued — one slot per task, the latest intent wins — and
    /// re-validated against the then-current local state once the in-flight
    /// move resolves. Rapid re-drags of the same card therefore never lose
    /// an update; moves on different tasks proceed independently.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::UnknownTask`] when the intent names a task the
    /// store does not hold.
    pub async fn request_move(&self, intent: MoveIntent) -> Result<MoveOutcome, MoveError> {
        let task_id = intent.task_id;
        if self.store.is_in_flight(task_id) {
            self.queue_intent(intent);
            self.emit(MoveEvent::Queued { task_id });
            return Ok(MoveOutcome::Queued);
        }

        let outcome = self.process(intent).await?;
        self.drain_queued(task_id).await;
        Ok(outcome)
    }

    /// Deletes a task: removed from the store immediately, any queued intent
    /// for it dropped, then the backend delete issued. A persistence call
    /// already in flight for the id resolves as an id-addressed no-op.
    ///
    /// A backend failure is surfaced but does not resurrect the task; the
    /// next poll reconciles whichever side won.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the backend rejects the delete.
    pub async fn delete_task(&self, task_id: TaskId) -> Result<(), BackendError> {
        if self.take_queued(task_id).is_some() {
            debug!(%task_id, "dropped queued move intent for deleted task");
        }
        self.store.remove(task_id);
        self.backend.delete_task(task_id).await
    }

    async fn process(&self, intent: MoveIntent) -> Result<MoveOutcome, MoveError> {
        let MoveIntent {
            task_id,
            destination,
            user,
        } = intent;
        self.emit(MoveEvent::Validating { task_id });
        let task = self
            .store
            .get(task_id)
            .ok_or(MoveError::UnknownTask(task_id))?;

        match validate(&task, &destination, &user) {
            MoveDecision::Reject(reason) => {
                debug!(%task_id, %reason, "move rejected");
                self.emit(MoveEvent::Rejected { task_id, reason });
                Ok(MoveOutcome::Rejected(reason))
            }
            MoveDecision::NoChange => Ok(MoveOutcome::NoChange),
            MoveDecision::Apply(new_status) => self.persist(task_id, new_status).await,
        }
    }

    async fn persist(
        &self,
        task_id: TaskId,
        new_status: StatusCode,
    ) -> Result<MoveOutcome, MoveError> {
        self.store.apply_optimistic(task_id, new_status.clone())?;
        self.emit(MoveEvent::Applied {
            task_id,
            status: new_status.clone(),
        });

        match self.backend.update_task_status(task_id, &new_status).await {
            Ok(()) => {
                if self.store.commit(task_id) {
                    self.emit(MoveEvent::Committed {
                        task_id,
                        status: new_status.clone(),
                    });
                }
                Ok(MoveOutcome::Committed(new_status))
            }
            Err(err) => {
                warn!(%task_id, error = %err, "status update failed; rolling back");
                if let Some(restored) = self.store.roll_back(task_id) {
                    self.emit(MoveEvent::RolledBack {
                        task_id,
                        reason: err.clone(),
                        restored,
                    });
                }
                Ok(MoveOutcome::RolledBack(err))
            }
        }
    }

    async fn drain_queued(&self, task_id: TaskId) {
        while let Some(intent) = self.take_queued(task_id) {
            match self.process(intent).await {
                Ok(_) => {}
                Err(err) => {
                    debug!(%task_id, error = %err, "queued move intent dropped");
                }
            }
        }
    }
}
