//! Session cache of task entities with in-flight move tracking.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tokio::sync::watch;

use crate::board::domain::{StatusCode, Task, TaskId};

/// Errors returned by task store mutations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No task with the given identifier is held locally.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),

    /// A move for the task is already awaiting persistence.
    #[error("move already in flight for task: {0}")]
    MoveAlreadyInFlight(TaskId),
}

/// Authoritative-for-the-session cache of task entities.
///
/// Cloning yields another handle onto the same cache. Every task currently
/// inside an uncommitted move is marked in flight together with its pre-move
/// status; [`TaskStore::merge`] keeps the local value of in-flight tasks so a
/// poll response never clobbers an optimistic move, and rollback restores
/// the recorded pre-move status exactly.
///
/// Subscribers observe a revision counter that is bumped whenever the
/// visible snapshot changes; on a bump they re-read [`TaskStore::snapshot`]
/// and re-project.
#[derive(Debug, Clone)]
pub struct TaskStore {
    state: Arc<RwLock<StoreState>>,
    revision: Arc<watch::Sender<u64>>,
}

#[derive(Debug, Default)]
struct StoreState {
    tasks: HashMap<TaskId, Task>,
    in_flight: HashMap<TaskId, StatusCode>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            revision: Arc::new(revision),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    /// Subscribes to snapshot revisions. The receiver yields the current
    /// revision immediately and again after every visible change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Returns the current snapshot revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Inserts or replaces a task. Entry point for creation collaborators.
    pub fn insert(&self, task: Task) {
        let mut state = self.write_state();
        state.tasks.insert(task.id(), task);
        drop(state);
        self.bump_revision();
    }

    /// Returns a copy of the task, if held.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.read_state().tasks.get(&id).cloned()
    }

    /// Returns whether the task is held locally.
    #[must_use]
    pub fn contains(&self, id: TaskId) -> bool {
        self.read_state().tasks.contains_key(&id)
    }

    /// Returns the number of tasks held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_state().tasks.len()
    }

    /// Returns whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_state().tasks.is_empty()
    }

    /// Returns all held tasks ordered by creation time, then id.
    ///
    /// The stable ordering keeps projections deterministic across merges.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.read_state().tasks.values().cloned().collect();
        tasks.sort_by_key(|task| (task.created_at(), task.id()));
        tasks
    }

    /// Returns whether a move for the task is currently in flight.
    #[must_use]
    pub fn is_in_flight(&self, id: TaskId) -> bool {
        self.read_state().in_flight.contains_key(&id)
    }

    /// Returns how many tasks are currently in flight.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.read_state().in_flight.len()
    }

    /// Applies a move optimistically: records the current status as the
    /// rollback target, marks the task in flight, and sets the new status.
    ///
    /// Returns the pre-move status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownTask`] when the task is not held and
    /// [`StoreError::MoveAlreadyInFlight`] when an uncommitted move for it
    /// already exists.
    pub fn apply_optimistic(
        &self,
        id: TaskId,
        new_status: StatusCode,
    ) -> Result<StatusCode, StoreError> {
        let mut state = self.write_state();
        if state.in_flight.contains_key(&id) {
            return Err(StoreError::MoveAlreadyInFlight(id));
        }
        let task = state.tasks.get_mut(&id).ok_or(StoreError::UnknownTask(id))?;
        let prior = task.status().clone();
        task.set_status(new_status);
        state.in_flight.insert(id, prior.clone());
        drop(state);
        self.bump_revision();
        Ok(prior)
    }

    /// Confirms an optimistic move: the local value stands and the in-flight
    /// mark is cleared.
    ///
    /// Returns false when the task was deleted or never in flight; the
    /// commit is an id-addressed no-op in that case.
    pub fn commit(&self, id: TaskId) -> bool {
        let mut state = self.write_state();
        state.in_flight.remove(&id).is_some() && state.tasks.contains_key(&id)
    }

    /// Reverts an optimistic move to its recorded pre-move status and clears
    /// the in-flight mark.
    ///
    /// Returns the restored status, or `None` when the task was deleted or
    /// never in flight.
    pub fn roll_back(&self, id: TaskId) -> Option<StatusCode> {
        let mut state = self.write_state();
        let prior = state.in_flight.remove(&id)?;
        let task = state.tasks.get_mut(&id)?;
        task.set_status(prior.clone());
        drop(state);
        self.bump_revision();
        Some(prior)
    }

    /// Removes a task and clears any in-flight mark for it. Entry point for
    /// deletion collaborators; a persistence call already in flight for the
    /// id resolves as a no-op afterwards.
    pub fn remove(&self, id: TaskId) -> Option<Task> {
        let mut state = self.write_state();
        state.in_flight.remove(&id);
        let removed = state.tasks.remove(&id);
        drop(state);
        if removed.is_some() {
            self.bump_revision();
        }
        removed
    }

    /// Merges an authoritative fetch into the store.
    ///
    /// The fetched set is adopted wholesale: tasks not previously present
    /// are added, locally-held tasks absent from the fetch are removed, and
    /// fetched values replace local ones — except that every task currently
    /// in flight keeps its local value, whatever the fetch said about it.
    pub fn merge(&self, fetched: Vec<Task>) {
        let mut state = self.write_state();
        let mut adopted: HashMap<TaskId, Task> =
            fetched.into_iter().map(|task| (task.id(), task)).collect();
        for id in state.in_flight.keys() {
            if let Some(local) = state.tasks.get(id) {
                adopted.insert(*id, local.clone());
            }
        }
        state.tasks = adopted;
        drop(state);
        self.bump_revision();
    }
}
