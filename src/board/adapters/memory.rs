//! In-memory backend for tests and local development.
//!
//! Implements the full filter and sort semantics of the backend port and
//! supports scripted failures so tests can drive rollback paths, plus a
//! recorded log of status-update calls so tests can assert that no network
//! call happened.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::board::domain::{StatusCode, StatusDefinition, Task, TaskId, Team};
use crate::board::ports::{BackendError, BackendResult, BoardBackend, SortBy, TaskFilters};

/// Thread-safe in-memory board backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoardBackend {
    state: Arc<RwLock<BackendState>>,
}

#[derive(Debug, Default)]
struct BackendState {
    tasks: HashMap<TaskId, Task>,
    vocabularies: HashMap<Team, Vec<StatusDefinition>>,
    fail_next_fetch: Option<BackendError>,
    fail_next_update: Option<BackendError>,
    fail_next_delete: Option<BackendError>,
    update_calls: Vec<(TaskId, StatusCode)>,
}

impl InMemoryBoardBackend {
    /// Creates an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a team's status vocabulary. Entries are kept ordered by position.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] when the backend state is
    /// unavailable.
    pub fn seed_vocabulary(
        &self,
        team: Team,
        mut definitions: Vec<StatusDefinition>,
    ) -> BackendResult<()> {
        definitions.sort_by_key(StatusDefinition::position);
        let mut state = write_state(&self.state)?;
        state.vocabularies.insert(team, definitions);
        Ok(())
    }

    /// Inserts or replaces a task.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] when the backend state is
    /// unavailable.
    pub fn upsert_task(&self, task: Task) -> BackendResult<()> {
        let mut state = write_state(&self.state)?;
        state.tasks.insert(task.id(), task);
        Ok(())
    }

    /// Returns the stored task, if present.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] when the backend state is
    /// unavailable.
    pub fn task(&self, id: TaskId) -> BackendResult<Option<Task>> {
        let state = read_state(&self.state)?;
        Ok(state.tasks.get(&id).cloned())
    }

    /// Scripts a failure for the next task fetch.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] when the backend state is
    /// unavailable.
    pub fn fail_next_fetch(&self, err: BackendError) -> BackendResult<()> {
        let mut state = write_state(&self.state)?;
        state.fail_next_fetch = Some(err);
        Ok(())
    }

    /// Scripts a failure for the next status update.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] when the backend state is
    /// unavailable.
    pub fn fail_next_update(&self, err: BackendError) -> BackendResult<()> {
        let mut state = write_state(&self.state)?;
        state.fail_next_update = Some(err);
        Ok(())
    }

    /// Scripts a failure for the next delete.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] when the backend state is
    /// unavailable.
    pub fn fail_next_delete(&self, err: BackendError) -> BackendResult<()> {
        let mut state = write_state(&self.state)?;
        state.fail_next_delete = Some(err);
        Ok(())
    }

    /// Returns every status-update call received so far, in order.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] when the backend state is
    /// unavailable.
    pub fn update_calls(&self) -> BackendResult<Vec<(TaskId, StatusCode)>> {
        let state = read_state(&self.state)?;
        Ok(state.update_calls.clone())
    }
}

fn read_state(
    state: &Arc<RwLock<BackendState>>,
) -> BackendResult<std::sync::RwLockReadGuard<'_, BackendState>> {
    state
        .read()
        .map_err(|err| BackendError::transport(std::io::Error::other(err.to_string())))
}

fn write_state(
    state: &Arc<RwLock<BackendState>>,
) -> BackendResult<std::sync::RwLockWriteGuard<'_, BackendState>> {
    state
        .write()
        .map_err(|err| BackendError::transport(std::io::Error::other(err.to_string())))
}

fn matches_filters(task: &Task, filters: &TaskFilters) -> bool {
    if task.team() != filters.team {
        return false;
    }
    if let Some(client_id) = filters.client_id {
        if task.client_id() != Some(client_id) {
            return false;
        }
    }
    if let Some(assignee_id) = filters.assignee_id {
        if task.assignee_id() != Some(assignee_id) {
            return false;
        }
    }
    if let Some(query) = filters.search_query.as_deref() {
        let needle = query.trim().to_lowercase();
        if !needle.is_empty() && !matches_search(task, &needle) {
            return false;
        }
    }
    true
}

fn matches_search(task: &Task, needle: &str) -> bool {
    task.title().to_lowercase().contains(needle)
        || task
            .description()
            .is_some_and(|description| description.to_lowercase().contains(needle))
}

fn sort_tasks(tasks: &mut [Task], sort_by: SortBy) {
    match sort_by {
        SortBy::CreatedDate => tasks.sort_by_key(|task| (task.created_at(), task.id())),
        SortBy::DueDate => tasks.sort_by_key(|task| {
            (
                task.due_date().is_none(),
                task.due_date(),
                task.created_at(),
                task.id(),
            )
        }),
        SortBy::Title => {
            tasks.sort_by(|a, b| {
                (a.title(), a.created_at(), a.id()).cmp(&(b.title(), b.created_at(), b.id()))
            });
        }
    }
}

#[async_trait]
impl BoardBackend for InMemoryBoardBackend {
    async fn fetch_tasks(&self, filters: &TaskFilters) -> BackendResult<Vec<Task>> {
        let mut state = write_state(&self.state)?;
        if let Some(err) = state.fail_next_fetch.take() {
            return Err(err);
        }
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| matches_filters(task, filters))
            .cloned()
            .collect();
        drop(state);
        sort_tasks(&mut tasks, filters.sort_by.unwrap_or_default());
        Ok(tasks)
    }

    async fn fetch_status_definitions(&self, team: Team) -> BackendResult<Vec<StatusDefinition>> {
        let state = read_state(&self.state)?;
        Ok(state.vocabularies.get(&team).cloned().unwrap_or_default())
    }

    async fn update_task_status(&self, id: TaskId, status: &StatusCode) -> BackendResult<()> {
        let mut state = write_state(&self.state)?;
        state.update_calls.push((id, status.clone()));
        if let Some(err) = state.fail_next_update.take() {
            return Err(err);
        }
        let task = state
            .tasks
            .get_mut(&id)
            .ok_or(BackendError::NotFound(id))?;
        task.set_status(status.clone());
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> BackendResult<()> {
        let mut state = write_state(&self.state)?;
        if let Some(err) = state.fail_next_delete.take() {
            return Err(err);
        }
        state
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(BackendError::NotFound(id))
    }
}
