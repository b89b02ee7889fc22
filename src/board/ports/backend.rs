//! Backend port for task persistence, vocabulary lookup, and status updates.

use crate::board::domain::{ClientId, StatusCode, StatusDefinition, Task, TaskId, Team, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Sort order a backend applies to fetched tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Oldest task first. The default, matching the board's stable ordering.
    #[default]
    CreatedDate,
    /// Earliest due date first; tasks without one last.
    DueDate,
    /// Lexicographic by title.
    Title,
}

/// Filter scope for a task fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilters {
    /// Team whose tasks are fetched. Always present; the board is team-scoped.
    pub team: Team,
    /// Restrict to tasks billed against this client.
    pub client_id: Option<ClientId>,
    /// Restrict to tasks assigned to this user.
    pub assignee_id: Option<UserId>,
    /// Case-insensitive substring match over title and description.
    pub search_query: Option<String>,
    /// Sort order; backends default to creation date when absent.
    pub sort_by: Option<SortBy>,
}

impl TaskFilters {
    /// Creates a filter scope covering a whole team.
    #[must_use]
    pub const fn for_team(team: Team) -> Self {
        Self {
            team,
            client_id: None,
            assignee_id: None,
            search_query: None,
            sort_by: None,
        }
    }

    /// Restricts the scope to one client.
    #[must_use]
    pub const fn with_client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    /// Restricts the scope to one assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Restricts the scope by a search query.
    #[must_use]
    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub const fn with_sort(mut self, sort_by: SortBy) -> Self {
        self.sort_by = Some(sort_by);
        self
    }
}

/// Persistence collaborator contract.
///
/// Implementations are the authoritative source of tasks and status
/// vocabularies. The board never assumes a push channel exists; it reaches
/// the backend only through these request/response calls.
#[async_trait]
pub trait BoardBackend: Send + Sync {
    /// Fetches the tasks matching the given filter scope.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the fetch cannot be served.
    async fn fetch_tasks(&self, filters: &TaskFilters) -> BackendResult<Vec<Task>>;

    /// Fetches a team's status vocabulary, ordered by position.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the lookup cannot be served.
    async fn fetch_status_definitions(&self, team: Team) -> BackendResult<Vec<StatusDefinition>>;

    /// Persists a task's new status.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] when the task no longer exists,
    /// [`BackendError::Rejected`] when the server refuses the update, or
    /// [`BackendError::Transport`] on network failure.
    async fn update_task_status(&self, id: TaskId, status: &StatusCode) -> BackendResult<()>;

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] when the task no longer exists or
    /// [`BackendError::Transport`] on network failure.
    async fn delete_task(&self, id: TaskId) -> BackendResult<()>;
}

/// Errors returned by backend implementations.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The server refused the operation.
    #[error("server rejected operation: {0}")]
    Rejected(String),

    /// Network or transport failure.
    #[error("transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl BackendError {
    /// Wraps a transport error.
    #[must_use]
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
