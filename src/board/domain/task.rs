//! Task aggregate root.

use super::{BoardDomainError, ClientId, StatusCode, TaskId, Team, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Work item on the board.
///
/// The team is fixed at creation; only the status moves a task between
/// columns, and status mutation happens exclusively through the task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: Option<String>,
    team: Team,
    status: StatusCode,
    assignee_id: Option<UserId>,
    client_id: Option<ClientId>,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// Parameter object for creating a fresh task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSeed {
    /// Task title; must not be empty after trimming.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Team the task belongs to, immutable afterwards.
    pub team: Team,
    /// Initial status within the team's vocabulary.
    pub status: StatusCode,
    /// Assigned user, if any.
    pub assignee_id: Option<UserId>,
    /// Client the task is billed against, if any.
    pub client_id: Option<ClientId>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskSeed {
    /// Creates a seed with the required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, team: Team, status: StatusCode) -> Self {
        Self {
            title: title.into(),
            description: None,
            team,
            status,
            assignee_id: None,
            client_id: None,
            due_date: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Sets the client.
    #[must_use]
    pub const fn with_client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted team.
    pub team: Team,
    /// Persisted status code.
    pub status: StatusCode,
    /// Persisted assignee, if any.
    pub assignee_id: Option<UserId>,
    /// Persisted client, if any.
    pub client_id: Option<ClientId>,
    /// Persisted due date, if any.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task stamped with the current clock time.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyTaskTitle`] when the seed title is
    /// empty after trimming.
    pub fn new(seed: TaskSeed, clock: &impl Clock) -> Result<Self, BoardDomainError> {
        let title = seed.title.trim().to_owned();
        if title.is_empty() {
            return Err(BoardDomainError::EmptyTaskTitle);
        }
        Ok(Self {
            id: TaskId::new(),
            title,
            description: seed.description,
            team: seed.team,
            status: seed.status,
            assignee_id: seed.assignee_id,
            client_id: seed.client_id,
            due_date: seed.due_date,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_data(data: TaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            team: data.team,
            status: data.status,
            assignee_id: data.assignee_id,
            client_id: data.client_id,
            due_date: data.due_date,
            created_at: data.created_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the team the task belongs to.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Returns the current status code.
    #[must_use]
    pub const fn status(&self) -> &StatusCode {
        &self.status
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee_id(&self) -> Option<UserId> {
        self.assignee_id
    }

    /// Returns the client, if any.
    #[must_use]
    pub const fn client_id(&self) -> Option<ClientId> {
        self.client_id
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the creation timestamp, the stable-ordering key.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replaces the status code. Only the task store calls this.
    pub(crate) fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }
}
