//! Derived columns and the board projection.

use super::{StatusCode, StatusDefinition, Task, Team};
use tracing::warn;

/// Identifies a column as a move destination: one status within one team.
///
/// Move intents carry a `ColumnRef` rather than anything produced by a drag
/// or pointer library, so the transition engine is agnostic to how the
/// intent was produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    team: Team,
    status: StatusCode,
}

impl ColumnRef {
    /// Creates a column reference.
    #[must_use]
    pub const fn new(team: Team, status: StatusCode) -> Self {
        Self { team, status }
    }

    /// Returns the column's team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Returns the column's status code.
    #[must_use]
    pub const fn status(&self) -> &StatusCode {
        &self.status
    }
}

impl From<&StatusDefinition> for ColumnRef {
    fn from(def: &StatusDefinition) -> Self {
        Self::new(def.team(), def.code().clone())
    }
}

/// Derived grouping of same-status tasks within one team. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    definition: StatusDefinition,
    tasks: Vec<Task>,
}

impl Column {
    /// Returns the vocabulary entry that defines this column.
    #[must_use]
    pub const fn definition(&self) -> &StatusDefinition {
        &self.definition
    }

    /// Returns a reference identifying this column as a move destination.
    #[must_use]
    pub fn column_ref(&self) -> ColumnRef {
        ColumnRef::from(&self.definition)
    }

    /// Returns the tasks in this column, in snapshot order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the number of tasks in this column.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tasks.len()
    }
}

/// Permission filter that keeps every column visible. The default view gate.
#[must_use]
pub const fn all_visible(_status: &StatusCode) -> bool {
    true
}

/// Projects the task snapshot onto ordered columns.
///
/// `status_defs` arrive ordered by position and scoped to one team; `tasks`
/// are pre-filtered to the same team. A column is built for every vocabulary
/// entry passing `permission_filter`, holding the tasks whose status matches
/// its code in the relative order they appear in the input. Tasks whose
/// status matches no vocabulary entry are excluded and logged as a
/// data-integrity warning.
///
/// Pure and deterministic: identical inputs yield an identical output, so
/// callers can skip re-renders by comparing projections for equality. An
/// empty vocabulary yields an empty projection.
#[must_use]
pub fn project<F>(status_defs: &[StatusDefinition], tasks: &[Task], permission_filter: F) -> Vec<Column>
where
    F: Fn(&StatusCode) -> bool,
{
    let mut columns: Vec<Column> = status_defs
        .iter()
        .filter(|def| permission_filter(def.code()))
        .map(|def| Column {
            definition: def.clone(),
            tasks: Vec::new(),
        })
        .collect();

    for task in tasks {
        let in_vocabulary = status_defs.iter().any(|def| def.code() == task.status());
        if !in_vocabulary {
            warn!(
                task_id = %task.id(),
                status = %task.status(),
                team = %task.team(),
                "task status missing from team vocabulary; excluded from projection"
            );
            continue;
        }
        if let Some(column) = columns
            .iter_mut()
            .find(|column| column.definition.code() == task.status())
        {
            column.tasks.push(task.clone());
        }
    }

    columns
}
