//! Move decision function: may this user move this task to that column?

use super::{ColumnRef, StatusCode, Task, User};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a proposed move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The destination column belongs to a different team than the task.
    CrossTeam,
    /// The user may not act on the destination status.
    PermissionDenied,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrossTeam => f.write_str("cross-team move"),
            Self::PermissionDenied => f.write_str("permission denied"),
        }
    }
}

/// Outcome of validating a proposed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveDecision {
    /// The move is allowed and changes the task's status to the given code.
    Apply(StatusCode),
    /// The destination matches the current status; nothing to do. Callers
    /// treat this as a no-op: no mutation, no network call.
    NoChange,
    /// The move is not allowed.
    Reject(RejectReason),
}

/// Decides whether `user` may move `task` into `destination`.
///
/// Rules are evaluated in order and the first match wins:
///
/// 1. Destination on a different team than the task: [`RejectReason::CrossTeam`].
/// 2. User may not act on the destination status: [`RejectReason::PermissionDenied`].
/// 3. Destination equals the current status: [`MoveDecision::NoChange`].
/// 4. Otherwise the move applies the destination status.
///
/// Pure and side-effect free; the decision is fully determined by its inputs.
#[must_use]
pub fn validate(task: &Task, destination: &ColumnRef, user: &User) -> MoveDecision {
    if task.team() != destination.team() {
        return MoveDecision::Reject(RejectReason::CrossTeam);
    }
    if !user.can_act(destination.status(), destination.team()) {
        return MoveDecision::Reject(RejectReason::PermissionDenied);
    }
    if task.status() == destination.status() {
        return MoveDecision::NoChange;
    }
    MoveDecision::Apply(destination.status().clone())
}
