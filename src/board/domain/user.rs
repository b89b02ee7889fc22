//! Board users, roles, and the permission gate.

use super::{ParseRoleError, StatusCode, Team, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Role a user holds on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full rights across every team and status.
    Admin,
    /// Team-scoped rights, restricted by allowed statuses.
    Manager,
    /// Team-scoped rights, restricted by allowed statuses.
    Employee,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "employee" => Ok(Self::Employee),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Board user with the inputs the permission gate needs.
///
/// Visibility is read-open: every column of the user's team is visible.
/// Write actions (creating a task in a column, moving a task into a column)
/// are restricted to the allowed-status set, which admins bypass entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    role: Role,
    team: Team,
    allowed_statuses: HashSet<StatusCode>,
}

impl User {
    /// Creates a user.
    #[must_use]
    pub fn new(
        id: UserId,
        role: Role,
        team: Team,
        allowed_statuses: impl IntoIterator<Item = StatusCode>,
    ) -> Self {
        Self {
            id,
            role,
            team,
            allowed_statuses: allowed_statuses.into_iter().collect(),
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the user's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the user's team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Returns the statuses the user may act on. Ignored for admins.
    #[must_use]
    pub const fn allowed_statuses(&self) -> &HashSet<StatusCode> {
        &self.allowed_statuses
    }

    /// Returns whether the user may see a column of the given team.
    ///
    /// Visibility is not gated by the allowed-status set; a user sees every
    /// column of their own team, and admins see all teams.
    #[must_use]
    pub fn can_view_column(&self, team: Team) -> bool {
        self.role == Role::Admin || team == self.team
    }

    /// Returns whether the user may act on the given status and team.
    ///
    /// Gates both creating a task in a column and moving a task into one.
    /// Admins may always act; everyone else needs the column to be on their
    /// own team and the status to be in their allowed set.
    #[must_use]
    pub fn can_act(&self, status: &StatusCode, team: Team) -> bool {
        if self.role == Role::Admin {
            return true;
        }
        team == self.team && self.allowed_statuses.contains(status)
    }
}
