//! Team-scoped status vocabulary entries.

use super::{BoardDomainError, StatusCode, Team};
use serde::{Deserialize, Serialize};

/// One entry in a team's ordered status vocabulary.
///
/// The position defines column order on the board; codes are unique within
/// a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDefinition {
    code: StatusCode,
    team: Team,
    name: String,
    color: String,
    position: u32,
}

impl StatusDefinition {
    /// Creates a validated status definition.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyStatusName`] when the display name is
    /// empty after trimming.
    pub fn new(
        code: StatusCode,
        team: Team,
        name: impl Into<String>,
        color: impl Into<String>,
        position: u32,
    ) -> Result<Self, BoardDomainError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(BoardDomainError::EmptyStatusName);
        }
        Ok(Self {
            code,
            team,
            name,
            color: color.into(),
            position,
        })
    }

    /// Returns the status code.
    #[must_use]
    pub const fn code(&self) -> &StatusCode {
        &self.code
    }

    /// Returns the team the vocabulary entry belongs to.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display color.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Returns the column-ordering position.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }
}
