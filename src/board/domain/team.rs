//! Team partition of the board.

use super::ParseTeamError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Partition of tasks, clients, and status vocabulary.
///
/// A task's team is immutable after creation; only its status changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    /// Creative production work.
    Creative,
    /// Web development work.
    Web,
}

impl Team {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Creative => "creative",
            Self::Web => "web",
        }
    }
}

impl TryFrom<&str> for Team {
    type Error = ParseTeamError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "creative" => Ok(Self::Creative),
            "web" => Ok(Self::Web),
            _ => Err(ParseTeamError(value.to_owned())),
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
