//! Error types for board domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain board values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The status code is empty after trimming.
    #[error("status code must not be empty")]
    EmptyStatusCode,

    /// The status display name is empty after trimming.
    #[error("status name must not be empty")]
    EmptyStatusName,

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,
}

/// Error returned while parsing team identifiers from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown team: {0}")]
pub struct ParseTeamError(pub String);

/// Error returned while parsing user roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
