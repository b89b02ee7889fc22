//! Domain model for the task board.
//!
//! The board domain models tasks, team-scoped status vocabularies, derived
//! columns, the permission gate, and the transition decision function while
//! keeping all infrastructure concerns outside of the domain boundary.

mod column;
mod error;
mod ids;
mod status;
mod task;
mod team;
mod transition;
mod user;

pub use column::{Column, ColumnRef, all_visible, project};
pub use error::{BoardDomainError, ParseRoleError, ParseTeamError};
pub use ids::{ClientId, StatusCode, TaskId, UserId};
pub use status::StatusDefinition;
pub use task::{Task, TaskData, TaskSeed};
pub use team::Team;
pub use transition::{MoveDecision, RejectReason, validate};
pub use user::{Role, User};
