//! Port contracts for the board.
//!
//! Ports define infrastructure-agnostic interfaces used by board services.

pub mod backend;

pub use backend::{BackendError, BackendResult, BoardBackend, SortBy, TaskFilters};
