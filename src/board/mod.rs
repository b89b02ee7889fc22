//! Task board status transitions and client-side synchronization.
//!
//! This module implements the board engine: projecting team-scoped status
//! columns from the current task snapshot, validating move intents against
//! the permission model, applying accepted moves optimistically with
//! compensating rollback, and merging periodically polled authoritative
//! state into the session cache without losing in-flight moves. The module
//! follows hexagonal architecture:
//!
//! - Domain types and decision functions in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
