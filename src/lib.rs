//! Flowboard: status-transition and synchronization engine for a multi-user
//! task board.
//!
//! Work items are organised into team-scoped, ordered status columns. This
//! crate implements the core that makes moving tasks between columns feel
//! instant while staying consistent with an authoritative backend that is
//! mutated concurrently by other sessions and reached only through periodic
//! polling:
//!
//! - deriving ordered columns from a status vocabulary and a task snapshot,
//! - gating which transitions a user may perform,
//! - applying moves optimistically with compensating rollback, and
//! - reconciling local state against polled fetches without clobbering
//!   in-flight moves.
//!
//! # Architecture
//!
//! Flowboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the persistence collaborator
//! - **Adapters**: Concrete port implementations (in-memory backend)
//! - **Services**: The task store, optimistic mutator, and sync poller

pub mod board;
