//! Orchestration services for the board.
//!
//! The task store is the single shared mutable resource of the session. It
//! is mutated only by the optimistic mutator (apply, commit, roll back) and
//! the sync poller (merge), which share one in-flight-task exclusion rule so
//! neither clobbers the other.

mod mutator;
mod poller;
mod store;

pub use mutator::{MoveError, MoveEvent, MoveIntent, MoveOutcome, OptimisticMutator};
pub use poller::{PollOutcome, SyncPoller};
pub use store::{StoreError, TaskStore};
