//! Task synchronization between the remote store and local view state.
//!
//! # Responsibility
//! - Keep the local task list consistent with the store's pushed snapshots.
//! - Run user mutations against the store and reflect their outcome.
//!
//! # Invariants
//! - All state changes go through `state::reduce`, one event at a time.
//! - The subscription is the only path back into the list, except the
//!   confirmed completion toggle.

pub mod state;
pub mod synchronizer;

pub use state::{reduce, RemoteCommand, SyncError, SyncEvent, SyncState, SyncStatus};
pub use synchronizer::{TaskSynchronizer, TaskSynchronizerHandle};
