//! Contracts for the remote auth service and document store.
//!
//! # Responsibility
//! - Describe the capability surface the state holders depend on.
//! - Keep transport and vendor details outside core logic.
//!
//! # Invariants
//! - Remote failures surface as `RemoteError` carrying the service message verbatim.
//! - Store calls are always scoped to one user collection (`users/{uid}/tasks`).

pub mod auth;
pub mod store;
pub mod subscription;

use thiserror::Error;

pub use auth::{AuthService, AuthUser};
pub use store::{collection_path, TaskFieldUpdate, TaskStore};
pub use subscription::{SnapshotResult, SnapshotSender, TaskSubscription};

/// Failure reported by a remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;
