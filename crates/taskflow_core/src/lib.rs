//! Core state and synchronization logic for TaskFlow.
//! This crate is the single source of truth for task and session invariants.

pub mod backend;
pub mod config;
pub mod db;
pub mod local;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;
pub mod view;

pub use backend::{
    AuthService, AuthUser, RemoteError, RemoteResult, SnapshotResult, TaskFieldUpdate, TaskStore,
    TaskSubscription,
};
pub use config::{ConfigError, CoreConfig};
pub use local::{LocalAuthService, LocalTaskStore};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::task::{now_epoch_ms, Task, TaskId, TaskValidationError, UserId};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::session::{SessionError, SessionManager, SessionPhase, SessionState};
pub use sync::{
    reduce, RemoteCommand, SyncError, SyncEvent, SyncState, SyncStatus, TaskSynchronizer,
    TaskSynchronizerHandle,
};
pub use view::{display_name, start_route, Route, TaskDialogView, TaskListView};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
