//! Synchronizer state and its single reducer.
//!
//! # Responsibility
//! - Hold the view state owned by the task synchronizer.
//! - Turn every input (intent, snapshot, remote completion) into a state
//!   change plus, at most, one remote command to run.
//!
//! # Invariants
//! - Snapshots replace the whole list, sorted by ascending `timestamp`.
//! - Completion toggles are patched locally only after remote confirmation.
//! - Closing the dialog always clears `editing_task`.
//! - After sign-out, late snapshots and completions are ignored.

use crate::backend::{RemoteError, RemoteResult};
use crate::model::task::{validate_title, Task, TaskId, TaskValidationError};
use thiserror::Error;

/// Whether the synchronizer is bound to a live user collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No user id was available at construction.
    Unauthenticated,
    Listening,
    SignedOut,
}

/// User-visible failures, rendered into `SyncState::error_message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("User not authenticated. Please log in.")]
    NotAuthenticated,
    #[error("User not authenticated for {0} task.")]
    NotAuthenticatedFor(&'static str),
    #[error(transparent)]
    Validation(#[from] TaskValidationError),
    #[error("Error listening for tasks: {0}")]
    Listen(RemoteError),
    #[error("Error adding task: {0}")]
    Add(RemoteError),
    #[error("Error updating task status: {0}")]
    Toggle(RemoteError),
    #[error("Error updating task: {0}")]
    Update(RemoteError),
    #[error("Error deleting task: {0}")]
    Delete(RemoteError),
}

/// Remote effect requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    Create(Task),
    SetCompleted { id: TaskId, is_completed: bool },
    Overwrite(Task),
    Delete(TaskId),
}

impl RemoteCommand {
    /// Short operation name for log lines.
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::SetCompleted { .. } => "set_completed",
            Self::Overwrite(_) => "overwrite",
            Self::Delete(_) => "delete",
        }
    }

    fn failure(&self, err: RemoteError) -> SyncError {
        match self {
            Self::Create(_) => SyncError::Add(err),
            Self::SetCompleted { .. } => SyncError::Toggle(err),
            Self::Overwrite(_) => SyncError::Update(err),
            Self::Delete(_) => SyncError::Delete(err),
        }
    }
}

/// Every input the synchronizer reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    SnapshotReceived(Vec<Task>),
    SubscriptionFailed(RemoteError),
    AddRequested {
        title: String,
        description: String,
        now_ms: i64,
    },
    ToggleRequested(Task),
    /// `None` opens the dialog in "new task" mode.
    EditRequested(Option<Task>),
    DialogVisibilityChanged(bool),
    UpdateRequested(Task),
    DeleteRequested(TaskId),
    LoggedOut,
    RemoteCompleted {
        command: RemoteCommand,
        result: RemoteResult<()>,
    },
}

/// Read-only snapshot published to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState {
    pub status: SyncStatus,
    pub is_loading: bool,
    pub error_message: Option<String>,
    /// Ordered by ascending `timestamp`.
    pub tasks: Vec<Task>,
    pub editing_task: Option<Task>,
    pub show_task_dialog: bool,
}

impl SyncState {
    /// Initial state when a user id is present and the feed is opening.
    pub fn listening() -> Self {
        Self {
            status: SyncStatus::Listening,
            is_loading: true,
            error_message: None,
            tasks: Vec::new(),
            editing_task: None,
            show_task_dialog: false,
        }
    }

    /// Initial state when construction found no signed-in user.
    pub fn unauthenticated() -> Self {
        Self {
            status: SyncStatus::Unauthenticated,
            is_loading: false,
            error_message: Some(SyncError::NotAuthenticated.to_string()),
            ..Self::listening()
        }
    }

    pub fn is_listening(&self) -> bool {
        self.status == SyncStatus::Listening
    }

    fn set_error(&mut self, err: SyncError) {
        self.error_message = Some(err.to_string());
    }

    fn reset_dialog(&mut self) {
        self.show_task_dialog = false;
        self.editing_task = None;
        self.error_message = None;
    }

    /// Starts a remote mutation, or records why it cannot start.
    fn begin(&mut self, purpose: &'static str, command: RemoteCommand) -> Option<RemoteCommand> {
        self.error_message = None;
        if !self.is_listening() {
            self.is_loading = false;
            self.set_error(SyncError::NotAuthenticatedFor(purpose));
            return None;
        }
        self.is_loading = true;
        Some(command)
    }
}

/// Applies one event and returns the remote command to dispatch, if any.
pub fn reduce(state: &mut SyncState, event: SyncEvent) -> Option<RemoteCommand> {
    match event {
        SyncEvent::SnapshotReceived(mut tasks) => {
            if !state.is_listening() {
                return None;
            }
            tasks.sort_by_key(|task| task.timestamp);
            state.is_loading = false;
            state.tasks = tasks;
            state.error_message = None;
            None
        }
        SyncEvent::SubscriptionFailed(err) => {
            if !state.is_listening() {
                return None;
            }
            state.is_loading = false;
            state.tasks.clear();
            state.set_error(SyncError::Listen(err));
            None
        }
        SyncEvent::AddRequested {
            title,
            description,
            now_ms,
        } => {
            if let Err(err) = validate_title(&title) {
                state.set_error(err.into());
                return None;
            }
            let draft = Task::draft(&title, &description, now_ms);
            state.begin("adding", RemoteCommand::Create(draft))
        }
        SyncEvent::ToggleRequested(task) => state.begin(
            "updating",
            RemoteCommand::SetCompleted {
                id: task.id,
                is_completed: !task.is_completed,
            },
        ),
        SyncEvent::EditRequested(task) => {
            state.editing_task = task;
            state.show_task_dialog = true;
            None
        }
        SyncEvent::DialogVisibilityChanged(show) => {
            state.show_task_dialog = show;
            if !show {
                state.editing_task = None;
            }
            None
        }
        SyncEvent::UpdateRequested(task) => {
            if let Err(err) = task.validate() {
                state.set_error(err.into());
                return None;
            }
            state.begin("updating", RemoteCommand::Overwrite(task))
        }
        SyncEvent::DeleteRequested(id) => state.begin("deleting", RemoteCommand::Delete(id)),
        SyncEvent::LoggedOut => {
            state.status = SyncStatus::SignedOut;
            state.tasks.clear();
            state.is_loading = false;
            state.reset_dialog();
            None
        }
        SyncEvent::RemoteCompleted { command, result } => {
            if state.status == SyncStatus::SignedOut {
                return None;
            }
            state.is_loading = false;
            match (command, result) {
                (RemoteCommand::Create(_) | RemoteCommand::Overwrite(_), Ok(())) => {
                    state.reset_dialog();
                }
                (RemoteCommand::SetCompleted { id, is_completed }, Ok(())) => {
                    for task in state.tasks.iter_mut().filter(|task| task.id == id) {
                        task.is_completed = is_completed;
                    }
                }
                (RemoteCommand::Delete(_), Ok(())) => {}
                (command, Err(err)) => state.set_error(command.failure(err)),
            }
            None
        }
    }
}
