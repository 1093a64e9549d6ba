//! Task list screen and add/edit dialog projections.

use crate::model::task::Task;
use crate::sync::state::SyncState;

const GUEST_NAME: &str = "Guest";

/// What the task list body shows.
///
/// Precedence: loading, then error, then empty, then the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskListView {
    Loading,
    Error(String),
    Empty,
    Tasks(Vec<Task>),
}

impl TaskListView {
    pub fn from_state(state: &SyncState) -> Self {
        if state.is_loading {
            return Self::Loading;
        }
        if let Some(message) = &state.error_message {
            return Self::Error(message.clone());
        }
        if state.tasks.is_empty() {
            return Self::Empty;
        }
        Self::Tasks(state.tasks.clone())
    }
}

/// Labels and prefilled fields for the add/edit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDialogView {
    pub heading: &'static str,
    pub confirm_label: &'static str,
    pub title: String,
    pub description: String,
    pub error_message: Option<String>,
}

impl TaskDialogView {
    /// `None` while the dialog is hidden.
    pub fn from_state(state: &SyncState) -> Option<Self> {
        if !state.show_task_dialog {
            return None;
        }
        let view = match &state.editing_task {
            Some(task) => Self {
                heading: "Edit Task",
                confirm_label: "Save Changes",
                title: task.title.clone(),
                description: task.description.clone(),
                error_message: state.error_message.clone(),
            },
            None => Self {
                heading: "Add New Task",
                confirm_label: "Add Task",
                title: String::new(),
                description: String::new(),
                error_message: state.error_message.clone(),
            },
        };
        Some(view)
    }
}

/// Short name for the drawer header: the part of the email before `@`.
pub fn display_name(email: Option<&str>) -> String {
    email
        .and_then(|email| email.split('@').next())
        .filter(|name| !name.is_empty())
        .unwrap_or(GUEST_NAME)
        .to_string()
}
