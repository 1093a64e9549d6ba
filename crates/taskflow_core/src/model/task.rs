//! Task document model.
//!
//! # Responsibility
//! - Define the canonical task record exchanged with the document store.
//! - Provide draft construction and title validation helpers.
//!
//! # Invariants
//! - `id` is empty until the store assigns one on creation.
//! - `title` is non-blank for every persisted task.
//! - `timestamp` (epoch milliseconds) never changes after creation.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Store-assigned task identifier.
///
/// Empty for drafts that have not been persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Identifier used for drafts before the store assigns one.
    pub fn unassigned() -> Self {
        Self(String::new())
    }

    pub fn is_unassigned(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Authenticated user identifier issued by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Local validation failures detected before any remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    #[error("Task title cannot be empty.")]
    BlankTitle,
}

/// One to-do item in a user's task collection.
///
/// Field names on the wire match the document layout (`isCompleted`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: TaskId,
    pub title: String,
    /// Empty when the user gave no description.
    #[serde(default)]
    pub description: String,
    #[serde(rename = "isCompleted", default)]
    pub is_completed: bool,
    /// Creation time in Unix epoch milliseconds.
    pub timestamp: i64,
}

impl Task {
    /// Builds an unpersisted task from dialog input.
    ///
    /// Title and description are trimmed; validation is left to the caller so
    /// it can run against the raw input.
    pub fn draft(title: &str, description: &str, now_ms: i64) -> Self {
        Self {
            id: TaskId::unassigned(),
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            is_completed: false,
            timestamp: now_ms,
        }
    }

    /// Rejects tasks whose title is empty or whitespace only.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(&self.title)
    }

    /// Returns a copy that differs only in the completion flag.
    pub fn with_completed(&self, is_completed: bool) -> Self {
        Self {
            is_completed,
            ..self.clone()
        }
    }
}

/// Title rule shared by create and update paths.
pub fn validate_title(title: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::BlankTitle);
    }
    Ok(())
}

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Clamps to `0` if the system clock is set before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{now_epoch_ms, validate_title, Task, TaskId, TaskValidationError};

    #[test]
    fn draft_trims_input_and_starts_incomplete() {
        let task = Task::draft("  buy milk ", "\n two liters ", 42);

        assert!(task.id.is_unassigned());
        assert_eq!(task.title, "buy milk");
        assert_eq!(task.description, "two liters");
        assert!(!task.is_completed);
        assert_eq!(task.timestamp, 42);
    }

    #[test]
    fn validate_title_rejects_whitespace_only() {
        assert_eq!(validate_title(""), Err(TaskValidationError::BlankTitle));
        assert_eq!(validate_title(" \t\n"), Err(TaskValidationError::BlankTitle));
        assert!(validate_title(" x ").is_ok());
    }

    #[test]
    fn with_completed_keeps_other_fields() {
        let mut task = Task::draft("write report", "", 7);
        task.id = TaskId::new("t1");

        let flipped = task.with_completed(true);
        assert!(flipped.is_completed);
        assert_eq!(flipped.id, task.id);
        assert_eq!(flipped.title, task.title);
        assert_eq!(flipped.timestamp, task.timestamp);
    }

    #[test]
    fn wire_shape_uses_document_field_names() {
        let mut task = Task::draft("pay rent", "", 5);
        task.id = TaskId::new("t1");

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "t1",
                "title": "pay rent",
                "description": "",
                "isCompleted": false,
                "timestamp": 5
            })
        );
    }

    #[test]
    fn decoding_fills_missing_optional_fields() {
        let task: Task = serde_json::from_str(r#"{"title":"x","timestamp":3}"#).unwrap();
        assert!(task.id.is_unassigned());
        assert!(task.description.is_empty());
        assert!(!task.is_completed);
    }

    #[test]
    fn clock_is_after_epoch() {
        assert!(now_epoch_ms() > 0);
    }
}
