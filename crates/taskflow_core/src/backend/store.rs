//! Task document store contract.

use crate::backend::subscription::TaskSubscription;
use crate::backend::RemoteResult;
use crate::model::task::{Task, TaskId, UserId};
use async_trait::async_trait;

/// Field name used for the completion flag in stored documents.
pub const FIELD_IS_COMPLETED: &str = "isCompleted";

/// Single-field partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFieldUpdate {
    IsCompleted(bool),
}

impl TaskFieldUpdate {
    /// Stored field name targeted by this update.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::IsCompleted(_) => FIELD_IS_COMPLETED,
        }
    }

    /// Applies the update to an in-memory copy of the document.
    pub fn apply(self, task: &mut Task) {
        match self {
            Self::IsCompleted(value) => task.is_completed = value,
        }
    }
}

/// Returns the collection path that scopes one user's tasks.
pub fn collection_path(uid: &UserId) -> String {
    format!("users/{uid}/tasks")
}

/// Remote document store for per-user task collections.
///
/// # Contract
/// - `subscribe` delivers full snapshots ordered by `timestamp` ascending,
///   starting with the current contents, then one per change.
/// - `create` ignores the draft id and returns the store-assigned one.
/// - `overwrite` replaces the whole document at `task.id`.
#[async_trait]
pub trait TaskStore: Send + Sync {
    fn subscribe(&self, uid: &UserId) -> TaskSubscription;
    async fn create(&self, uid: &UserId, task: &Task) -> RemoteResult<TaskId>;
    async fn update_field(
        &self,
        uid: &UserId,
        id: &TaskId,
        update: TaskFieldUpdate,
    ) -> RemoteResult<()>;
    async fn overwrite(&self, uid: &UserId, task: &Task) -> RemoteResult<()>;
    async fn delete(&self, uid: &UserId, id: &TaskId) -> RemoteResult<()>;
}
