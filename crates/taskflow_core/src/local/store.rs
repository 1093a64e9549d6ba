//! SQLite-backed `TaskStore` with push snapshots.
//!
//! # Invariants
//! - A new subscriber receives the current snapshot before any change.
//! - Every successful mutation pushes one full snapshot to each live
//!   subscriber of the affected user.
//! - Cancelled subscribers are pruned on the next publish.
//! - Snapshots reach subscribers in commit order: the connection lock is held
//!   from the write until delivery (lock order: connection, then subscribers).

use crate::backend::{
    collection_path, RemoteError, RemoteResult, SnapshotSender, TaskFieldUpdate, TaskStore,
    TaskSubscription,
};
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::task::{Task, TaskId, UserId};
use crate::repo::task_repo::{RepoResult, SqliteTaskRepository, TaskRepository};
use async_trait::async_trait;
use log::{debug, error, info};
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Local document store over one SQLite connection.
pub struct LocalTaskStore {
    conn: Mutex<Connection>,
    subscribers: Mutex<HashMap<UserId, Vec<SnapshotSender>>>,
}

impl LocalTaskStore {
    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::with_connection(open_db(path)?))
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::with_connection(open_db_in_memory()?))
    }

    /// Wraps an already migrated connection.
    pub fn with_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live subscriptions for one user.
    pub fn subscriber_count(&self, uid: &UserId) -> usize {
        self.lock_subscribers().get(uid).map_or(0, |senders| {
            senders
                .iter()
                .filter(|sender| !sender.is_cancelled())
                .count()
        })
    }

    fn lock_conn(&self) -> RemoteResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RemoteError::new("local task store is unavailable"))
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, HashMap<UserId, Vec<SnapshotSender>>> {
        // A poisoned registry only holds senders; keep serving them.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs one mutation and, on success, publishes the resulting listing.
    ///
    /// The connection stays locked until every subscriber has the snapshot,
    /// so concurrent writes deliver snapshots in commit order.
    fn write<T>(
        &self,
        uid: &UserId,
        op: &'static str,
        f: impl FnOnce(&SqliteTaskRepository<'_>) -> RepoResult<T>,
    ) -> RemoteResult<T> {
        let conn = self.lock_conn()?;
        let repo = SqliteTaskRepository::new(&conn);
        let result = f(&repo).map_err(|err| RemoteError::new(err.to_string()));
        match &result {
            Ok(_) => {
                info!("event=store_write module=local_store status=ok op={op}");
                self.publish(&repo, uid);
            }
            Err(err) => error!(
                "event=store_write module=local_store status=error op={op} error={}",
                err
            ),
        }
        result
    }

    /// Must be called with the connection locked.
    fn publish(&self, repo: &SqliteTaskRepository<'_>, uid: &UserId) {
        let snapshot = list_snapshot(repo, uid);
        let mut subscribers = self.lock_subscribers();
        if let Some(senders) = subscribers.get_mut(uid) {
            senders.retain(|sender| sender.deliver(snapshot.clone()));
            debug!(
                "event=snapshot_publish module=local_store status=ok subscribers={}",
                senders.len()
            );
            if senders.is_empty() {
                subscribers.remove(uid);
            }
        }
    }
}

fn list_snapshot(repo: &SqliteTaskRepository<'_>, uid: &UserId) -> RemoteResult<Vec<Task>> {
    let snapshot = repo
        .list_tasks(uid)
        .map_err(|err| RemoteError::new(err.to_string()));
    if let Err(err) = &snapshot {
        error!(
            "event=snapshot_publish module=local_store status=error error={}",
            err
        );
    }
    snapshot
}

#[async_trait]
impl TaskStore for LocalTaskStore {
    fn subscribe(&self, uid: &UserId) -> TaskSubscription {
        let (sender, subscription) = TaskSubscription::channel();
        match self.lock_conn() {
            Ok(conn) => {
                // Registered before the lock drops so no write slips between
                // the first snapshot and the next publish.
                sender.deliver(list_snapshot(&SqliteTaskRepository::new(&conn), uid));
                self.lock_subscribers()
                    .entry(uid.clone())
                    .or_default()
                    .push(sender);
            }
            Err(err) => {
                sender.deliver(Err(err));
            }
        }
        info!(
            "event=subscribe module=local_store status=ok collection={}",
            collection_path(uid)
        );
        subscription
    }

    async fn create(&self, uid: &UserId, task: &Task) -> RemoteResult<TaskId> {
        self.write(uid, "create", |repo| repo.create_task(uid, task))
    }

    async fn update_field(
        &self,
        uid: &UserId,
        id: &TaskId,
        update: TaskFieldUpdate,
    ) -> RemoteResult<()> {
        self.write(uid, "update_field", |repo| match update {
            TaskFieldUpdate::IsCompleted(value) => repo.set_completed(uid, id, value),
        })
    }

    async fn overwrite(&self, uid: &UserId, task: &Task) -> RemoteResult<()> {
        self.write(uid, "overwrite", |repo| repo.overwrite_task(uid, task))
    }

    async fn delete(&self, uid: &UserId, id: &TaskId) -> RemoteResult<()> {
        self.write(uid, "delete", |repo| repo.delete_task(uid, id))
    }
}
