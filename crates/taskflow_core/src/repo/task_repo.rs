//! Task repository contract and SQLite implementation.
//!
//! # Invariants
//! - Write paths validate the task before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing order is `timestamp ASC, id ASC`.

use crate::db::DbError;
use crate::model::task::{Task, TaskId, TaskValidationError, UserId};
use rusqlite::{params, Connection, Row};
use thiserror::Error;
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    is_completed,
    timestamp
FROM tasks";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] TaskValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("No document to update: {0}")]
    NotFound(TaskId),
    #[error("invalid persisted task data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for one-user-at-a-time task CRUD.
pub trait TaskRepository {
    /// Inserts the task under a freshly generated id and returns that id.
    fn create_task(&self, owner: &UserId, task: &Task) -> RepoResult<TaskId>;
    fn set_completed(&self, owner: &UserId, id: &TaskId, is_completed: bool) -> RepoResult<()>;
    /// Replaces the whole document, creating it when absent.
    ///
    /// An existing document keeps its stored `timestamp`.
    fn overwrite_task(&self, owner: &UserId, task: &Task) -> RepoResult<()>;
    /// Removes the document; deleting a missing id is not an error.
    fn delete_task(&self, owner: &UserId, id: &TaskId) -> RepoResult<()>;
    fn list_tasks(&self, owner: &UserId) -> RepoResult<Vec<Task>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, owner: &UserId, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        let id = TaskId::new(Uuid::new_v4().simple().to_string());
        self.conn.execute(
            "INSERT INTO tasks (owner_uid, id, title, description, is_completed, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                owner.as_str(),
                id.as_str(),
                task.title.as_str(),
                task.description.as_str(),
                task.is_completed,
                task.timestamp,
            ],
        )?;

        Ok(id)
    }

    fn set_completed(&self, owner: &UserId, id: &TaskId, is_completed: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET is_completed = ?1 WHERE owner_uid = ?2 AND id = ?3;",
            params![is_completed, owner.as_str(), id.as_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id.clone()));
        }
        Ok(())
    }

    fn overwrite_task(&self, owner: &UserId, task: &Task) -> RepoResult<()> {
        task.validate()?;
        if task.id.is_unassigned() {
            return Err(RepoError::InvalidData(
                "cannot overwrite a task without an id".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT INTO tasks (owner_uid, id, title, description, is_completed, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (owner_uid, id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                is_completed = excluded.is_completed;",
            params![
                owner.as_str(),
                task.id.as_str(),
                task.title.as_str(),
                task.description.as_str(),
                task.is_completed,
                task.timestamp,
            ],
        )?;

        Ok(())
    }

    fn delete_task(&self, owner: &UserId, id: &TaskId) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM tasks WHERE owner_uid = ?1 AND id = ?2;",
            params![owner.as_str(), id.as_str()],
        )?;
        Ok(())
    }

    fn list_tasks(&self, owner: &UserId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE owner_uid = ?1
             ORDER BY timestamp ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([owner.as_str()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let is_completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` in tasks.is_completed"
            )));
        }
    };

    let task = Task {
        id: TaskId::new(row.get::<_, String>("id")?),
        title: row.get("title")?,
        description: row.get("description")?,
        is_completed,
        timestamp: row.get("timestamp")?,
    };
    task.validate()
        .map_err(|_| RepoError::InvalidData(format!("blank title in task `{}`", task.id)))?;
    Ok(task)
}
