//! Repository layer for locally persisted task documents.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from the store adapter.
//!
//! # Invariants
//! - Writes enforce `Task::validate()` before persistence.
//! - Every query is scoped to one owner uid.

pub mod task_repo;
