//! Domain model for the task list and its owner.
//!
//! # Responsibility
//! - Define the task document shape shared by the store and the synchronizer.
//! - Keep identifier types explicit in signatures.
//!
//! # Invariants
//! - A task id is assigned by the store and stays stable for the task lifetime.
//! - `timestamp` is fixed at creation and is the only sort key.

pub mod task;
