//! Screen-level projections derived from state holder snapshots.
//!
//! # Responsibility
//! - Decide which route a session starts on.
//! - Reduce synchronizer state to what the list screen and dialog render.
//!
//! # Invariants
//! - Projections are pure functions of their inputs.

pub mod routes;
pub mod task_list;

pub use routes::{start_route, Route};
pub use task_list::{display_name, TaskDialogView, TaskListView};
