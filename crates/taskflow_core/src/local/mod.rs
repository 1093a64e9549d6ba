//! Process-local implementations of the backend contracts.
//!
//! # Responsibility
//! - Run the full task flow without a hosted service (CLI, integration tests).
//! - Mirror the hosted service's observable behavior: full snapshots on every
//!   change, store-assigned ids, verbatim error messages.

pub mod auth;
pub mod store;

pub use auth::LocalAuthService;
pub use store::LocalTaskStore;
