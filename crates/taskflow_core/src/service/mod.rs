//! UI-facing state holders.
//!
//! # Responsibility
//! - Front the auth service for the login and sign-up screens.
//! - Keep screens decoupled from backend details.

pub mod session;
