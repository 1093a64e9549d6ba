//! Session manager for the authentication screens.
//!
//! # Responsibility
//! - Hold transient credential input, loading flag and last error.
//! - Run login / sign-up / logout against the auth service.
//!
//! # Invariants
//! - Credentials are never persisted or logged.
//! - Local validation failures never reach the auth service.
//! - Successful login, sign-up and logout clear every field.
//! - Remote failures keep the entered credentials for correction.

use crate::backend::AuthService;
use crate::config::{password_len, CoreConfig, DEFAULT_MIN_PASSWORD_LEN};
use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

/// Local validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Email and password cannot be empty.")]
    EmptyCredentials,
    #[error("Password must be at least {min_len} characters long.")]
    PasswordTooShort { min_len: usize },
}

/// Authentication lifecycle as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Authenticating,
    Authenticated,
    Error,
}

/// Read-only snapshot of the session fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub email: String,
    pub password: String,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub phase: SessionPhase,
}

impl SessionState {
    fn clear(&mut self, phase: SessionPhase) {
        *self = Self {
            phase,
            ..Self::default()
        };
    }

    fn fail(&mut self, message: String) {
        self.is_loading = false;
        self.error_message = Some(message);
        self.phase = SessionPhase::Error;
    }
}

#[derive(Debug, Clone, Copy)]
enum AuthAction {
    Login,
    SignUp,
}

impl AuthAction {
    fn event_name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::SignUp => "sign_up",
        }
    }
}

/// State holder fronting the auth service.
pub struct SessionManager {
    auth: Arc<dyn AuthService>,
    min_password_len: usize,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    pub fn new(auth: Arc<dyn AuthService>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            auth,
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
            state,
        }
    }

    /// Uses the sign-up password policy from `config`.
    pub fn from_config(auth: Arc<dyn AuthService>, config: &CoreConfig) -> Self {
        Self {
            min_password_len: config.min_password_len,
            ..Self::new(auth)
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn set_email(&self, email: impl Into<String>) {
        let email = email.into();
        self.state.send_modify(|state| state.email = email);
    }

    pub fn set_password(&self, password: impl Into<String>) {
        let password = password.into();
        self.state.send_modify(|state| state.password = password);
    }

    /// Signs in with the entered credentials.
    ///
    /// `on_success` runs before the fields are cleared. Returns whether the
    /// sign-in succeeded.
    pub async fn login(&self, on_success: impl FnOnce()) -> bool {
        self.authenticate(AuthAction::Login, on_success).await
    }

    /// Creates an account with the entered credentials.
    ///
    /// Passwords shorter than the configured minimum fail locally.
    pub async fn sign_up(&self, on_success: impl FnOnce()) -> bool {
        self.authenticate(AuthAction::SignUp, on_success).await
    }

    /// Signs out and clears every session field.
    pub fn logout(&self) {
        self.auth.sign_out();
        self.state.send_modify(|state| state.clear(SessionPhase::Idle));
        info!("event=logout module=session status=ok");
    }

    /// Asks the auth service directly; nothing is cached here.
    pub fn is_user_logged_in(&self) -> bool {
        self.auth.current_user().is_some()
    }

    /// Email of the signed-in account, if any.
    pub fn current_user_email(&self) -> Option<String> {
        self.auth.current_user().map(|user| user.email)
    }

    async fn authenticate(&self, action: AuthAction, on_success: impl FnOnce()) -> bool {
        let (email, password) = {
            let state = self.state.borrow();
            (state.email.clone(), state.password.clone())
        };

        if let Err(err) = self.validate(action, &email, &password) {
            warn!(
                "event={} module=session status=error error_code=local_validation",
                action.event_name()
            );
            self.state.send_modify(|state| state.fail(err.to_string()));
            return false;
        }

        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error_message = None;
            state.phase = SessionPhase::Authenticating;
        });
        info!("event={} module=session status=start", action.event_name());

        let result = match action {
            AuthAction::Login => self.auth.sign_in(&email, &password).await,
            AuthAction::SignUp => self.auth.sign_up(&email, &password).await,
        };

        match result {
            Ok(_) => {
                on_success();
                self.state
                    .send_modify(|state| state.clear(SessionPhase::Authenticated));
                info!("event={} module=session status=ok", action.event_name());
                true
            }
            Err(err) => {
                warn!(
                    "event={} module=session status=error error_code=remote",
                    action.event_name()
                );
                self.state.send_modify(|state| state.fail(err.message));
                false
            }
        }
    }

    fn validate(
        &self,
        action: AuthAction,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(SessionError::EmptyCredentials);
        }
        let too_short = password_len(password) < self.min_password_len;
        if matches!(action, AuthAction::SignUp) && too_short {
            return Err(SessionError::PasswordTooShort {
                min_len: self.min_password_len,
            });
        }
        Ok(())
    }
}
