//! In-process `AuthService`.
//!
//! # Invariants
//! - Emails are matched case-insensitively after trimming.
//! - A uid is derived from the normalized email, so the same account maps to
//!   the same task collection across process restarts.
//! - Accounts live only as long as the service instance.

use crate::backend::{AuthService, AuthUser, RemoteError, RemoteResult};
use crate::config::password_len;
use crate::model::task::UserId;
use async_trait::async_trait;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

const ACCOUNT_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2d8e_4b7a_4c51_9e3d_0a2b_7c64_f915);
const SERVICE_MIN_PASSWORD_LEN: usize = 6;

pub const MSG_BAD_EMAIL: &str = "The email address is badly formatted.";
pub const MSG_EMAIL_IN_USE: &str = "The email address is already in use by another account.";
pub const MSG_BAD_CREDENTIALS: &str =
    "The supplied auth credential is incorrect, malformed or has expired.";
pub const MSG_WEAK_PASSWORD: &str = "Password should be at least 6 characters";

#[derive(Default)]
struct AuthInner {
    passwords: HashMap<String, String>,
    current: Option<AuthUser>,
}

/// Email/password accounts held in memory.
#[derive(Default)]
pub struct LocalAuthService {
    inner: Mutex<AuthInner>,
}

impl LocalAuthService {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, AuthInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl AuthService for LocalAuthService {
    async fn sign_in(&self, email: &str, password: &str) -> RemoteResult<AuthUser> {
        let email = normalize_email(email)?;
        let mut inner = self.lock();
        match inner.passwords.get(&email) {
            Some(stored) if stored == password => {
                let user = user_for(email);
                inner.current = Some(user.clone());
                info!("event=sign_in module=local_auth status=ok");
                Ok(user)
            }
            _ => {
                info!("event=sign_in module=local_auth status=error error_code=bad_credentials");
                Err(RemoteError::new(MSG_BAD_CREDENTIALS))
            }
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> RemoteResult<AuthUser> {
        let email = normalize_email(email)?;
        if password_len(password) < SERVICE_MIN_PASSWORD_LEN {
            return Err(RemoteError::new(MSG_WEAK_PASSWORD));
        }

        let mut inner = self.lock();
        if inner.passwords.contains_key(&email) {
            info!("event=sign_up module=local_auth status=error error_code=email_in_use");
            return Err(RemoteError::new(MSG_EMAIL_IN_USE));
        }
        inner.passwords.insert(email.clone(), password.to_string());
        let user = user_for(email);
        inner.current = Some(user.clone());
        info!("event=sign_up module=local_auth status=ok");
        Ok(user)
    }

    fn sign_out(&self) {
        self.lock().current = None;
        info!("event=sign_out module=local_auth status=ok");
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.lock().current.clone()
    }
}

fn normalize_email(email: &str) -> RemoteResult<String> {
    let normalized = email.trim().to_ascii_lowercase();
    if !EMAIL_RE.is_match(&normalized) {
        return Err(RemoteError::new(MSG_BAD_EMAIL));
    }
    Ok(normalized)
}

fn user_for(email: String) -> AuthUser {
    let uid = Uuid::new_v5(&ACCOUNT_NAMESPACE, email.as_bytes());
    AuthUser {
        uid: UserId::new(uid.simple().to_string()),
        email,
    }
}
