//! Authentication service contract.

use crate::backend::RemoteResult;
use crate::model::task::UserId;
use async_trait::async_trait;

/// Identity of the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: UserId,
    pub email: String,
}

/// Remote authentication capability.
///
/// `sign_out` and the current-user accessors are synchronous from the caller's
/// perspective; they only touch the service's local session.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> RemoteResult<AuthUser>;
    async fn sign_up(&self, email: &str, password: &str) -> RemoteResult<AuthUser>;
    fn sign_out(&self);
    fn current_user(&self) -> Option<AuthUser>;

    /// Live view of the signed-in uid; never cached by callers.
    fn current_user_id(&self) -> Option<UserId> {
        self.current_user().map(|user| user.uid)
    }
}
