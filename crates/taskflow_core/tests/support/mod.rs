//! Scripted backend doubles shared by integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskflow_core::{
    AuthService, AuthUser, RemoteError, RemoteResult, SnapshotResult, Task, TaskFieldUpdate,
    TaskId, TaskStore, TaskSubscription, UserId,
};
use taskflow_core::backend::SnapshotSender;
use tokio::sync::Notify;

pub fn task(id: &str, title: &str, timestamp: i64) -> Task {
    Task {
        id: TaskId::new(id),
        title: title.to_string(),
        description: String::new(),
        is_completed: false,
        timestamp,
    }
}

/// Polls `condition` until it holds or one second passes.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let wait = async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(1), wait).await.is_ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCall {
    SignIn { email: String },
    SignUp { email: String },
    SignOut,
}

/// Auth double with a fixed outcome and optional gate held during calls.
pub struct ScriptedAuth {
    current: Mutex<Option<AuthUser>>,
    outcome: Mutex<RemoteResult<AuthUser>>,
    calls: Mutex<Vec<AuthCall>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedAuth {
    pub fn signed_in(uid: &str) -> Arc<Self> {
        let user = user(uid);
        Arc::new(Self {
            current: Mutex::new(Some(user.clone())),
            outcome: Mutex::new(Ok(user)),
            calls: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
        })
    }

    pub fn signed_out() -> Arc<Self> {
        let auth = Self::signed_in("u1");
        *auth.current.lock().unwrap() = None;
        auth
    }

    pub fn fail_with(&self, message: &str) {
        *self.outcome.lock().unwrap() = Err(RemoteError::new(message));
    }

    pub fn succeed_as(&self, uid: &str) {
        *self.outcome.lock().unwrap() = Ok(user(uid));
    }

    /// Makes every sign-in/up wait until the gate is notified.
    pub fn hold_calls(&self, gate: Arc<Notify>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    pub fn calls(&self) -> Vec<AuthCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remote_call_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| !matches!(call, AuthCall::SignOut))
            .count()
    }

    async fn finish(&self) -> RemoteResult<AuthUser> {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let outcome = self.outcome.lock().unwrap().clone();
        if let Ok(user) = &outcome {
            *self.current.lock().unwrap() = Some(user.clone());
        }
        outcome
    }
}

fn user(uid: &str) -> AuthUser {
    AuthUser {
        uid: UserId::new(uid),
        email: format!("{uid}@example.com"),
    }
}

#[async_trait]
impl AuthService for ScriptedAuth {
    async fn sign_in(&self, email: &str, _password: &str) -> RemoteResult<AuthUser> {
        self.calls.lock().unwrap().push(AuthCall::SignIn {
            email: email.to_string(),
        });
        self.finish().await
    }

    async fn sign_up(&self, email: &str, _password: &str) -> RemoteResult<AuthUser> {
        self.calls.lock().unwrap().push(AuthCall::SignUp {
            email: email.to_string(),
        });
        self.finish().await
    }

    fn sign_out(&self) {
        self.calls.lock().unwrap().push(AuthCall::SignOut);
        *self.current.lock().unwrap() = None;
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.current.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Subscribe(UserId),
    Create(UserId, Task),
    UpdateField(UserId, TaskId, TaskFieldUpdate),
    Overwrite(UserId, Task),
    Delete(UserId, TaskId),
}

/// Store double: records calls, fails on demand, snapshots pushed by hand.
#[derive(Default)]
pub struct ScriptedStore {
    calls: Mutex<Vec<StoreCall>>,
    failure: Mutex<Option<String>>,
    feeds: Mutex<Vec<SnapshotSender>>,
    next_id: AtomicUsize,
}

impl ScriptedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every following mutation fails with `message`.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn succeed(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Delivers to every live feed; returns how many received it.
    pub fn push(&self, snapshot: SnapshotResult) -> usize {
        let feeds = self.feeds.lock().unwrap();
        feeds
            .iter()
            .filter(|feed| feed.deliver(snapshot.clone()))
            .count()
    }

    pub fn live_feeds(&self) -> usize {
        self.feeds
            .lock()
            .unwrap()
            .iter()
            .filter(|feed| !feed.is_cancelled())
            .count()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| !matches!(call, StoreCall::Subscribe(_)))
            .count()
    }

    fn record(&self, call: StoreCall) -> RemoteResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().as_deref() {
            Some(message) => Err(RemoteError::new(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskStore for ScriptedStore {
    fn subscribe(&self, uid: &UserId) -> TaskSubscription {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Subscribe(uid.clone()));
        let (sender, subscription) = TaskSubscription::channel();
        self.feeds.lock().unwrap().push(sender);
        subscription
    }

    async fn create(&self, uid: &UserId, task: &Task) -> RemoteResult<TaskId> {
        self.record(StoreCall::Create(uid.clone(), task.clone()))?;
        let next = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(TaskId::new(format!("doc-{next}")))
    }

    async fn update_field(
        &self,
        uid: &UserId,
        id: &TaskId,
        update: TaskFieldUpdate,
    ) -> RemoteResult<()> {
        self.record(StoreCall::UpdateField(uid.clone(), id.clone(), update))
    }

    async fn overwrite(&self, uid: &UserId, task: &Task) -> RemoteResult<()> {
        self.record(StoreCall::Overwrite(uid.clone(), task.clone()))
    }

    async fn delete(&self, uid: &UserId, id: &TaskId) -> RemoteResult<()> {
        self.record(StoreCall::Delete(uid.clone(), id.clone()))
    }
}
