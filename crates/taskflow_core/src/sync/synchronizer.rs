//! Task synchronizer actor and its cloneable handle.
//!
//! One tokio task owns the `SyncState`, the store subscription and the
//! outstanding remote calls. Intents, snapshots and remote completions are
//! funneled into that task and applied through `reduce` one at a time, so no
//! locking is needed around the state. Every change is published on a
//! `watch` channel for readers.
//!
//! Public API: [`TaskSynchronizer::spawn`] and [`TaskSynchronizerHandle`].

use crate::backend::{
    collection_path, AuthService, RemoteResult, SnapshotResult, TaskFieldUpdate, TaskStore,
    TaskSubscription,
};
use crate::model::task::{now_epoch_ms, Task, TaskId, UserId};
use crate::sync::state::{reduce, RemoteCommand, SyncEvent, SyncState};
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Messages sent from handles to the actor loop.
enum Intent {
    Event(SyncEvent),
    Shutdown,
}

/// What the actor loop woke up for.
enum Wakeup {
    Event(SyncEvent),
    FeedClosed,
    Stop,
}

/// Factory for the synchronizer actor.
pub struct TaskSynchronizer;

impl TaskSynchronizer {
    /// Starts a synchronizer bound to the user signed in right now.
    ///
    /// The user id is captured once. Without one the synchronizer reports
    /// "not authenticated" and never subscribes; a later sign-in needs a new
    /// synchronizer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        auth: Arc<dyn AuthService>,
        store: Arc<dyn TaskStore>,
    ) -> TaskSynchronizerHandle {
        let uid = auth.current_user_id();
        let (state, subscription) = match &uid {
            Some(uid) => {
                info!(
                    "event=task_listen module=sync status=start collection={}",
                    collection_path(uid)
                );
                (SyncState::listening(), Some(store.subscribe(uid)))
            }
            None => {
                warn!("event=task_listen module=sync status=error error_code=not_authenticated");
                (SyncState::unauthenticated(), None)
            }
        };

        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(state.clone());

        let actor = SyncActor {
            uid,
            store,
            subscription,
            completion_tx,
            state,
            publisher: state_tx,
        };
        tokio::spawn(actor.run(intent_rx, completion_rx));

        TaskSynchronizerHandle {
            auth,
            intents: intent_tx,
            state: state_rx,
        }
    }
}

/// Cloneable front for UI code.
///
/// Intent methods return immediately; results show up in later state
/// snapshots. Dropping every handle stops the actor and cancels its feed.
#[derive(Clone)]
pub struct TaskSynchronizerHandle {
    auth: Arc<dyn AuthService>,
    intents: mpsc::UnboundedSender<Intent>,
    state: watch::Receiver<SyncState>,
}

impl TaskSynchronizerHandle {
    /// Creates a task from dialog input; the feed delivers it with its id.
    pub fn add_task(&self, title: impl Into<String>, description: impl Into<String>) {
        self.send(SyncEvent::AddRequested {
            title: title.into(),
            description: description.into(),
            now_ms: now_epoch_ms(),
        });
    }

    pub fn toggle_task_completion(&self, task: &Task) {
        self.send(SyncEvent::ToggleRequested(task.clone()));
    }

    /// Opens the dialog; `None` means "new task".
    pub fn set_task_to_edit(&self, task: Option<Task>) {
        self.send(SyncEvent::EditRequested(task));
    }

    pub fn set_show_add_task_dialog(&self, show: bool) {
        self.send(SyncEvent::DialogVisibilityChanged(show));
    }

    /// Overwrites the whole stored document with `task`.
    pub fn update_task(&self, task: Task) {
        self.send(SyncEvent::UpdateRequested(task));
    }

    pub fn delete_task(&self, id: impl Into<TaskId>) {
        self.send(SyncEvent::DeleteRequested(id.into()));
    }

    /// Signs out immediately, then clears state and cancels the feed.
    pub fn logout(&self) {
        self.auth.sign_out();
        self.send(SyncEvent::LoggedOut);
    }

    /// Stops the actor loop; pending intents are dropped.
    pub fn shutdown(&self) {
        let _ = self.intents.send(Intent::Shutdown);
    }

    /// Latest published state.
    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.clone()
    }

    /// Waits until a published state satisfies `predicate`.
    ///
    /// Returns `None` if the actor stopped first.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SyncState) -> bool,
    ) -> Option<SyncState> {
        let mut receiver = self.state.clone();
        let result = receiver.wait_for(predicate).await;
        result.ok().map(|state| state.clone())
    }

    fn send(&self, event: SyncEvent) {
        if self.intents.send(Intent::Event(event)).is_err() {
            warn!("event=task_intent module=sync status=error error_code=actor_stopped");
        }
    }
}

struct SyncActor {
    uid: Option<UserId>,
    store: Arc<dyn TaskStore>,
    subscription: Option<TaskSubscription>,
    completion_tx: mpsc::UnboundedSender<SyncEvent>,
    state: SyncState,
    publisher: watch::Sender<SyncState>,
}

impl SyncActor {
    async fn run(
        mut self,
        mut intents: mpsc::UnboundedReceiver<Intent>,
        mut completions: mpsc::UnboundedReceiver<SyncEvent>,
    ) {
        loop {
            let wakeup = tokio::select! {
                intent = intents.recv() => match intent {
                    Some(Intent::Event(event)) => Wakeup::Event(event),
                    Some(Intent::Shutdown) | None => Wakeup::Stop,
                },
                Some(event) = completions.recv() => Wakeup::Event(event),
                snapshot = next_snapshot(&mut self.subscription) => match snapshot {
                    Some(Ok(tasks)) => Wakeup::Event(SyncEvent::SnapshotReceived(tasks)),
                    Some(Err(err)) => Wakeup::Event(SyncEvent::SubscriptionFailed(err)),
                    None => Wakeup::FeedClosed,
                },
            };

            match wakeup {
                Wakeup::Event(event) => self.apply(event),
                Wakeup::FeedClosed => {
                    debug!("event=task_listen module=sync status=closed");
                    self.subscription = None;
                }
                Wakeup::Stop => break,
            }
        }

        self.cancel_subscription();
        debug!("event=task_sync_stop module=sync status=ok");
    }

    fn apply(&mut self, event: SyncEvent) {
        if matches!(event, SyncEvent::LoggedOut) {
            self.cancel_subscription();
        }
        if let SyncEvent::SubscriptionFailed(err) = &event {
            error!("event=task_listen module=sync status=error error={err}");
        }

        if let Some(command) = reduce(&mut self.state, event) {
            self.dispatch(command);
        }
        self.publisher.send_replace(self.state.clone());
    }

    fn dispatch(&self, command: RemoteCommand) {
        let Some(uid) = self.uid.clone() else {
            return;
        };
        let store = Arc::clone(&self.store);
        let completion_tx = self.completion_tx.clone();

        info!(
            "event=task_write module=sync status=start op={}",
            command.op_name()
        );
        tokio::spawn(async move {
            let result = execute(store.as_ref(), &uid, &command).await;
            match &result {
                Ok(()) => info!(
                    "event=task_write module=sync status=ok op={}",
                    command.op_name()
                ),
                Err(err) => error!(
                    "event=task_write module=sync status=error op={} error={}",
                    command.op_name(),
                    err
                ),
            }
            // The actor may already be gone; nothing left to update then.
            let _ = completion_tx.send(SyncEvent::RemoteCompleted { command, result });
        });
    }

    fn cancel_subscription(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
            info!("event=task_listen module=sync status=cancelled");
        }
    }
}

async fn next_snapshot(subscription: &mut Option<TaskSubscription>) -> Option<SnapshotResult> {
    match subscription {
        Some(subscription) => subscription.next().await,
        None => std::future::pending().await,
    }
}

async fn execute(
    store: &dyn TaskStore,
    uid: &UserId,
    command: &RemoteCommand,
) -> RemoteResult<()> {
    match command {
        RemoteCommand::Create(task) => store.create(uid, task).await.map(|_| ()),
        RemoteCommand::SetCompleted { id, is_completed } => {
            store
                .update_field(uid, id, TaskFieldUpdate::IsCompleted(*is_completed))
                .await
        }
        RemoteCommand::Overwrite(task) => store.overwrite(uid, task).await,
        RemoteCommand::Delete(id) => store.delete(uid, id).await,
    }
}
