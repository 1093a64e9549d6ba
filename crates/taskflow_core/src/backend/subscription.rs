//! Cancellable push feed of collection snapshots.
//!
//! # Invariants
//! - Messages are read one at a time in delivery order.
//! - After `cancel` (or drop) the producer observes a closed feed and nothing
//!   further is yielded.

use crate::backend::RemoteError;
use crate::model::task::Task;
use tokio::sync::mpsc;

/// One push from the store: a full listing or a transport failure.
pub type SnapshotResult = Result<Vec<Task>, RemoteError>;

/// Producer half held by store implementations.
#[derive(Debug, Clone)]
pub struct SnapshotSender {
    sender: mpsc::UnboundedSender<SnapshotResult>,
}

impl SnapshotSender {
    /// Pushes one message; returns `false` once the consumer has gone away.
    pub fn deliver(&self, snapshot: SnapshotResult) -> bool {
        self.sender.send(snapshot).is_ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Consumer half returned by `TaskStore::subscribe`.
#[derive(Debug)]
pub struct TaskSubscription {
    receiver: mpsc::UnboundedReceiver<SnapshotResult>,
    cancelled: bool,
}

impl TaskSubscription {
    /// Creates a connected producer/consumer pair.
    pub fn channel() -> (SnapshotSender, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            SnapshotSender { sender },
            Self {
                receiver,
                cancelled: false,
            },
        )
    }

    /// Waits for the next message; `None` once cancelled or the producer is gone.
    pub async fn next(&mut self) -> Option<SnapshotResult> {
        if self.cancelled {
            return None;
        }
        self.receiver.recv().await
    }

    /// Stops delivery and discards anything already buffered.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}
