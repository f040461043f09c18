//! # Subscribers
//!
//! The receiving side of the inbound channel and the canvas change feed.

use crate::events::InboundEvent;
use crate::DEFAULT_FEED_CAPACITY;
use futures::{Stream, StreamExt};
use shared_types::CellChange;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;

/// Single consumer of inbound events.
pub struct InboundReceiver {
    receiver: mpsc::Receiver<InboundEvent>,
}

impl InboundReceiver {
    pub(crate) fn new(receiver: mpsc::Receiver<InboundEvent>) -> Self {
        Self { receiver }
    }

    /// Next event, or `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<InboundEvent> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<InboundEvent> {
        self.receiver.try_recv().ok()
    }
}

/// Anything that wants to hear about visible cell changes.
pub trait ChangeSink: Send + Sync {
    fn notify(&self, change: CellChange);
}

/// Discards every change.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ChangeSink for NullSink {
    fn notify(&self, _change: CellChange) {}
}

/// Keeps every change in memory. Handy for assertions.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    changes: Arc<Mutex<Vec<CellChange>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes recorded so far, oldest first.
    pub fn changes(&self) -> Vec<CellChange> {
        self.changes
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<CellChange> {
        match self.changes.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl ChangeSink for RecordingSink {
    fn notify(&self, change: CellChange) {
        match self.changes.lock() {
            Ok(mut guard) => guard.push(change),
            Err(poisoned) => poisoned.into_inner().push(change),
        }
    }
}

/// Broadcast of cell changes to any number of observers.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<CellChange>,
}

impl ChangeFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FEED_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CellChange> {
        self.sender.subscribe()
    }

    /// Stream view of the feed. Lagged gaps are logged and skipped.
    pub fn stream(&self) -> impl Stream<Item = CellChange> + Send + 'static {
        BroadcastStream::new(self.sender.subscribe()).filter_map(|item| async move {
            match item {
                Ok(change) => Some(change),
                Err(err) => {
                    warn!(error = %err, "Change observer lagged");
                    None
                }
            }
        })
    }

    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeSink for ChangeFeed {
    fn notify(&self, change: CellChange) {
        // No observers is normal while headless.
        let _ = self.sender.send(change);
    }
}
