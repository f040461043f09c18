//! # Event Publisher
//!
//! Sending side of the inbound channel. Every relay task holds a clone.

use crate::events::InboundEvent;
use crate::subscriber::InboundReceiver;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Trait for publishing inbound events to the dispatcher.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event, waiting for buffer space.
    ///
    /// Returns `false` when the dispatcher has gone away.
    async fn publish(&self, event: InboundEvent) -> bool;

    /// Publish without waiting. Drops the event when the buffer is full.
    fn try_publish(&self, event: InboundEvent) -> bool;

    /// Total events accepted by the channel.
    fn events_published(&self) -> u64;
}

/// Creates a bounded inbound channel.
pub fn inbound_channel(capacity: usize) -> (InboundSender, InboundReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        InboundSender {
            sender: tx,
            published: Arc::new(AtomicU64::new(0)),
        },
        InboundReceiver::new(rx),
    )
}

/// mpsc-backed publisher. Cloning shares the counter.
#[derive(Clone)]
pub struct InboundSender {
    sender: mpsc::Sender<InboundEvent>,
    published: Arc<AtomicU64>,
}

impl InboundSender {
    /// Whether the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[async_trait]
impl EventPublisher for InboundSender {
    async fn publish(&self, event: InboundEvent) -> bool {
        let topic = event.topic();
        match self.sender.send(event).await {
            Ok(()) => {
                self.published.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(_) => {
                debug!(topic = topic.as_str(), "Inbound event dropped (dispatcher gone)");
                false
            }
        }
    }

    fn try_publish(&self, event: InboundEvent) -> bool {
        let topic = event.topic();
        match self.sender.try_send(event) {
            Ok(()) => {
                self.published.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(topic = topic.as_str(), "Inbound channel full, event dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::RelayRecord;

    fn status_event() -> InboundEvent {
        InboundEvent::RelayStatusChanged(RelayRecord::new("wss://r"))
    }

    #[tokio::test]
    async fn test_publish_and_receive() {
        let (tx, mut rx) = inbound_channel(4);
        assert!(tx.publish(status_event()).await);
        assert_eq!(tx.events_published(), 1);
        assert_eq!(rx.recv().await, Some(status_event()));
    }

    #[tokio::test]
    async fn test_publish_after_receiver_dropped() {
        let (tx, rx) = inbound_channel(4);
        drop(rx);
        assert!(tx.is_closed());
        assert!(!tx.publish(status_event()).await);
        assert_eq!(tx.events_published(), 0);
    }

    #[tokio::test]
    async fn test_try_publish_drops_when_full() {
        let (tx, _rx) = inbound_channel(1);
        assert!(tx.try_publish(status_event()));
        assert!(!tx.try_publish(status_event()));
        assert_eq!(tx.events_published(), 1);
    }
}
