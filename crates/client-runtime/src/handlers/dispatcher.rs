//! Drains the relay fan-in channel into the pipeline.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use canvas_telemetry::RELAYS_CONNECTED;
use parking_lot::Mutex;
use shared_bus::{InboundEvent, InboundReceiver};
use shared_types::unix_now;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::pipeline::{EventPipeline, IngestOutcome};

/// Routes every inbound event to its handler.
pub struct Dispatcher {
    pipeline: Arc<Mutex<EventPipeline>>,
    /// `(relay, subscription_id)` of subscriptions relays have closed.
    closed: mpsc::Sender<(String, String)>,
    connected: HashSet<String>,
    applied: u64,
}

impl Dispatcher {
    pub fn new(
        pipeline: Arc<Mutex<EventPipeline>>,
        closed: mpsc::Sender<(String, String)>,
    ) -> Self {
        Self {
            pipeline,
            closed,
            connected: HashSet::new(),
            applied: 0,
        }
    }

    /// Placements applied so far.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub async fn handle(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::PlacementReceived { origin, event, .. }
            | InboundEvent::ReceiptReceived { origin, event, .. } => {
                let outcome = self
                    .pipeline
                    .lock()
                    .ingest(origin, event, unix_now(), Instant::now());
                if matches!(outcome, IngestOutcome::Applied { .. }) {
                    self.applied += 1;
                }
            }
            InboundEvent::SubscriptionClosed {
                relay,
                subscription_id,
                reason,
            } => {
                debug!(%relay, subscription = %subscription_id, %reason, "Subscription closed by relay");
                let _ = self.closed.send((relay, subscription_id)).await;
            }
            InboundEvent::RelayStatusChanged(record) => {
                if record.is_connected() {
                    self.connected.insert(record.url);
                } else {
                    self.connected.remove(&record.url);
                }
                RELAYS_CONNECTED.set(self.connected.len() as f64);
            }
        }
    }

    /// Runs until the channel closes or `shutdown` flips to `true`.
    pub fn spawn(
        mut self,
        mut inbound: InboundReceiver,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<u64> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = inbound.recv() => match event {
                        Some(event) => self.handle(event).await,
                        None => break,
                    },
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            info!(applied = self.applied, "Dispatcher stopped");
            self.applied
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ClientConfig;
    use shared_bus::{inbound_channel, EventPublisher, NullSink, Origin};
    use shared_crypto::EventKeys;
    use shared_types::{PlacementBatch, Pixel, RelayRecord, RelayStatus};

    fn pipeline() -> Arc<Mutex<EventPipeline>> {
        Arc::new(Mutex::new(EventPipeline::new(
            &ClientConfig::for_testing(),
            Arc::new(NullSink),
        )))
    }

    #[tokio::test]
    async fn test_routes_placements_and_closes() {
        let pipeline = pipeline();
        let (closed_tx, mut closed_rx) = mpsc::channel(4);
        let (tx, rx) = inbound_channel(16);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = Dispatcher::new(Arc::clone(&pipeline), closed_tx).spawn(rx, shutdown_rx);

        let keys = EventKeys::generate();
        let unsigned = pipeline
            .lock()
            .codec()
            .encode_placement(
                &PlacementBatch::new(vec![Pixel::new(1, 1, "#ff0000")], 1_000),
                false,
                unix_now(),
            )
            .unwrap();
        let event = keys.sign_event(unsigned).unwrap();

        let mut connected = RelayRecord::new("wss://a.test");
        connected.status = RelayStatus::Connected;
        assert!(tx.publish(InboundEvent::RelayStatusChanged(connected)).await);
        assert!(
            tx.publish(InboundEvent::from_relay("wss://a.test", Origin::Live, event).unwrap())
                .await
        );
        assert!(
            tx.publish(InboundEvent::SubscriptionClosed {
                relay: "wss://a.test".into(),
                subscription_id: "test-live".into(),
                reason: "restarting".into(),
            })
            .await
        );

        assert_eq!(
            closed_rx.recv().await,
            Some(("wss://a.test".to_string(), "test-live".to_string()))
        );
        shutdown_tx.send(true).unwrap();
        assert_eq!(task.await.unwrap(), 1);
        assert_eq!(pipeline.lock().canvas().len(), 1);
    }

    #[tokio::test]
    async fn test_stops_when_channel_closes() {
        let (closed_tx, _closed_rx) = mpsc::channel(1);
        let (tx, rx) = inbound_channel(4);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = Dispatcher::new(pipeline(), closed_tx).spawn(rx, shutdown_rx);
        drop(tx);
        assert_eq!(task.await.unwrap(), 0);
    }
}
