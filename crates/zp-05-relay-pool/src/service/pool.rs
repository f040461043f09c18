//! Relay pool service.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::RwLock;
use shared_bus::InboundSender;
use shared_types::{Filter, RelayRecord, TransportEvent};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::commands::RelayCommand;
use super::worker::{RecordTable, RelayWorker};
use crate::config::RelayPoolConfig;
use crate::domain::{PublishReport, RelayError};
use crate::ports::{RelayConnector, RelayPoolApi};

struct RelayHandle {
    url: String,
    commands: mpsc::Sender<RelayCommand>,
}

/// Connections to every configured relay.
///
/// Each relay is served by its own task. The pool only routes commands and
/// reads the shared status table, so it never blocks on a slow relay.
pub struct RelayPool {
    config: RelayPoolConfig,
    handles: Vec<RelayHandle>,
    records: RecordTable,
    status_rx: watch::Receiver<u64>,
    tasks: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl RelayPool {
    /// Spawns one task per distinct relay URL. Must be called inside a
    /// tokio runtime.
    pub fn start(
        config: RelayPoolConfig,
        connector: Arc<dyn RelayConnector>,
        bus: InboundSender,
    ) -> Self {
        let mut urls: Vec<String> = Vec::with_capacity(config.relays.len());
        for url in &config.relays {
            if !urls.contains(url) {
                urls.push(url.clone());
            }
        }

        let records: RecordTable = Arc::new(RwLock::new(
            urls.iter()
                .map(|url| (url.clone(), RelayRecord::new(url.clone())))
                .collect::<HashMap<_, _>>(),
        ));
        let (status_tx, status_rx) = watch::channel(0u64);
        let status_tx = Arc::new(status_tx);

        let mut handles = Vec::with_capacity(urls.len());
        let mut tasks = Vec::with_capacity(urls.len());
        for url in urls {
            let (tx, rx) = mpsc::channel(config.command_buffer.max(1));
            let worker = RelayWorker::new(
                url.clone(),
                Arc::clone(&connector),
                config.backoff(),
                config.connect_timeout(),
                Arc::clone(&records),
                Arc::clone(&status_tx),
                bus.clone(),
                rx,
            );
            tasks.push(tokio::spawn(worker.run()));
            handles.push(RelayHandle { url, commands: tx });
        }

        info!(relays = handles.len(), "Relay pool started");
        Self {
            config,
            handles,
            records,
            status_rx,
            tasks: parking_lot::Mutex::new(tasks),
        }
    }

    pub fn config(&self) -> &RelayPoolConfig {
        &self.config
    }

    /// URLs of relays that are connected right now.
    pub fn connected_relays(&self) -> Vec<String> {
        self.statuses()
            .into_iter()
            .filter(RelayRecord::is_connected)
            .map(|r| r.url)
            .collect()
    }

    pub fn is_connected(&self, url: &str) -> bool {
        self.records
            .read()
            .get(url)
            .map(RelayRecord::is_connected)
            .unwrap_or(false)
    }

    /// Waits until at least one relay is connected. Returns `false` on
    /// timeout.
    pub async fn wait_until_connected(&self, timeout: Duration) -> bool {
        let mut status_rx = self.status_rx.clone();
        let wait = async {
            loop {
                if !self.connected_relays().is_empty() {
                    return true;
                }
                if status_rx.changed().await.is_err() {
                    return false;
                }
            }
        };
        tokio::time::timeout(timeout, wait).await.unwrap_or(false)
    }

    /// Stops every relay task and waits for them to close their sockets.
    pub async fn shutdown(&self) {
        for handle in &self.handles {
            let _ = handle.commands.send(RelayCommand::Shutdown).await;
        }
        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Relay task ended abnormally");
            }
        }
        info!("Relay pool stopped");
    }

    fn handle(&self, url: &str) -> Result<&RelayHandle, RelayError> {
        self.handles
            .iter()
            .find(|h| h.url == url)
            .ok_or_else(|| RelayError::UnknownRelay(url.to_string()))
    }

    async fn send(handle: &RelayHandle, command: RelayCommand) -> Result<(), RelayError> {
        handle
            .commands
            .send(command)
            .await
            .map_err(|_| RelayError::PoolShutdown)
    }

    async fn publish_to(
        &self,
        handle: &RelayHandle,
        event: TransportEvent,
    ) -> Result<(), RelayError> {
        let (reply, rx) = oneshot::channel();
        Self::send(handle, RelayCommand::Publish { event, reply }).await?;
        match tokio::time::timeout(self.config.publish_timeout(), rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(RelayError::PoolShutdown),
            Err(_) => Err(RelayError::Timeout("publish")),
        }
    }
}

#[async_trait]
impl RelayPoolApi for RelayPool {
    fn relay_urls(&self) -> Vec<String> {
        self.handles.iter().map(|h| h.url.clone()).collect()
    }

    fn statuses(&self) -> Vec<RelayRecord> {
        let records = self.records.read();
        self.handles
            .iter()
            .filter_map(|h| records.get(&h.url).cloned())
            .collect()
    }

    async fn subscribe(
        &self,
        relay: Option<&str>,
        subscription_id: &str,
        filters: Vec<Filter>,
    ) -> Result<(), RelayError> {
        let targets: Vec<&RelayHandle> = match relay {
            Some(url) => vec![self.handle(url)?],
            None => self.handles.iter().collect(),
        };
        for handle in targets {
            Self::send(
                handle,
                RelayCommand::Subscribe {
                    subscription_id: subscription_id.to_string(),
                    filters: filters.clone(),
                },
            )
            .await?;
        }
        debug!(subscription = subscription_id, "Subscription registered");
        Ok(())
    }

    async fn unsubscribe(&self, subscription_id: &str) -> Result<(), RelayError> {
        for handle in &self.handles {
            Self::send(
                handle,
                RelayCommand::Unsubscribe {
                    subscription_id: subscription_id.to_string(),
                },
            )
            .await?;
        }
        Ok(())
    }

    async fn query(
        &self,
        relay: &str,
        filters: Vec<Filter>,
    ) -> Result<Vec<TransportEvent>, RelayError> {
        let handle = self.handle(relay)?;
        let subscription_id = format!("zp-query-{}", Uuid::new_v4().simple());
        let (reply, rx) = oneshot::channel();
        Self::send(
            handle,
            RelayCommand::Query {
                subscription_id: subscription_id.clone(),
                filters,
                reply,
            },
        )
        .await?;

        match tokio::time::timeout(self.config.query_timeout(), rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(RelayError::PoolShutdown),
            Err(_) => {
                let _ = handle
                    .commands
                    .try_send(RelayCommand::CancelQuery { subscription_id });
                Err(RelayError::Timeout("query"))
            }
        }
    }

    async fn publish(&self, event: &TransportEvent) -> Result<PublishReport, RelayError> {
        let started = Instant::now();
        let outcomes = join_all(self.handles.iter().map(|handle| async move {
            let outcome = self.publish_to(handle, event.clone()).await;
            (handle.url.clone(), outcome)
        }))
        .await;

        let mut accepted = Vec::new();
        let mut failed = Vec::new();
        for (url, outcome) in outcomes {
            match outcome {
                Ok(()) => accepted.push(url),
                Err(e) => failed.push((url, e.to_string())),
            }
        }
        let report = PublishReport {
            event_id: event.id.clone(),
            accepted,
            failed,
            elapsed: started.elapsed(),
        };

        if report.is_success() {
            info!(
                event_id = %report.event_id,
                accepted = report.accepted.len(),
                failed = report.failed.len(),
                "Event published"
            );
            Ok(report)
        } else {
            warn!(event_id = %report.event_id, "No relay accepted event");
            Err(RelayError::NoRelayAccepted {
                event_id: report.event_id.to_string(),
                failures: report.failed,
            })
        }
    }
}
