//! Standing subscription with unbounded restarts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use shared_types::{unix_now, Timestamp};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::LiveFeedConfig;
use crate::domain::{live_filter, LiveFeedError};
use crate::ports::SubscriptionPort;

/// Keeps the live canvas subscription open.
pub struct LiveSubscriber {
    config: LiveFeedConfig,
    port: Arc<dyn SubscriptionPort>,
    /// `since` of the initial subscription while running.
    started_at: Mutex<Option<Timestamp>>,
    restarts: AtomicU64,
}

impl LiveSubscriber {
    pub fn new(config: LiveFeedConfig, port: Arc<dyn SubscriptionPort>) -> Self {
        Self {
            config,
            port,
            started_at: Mutex::new(None),
            restarts: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &LiveFeedConfig {
        &self.config
    }

    /// Opens the subscription on every relay for events at or after `since`.
    pub async fn start(&self, since: Timestamp) -> Result<(), LiveFeedError> {
        let filter = live_filter(&self.config, since);
        self.port
            .open(None, &self.config.subscription_id, vec![filter])
            .await?;
        *self.started_at.lock() = Some(since);
        info!(
            subscription = %self.config.subscription_id,
            since,
            "Live subscription opened"
        );
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.started_at.lock().is_some()
    }

    /// Handles a relay closing a subscription. Returns whether it was ours
    /// and has been re-issued.
    pub async fn on_closed(
        &self,
        relay: &str,
        subscription_id: &str,
        now: Timestamp,
    ) -> Result<bool, LiveFeedError> {
        if subscription_id != self.config.subscription_id {
            return Ok(false);
        }
        let Some(started_at) = *self.started_at.lock() else {
            return Err(LiveFeedError::NotStarted);
        };

        let since = now
            .saturating_sub(self.config.restart_overlap_secs)
            .max(started_at);
        let filter = live_filter(&self.config, since);
        self.port
            .open(Some(relay), subscription_id, vec![filter])
            .await?;
        let restarts = self.restarts.fetch_add(1, Ordering::Relaxed) + 1;
        info!(relay, subscription = subscription_id, since, restarts, "Live subscription re-issued");
        Ok(true)
    }

    /// Closes the subscription everywhere.
    pub async fn stop(&self) -> Result<(), LiveFeedError> {
        if self.started_at.lock().take().is_none() {
            return Err(LiveFeedError::NotStarted);
        }
        self.port.close(&self.config.subscription_id).await?;
        debug!(subscription = %self.config.subscription_id, "Live subscription closed");
        Ok(())
    }

    /// Subscriptions re-issued since start.
    pub fn restarts(&self) -> u64 {
        self.restarts.load(Ordering::Relaxed)
    }

    /// Re-issues the subscription for every `(relay, subscription_id)`
    /// close notification received, until the channel closes.
    pub fn spawn_supervisor(
        self: Arc<Self>,
        mut closed: mpsc::Receiver<(String, String)>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some((relay, subscription_id)) = closed.recv().await {
                tokio::time::sleep(self.config.restart_delay()).await;
                match self.on_closed(&relay, &subscription_id, unix_now()).await {
                    Ok(_) => {}
                    Err(LiveFeedError::NotStarted) => {
                        debug!(relay = %relay, "Ignoring close after stop");
                    }
                    Err(e) => {
                        warn!(relay = %relay, error = %e, "Failed to re-issue live subscription");
                    }
                }
            }
            debug!("Live feed supervisor stopped");
        })
    }
}
