//! # Canvas Client
//!
//! Wires the relay pool, history backfill, live feed and the event pipeline
//! into one running client.
//!
//! ## Startup
//!
//! 1. Connect to every relay and wait for the first one
//! 2. Backfill history from the connected relays and replay it in order
//! 3. Open the live subscription from the moment history was cut
//! 4. Keep draining the fan-in channel, sweep unsettled placements
//!
//! ## Submission
//!
//! Pre-flight validation, then sign, publish, paint provisionally, and
//! finally try to pay. A failed payment leaves the provisional paint in
//! place until it expires.

use std::sync::Arc;
use std::time::{Duration, Instant};

use canvas_telemetry::PUBLISH_DURATION;
use parking_lot::Mutex;
use shared_bus::{inbound_channel, ChangeFeed, Origin, DEFAULT_CHANNEL_CAPACITY};
use shared_types::{
    unix_now, CellChange, CellCoord, CellPaint, EventId, Pixel, PlacementBatch, RelayRecord,
};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use zp_01_pricing::CostBreakdown;
use zp_02_codec::PlacementCodec;
use zp_05_relay_pool::{PublishReport, RelayConnector, RelayPool, RelayPoolApi};
use zp_06_history_sync::{HistoricalSync, SyncOutcome};
use zp_07_live_feed::LiveSubscriber;

use crate::adapters::{
    EventSigner, InvoiceProvider, PoolSubscriptionPort, RelayHistorySource, Wallet,
};
use crate::container::ClientConfig;
use crate::errors::ClientError;
use crate::handlers::{Dispatcher, EventPipeline, IngestOutcome};

/// Close notifications buffered for the live feed supervisor.
const CLOSED_BUFFER: usize = 64;

/// External collaborators of the client.
pub struct ClientDeps {
    pub connector: Arc<dyn RelayConnector>,
    pub signer: Arc<dyn EventSigner>,
    pub invoices: Arc<dyn InvoiceProvider>,
    pub wallet: Arc<dyn Wallet>,
}

/// Tally of the history replay done by `start`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupReport {
    pub history_events: usize,
    pub applied: usize,
    /// Valid placements already covered by newer paint.
    pub superseded: usize,
    pub pending: usize,
    pub rejected: usize,
    /// Relays whose backfill failed.
    pub failed_sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid { invoice: String },
    Failed { reason: String },
}

/// Result of a submitted placement.
#[derive(Debug, Clone)]
pub struct Submission {
    pub event_id: EventId,
    pub report: PublishReport,
    /// Cells painted provisionally.
    pub provisional_cells: usize,
    pub payment: PaymentStatus,
}

/// A running canvas client.
pub struct CanvasClient {
    config: ClientConfig,
    codec: PlacementCodec,
    pool: Arc<RelayPool>,
    pipeline: Arc<Mutex<EventPipeline>>,
    feed: ChangeFeed,
    live: Arc<LiveSubscriber>,
    signer: Arc<dyn EventSigner>,
    invoices: Arc<dyn InvoiceProvider>,
    wallet: Arc<dyn Wallet>,
    startup: StartupReport,
    shutdown_tx: watch::Sender<bool>,
    dispatcher: Mutex<Option<JoinHandle<u64>>>,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl CanvasClient {
    /// Connects, backfills and subscribes. Fails when no relay connects
    /// within the startup timeout.
    pub async fn start(config: ClientConfig, deps: ClientDeps) -> Result<Self, ClientError> {
        config.validate()?;

        let feed = ChangeFeed::new();
        let pipeline = Arc::new(Mutex::new(EventPipeline::new(
            &config,
            Arc::new(feed.clone()),
        )));
        let codec = pipeline.lock().codec().clone();

        let (inbound_tx, inbound_rx) = inbound_channel(DEFAULT_CHANNEL_CAPACITY);
        let pool = Arc::new(RelayPool::start(
            config.relay_pool.clone(),
            deps.connector,
            inbound_tx,
        ));
        let api: Arc<dyn RelayPoolApi> = pool.clone();
        let live = Arc::new(LiveSubscriber::new(
            config.live_config(),
            Arc::new(PoolSubscriptionPort::new(Arc::clone(&api))),
        ));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (closed_tx, closed_rx) = mpsc::channel(CLOSED_BUFFER);
        let dispatcher = Dispatcher::new(Arc::clone(&pipeline), closed_tx)
            .spawn(inbound_rx, shutdown_rx.clone());
        let background = vec![
            Arc::clone(&live).spawn_supervisor(closed_rx),
            spawn_sweeper(Arc::clone(&pipeline), config.sweep_interval(), shutdown_rx),
        ];

        let mut client = Self {
            config,
            codec,
            pool,
            pipeline,
            feed,
            live,
            signer: deps.signer,
            invoices: deps.invoices,
            wallet: deps.wallet,
            startup: StartupReport::default(),
            shutdown_tx,
            dispatcher: Mutex::new(Some(dispatcher)),
            background: Mutex::new(background),
        };

        let bootstrapped = client.bootstrap(api).await;
        match bootstrapped {
            Ok(report) => {
                info!(
                    history_events = report.history_events,
                    applied = report.applied,
                    superseded = report.superseded,
                    pending = report.pending,
                    "Canvas client started"
                );
                client.startup = report;
                Ok(client)
            }
            Err(e) => {
                client.shutdown().await;
                Err(e)
            }
        }
    }

    async fn bootstrap(&self, api: Arc<dyn RelayPoolApi>) -> Result<StartupReport, ClientError> {
        if !self
            .pool
            .wait_until_connected(self.config.startup_timeout())
            .await
        {
            return Err(ClientError::NotConnected);
        }

        let until = unix_now();
        let sources = RelayHistorySource::for_relays(&api, &self.pool.connected_relays());
        let report = match HistoricalSync::new(self.config.sync_config())
            .sync(&sources, until)
            .await
        {
            Ok(outcome) => self.replay(outcome),
            Err(e) => {
                warn!(error = %e, "History unavailable, continuing with the live feed");
                StartupReport::default()
            }
        };

        self.live.start(until).await?;
        Ok(report)
    }

    /// Feeds backfilled events through the pipeline, oldest first.
    fn replay(&self, outcome: SyncOutcome) -> StartupReport {
        let failed_sources = outcome.failed_sources().map(|r| r.source.clone()).collect();
        let mut report = StartupReport {
            history_events: outcome.events.len(),
            failed_sources,
            ..StartupReport::default()
        };

        let mut pipeline = self.pipeline.lock();
        for event in outcome.events {
            match pipeline.ingest(Origin::History, event, unix_now(), Instant::now()) {
                IngestOutcome::Applied { .. } => report.applied += 1,
                IngestOutcome::Superseded => report.superseded += 1,
                IngestOutcome::Pending => report.pending += 1,
                IngestOutcome::Rejected { .. } => report.rejected += 1,
                IngestOutcome::Duplicate | IngestOutcome::Ignored => {}
            }
        }
        report
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn startup(&self) -> &StartupReport {
        &self.startup
    }

    pub fn public_key(&self) -> String {
        self.signer.public_key()
    }

    /// Publishes a placement and tries to pay for it.
    ///
    /// The batch is checked strictly against the current canvas first. When
    /// the signer declines, nothing is published. Payment problems are
    /// reported in the returned [`Submission`] and never undo the placement.
    pub async fn submit(&self, mut batch: PlacementBatch) -> Result<Submission, ClientError> {
        let now = unix_now();
        batch.timestamp = Some(now);
        batch.author = Some(self.signer.public_key());
        self.pipeline.lock().preflight(&batch, now)?;

        if self.pool.connected_relays().is_empty() {
            return Err(ClientError::NotConnected);
        }

        let unsigned = self.codec.encode_placement(&batch, true, now)?;
        let event = self.signer.sign(unsigned).await?;
        let report = self.pool.publish(&event).await?;
        PUBLISH_DURATION.observe(report.elapsed.as_secs_f64());
        info!(
            event_id = %event.id,
            pixels = batch.len(),
            accepted = report.accepted.len(),
            "Placement published"
        );

        let provisional_cells = self.pipeline.lock().stage_local(&event, Instant::now())?;
        let payment = self.pay(&batch, &event.id).await;

        Ok(Submission {
            event_id: event.id,
            report,
            provisional_cells,
            payment,
        })
    }

    async fn pay(&self, batch: &PlacementBatch, placement_id: &EventId) -> PaymentStatus {
        match self.request_and_pay(batch, placement_id).await {
            Ok(invoice) => PaymentStatus::Paid { invoice },
            Err(e) => {
                warn!(placement_id = %placement_id, error = %e, "Payment failed, placement stays provisional");
                PaymentStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn request_and_pay(
        &self,
        batch: &PlacementBatch,
        placement_id: &EventId,
    ) -> Result<String, ClientError> {
        let request = self
            .codec
            .payment_request(batch, placement_id, unix_now());
        let signed = self.signer.sign(request).await?;
        let invoice = self.invoices.fetch_invoice(batch.amount, &signed).await?;
        self.wallet.pay(&invoice).await?;
        debug!(placement_id = %placement_id, "Invoice paid");
        Ok(invoice)
    }

    /// Price of painting `pixels` now.
    pub fn quote(&self, pixels: &[Pixel]) -> CostBreakdown {
        self.pipeline.lock().quote(pixels, unix_now())
    }

    pub fn cell(&self, coord: CellCoord) -> Option<CellPaint> {
        self.pipeline.lock().cell(coord)
    }

    pub fn painted_cells(&self) -> usize {
        self.pipeline.lock().canvas().len()
    }

    pub fn pending_placements(&self) -> usize {
        self.pipeline.lock().pending_placements()
    }

    pub fn statuses(&self) -> Vec<RelayRecord> {
        self.pool.statuses()
    }

    /// Every cell change from now on.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<CellChange> {
        self.feed.subscribe()
    }

    /// Closes the live subscription, stops every task and disconnects.
    pub async fn shutdown(&self) {
        if let Err(e) = self.live.stop().await {
            debug!(error = %e, "Live feed was not running");
        }
        let _ = self.shutdown_tx.send(true);
        self.pool.shutdown().await;

        let dispatcher = self.dispatcher.lock().take();
        if let Some(task) = dispatcher {
            match task.await {
                Ok(applied) => debug!(applied, "Dispatcher joined"),
                Err(e) => warn!(error = %e, "Dispatcher ended abnormally"),
            }
        }
        let background: Vec<JoinHandle<()>> = std::mem::take(&mut *self.background.lock());
        for task in background {
            if let Err(e) = task.await {
                warn!(error = %e, "Background task ended abnormally");
            }
        }
        info!("Canvas client stopped");
    }
}

fn spawn_sweeper(
    pipeline: Arc<Mutex<EventPipeline>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let cleared = pipeline.lock().expire(Instant::now());
                    if cleared > 0 {
                        debug!(cleared, "Sweep cleared provisional paint");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    })
}
