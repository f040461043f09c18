//! # Canvas Client
//!
//! Connects to the configured relays, follows the canvas and logs every
//! cell change until Ctrl-C.
//!
//! ## Environment
//!
//! Telemetry: `ZP_LOG_LEVEL`, `ZP_JSON_LOGS`. Client: `ZP_CONFIG`,
//! `ZP_RELAYS`, `ZP_CANVAS_PUBKEY`, `ZP_SINCE`, `ZP_PAGE_SIZE`, `ZP_LNURL`,
//! `ZP_SECRET_KEY`.

use std::sync::Arc;

use anyhow::Context;
use canvas_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use client_runtime::adapters::{ExternalWallet, LnurlInvoiceProvider, LocalSigner};
use client_runtime::{CanvasClient, ClientConfig, ClientDeps};
use shared_types::CellChange;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use zp_05_relay_pool::WsConnector;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _telemetry = init_telemetry(&TelemetryConfig::from_env())?;

    let config = ClientConfig::load().context("loading configuration")?;
    config.validate().context("validating configuration")?;
    info!(
        relays = config.relay_pool.relays.len(),
        canvas = %config.canvas_pubkey,
        "Starting canvas client"
    );

    let signer = match &config.secret_key {
        Some(secret) => LocalSigner::from_secret_hex(secret)?,
        None => {
            warn!("ZP_SECRET_KEY not set, signing with an ephemeral key");
            LocalSigner::ephemeral()
        }
    };
    let deps = ClientDeps {
        connector: Arc::new(WsConnector),
        signer: Arc::new(signer),
        invoices: Arc::new(LnurlInvoiceProvider::new(config.lnurl_endpoint.clone())?),
        wallet: Arc::new(ExternalWallet),
    };

    let client = CanvasClient::start(config, deps).await?;
    let startup = client.startup();
    info!(
        history_events = startup.history_events,
        applied = startup.applied,
        cells = client.painted_cells(),
        "Canvas loaded"
    );

    let mut changes = client.subscribe_changes();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received");
                break;
            }
            change = changes.recv() => match change {
                Ok(CellChange::Painted { coord, paint }) => info!(
                    %coord,
                    color = %paint.color,
                    author = %paint.author,
                    settled = paint.valid,
                    "Cell painted"
                ),
                Ok(CellChange::Cleared { coord }) => info!(%coord, "Cell cleared"),
                Err(RecvError::Lagged(missed)) => warn!(missed, "Change log lagging"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    client.shutdown().await;
    match encode_metrics() {
        Ok(text) => debug!(metrics = %text, "Final metrics"),
        Err(e) => warn!(error = %e, "Could not encode metrics"),
    }
    Ok(())
}
