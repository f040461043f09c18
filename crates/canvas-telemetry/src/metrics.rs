//! Prometheus metrics for the canvas client.
//!
//! All metrics follow the naming convention: `zp_<area>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: events received, rejected, applied
//! - **Gauge**: connected relays, pending placements
//! - **Histogram**: publish round-trip latency

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Registry holding every canvas metric
    pub static ref REGISTRY: Registry = Registry::new();

    /// Events handed to the pipeline
    pub static ref EVENTS_RECEIVED: CounterVec = CounterVec::new(
        Opts::new("zp_events_received_total", "Events handed to the pipeline"),
        &["topic", "origin"]
    ).expect("metric creation failed");

    /// Events dropped before reaching the canvas
    pub static ref EVENTS_REJECTED: CounterVec = CounterVec::new(
        Opts::new("zp_events_rejected_total", "Events rejected by the pipeline"),
        &["reason"]  // duplicate/forged/undecodable/foreign/invalid
    ).expect("metric creation failed");

    /// Placements that passed validation and were painted
    pub static ref PLACEMENTS_APPLIED: Counter = Counter::new(
        "zp_canvas_placements_applied_total",
        "Placements painted onto the canvas"
    ).expect("metric creation failed");

    /// Cells whose visible paint changed
    pub static ref CELLS_PAINTED: Counter = Counter::new(
        "zp_canvas_cells_painted_total",
        "Cell paint changes emitted"
    ).expect("metric creation failed");

    /// Receipt handling outcomes
    pub static ref RECEIPTS: CounterVec = CounterVec::new(
        Opts::new("zp_receipts_total", "Payment receipts by outcome"),
        &["outcome"]  // matched/pending/mismatched/legacy/ignored/expired
    ).expect("metric creation failed");

    /// Placements waiting for their receipt
    pub static ref PENDING_PLACEMENTS: Gauge = Gauge::new(
        "zp_receipts_pending_placements",
        "Placements awaiting a payment receipt"
    ).expect("metric creation failed");

    /// Relays currently connected
    pub static ref RELAYS_CONNECTED: Gauge = Gauge::new(
        "zp_relays_connected",
        "Number of relays with an open connection"
    ).expect("metric creation failed");

    /// Time from publish to the last relay answer
    pub static ref PUBLISH_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "zp_relay_publish_duration_seconds",
            "Time spent publishing an event to all relays"
        ).buckets(exponential_buckets(0.01, 2.0, 12).expect("bucket layout"))
    ).expect("metric creation failed");
}

/// Registers every metric with [`REGISTRY`]. Safe to call more than once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(EVENTS_RECEIVED.clone()),
        Box::new(EVENTS_REJECTED.clone()),
        Box::new(PLACEMENTS_APPLIED.clone()),
        Box::new(CELLS_PAINTED.clone()),
        Box::new(RECEIPTS.clone()),
        Box::new(PENDING_PLACEMENTS.clone()),
        Box::new(RELAYS_CONNECTED.clone()),
        Box::new(PUBLISH_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
