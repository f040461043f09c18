//! # Canvas Telemetry
//!
//! Logging and metrics for the canvas client.
//!
//! ## Components
//!
//! - **Logs**: `tracing` subscriber with an env filter, plain or JSON output
//! - **Metrics**: Prometheus counters and gauges in a private registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use canvas_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ZP_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter directives |
//! | `ZP_JSON_LOGS` | `false` | Emit JSON lines instead of text |
//! | `ZP_CONSOLE_OUTPUT` | `true` | Write logs to stdout at all |
//! | `ZP_SERVICE_NAME` | `zappy-place` | Service name in the startup line |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, CELLS_PAINTED, EVENTS_RECEIVED, EVENTS_REJECTED,
    PENDING_PLACEMENTS, PLACEMENTS_APPLIED, PUBLISH_DURATION, RECEIPTS, RELAYS_CONNECTED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install log subscriber: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Installs the global subscriber and registers all metrics.
///
/// Returns a guard to hold for the lifetime of the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    init_logging(config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
    })
}

/// Keeps telemetry active. Logs a final line when dropped.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
