//! # ZP-05 Relay Pool
//!
//! Maintains one connection per configured relay and exposes subscribe,
//! query and publish across all of them.
//!
//! ## Connection Lifecycle
//!
//! ```text
//!            connect ok                       peer closes
//! Connecting ──────────▶ Connected ─────────────────────────▶ Disconnected
//!     ▲  │                   │ transport error                    │
//!     │  │ connect fails     ▼                                    │
//!     │  └─────────────▶   Error ── errors < max ──▶ backoff ─────┘
//!     └──────────────────────────────────────────────────┘
//! ```
//!
//! - Backoff is `min(base * 2^(errors - 1), max)`. A peer-initiated close is
//!   not an error and does not grow the delay.
//! - After `max_reconnect_attempts` consecutive failures a relay is given up.
//! - Live subscriptions survive reconnects and are re-issued automatically.
//!
//! ## Module Structure
//!
//! ```text
//! zp-05-relay-pool/
//! ├── domain/          # Wire messages, backoff policy, errors, reports
//! ├── ports/           # RelayPoolApi (inbound), RelayConnector/RelayTransport (outbound)
//! ├── adapters/        # WebSocket connector
//! ├── service/         # RelayPool and per-relay worker tasks
//! ├── testing.rs       # In-memory relay network
//! └── config.rs        # RelayPoolConfig
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;
pub mod testing;

// Re-exports
pub use adapters::WsConnector;
pub use config::RelayPoolConfig;
pub use domain::{BackoffPolicy, ClientMessage, PublishReport, RelayError, RelayMessage};
pub use ports::{RelayConnector, RelayPoolApi, RelayTransport};
pub use service::RelayPool;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
