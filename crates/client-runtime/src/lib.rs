//! # Client Runtime Library
//!
//! Exposes the wiring of the canvas client for tests and embedding. The
//! `canvas-client` binary in `main.rs` is the main entry point.
//!
//! ## Data Flow
//!
//! ```text
//! relays ─▶ RelayPool ─▶ InboundEvent ─▶ Dispatcher ─▶ EventPipeline ─▶ ChangeFeed
//!              ▲                                          ▲
//!              │ REQ (paged)                              │ replay
//!          HistoricalSync ────────────────────────────────┘
//! ```
//!
//! - **Hexagonal Architecture**: ports for signing, invoices and wallets,
//!   adapters bind them to local keys, LNURL and the relay pool
//! - **Single consumer**: one mutex-guarded pipeline owns all canvas state

#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod client;
pub mod container;
pub mod errors;
pub mod handlers;
pub mod testing;

pub use client::{CanvasClient, ClientDeps, PaymentStatus, StartupReport, Submission};
pub use container::{ClientConfig, ConfigError};
pub use errors::ClientError;
pub use handlers::{EventPipeline, IngestOutcome};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
