//! # ZP-08 Receipts
//!
//! A paid placement counts only once a receipt for the same amount shows up.
//! The two halves arrive independently, in either order, possibly from
//! different relays:
//!
//! ```text
//! placement(id, amount) ──┐
//!                         ├── same id, same amount ──▶ Settled(placement)
//! receipt(→id, amount) ───┘   same id, other amount ──▶ Mismatch (receipt dropped)
//! ```
//!
//! Unmatched halves wait in bounded tables. Entries older than the pending
//! TTL are expired, and a table that outgrows its cap drops its older half.
//! Expired and evicted placement ids are handed back so their provisional
//! paint can be reverted.

#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod service;

// Re-exports
pub use config::ReceiptConfig;
pub use domain::{Correlation, ReceiptError};
pub use service::ReceiptCorrelator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
