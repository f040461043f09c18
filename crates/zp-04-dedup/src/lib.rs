//! # ZP-04 Dedup
//!
//! Remembers which event ids have already been processed so that the same
//! event arriving from several relays, or from history and live at once,
//! is applied exactly once.
//!
//! Memory is bounded. Once the set grows past its capacity the oldest half
//! is forgotten. An event older than that window could in principle be
//! processed again; canvas resolution is idempotent for a repeated event, so
//! the only cost is duplicate work.

#![warn(clippy::all)]

pub mod config;
pub mod domain;

pub use config::DedupConfig;
pub use domain::ProcessedEventSet;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
