//! Ports for history sync.

pub mod outbound;

pub use outbound::HistorySource;
