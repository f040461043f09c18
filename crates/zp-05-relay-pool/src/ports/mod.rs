//! Ports for the relay pool.

pub mod inbound;
pub mod outbound;

pub use inbound::RelayPoolApi;
pub use outbound::{RelayConnector, RelayTransport};
