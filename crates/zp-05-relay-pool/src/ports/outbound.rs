//! Outbound ports (SPI) the relay pool drives.

use async_trait::async_trait;

use crate::domain::{ClientMessage, RelayError, RelayMessage};

/// Opens connections to relays.
#[async_trait]
pub trait RelayConnector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn RelayTransport>, RelayError>;
}

/// One open relay connection.
#[async_trait]
pub trait RelayTransport: Send {
    async fn send(&mut self, message: ClientMessage) -> Result<(), RelayError>;

    /// Next frame. `None` once the peer has closed the connection.
    /// Must be cancel safe.
    async fn recv(&mut self) -> Option<Result<RelayMessage, RelayError>>;

    async fn close(&mut self);
}
