//! Adapters for outbound ports.

mod websocket;

pub use websocket::WsConnector;
