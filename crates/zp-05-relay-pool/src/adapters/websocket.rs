//! WebSocket transport over tokio-tungstenite.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::domain::{ClientMessage, RelayError, RelayMessage};
use crate::ports::{RelayConnector, RelayTransport};

/// Connects to `ws://` and `wss://` relays.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

#[async_trait]
impl RelayConnector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn RelayTransport>, RelayError> {
        let (stream, _) = connect_async(url).await.map_err(|e| RelayError::Connect {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Box::new(WsTransport {
            url: url.to_string(),
            stream,
        }))
    }
}

struct WsTransport {
    url: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl RelayTransport for WsTransport {
    async fn send(&mut self, message: ClientMessage) -> Result<(), RelayError> {
        let text = message.to_json()?;
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<RelayMessage, RelayError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => match RelayMessage::from_json(&text) {
                    Ok(message) => return Some(Ok(message)),
                    Err(e) => {
                        debug!(relay = %self.url, error = %e, "Ignoring unparseable frame");
                    }
                },
                Ok(Message::Ping(data)) => {
                    if let Err(e) = self.stream.send(Message::Pong(data)).await {
                        return Some(Err(RelayError::Transport(e.to_string())));
                    }
                }
                Ok(Message::Close(_)) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(RelayError::Transport(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}
