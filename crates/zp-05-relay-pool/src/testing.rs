//! In-memory relay network for tests.
//!
//! Each mock relay keeps a store of events and answers REQ, CLOSE and EVENT
//! frames the way a real relay does: stored matches newest first, then EOSE,
//! then live delivery of anything published or injected later.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Filter, TransportEvent};
use tokio::sync::mpsc;

use crate::domain::{ClientMessage, RelayError, RelayMessage};
use crate::ports::{RelayConnector, RelayTransport};

#[derive(Default)]
struct Session {
    outbox: Option<mpsc::UnboundedSender<RelayMessage>>,
    subscriptions: HashMap<String, Vec<Filter>>,
}

impl Session {
    fn push(&self, message: RelayMessage) {
        if let Some(outbox) = &self.outbox {
            let _ = outbox.send(message);
        }
    }
}

#[derive(Default)]
struct MockRelay {
    stored: Vec<TransportEvent>,
    sessions: HashMap<u64, Session>,
    next_session: u64,
    connect_attempts: u32,
    failures_left: u32,
    refuse: bool,
    reject_publishes: Option<String>,
    close_queries: Option<String>,
    requests: Vec<ClientMessage>,
}

impl MockRelay {
    fn replay(&self, filters: &[Filter]) -> Vec<TransportEvent> {
        let mut newest_first = self.stored.clone();
        newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut out: Vec<TransportEvent> = Vec::new();
        for filter in filters {
            let limit = filter.limit.unwrap_or(usize::MAX);
            for event in newest_first.iter().filter(|e| filter.matches(e)).take(limit) {
                if !out.iter().any(|o| o.id == event.id) {
                    out.push(event.clone());
                }
            }
        }
        out
    }

    fn deliver(&self, event: &TransportEvent) {
        for session in self.sessions.values() {
            for (subscription_id, filters) in &session.subscriptions {
                if filters.iter().any(|f| f.matches(event)) {
                    session.push(RelayMessage::Event {
                        subscription_id: subscription_id.clone(),
                        event: event.clone(),
                    });
                }
            }
        }
    }

    fn store(&mut self, event: TransportEvent) -> bool {
        if self.stored.iter().any(|e| e.id == event.id) {
            return false;
        }
        self.stored.push(event);
        true
    }
}

#[derive(Default)]
struct NetworkState {
    relays: HashMap<String, MockRelay>,
}

/// A set of fake relays shared by every connector cloned from it.
#[derive(Clone, Default)]
pub struct MockRelayNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl MockRelayNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_relay(&self, url: &str) {
        self.state.lock().relays.entry(url.to_string()).or_default();
    }

    pub fn connector(&self) -> MockConnector {
        MockConnector {
            network: self.clone(),
        }
    }

    /// Adds an event to a relay's store without live delivery.
    pub fn store(&self, url: &str, event: TransportEvent) {
        self.with_relay(url, |relay| {
            relay.store(event);
        });
    }

    /// Stores an event and delivers it to matching live subscriptions, as if
    /// another client had published it.
    pub fn inject(&self, url: &str, event: TransportEvent) {
        self.with_relay(url, |relay| {
            if relay.store(event.clone()) {
                relay.deliver(&event);
            }
        });
    }

    /// The next `count` connection attempts fail.
    pub fn fail_next_connects(&self, url: &str, count: u32) {
        self.with_relay(url, |relay| relay.failures_left = count);
    }

    /// Every connection attempt fails.
    pub fn refuse(&self, url: &str) {
        self.with_relay(url, |relay| relay.refuse = true);
    }

    /// Answers every EVENT with `OK false`.
    pub fn reject_publishes(&self, url: &str, reason: &str) {
        self.with_relay(url, |relay| relay.reject_publishes = Some(reason.to_string()));
    }

    /// Answers every REQ with CLOSED.
    pub fn close_queries(&self, url: &str, reason: &str) {
        self.with_relay(url, |relay| relay.close_queries = Some(reason.to_string()));
    }

    /// Ends every open connection as a clean peer close.
    pub fn drop_connections(&self, url: &str) {
        self.with_relay(url, |relay| relay.sessions.clear());
    }

    /// Ends one subscription from the relay's side.
    pub fn close_subscription(&self, url: &str, subscription_id: &str, reason: &str) {
        self.with_relay(url, |relay| {
            for session in relay.sessions.values_mut() {
                if session.subscriptions.remove(subscription_id).is_some() {
                    session.push(RelayMessage::Closed {
                        subscription_id: subscription_id.to_string(),
                        message: reason.to_string(),
                    });
                }
            }
        });
    }

    pub fn connect_attempts(&self, url: &str) -> u32 {
        self.with_relay(url, |relay| relay.connect_attempts)
    }

    /// Every frame the relay received, in order.
    pub fn requests(&self, url: &str) -> Vec<ClientMessage> {
        self.with_relay(url, |relay| relay.requests.clone())
    }

    pub fn stored(&self, url: &str) -> Vec<TransportEvent> {
        self.with_relay(url, |relay| relay.stored.clone())
    }

    /// Open subscription ids across all sessions, sorted.
    pub fn live_subscriptions(&self, url: &str) -> Vec<String> {
        self.with_relay(url, |relay| {
            let mut ids: Vec<String> = relay
                .sessions
                .values()
                .flat_map(|s| s.subscriptions.keys().cloned())
                .collect();
            ids.sort();
            ids.dedup();
            ids
        })
    }

    fn with_relay<T: Default>(&self, url: &str, f: impl FnOnce(&mut MockRelay) -> T) -> T {
        let mut state = self.state.lock();
        state.relays.get_mut(url).map(f).unwrap_or_default()
    }

    fn connect(&self, url: &str) -> Result<MockTransport, RelayError> {
        let mut state = self.state.lock();
        let refused = |reason: &str| RelayError::Connect {
            url: url.to_string(),
            reason: reason.to_string(),
        };
        let relay = state
            .relays
            .get_mut(url)
            .ok_or_else(|| refused("no such relay"))?;
        relay.connect_attempts += 1;
        if relay.refuse {
            return Err(refused("connection refused"));
        }
        if relay.failures_left > 0 {
            relay.failures_left -= 1;
            return Err(refused("connection reset"));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let session_id = relay.next_session;
        relay.next_session += 1;
        relay.sessions.insert(
            session_id,
            Session {
                outbox: Some(tx),
                subscriptions: HashMap::new(),
            },
        );
        Ok(MockTransport {
            url: url.to_string(),
            session_id,
            network: self.clone(),
            inbox: rx,
        })
    }

    fn handle_frame(
        &self,
        url: &str,
        session_id: u64,
        message: ClientMessage,
    ) -> Result<(), RelayError> {
        let mut state = self.state.lock();
        let relay = state
            .relays
            .get_mut(url)
            .ok_or(RelayError::ConnectionClosed)?;
        if !relay.sessions.contains_key(&session_id) {
            return Err(RelayError::ConnectionClosed);
        }
        relay.requests.push(message.clone());

        match message {
            ClientMessage::Req {
                subscription_id,
                filters,
            } => {
                let session = &relay.sessions[&session_id];
                if let Some(reason) = &relay.close_queries {
                    session.push(RelayMessage::Closed {
                        subscription_id,
                        message: reason.clone(),
                    });
                    return Ok(());
                }
                for event in relay.replay(&filters) {
                    session.push(RelayMessage::Event {
                        subscription_id: subscription_id.clone(),
                        event,
                    });
                }
                session.push(RelayMessage::Eose(subscription_id.clone()));
                if let Some(session) = relay.sessions.get_mut(&session_id) {
                    session.subscriptions.insert(subscription_id, filters);
                }
            }
            ClientMessage::Close(subscription_id) => {
                if let Some(session) = relay.sessions.get_mut(&session_id) {
                    session.subscriptions.remove(&subscription_id);
                }
            }
            ClientMessage::Event(event) => {
                let event_id = event.id.clone();
                let verdict = match relay.reject_publishes.clone() {
                    Some(reason) => (false, reason),
                    None => {
                        if relay.store(event.clone()) {
                            relay.deliver(&event);
                        }
                        (true, String::new())
                    }
                };
                relay.sessions[&session_id].push(RelayMessage::Ok {
                    event_id,
                    accepted: verdict.0,
                    message: verdict.1,
                });
            }
        }
        Ok(())
    }

    fn end_session(&self, url: &str, session_id: u64) {
        if let Some(relay) = self.state.lock().relays.get_mut(url) {
            relay.sessions.remove(&session_id);
        }
    }
}

/// Connector handing out [`MockTransport`]s.
#[derive(Clone)]
pub struct MockConnector {
    network: MockRelayNetwork,
}

#[async_trait]
impl RelayConnector for MockConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn RelayTransport>, RelayError> {
        Ok(Box::new(self.network.connect(url)?))
    }
}

/// One session with a mock relay.
pub struct MockTransport {
    url: String,
    session_id: u64,
    network: MockRelayNetwork,
    inbox: mpsc::UnboundedReceiver<RelayMessage>,
}

#[async_trait]
impl RelayTransport for MockTransport {
    async fn send(&mut self, message: ClientMessage) -> Result<(), RelayError> {
        self.network.handle_frame(&self.url, self.session_id, message)
    }

    async fn recv(&mut self) -> Option<Result<RelayMessage, RelayError>> {
        self.inbox.recv().await.map(Ok)
    }

    async fn close(&mut self) {
        self.network.end_session(&self.url, self.session_id);
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        self.network.end_session(&self.url, self.session_id);
    }
}
