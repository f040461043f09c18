//! One task per relay: connect, serve, back off, repeat.

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use shared_bus::{EventPublisher, InboundEvent, InboundSender, Origin};
use shared_types::{
    unix_now, EventId, Filter, RelayNotice, RelayRecord, RelayStatus, TransportEvent,
};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

use super::commands::{RelayCommand, Reply};
use crate::domain::{BackoffPolicy, ClientMessage, RelayError, RelayMessage};
use crate::ports::{RelayConnector, RelayTransport};

pub(crate) type RecordTable = Arc<RwLock<HashMap<String, RelayRecord>>>;

enum SessionEnd {
    Shutdown,
    PeerClosed,
    Failed(RelayError),
}

enum Step {
    Command(Option<RelayCommand>),
    Message(Option<Result<RelayMessage, RelayError>>),
}

struct PendingQuery {
    events: Vec<TransportEvent>,
    reply: Reply<Vec<TransportEvent>>,
}

pub(crate) struct RelayWorker {
    url: String,
    connector: Arc<dyn RelayConnector>,
    policy: BackoffPolicy,
    connect_timeout: Duration,
    records: RecordTable,
    status_tx: Arc<watch::Sender<u64>>,
    bus: InboundSender,
    commands: mpsc::Receiver<RelayCommand>,
    /// Live subscriptions, re-issued on every new connection.
    subscriptions: HashMap<String, Vec<Filter>>,
    queries: HashMap<String, PendingQuery>,
    publishes: HashMap<EventId, Vec<Reply<()>>>,
}

impl RelayWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        url: String,
        connector: Arc<dyn RelayConnector>,
        policy: BackoffPolicy,
        connect_timeout: Duration,
        records: RecordTable,
        status_tx: Arc<watch::Sender<u64>>,
        bus: InboundSender,
        commands: mpsc::Receiver<RelayCommand>,
    ) -> Self {
        Self {
            url,
            connector,
            policy,
            connect_timeout,
            records,
            status_tx,
            bus,
            commands,
            subscriptions: HashMap::new(),
            queries: HashMap::new(),
            publishes: HashMap::new(),
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            self.transition(RelayStatus::Connecting);
            let attempt =
                tokio::time::timeout(self.connect_timeout, self.connector.connect(&self.url)).await;

            let end = match attempt {
                Ok(Ok(transport)) => {
                    self.transition(RelayStatus::Connected);
                    info!(relay = %self.url, subscriptions = self.subscriptions.len(), "Relay connected");
                    self.serve(transport).await
                }
                Ok(Err(e)) => SessionEnd::Failed(e),
                Err(_) => SessionEnd::Failed(RelayError::Timeout("connect")),
            };
            self.fail_pending();

            match end {
                SessionEnd::Shutdown => {
                    self.transition(RelayStatus::Disconnected);
                    debug!(relay = %self.url, "Relay task stopped");
                    return;
                }
                SessionEnd::PeerClosed => {
                    self.transition(RelayStatus::Disconnected);
                    warn!(relay = %self.url, "Relay closed the connection");
                }
                SessionEnd::Failed(e) => {
                    let record = self.transition(RelayStatus::Error);
                    warn!(relay = %self.url, error = %e, errors = record.error_count, "Relay connection failed");
                }
            }

            let errors = self.error_count();
            if !self.policy.should_retry(errors) {
                error!(relay = %self.url, attempts = errors, "Giving up on relay");
                self.park(errors).await;
                self.transition(RelayStatus::Disconnected);
                return;
            }

            let delay = self.policy.delay(errors);
            debug!(relay = %self.url, delay_ms = delay.as_millis() as u64, "Reconnecting after backoff");
            if self.wait_offline(delay).await.is_break() {
                self.transition(RelayStatus::Disconnected);
                return;
            }
        }
    }

    async fn serve(&mut self, mut transport: Box<dyn RelayTransport>) -> SessionEnd {
        let live: Vec<(String, Vec<Filter>)> = self
            .subscriptions
            .iter()
            .map(|(id, filters)| (id.clone(), filters.clone()))
            .collect();
        for (subscription_id, filters) in live {
            let req = ClientMessage::Req {
                subscription_id,
                filters,
            };
            if let Err(e) = transport.send(req).await {
                return SessionEnd::Failed(e);
            }
        }

        loop {
            let step = tokio::select! {
                command = self.commands.recv() => Step::Command(command),
                message = transport.recv() => Step::Message(message),
            };

            let outcome = match step {
                Step::Command(None) | Step::Command(Some(RelayCommand::Shutdown)) => {
                    transport.close().await;
                    return SessionEnd::Shutdown;
                }
                Step::Command(Some(command)) => {
                    self.handle_command(transport.as_mut(), command).await
                }
                Step::Message(None) => return SessionEnd::PeerClosed,
                Step::Message(Some(Err(e))) => return SessionEnd::Failed(e),
                Step::Message(Some(Ok(message))) => {
                    self.handle_message(transport.as_mut(), message).await
                }
            };

            if let Err(e) = outcome {
                return SessionEnd::Failed(e);
            }
        }
    }

    async fn handle_command(
        &mut self,
        transport: &mut dyn RelayTransport,
        command: RelayCommand,
    ) -> Result<(), RelayError> {
        match command {
            RelayCommand::Subscribe {
                subscription_id,
                filters,
            } => {
                self.subscriptions
                    .insert(subscription_id.clone(), filters.clone());
                transport
                    .send(ClientMessage::Req {
                        subscription_id,
                        filters,
                    })
                    .await
            }
            RelayCommand::Unsubscribe { subscription_id } => {
                if self.subscriptions.remove(&subscription_id).is_some() {
                    transport.send(ClientMessage::Close(subscription_id)).await
                } else {
                    Ok(())
                }
            }
            RelayCommand::Query {
                subscription_id,
                filters,
                reply,
            } => {
                self.queries.insert(
                    subscription_id.clone(),
                    PendingQuery {
                        events: Vec::new(),
                        reply,
                    },
                );
                transport
                    .send(ClientMessage::Req {
                        subscription_id,
                        filters,
                    })
                    .await
            }
            RelayCommand::CancelQuery { subscription_id } => {
                if self.queries.remove(&subscription_id).is_some() {
                    transport.send(ClientMessage::Close(subscription_id)).await
                } else {
                    Ok(())
                }
            }
            RelayCommand::Publish { event, reply } => {
                self.publishes
                    .entry(event.id.clone())
                    .or_default()
                    .push(reply);
                transport.send(ClientMessage::Event(event)).await
            }
            // Handled by the caller.
            RelayCommand::Shutdown => Ok(()),
        }
    }

    async fn handle_message(
        &mut self,
        transport: &mut dyn RelayTransport,
        message: RelayMessage,
    ) -> Result<(), RelayError> {
        match message {
            RelayMessage::Event {
                subscription_id,
                event,
            } => {
                if let Some(query) = self.queries.get_mut(&subscription_id) {
                    query.events.push(event);
                } else if self.subscriptions.contains_key(&subscription_id) {
                    match InboundEvent::from_relay(&self.url, Origin::Live, event) {
                        Some(inbound) => {
                            self.bus.publish(inbound).await;
                        }
                        None => trace!(relay = %self.url, "Ignoring event of unrelated kind"),
                    }
                } else {
                    trace!(relay = %self.url, subscription = %subscription_id, "Event for unknown subscription");
                }
            }
            RelayMessage::Eose(subscription_id) => {
                if let Some(query) = self.queries.remove(&subscription_id) {
                    debug!(relay = %self.url, events = query.events.len(), "Query complete");
                    let _ = query.reply.send(Ok(query.events));
                    transport.send(ClientMessage::Close(subscription_id)).await?;
                } else if self.subscriptions.contains_key(&subscription_id) {
                    debug!(relay = %self.url, subscription = %subscription_id, "Live subscription caught up");
                }
            }
            RelayMessage::Closed {
                subscription_id,
                message,
            } => {
                let notice = RelayNotice::SubscriptionClosed {
                    relay: self.url.clone(),
                    subscription_id: subscription_id.clone(),
                    reason: message.clone(),
                };
                if let Some(query) = self.queries.remove(&subscription_id) {
                    let _ = query.reply.send(Err(notice.into()));
                } else if self.subscriptions.remove(&subscription_id).is_some() {
                    warn!(relay = %self.url, subscription = %subscription_id, reason = %message, "Relay closed subscription");
                    self.bus
                        .publish(InboundEvent::SubscriptionClosed {
                            relay: self.url.clone(),
                            subscription_id,
                            reason: message,
                        })
                        .await;
                }
            }
            RelayMessage::Ok {
                event_id,
                accepted,
                message,
            } => {
                if let Some(waiters) = self.publishes.remove(&event_id) {
                    for waiter in waiters {
                        let outcome = if accepted {
                            Ok(())
                        } else {
                            Err(RelayNotice::EventRejected {
                                relay: self.url.clone(),
                                event_id: event_id.to_string(),
                                reason: message.clone(),
                            }
                            .into())
                        };
                        let _ = waiter.send(outcome);
                    }
                }
            }
            RelayMessage::Notice(text) => {
                info!(relay = %self.url, notice = %text, "Relay notice");
            }
            RelayMessage::Auth(_) => {
                debug!(relay = %self.url, "Ignoring auth challenge");
            }
        }
        Ok(())
    }

    /// Sleeps out the backoff while still answering commands.
    async fn wait_offline(&mut self, delay: Duration) -> ControlFlow<()> {
        let deadline = Instant::now() + delay;
        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => return ControlFlow::Continue(()),
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        return ControlFlow::Break(());
                    };
                    let reason = RelayError::NotConnected(self.url.clone());
                    if self.handle_offline(command, reason).is_break() {
                        return ControlFlow::Break(());
                    }
                }
            }
        }
    }

    /// Answers commands after the relay was given up, until shutdown.
    async fn park(&mut self, attempts: u32) {
        while let Some(command) = self.commands.recv().await {
            let reason = RelayError::GaveUp {
                url: self.url.clone(),
                attempts,
            };
            if self.handle_offline(command, reason).is_break() {
                return;
            }
        }
    }

    fn handle_offline(&mut self, command: RelayCommand, reason: RelayError) -> ControlFlow<()> {
        match command {
            RelayCommand::Shutdown => return ControlFlow::Break(()),
            RelayCommand::Subscribe {
                subscription_id,
                filters,
            } => {
                self.subscriptions.insert(subscription_id, filters);
            }
            RelayCommand::Unsubscribe { subscription_id } => {
                self.subscriptions.remove(&subscription_id);
            }
            RelayCommand::Query { reply, .. } => {
                let _ = reply.send(Err(reason));
            }
            RelayCommand::Publish { reply, .. } => {
                let _ = reply.send(Err(reason));
            }
            RelayCommand::CancelQuery { .. } => {}
        }
        ControlFlow::Continue(())
    }

    fn fail_pending(&mut self) {
        for (_, query) in self.queries.drain() {
            let _ = query.reply.send(Err(RelayError::ConnectionClosed));
        }
        for (_, waiters) in self.publishes.drain() {
            for waiter in waiters {
                let _ = waiter.send(Err(RelayError::ConnectionClosed));
            }
        }
    }

    fn error_count(&self) -> u32 {
        self.records
            .read()
            .get(&self.url)
            .map(|r| r.error_count)
            .unwrap_or(0)
    }

    /// Applies a status change, then notifies watchers and the bus.
    fn transition(&self, status: RelayStatus) -> RelayRecord {
        let record = {
            let mut records = self.records.write();
            let record = records
                .entry(self.url.clone())
                .or_insert_with(|| RelayRecord::new(self.url.clone()));
            match status {
                RelayStatus::Connected => {
                    record.error_count = 0;
                    record.last_connected = Some(unix_now());
                }
                RelayStatus::Error => record.error_count = record.error_count.saturating_add(1),
                RelayStatus::Connecting | RelayStatus::Disconnected => {}
            }
            record.status = status;
            record.clone()
        };
        self.status_tx.send_modify(|version| *version = version.wrapping_add(1));
        self.bus
            .try_publish(InboundEvent::RelayStatusChanged(record.clone()));
        record
    }
}
