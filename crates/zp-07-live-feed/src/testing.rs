//! Recording subscription port for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::Filter;

use crate::domain::LiveFeedError;
use crate::ports::SubscriptionPort;

/// One call made through the port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortCall {
    Open {
        relay: Option<String>,
        subscription_id: String,
        filters: Vec<Filter>,
    },
    Close(String),
}

/// Records calls and can be told to fail opens.
#[derive(Default)]
pub struct RecordingSubscriptionPort {
    calls: Mutex<Vec<PortCall>>,
    failures_left: Mutex<u32>,
}

impl RecordingSubscriptionPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_opens(&self, count: u32) {
        *self.failures_left.lock() = count;
    }

    pub fn calls(&self) -> Vec<PortCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SubscriptionPort for RecordingSubscriptionPort {
    async fn open(
        &self,
        relay: Option<&str>,
        subscription_id: &str,
        filters: Vec<Filter>,
    ) -> Result<(), LiveFeedError> {
        {
            let mut failures = self.failures_left.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(LiveFeedError::Subscribe("relay pool unavailable".into()));
            }
        }
        self.calls.lock().push(PortCall::Open {
            relay: relay.map(str::to_string),
            subscription_id: subscription_id.to_string(),
            filters,
        });
        Ok(())
    }

    async fn close(&self, subscription_id: &str) -> Result<(), LiveFeedError> {
        self.calls
            .lock()
            .push(PortCall::Close(subscription_id.to_string()));
        Ok(())
    }
}
