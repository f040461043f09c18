//! Shared setup for scenarios.

use std::sync::Arc;
use std::time::Duration;

use client_runtime::testing::{MockInvoiceProvider, MockSigner, MockWallet};
use client_runtime::{CanvasClient, ClientConfig, ClientDeps, ClientError};
use shared_crypto::EventKeys;
use shared_types::{
    Pixel, PlacementBatch, Timestamp, TransportEvent, UnsignedEvent, KIND_PAYMENT_RECEIPT,
};
use zp_02_codec::PlacementCodec;
use zp_05_relay_pool::testing::MockRelayNetwork;

pub const RELAY_A: &str = "wss://relay-a.test";
pub const RELAY_B: &str = "wss://relay-b.test";
pub const LIVE_SUBSCRIPTION: &str = "test-live";

/// Two mock relays plus mock signer, invoice endpoint and wallet.
pub struct World {
    pub network: MockRelayNetwork,
    pub signer: Arc<MockSigner>,
    pub invoices: Arc<MockInvoiceProvider>,
    pub wallet: Arc<MockWallet>,
    pub config: ClientConfig,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        let network = MockRelayNetwork::new();
        network.add_relay(RELAY_A);
        network.add_relay(RELAY_B);
        Self {
            network,
            signer: Arc::new(MockSigner::new()),
            invoices: Arc::new(MockInvoiceProvider::new()),
            wallet: Arc::new(MockWallet::new()),
            config: ClientConfig::for_testing(),
        }
    }

    pub fn codec(&self) -> PlacementCodec {
        PlacementCodec::new(
            self.config.canvas_pubkey.clone(),
            self.config.relay_pool.relays.clone(),
        )
    }

    pub async fn start(&self) -> Result<CanvasClient, ClientError> {
        CanvasClient::start(
            self.config.clone(),
            ClientDeps {
                connector: Arc::new(self.network.connector()),
                signer: self.signer.clone(),
                invoices: self.invoices.clone(),
                wallet: self.wallet.clone(),
            },
        )
        .await
    }

    /// Stores an event on both relays.
    pub fn store_everywhere(&self, event: &TransportEvent) {
        self.network.store(RELAY_A, event.clone());
        self.network.store(RELAY_B, event.clone());
    }

    /// Signed placement of `pixels` at `at`.
    pub fn placement(
        &self,
        painter: &EventKeys,
        pixels: Vec<Pixel>,
        amount: u64,
        requires_payment: bool,
        at: Timestamp,
    ) -> TransportEvent {
        let unsigned = self
            .codec()
            .encode_placement(&PlacementBatch::new(pixels, amount), requires_payment, at)
            .expect("placement encodes");
        painter.sign_event(unsigned).expect("placement signs")
    }

    /// Signed payment request for `placement`.
    pub fn payment_request(
        &self,
        painter: &EventKeys,
        placement: &TransportEvent,
        amount: u64,
        at: Timestamp,
    ) -> TransportEvent {
        let unsigned = self.codec().payment_request(
            &PlacementBatch::new(vec![], amount),
            &placement.id,
            at,
        );
        painter.sign_event(unsigned).expect("request signs")
    }

    /// Receipt from `issuer` wrapping `request`.
    pub fn receipt(
        &self,
        issuer: &EventKeys,
        request: &TransportEvent,
        at: Timestamp,
    ) -> TransportEvent {
        issuer
            .sign_event(UnsignedEvent {
                created_at: at,
                kind: KIND_PAYMENT_RECEIPT,
                tags: vec![
                    vec!["p".into(), self.config.canvas_pubkey.clone()],
                    vec![
                        "description".into(),
                        serde_json::to_string(request).expect("request serializes"),
                    ],
                ],
                content: String::new(),
            })
            .expect("receipt signs")
    }

    /// Waits until the live subscription is open on `relay`.
    pub async fn live_on(&self, relay: &str) -> bool {
        eventually(|| self.network.live_subscriptions(relay) == vec![LIVE_SUBSCRIPTION]).await
    }
}

/// Polls `check` for up to three seconds.
pub async fn eventually(check: impl Fn() -> bool) -> bool {
    for _ in 0..300 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
