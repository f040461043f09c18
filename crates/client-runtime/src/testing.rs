//! Test doubles for the signing and payment ports.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_crypto::EventKeys;
use shared_types::{Millisats, TransportEvent, UnsignedEvent};

use crate::adapters::{EventSigner, InvoiceProvider, Wallet};
use crate::errors::ClientError;

/// Signs with a generated key. Can be told to decline like a user would.
pub struct MockSigner {
    keys: EventKeys,
    cancel: AtomicBool,
    signed: Mutex<Vec<TransportEvent>>,
}

impl MockSigner {
    pub fn new() -> Self {
        Self {
            keys: EventKeys::generate(),
            cancel: AtomicBool::new(false),
            signed: Mutex::new(Vec::new()),
        }
    }

    /// Every following request is declined.
    pub fn cancel_all(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn signed(&self) -> Vec<TransportEvent> {
        self.signed.lock().clone()
    }
}

impl Default for MockSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSigner for MockSigner {
    fn public_key(&self) -> String {
        self.keys.public_key_hex()
    }

    async fn sign(&self, unsigned: UnsignedEvent) -> Result<TransportEvent, ClientError> {
        if self.cancel.load(Ordering::SeqCst) {
            return Err(ClientError::SigningCancelled);
        }
        let event = self.keys.sign_event(unsigned)?;
        self.signed.lock().push(event.clone());
        Ok(event)
    }
}

/// Hands out `lnbc<amount>` invoices and records the requests it saw.
#[derive(Default)]
pub struct MockInvoiceProvider {
    requests: Mutex<Vec<(Millisats, TransportEvent)>>,
    failure: Mutex<Option<String>>,
}

impl MockInvoiceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, reason: &str) {
        *self.failure.lock() = Some(reason.to_string());
    }

    pub fn requests(&self) -> Vec<(Millisats, TransportEvent)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl InvoiceProvider for MockInvoiceProvider {
    async fn fetch_invoice(
        &self,
        amount: Millisats,
        payment_request: &TransportEvent,
    ) -> Result<String, ClientError> {
        self.requests.lock().push((amount, payment_request.clone()));
        match self.failure.lock().clone() {
            Some(reason) => Err(ClientError::Payment(reason)),
            None => Ok(format!("lnbc{amount}")),
        }
    }
}

/// Records paid invoices.
#[derive(Default)]
pub struct MockWallet {
    paid: Mutex<Vec<String>>,
}

impl MockWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paid(&self) -> Vec<String> {
        self.paid.lock().clone()
    }
}

#[async_trait]
impl Wallet for MockWallet {
    async fn pay(&self, invoice: &str) -> Result<(), ClientError> {
        self.paid.lock().push(invoice.to_string());
        Ok(())
    }
}
