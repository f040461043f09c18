//! Outbound ports for signing and payment.
//!
//! Key custody and wallets are external. The client only sees these traits.

use async_trait::async_trait;
use shared_types::{Millisats, TransportEvent, UnsignedEvent};

use crate::errors::ClientError;

/// Signs events on behalf of the user.
#[async_trait]
pub trait EventSigner: Send + Sync {
    /// Hex x-only public key events are signed with.
    fn public_key(&self) -> String;

    /// Returns the signed event, or [`ClientError::SigningCancelled`] when
    /// the user declines.
    async fn sign(&self, unsigned: UnsignedEvent) -> Result<TransportEvent, ClientError>;
}

/// Turns a signed payment request into a Lightning invoice.
#[async_trait]
pub trait InvoiceProvider: Send + Sync {
    async fn fetch_invoice(
        &self,
        amount: Millisats,
        payment_request: &TransportEvent,
    ) -> Result<String, ClientError>;
}

/// Pays Lightning invoices.
#[async_trait]
pub trait Wallet: Send + Sync {
    async fn pay(&self, invoice: &str) -> Result<(), ClientError>;
}
