//! Signer backed by a key held in process.

use async_trait::async_trait;
use shared_crypto::EventKeys;
use shared_types::{TransportEvent, UnsignedEvent};

use super::ports::EventSigner;
use crate::errors::ClientError;

pub struct LocalSigner {
    keys: EventKeys,
}

impl LocalSigner {
    pub fn new(keys: EventKeys) -> Self {
        Self { keys }
    }

    /// Fresh random identity, lost on exit.
    pub fn ephemeral() -> Self {
        Self::new(EventKeys::generate())
    }

    pub fn from_secret_hex(secret: &str) -> Result<Self, ClientError> {
        Ok(Self::new(EventKeys::from_secret_hex(secret)?))
    }
}

#[async_trait]
impl EventSigner for LocalSigner {
    fn public_key(&self) -> String {
        self.keys.public_key_hex()
    }

    async fn sign(&self, unsigned: UnsignedEvent) -> Result<TransportEvent, ClientError> {
        Ok(self.keys.sign_event(unsigned)?)
    }
}
