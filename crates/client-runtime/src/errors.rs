//! Client errors.

use shared_crypto::CryptoError;
use thiserror::Error;
use zp_02_codec::CodecError;
use zp_03_validation::ValidationFailure;
use zp_05_relay_pool::RelayError;
use zp_06_history_sync::SyncError;
use zp_07_live_feed::LiveFeedError;

use crate::container::ConfigError;

/// Errors surfaced by [`CanvasClient`](crate::CanvasClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The signer declined. Nothing was published.
    #[error("signing was cancelled")]
    SigningCancelled,

    /// No relay is connected.
    #[error("no relay connected")]
    NotConnected,

    /// The batch fails pre-flight validation.
    #[error("placement rejected: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("relay error: {0}")]
    Relay(#[from] RelayError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("history sync failed: {0}")]
    Sync(#[from] SyncError),

    #[error("live feed error: {0}")]
    LiveFeed(#[from] LiveFeedError),

    /// Invoice retrieval or payment failed.
    #[error("payment failed: {0}")]
    Payment(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
