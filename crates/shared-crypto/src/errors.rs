//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The id does not hash the event's own fields
    #[error("Event id mismatch: claimed {claimed}, computed {computed}")]
    IdMismatch {
        /// Id carried by the event
        claimed: String,
        /// Id recomputed from the event fields
        computed: String,
    },

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid signature format
    #[error("Invalid signature format")]
    InvalidSignatureFormat,

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Signing failed
    #[error("Signing failed")]
    SigningFailed,

    /// Hex field could not be decoded
    #[error("Invalid hex in {field}")]
    InvalidHex {
        /// Name of the offending field
        field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_mismatch_display() {
        let err = CryptoError::IdMismatch {
            claimed: "aa".into(),
            computed: "bb".into(),
        };
        assert_eq!(err.to_string(), "Event id mismatch: claimed aa, computed bb");
    }
}
