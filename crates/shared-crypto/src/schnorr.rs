//! # Schnorr Signatures (BIP-340)
//!
//! Events are signed over their 32-byte id with x-only secp256k1 keys.
//!
//! ## Use Cases
//!
//! - Signing placements and payment requests with a local key
//! - Verifying every inbound event before it is marked as seen

use crate::hashing::event_id;
use crate::CryptoError;
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::schnorr::{Signature, SigningKey, VerifyingKey};
use shared_types::{TransportEvent, UnsignedEvent};

/// Local signing identity.
pub struct EventKeys {
    signing_key: SigningKey,
}

impl EventKeys {
    /// Generate a random identity.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Load from a 32-byte secret key in hex.
    pub fn from_secret_hex(secret: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(secret.trim()).map_err(|_| CryptoError::InvalidHex {
            field: "secret key",
        })?;
        let signing_key =
            SigningKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// X-only public key in lowercase hex.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().to_bytes())
    }

    /// Assign pubkey and id, then sign.
    pub fn sign_event(&self, unsigned: UnsignedEvent) -> Result<TransportEvent, CryptoError> {
        let pubkey = self.public_key_hex();
        let id = event_id(
            &pubkey,
            unsigned.created_at,
            unsigned.kind,
            &unsigned.tags,
            &unsigned.content,
        );
        let digest = decode_hex(id.as_str(), "event id")?;
        let signature: Signature = self
            .signing_key
            .sign_prehash(&digest)
            .map_err(|_| CryptoError::SigningFailed)?;

        Ok(TransportEvent {
            id,
            pubkey,
            created_at: unsigned.created_at,
            kind: unsigned.kind,
            tags: unsigned.tags,
            content: unsigned.content,
            sig: hex::encode(signature.to_bytes()),
        })
    }
}

impl std::fmt::Debug for EventKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventKeys")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

/// Checks that the id hashes the event's fields and that `sig` is a valid
/// signature over it by `pubkey`.
pub fn verify_event(event: &TransportEvent) -> Result<(), CryptoError> {
    let computed = event_id(
        &event.pubkey,
        event.created_at,
        event.kind,
        &event.tags,
        &event.content,
    );
    if computed != event.id {
        return Err(CryptoError::IdMismatch {
            claimed: event.id.to_string(),
            computed: computed.to_string(),
        });
    }

    let key_bytes = decode_hex(&event.pubkey, "pubkey")?;
    let verifying_key =
        VerifyingKey::from_bytes(&key_bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
    let sig_bytes = decode_hex(&event.sig, "signature")?;
    let signature =
        Signature::try_from(sig_bytes.as_slice()).map_err(|_| CryptoError::InvalidSignatureFormat)?;
    let digest = decode_hex(event.id.as_str(), "event id")?;

    verifying_key
        .verify_prehash(&digest, &signature)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}

fn decode_hex(value: &str, field: &'static str) -> Result<Vec<u8>, CryptoError> {
    hex::decode(value).map_err(|_| CryptoError::InvalidHex { field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unsigned(content: &str) -> UnsignedEvent {
        UnsignedEvent {
            created_at: 1_751_900_000,
            kind: 90001,
            tags: vec![vec!["p".into(), "ab".repeat(32)]],
            content: content.into(),
        }
    }

    #[test]
    fn test_sign_then_verify() {
        let keys = EventKeys::generate();
        let event = keys.sign_event(unsigned("payload")).unwrap();
        assert_eq!(event.pubkey, keys.public_key_hex());
        assert_eq!(event.sig.len(), 128);
        assert!(verify_event(&event).is_ok());
    }

    #[test]
    fn test_tampered_content_fails_id_check() {
        let keys = EventKeys::generate();
        let mut event = keys.sign_event(unsigned("payload")).unwrap();
        event.content = "other".into();
        assert!(matches!(
            verify_event(&event),
            Err(CryptoError::IdMismatch { .. })
        ));
    }

    #[test]
    fn test_foreign_signature_fails() {
        let alice = EventKeys::generate();
        let bob = EventKeys::generate();
        let mut event = alice.sign_event(unsigned("payload")).unwrap();
        let forged = bob.sign_event(unsigned("payload")).unwrap();
        // Keep alice's id and pubkey, graft bob's signature.
        event.sig = forged.sig;
        assert_eq!(
            verify_event(&event),
            Err(CryptoError::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_garbage_pubkey_rejected() {
        let keys = EventKeys::generate();
        let mut event = keys.sign_event(unsigned("x")).unwrap();
        event.pubkey = "zz".into();
        // Id no longer matches either, which is checked first.
        assert!(verify_event(&event).is_err());
    }

    #[test]
    fn test_secret_hex_round_trip_keeps_identity() {
        let secret = "0101010101010101010101010101010101010101010101010101010101010101";
        let a = EventKeys::from_secret_hex(secret).unwrap();
        let b = EventKeys::from_secret_hex(secret).unwrap();
        assert_eq!(a.public_key_hex(), b.public_key_hex());
        assert!(EventKeys::from_secret_hex("not hex").is_err());
        assert!(EventKeys::from_secret_hex("00").is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let keys = EventKeys::generate();
        let rendered = format!("{keys:?}");
        assert!(rendered.contains(&keys.public_key_hex()));
        assert!(!rendered.contains("signing_key"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]
        #[test]
        fn prop_any_content_verifies(content in ".{0,64}") {
            let keys = EventKeys::generate();
            let event = keys.sign_event(unsigned(&content)).unwrap();
            prop_assert!(verify_event(&event).is_ok());
        }
    }
}
