//! # Event Hashing
//!
//! An event id is the lowercase hex SHA-256 of the compact JSON array
//! `[0, pubkey, created_at, kind, tags, content]`.

use sha2::{Digest, Sha256};
use shared_types::{EventId, Tag, Timestamp};

/// Canonical serialization that event ids and signatures commit to.
pub fn canonical_serialization(
    pubkey: &str,
    created_at: Timestamp,
    kind: u32,
    tags: &[Tag],
    content: &str,
) -> String {
    serde_json::json!([0, pubkey, created_at, kind, tags, content]).to_string()
}

/// Computes the id an event with these fields must carry.
pub fn event_id(
    pubkey: &str,
    created_at: Timestamp,
    kind: u32,
    tags: &[Tag],
    content: &str,
) -> EventId {
    let mut hasher = Sha256::new();
    hasher.update(canonical_serialization(pubkey, created_at, kind, tags, content).as_bytes());
    EventId::new(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_form_is_compact() {
        let tags = vec![vec!["p".to_string(), "abc".to_string()]];
        let json = canonical_serialization("pk", 10, 1, &tags, "hi \"there\"");
        assert_eq!(json, r#"[0,"pk",10,1,[["p","abc"]],"hi \"there\""]"#);
    }

    #[test]
    fn test_id_is_lowercase_hex_sha256() {
        let id = event_id("pk", 1, 1, &[], "");
        assert_eq!(id.as_str().len(), 64);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_id_changes_with_content() {
        assert_ne!(event_id("pk", 1, 1, &[], "a"), event_id("pk", 1, 1, &[], "b"));
    }
}
