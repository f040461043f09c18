//! Receipt correlation configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptConfig {
    /// How long an unmatched half waits for its partner.
    pub pending_ttl_secs: u64,
    /// Entries per side before the older half is pruned.
    pub max_pending: usize,
    /// Receipt issuers to accept. Empty accepts any issuer.
    pub trusted_issuers: Vec<String>,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            pending_ttl_secs: 3_600,
            max_pending: 10_000,
            trusted_issuers: Vec::new(),
        }
    }
}

impl ReceiptConfig {
    pub fn for_testing() -> Self {
        Self {
            pending_ttl_secs: 60,
            max_pending: 4,
            trusted_issuers: Vec::new(),
        }
    }

    pub fn pending_ttl(&self) -> Duration {
        Duration::from_secs(self.pending_ttl_secs)
    }

    pub fn trusts(&self, issuer: &str) -> bool {
        self.trusted_issuers.is_empty() || self.trusted_issuers.iter().any(|t| t == issuer)
    }
}
