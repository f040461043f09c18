//! # Client Configuration
//!
//! Unified configuration for every component plus the canvas identity.
//!
//! ## Sources
//!
//! 1. Defaults
//! 2. A JSON file named by `ZP_CONFIG`, if set
//! 3. Environment overrides: `ZP_RELAYS` (comma list), `ZP_CANVAS_PUBKEY`,
//!    `ZP_SINCE`, `ZP_PAGE_SIZE`, `ZP_LNURL`, `ZP_SECRET_KEY`
//!
//! The canvas pubkey has no usable default. [`ClientConfig::validate`]
//! fails until one is provided.

use std::env;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zp_03_validation::{ValidationConfig, ValidationMode};
use zp_04_dedup::DedupConfig;
use zp_05_relay_pool::RelayPoolConfig;
use zp_06_history_sync::SyncConfig;
use zp_07_live_feed::LiveFeedConfig;
use zp_08_receipts::ReceiptConfig;

/// Default LNURL-pay endpoint of the canvas.
pub const DEFAULT_LNURL_ENDPOINT: &str = "https://zappy-place.pages.dev/.well-known/lnurlp/pay";

/// Complete client configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub relay_pool: RelayPoolConfig,
    pub sync: SyncConfig,
    pub live: LiveFeedConfig,
    pub receipts: ReceiptConfig,
    pub dedup: DedupConfig,
    pub validation: ValidationConfig,
    /// Hex pubkey every canvas event tags.
    pub canvas_pubkey: String,
    /// LNURL-pay endpoint used to obtain invoices.
    pub lnurl_endpoint: String,
    /// Hex secret key for signing. An ephemeral key is used when absent.
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
    /// Validation mode for backfilled events.
    pub history_mode: ValidationMode,
    /// Period of the pending-placement sweep.
    pub sweep_interval_secs: u64,
    /// How long `start` waits for the first relay.
    pub startup_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_pool: RelayPoolConfig::default(),
            sync: SyncConfig::default(),
            live: LiveFeedConfig::default(),
            receipts: ReceiptConfig::default(),
            dedup: DedupConfig::default(),
            validation: ValidationConfig::default(),
            canvas_pubkey: String::new(),
            lnurl_endpoint: DEFAULT_LNURL_ENDPOINT.to_string(),
            secret_key: None,
            history_mode: ValidationMode::Strict,
            sweep_interval_secs: 60,
            startup_timeout_ms: 15_000,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("relay_pool", &self.relay_pool)
            .field("sync", &self.sync)
            .field("live", &self.live)
            .field("receipts", &self.receipts)
            .field("dedup", &self.dedup)
            .field("validation", &self.validation)
            .field("canvas_pubkey", &self.canvas_pubkey)
            .field("lnurl_endpoint", &self.lnurl_endpoint)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("history_mode", &self.history_mode)
            .field("sweep_interval_secs", &self.sweep_interval_secs)
            .field("startup_timeout_ms", &self.startup_timeout_ms)
            .finish()
    }
}

impl ClientConfig {
    /// Fast timings against the mock relays of the pool crate's test kit.
    pub fn for_testing() -> Self {
        Self {
            relay_pool: RelayPoolConfig::for_testing(),
            sync: SyncConfig::for_testing(),
            live: LiveFeedConfig::for_testing(),
            receipts: ReceiptConfig::for_testing(),
            dedup: DedupConfig::default(),
            validation: ValidationConfig::default(),
            canvas_pubkey: "ab".repeat(32),
            lnurl_endpoint: "http://lnurl.test/pay".to_string(),
            secret_key: None,
            history_mode: ValidationMode::Strict,
            sweep_interval_secs: 1,
            startup_timeout_ms: 1_000,
        }
    }

    /// Reads `ZP_CONFIG` and the environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with an injectable lookup.
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("ZP_CONFIG") {
            Some(path) => {
                let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                serde_json::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            None => Self::default(),
        };
        config.apply_overrides(&lookup)?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(relays) = lookup("ZP_RELAYS") {
            self.relay_pool.relays = relays
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(pubkey) = lookup("ZP_CANVAS_PUBKEY") {
            self.canvas_pubkey = pubkey.trim().to_lowercase();
        }
        if let Some(since) = lookup("ZP_SINCE") {
            self.sync.since_floor = parse_number("ZP_SINCE", &since)?;
        }
        if let Some(page_size) = lookup("ZP_PAGE_SIZE") {
            self.sync.page_size = parse_number("ZP_PAGE_SIZE", &page_size)?;
        }
        if let Some(endpoint) = lookup("ZP_LNURL") {
            self.lnurl_endpoint = endpoint;
        }
        if let Some(secret) = lookup("ZP_SECRET_KEY") {
            self.secret_key = Some(secret.trim().to_string());
        }
        Ok(())
    }

    /// Rejects configurations the client cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relay_pool.relays.is_empty() {
            return Err(ConfigError::NoRelays);
        }
        if self.sync.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.dedup.capacity == 0 {
            return Err(ConfigError::ZeroDedupCapacity);
        }
        if !is_hex_key(&self.canvas_pubkey) {
            return Err(ConfigError::InvalidPubkey(self.canvas_pubkey.clone()));
        }
        if let Some(secret) = &self.secret_key {
            if !is_hex_key(secret) {
                return Err(ConfigError::InvalidSecretKey);
            }
        }
        Ok(())
    }

    /// History settings scoped to the canvas.
    pub fn sync_config(&self) -> SyncConfig {
        let mut sync = self.sync.clone();
        sync.target.get_or_insert_with(|| self.canvas_pubkey.clone());
        sync
    }

    /// Live feed settings scoped to the canvas.
    pub fn live_config(&self) -> LiveFeedConfig {
        let mut live = self.live.clone();
        live.target.get_or_insert_with(|| self.canvas_pubkey.clone());
        live
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn is_hex_key(value: &str) -> bool {
    value.len() == 64 && hex::decode(value).is_ok()
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("cannot parse config file: {0}")]
    Parse(String),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("no relays configured")]
    NoRelays,

    #[error("history page size must be positive")]
    ZeroPageSize,

    #[error("dedup capacity must be positive")]
    ZeroDedupCapacity,

    #[error("canvas pubkey must be 64 hex characters, got {0:?}")]
    InvalidPubkey(String),

    #[error("secret key must be 64 hex characters")]
    InvalidSecretKey,
}
