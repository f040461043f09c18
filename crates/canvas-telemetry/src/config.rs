//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logs and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name reported at startup
    pub service_name: String,

    /// Filter directives (trace, debug, info, or `target=level` lists)
    pub log_level: String,

    /// Whether to write logs to stdout at all
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "zappy-place".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ZP_SERVICE_NAME`: Service name (default: zappy-place)
    /// - `ZP_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `ZP_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `ZP_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            service_name: lookup("ZP_SERVICE_NAME").unwrap_or(defaults.service_name),
            log_level: lookup("ZP_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            console_output: lookup("ZP_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.console_output),
            json_logs: lookup("ZP_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::from_lookup(lookup(&[]));
        assert_eq!(config.log_level, "info");
        assert!(config.console_output);
        assert!(!config.json_logs);
    }

    #[test]
    fn test_zp_level_wins_over_rust_log() {
        let config = TelemetryConfig::from_lookup(lookup(&[
            ("ZP_LOG_LEVEL", "debug"),
            ("RUST_LOG", "warn"),
        ]));
        assert_eq!(config.log_level, "debug");

        let config = TelemetryConfig::from_lookup(lookup(&[("RUST_LOG", "warn")]));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_boolean_flags() {
        let config = TelemetryConfig::from_lookup(lookup(&[
            ("ZP_JSON_LOGS", "1"),
            ("ZP_CONSOLE_OUTPUT", "FALSE"),
        ]));
        assert!(config.json_logs);
        assert!(!config.console_output);
    }
}
