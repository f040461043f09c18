//! # Configuration Layering
//!
//! A JSON file named by `ZP_CONFIG` overrides defaults, `ZP_*` variables
//! override the file, and the result drives a real client.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use client_runtime::{ClientConfig, ConfigError};
    use shared_crypto::EventKeys;
    use shared_types::{unix_now, CellCoord, Pixel};

    use crate::fixtures::{World, RELAY_A, RELAY_B};

    fn load(vars: &[(&str, String)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        ClientConfig::load_with(|key| vars.get(key).cloned())
    }

    #[tokio::test]
    async fn test_layered_config_drives_the_client() {
        let mut world = World::new();
        let now = unix_now();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");
        std::fs::write(
            &path,
            format!(
                r#"{{
                    "relay_pool": {{ "relays": ["{RELAY_A}"] }},
                    "canvas_pubkey": "{}",
                    "startup_timeout_ms": 2000
                }}"#,
                world.config.canvas_pubkey
            ),
        )
        .unwrap();

        let config = load(&[
            ("ZP_CONFIG", path.display().to_string()),
            ("ZP_RELAYS", format!("{RELAY_A}, {RELAY_B}")),
            ("ZP_SINCE", (now - 100).to_string()),
            ("ZP_PAGE_SIZE", "2".to_string()),
        ])
        .unwrap();
        assert_eq!(config.relay_pool.relays, vec![RELAY_A, RELAY_B]);
        assert_eq!(config.sync.page_size, 2);
        config.validate().unwrap();

        let painter = EventKeys::generate();
        let stale = world.placement(&painter, vec![Pixel::new(1, 1, "#111111")], 1_000, false, now - 500);
        let recent = world.placement(&painter, vec![Pixel::new(2, 2, "#222222")], 1_000, false, now - 50);
        world.store_everywhere(&stale);
        world.store_everywhere(&recent);

        world.config = config;
        let client = world.start().await.unwrap();
        assert!(client.cell(CellCoord::new(1, 1)).is_none());
        assert!(client.cell(CellCoord::new(2, 2)).is_some());
        client.shutdown().await;
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = load(&[("ZP_CONFIG", "/nonexistent/zp.json".to_string())]).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_only_config_needs_a_canvas() {
        let config = load(&[("ZP_RELAYS", RELAY_A.to_string())]).unwrap();
        assert_eq!(config.relay_pool.relays, vec![RELAY_A]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPubkey(_))
        ));
    }
}
