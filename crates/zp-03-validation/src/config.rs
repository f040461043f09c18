//! Validation configuration.

use serde::{Deserialize, Serialize};
use shared_types::{MAX_FUTURE_SKEW_SECS, WORLD_SIZE};

/// Configuration for the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Side length of the world.
    pub world_size: u32,
    /// Strict mode rejects timestamps further ahead than this.
    pub max_future_skew_secs: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            world_size: WORLD_SIZE,
            max_future_skew_secs: MAX_FUTURE_SKEW_SECS,
        }
    }
}

impl ValidationConfig {
    /// Small world for tests.
    pub fn for_testing() -> Self {
        Self {
            world_size: 16,
            max_future_skew_secs: MAX_FUTURE_SKEW_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert_eq!(config.world_size, 2000);
        assert_eq!(config.max_future_skew_secs, 60);
    }
}
