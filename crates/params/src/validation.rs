//! Parameters used by the transfer validator.

use serde::{Deserialize, Serialize};

use super::default::{MAX_BEACON_LATENCY_BLOCKS, MAX_CONSUMERS};

/// Thresholds the validator compares live chain state against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationParams {
    /// Consumer limit assumed for a parachain that does not expose one.
    pub default_max_consumers: u32,

    /// Beacon light client lag (in execution blocks) above which a latency warning is logged.
    pub max_beacon_latency_blocks: u64,
}

impl Default for ValidationParams {
    fn default() -> Self {
        Self {
            default_max_consumers: MAX_CONSUMERS,
            max_beacon_latency_blocks: MAX_BEACON_LATENCY_BLOCKS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_params_serde() {
        let params = ValidationParams::default();
        let serialized = toml::to_string(&params).unwrap();

        let deserialized: ValidationParams = toml::from_str(&serialized).unwrap();

        assert_eq!(params, deserialized);
    }
}
