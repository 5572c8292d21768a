//! Fallback fees for the Kusama <> Polkadot bridge.
//!
//! The live values are read from the bridge hub router storage; these are only used when the
//! storage items are unset.

use serde::{Deserialize, Serialize};

use super::default::{
    KUSAMA_BASE_FEE, KUSAMA_FEE_PER_BYTE, POLKADOT_BASE_FEE, POLKADOT_FEE_PER_BYTE,
};

/// Base and per-byte export fees for each side of the inter-network bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterNetworkFeeParams {
    /// Base fee charged by Kusama's bridge hub router, in KSM planck.
    pub kusama_base_fee: u64,

    /// Per-byte fee charged by Kusama's bridge hub router, in KSM planck.
    pub kusama_fee_per_byte: u64,

    /// Base fee charged by Polkadot's bridge hub router, in DOT planck.
    pub polkadot_base_fee: u64,

    /// Per-byte fee charged by Polkadot's bridge hub router, in DOT planck.
    pub polkadot_fee_per_byte: u64,
}

impl Default for InterNetworkFeeParams {
    fn default() -> Self {
        Self {
            kusama_base_fee: KUSAMA_BASE_FEE,
            kusama_fee_per_byte: KUSAMA_FEE_PER_BYTE,
            polkadot_base_fee: POLKADOT_BASE_FEE,
            polkadot_fee_per_byte: POLKADOT_FEE_PER_BYTE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inter_network_fee_params_serde() {
        let params = InterNetworkFeeParams::default();
        let serialized = toml::to_string(&params).unwrap();

        let deserialized: InterNetworkFeeParams = toml::from_str(&serialized).unwrap();

        assert_eq!(params, deserialized);
    }
}
