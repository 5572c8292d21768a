//! Parameters that control fee padding and second-layer pricing.

use serde::{Deserialize, Serialize};

use super::default::{
    ASSET_DEPOSIT_PADDING_PCT, EXECUTION_FEE_PADDING_PCT, FILL_DEADLINE_BUFFER_SECS,
    INTER_NETWORK_FEE_PADDING_PCT, L2_FEE_PADDING_PCT, L2_SWAP_POOL_FEE, RELAYER_FEE_PADDING_PCT,
};

/// Safety margins applied while composing a delivery fee.
///
/// Padding is always applied as `fee * (100 + pct) / 100` with truncating division, exactly once
/// per fee component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeParams {
    /// Padding applied to every execution fee component.
    pub execution_fee_padding_pct: u32,

    /// Padding applied to the relayer fee when the caller does not override it.
    pub relayer_fee_padding_pct: u32,

    /// Padding applied to inter-network export fees and the remote execution fee.
    pub inter_network_fee_padding_pct: u32,

    /// Padding applied to second-layer bridge fees and swap quotes.
    pub l2_fee_padding_pct: u32,

    /// Padding applied to the foreign asset deposit of a token registration.
    pub asset_deposit_padding_pct: u32,

    /// Pool fee tier used when quoting a second-layer fee swap and the registry has none.
    pub default_l2_swap_pool_fee: u32,

    /// Seconds after which an unfilled second-layer deposit expires.
    pub fill_deadline_buffer_secs: u64,
}

impl Default for FeeParams {
    fn default() -> Self {
        Self {
            execution_fee_padding_pct: EXECUTION_FEE_PADDING_PCT,
            relayer_fee_padding_pct: RELAYER_FEE_PADDING_PCT,
            inter_network_fee_padding_pct: INTER_NETWORK_FEE_PADDING_PCT,
            l2_fee_padding_pct: L2_FEE_PADDING_PCT,
            asset_deposit_padding_pct: ASSET_DEPOSIT_PADDING_PCT,
            default_l2_swap_pool_fee: L2_SWAP_POOL_FEE,
            fill_deadline_buffer_secs: FILL_DEADLINE_BUFFER_SECS,
        }
    }
}
