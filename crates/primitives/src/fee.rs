//! Fee value objects and the padding rule applied to fee estimates.
//!
//! All amounts are integers in the smallest unit of their currency. Fee values are created once
//! per plan and never mutated; re-pricing produces a new value.

use ethnum::U256;
use serde::Serialize;

use crate::errors::{PrimitiveError, PrimitiveResult};

/// Pads `fee` by `pct` percent: `fee * (100 + pct) / 100`, with truncating division.
///
/// The intermediate product is computed in 256 bits, and the result saturates at [`u128::MAX`],
/// so padding never decreases a fee.
pub fn pad_fee_by_percentage(fee: u128, pct: u32) -> u128 {
    let padded = U256::new(fee) * U256::new(100 + u128::from(pct)) / U256::new(100);
    if padded > U256::new(u128::MAX) {
        u128::MAX
    } else {
        padded.as_u128()
    }
}

/// Sums fee components, failing on overflow.
pub fn checked_sum(
    what: &'static str,
    parts: impl IntoIterator<Item = u128>,
) -> PrimitiveResult<u128> {
    parts
        .into_iter()
        .try_fold(0u128, |acc, part| acc.checked_add(part))
        .ok_or(PrimitiveError::FeeOverflow(what))
}

/// The currency a transfer's fees are denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum FeeAsset {
    /// Ether, attached as value to the gateway call.
    #[default]
    Ether,

    /// The relay chain's native token.
    Dot,
}

/// Delivery and execution cost of one hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HopFee {
    /// Cost of delivering the message to the hop.
    pub delivery: u128,

    /// Cost of executing the message on the hop.
    pub execution: u128,
}

impl HopFee {
    /// Delivery plus execution.
    pub fn total(&self) -> PrimitiveResult<u128> {
        checked_sum("hop fee", [self.delivery, self.execution])
    }
}

/// The relayer's message-submission extrinsic cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtrinsicFee {
    /// Cost in the bridge hub's native currency.
    pub native: u128,

    /// Cost converted into the transfer's fee asset.
    pub converted: u128,
}

/// Extra fees of a transfer that starts on a second-layer chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct L2Fees {
    /// Fee of bridging from the second-layer chain to L1, in the second-layer input token.
    pub bridge_fee_in_l2_token: u128,

    /// Amount of the L1 token swapped into ether to pay the bridge fees.
    pub swap_fee_in_l1_token: u128,
}

/// DOT amounts carried alongside the ether-denominated components.
///
/// Present when a hop is paid in DOT: the destination fee of the DOT fee variant, or both hops of
/// a transfer entering a v4 AssetHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DotFees {
    /// DOT paid for execution on AssetHub.
    pub asset_hub: u128,

    /// DOT paid for delivery to and execution on the destination.
    pub destination: u128,
}

/// A priced transfer: per-hop costs, the relayer fee and their total.
///
/// Every hop component is in ether (wei). The delivery from the bridge hub to AssetHub is paid by
/// the relayer out of the relayer fee, so it is reported but not part of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeliveryFee {
    fee_asset: FeeAsset,
    asset_hub: HopFee,
    destination: HopFee,
    relayer_fee: u128,
    extrinsic: Option<ExtrinsicFee>,
    dot: Option<DotFees>,
    l2: Option<L2Fees>,
    total: u128,
}

impl DeliveryFee {
    /// Composes a fee from its hop components.
    pub fn new(
        fee_asset: FeeAsset,
        asset_hub: HopFee,
        destination: HopFee,
        relayer_fee: u128,
    ) -> PrimitiveResult<Self> {
        let total = checked_sum(
            "delivery fee total",
            [
                asset_hub.execution,
                destination.delivery,
                destination.execution,
                relayer_fee,
            ],
        )?;
        Ok(Self {
            fee_asset,
            asset_hub,
            destination,
            relayer_fee,
            extrinsic: None,
            dot: None,
            l2: None,
            total,
        })
    }

    /// Returns the fee annotated with the extrinsic cost the relayer fee was derived from.
    pub fn with_extrinsic(mut self, extrinsic: ExtrinsicFee) -> Self {
        self.extrinsic = Some(extrinsic);
        self
    }

    /// Returns the fee annotated with the DOT amounts paid on the Polkadot side.
    pub fn with_dot_fees(mut self, dot: DotFees) -> Self {
        self.dot = Some(dot);
        self
    }

    /// Returns the fee extended with second-layer costs.
    ///
    /// The bridge fee is only part of the total when it is paid in the same currency as the rest
    /// of the fee, i.e. when the second-layer input token is the fee token.
    pub fn with_l2_fees(mut self, l2: L2Fees, bridge_fee_in_total: bool) -> PrimitiveResult<Self> {
        if bridge_fee_in_total {
            self.total = checked_sum(
                "delivery fee total",
                [self.total, l2.bridge_fee_in_l2_token],
            )?;
        }
        self.l2 = Some(l2);
        Ok(self)
    }

    /// The currency the destination's fee is paid in.
    pub const fn fee_asset(&self) -> FeeAsset {
        self.fee_asset
    }

    /// Delivery fee from the bridge hub to AssetHub.
    pub const fn asset_hub_delivery_fee(&self) -> u128 {
        self.asset_hub.delivery
    }

    /// Execution fee on AssetHub.
    pub const fn asset_hub_execution_fee(&self) -> u128 {
        self.asset_hub.execution
    }

    /// Delivery fee from AssetHub to the destination parachain.
    pub const fn destination_delivery_fee(&self) -> u128 {
        self.destination.delivery
    }

    /// Execution fee on the destination parachain.
    pub const fn destination_execution_fee(&self) -> u128 {
        self.destination.execution
    }

    /// Fee paid to the relayer that submits the message to the bridge hub.
    pub const fn relayer_fee(&self) -> u128 {
        self.relayer_fee
    }

    /// The extrinsic cost the relayer fee was derived from, if it was not overridden.
    pub const fn extrinsic(&self) -> Option<ExtrinsicFee> {
        self.extrinsic
    }

    /// DOT amounts, when a hop is paid in DOT.
    pub const fn dot_fees(&self) -> Option<DotFees> {
        self.dot
    }

    /// Second-layer costs, for transfers that start on a second-layer chain.
    pub const fn l2(&self) -> Option<L2Fees> {
        self.l2
    }

    /// Ether to attach for fees: AssetHub execution, the destination hop and the relayer fee.
    pub const fn total(&self) -> u128 {
        self.total
    }

    /// Everything AssetHub consumes: delivery to it plus execution on it.
    pub fn asset_hub_total(&self) -> PrimitiveResult<u128> {
        self.asset_hub.total()
    }

    /// Everything the destination parachain consumes.
    pub fn destination_total(&self) -> PrimitiveResult<u128> {
        self.destination.total()
    }
}

/// A priced transfer across the inter-network bridge, in the source AssetHub's native currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterNetworkFee {
    xcm_bridge_fee: u128,
    bridge_hub_delivery_fee: u128,
    destination_fee: u128,
    total_fee_in_native: u128,
}

impl InterNetworkFee {
    /// Composes the fee; the total is the sum of the three components.
    pub fn new(
        xcm_bridge_fee: u128,
        bridge_hub_delivery_fee: u128,
        destination_fee: u128,
    ) -> PrimitiveResult<Self> {
        let total_fee_in_native = checked_sum(
            "inter-network fee total",
            [xcm_bridge_fee, bridge_hub_delivery_fee, destination_fee],
        )?;
        Ok(Self {
            xcm_bridge_fee,
            bridge_hub_delivery_fee,
            destination_fee,
            total_fee_in_native,
        })
    }

    /// Export fee charged by the source bridge hub router.
    pub const fn xcm_bridge_fee(&self) -> u128 {
        self.xcm_bridge_fee
    }

    /// Delivery fee from the source AssetHub to its bridge hub.
    pub const fn bridge_hub_delivery_fee(&self) -> u128 {
        self.bridge_hub_delivery_fee
    }

    /// Execution fee on the destination AssetHub.
    pub const fn destination_fee(&self) -> u128 {
        self.destination_fee
    }

    /// Sum of all components.
    pub const fn total_fee_in_native(&self) -> u128 {
        self.total_fee_in_native
    }
}
