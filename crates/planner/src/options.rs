//! Per-call options that adjust how a transfer is priced and built.

use serde::Serialize;
use snowbridge_planner_primitives::fee::FeeAsset;
use snowbridge_planner_programs::instruction::Instruction;

/// Caller overrides for one plan. Everything defaults to the planner parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeeOptions {
    padding_pct: Option<u32>,
    relayer_fee: Option<u128>,
    fee_asset: FeeAsset,
    destination_fee: Option<u128>,
    extra_instructions: Vec<Instruction>,
    fill_deadline_buffer_secs: Option<u64>,
}

impl FeeOptions {
    /// Overrides the execution fee padding.
    pub fn with_padding_pct(mut self, pct: u32) -> Self {
        self.padding_pct = Some(pct);
        self
    }

    /// Overrides the relayer fee, in ether.
    pub fn with_relayer_fee(mut self, fee: u128) -> Self {
        self.relayer_fee = Some(fee);
        self
    }

    /// Selects the currency the destination's fee is paid in.
    pub fn with_fee_asset(mut self, fee_asset: FeeAsset) -> Self {
        self.fee_asset = fee_asset;
        self
    }

    /// Supplies the destination's execution fee for chains that cannot quote one.
    ///
    /// The amount is in the selected fee asset: ether, or DOT for [`FeeAsset::Dot`] and for
    /// transfers through a v4 AssetHub.
    pub fn with_destination_fee(mut self, fee: u128) -> Self {
        self.destination_fee = Some(fee);
        self
    }

    /// Instructions appended to the beneficiary's program before its topic.
    pub fn with_extra_instructions(mut self, instructions: Vec<Instruction>) -> Self {
        self.extra_instructions = instructions;
        self
    }

    /// Overrides the fill deadline of a second-layer deposit.
    pub fn with_fill_deadline_buffer(mut self, secs: u64) -> Self {
        self.fill_deadline_buffer_secs = Some(secs);
        self
    }

    /// The execution fee padding override.
    pub const fn padding_pct(&self) -> Option<u32> {
        self.padding_pct
    }

    /// The relayer fee override.
    pub const fn relayer_fee(&self) -> Option<u128> {
        self.relayer_fee
    }

    /// The selected fee asset.
    pub const fn fee_asset(&self) -> FeeAsset {
        self.fee_asset
    }

    /// The destination fee override.
    pub const fn destination_fee(&self) -> Option<u128> {
        self.destination_fee
    }

    /// The extra instructions.
    pub fn extra_instructions(&self) -> &[Instruction] {
        &self.extra_instructions
    }

    /// The fill deadline override.
    pub const fn fill_deadline_buffer_secs(&self) -> Option<u64> {
        self.fill_deadline_buffer_secs
    }
}
