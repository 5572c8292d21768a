//! Programs for transfers that settle on AssetHub.

use snowbridge_planner_primitives::{address::AccountKey, topic::MessageId};

use crate::{
    errors::BuilderResult,
    inbound::InboundMessage,
    instruction::{AssetFilter, Instruction},
    program::{Program, XcmVersion},
};

/// The body the sender attaches to a transfer settling on AssetHub: refund unused fees and deposit
/// everything in holding to the beneficiary.
///
/// `extra` is spliced in right before the topic.
pub fn send_message_program(
    beneficiary: &AccountKey,
    held_assets: u32,
    extra: &[Instruction],
    topic: MessageId,
) -> BuilderResult<Program> {
    let mut instructions = vec![
        Instruction::RefundSurplus,
        Instruction::DepositAsset {
            assets: AssetFilter::all_counted(held_assets),
            beneficiary: beneficiary.to_location(),
        },
    ];
    instructions.extend_from_slice(extra);
    instructions.push(Instruction::SetTopic(topic));

    Program::new(XcmVersion::V5, instructions)
}

/// The full program AssetHub executes for a transfer settling there.
pub fn received_program(
    inbound: &InboundMessage,
    beneficiary: &AccountKey,
    extra: &[Instruction],
    topic: MessageId,
) -> BuilderResult<Program> {
    let body = send_message_program(beneficiary, inbound.held_asset_count(), extra, topic)?;
    inbound.program(body)
}
