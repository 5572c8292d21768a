//! Programs for AssetHub runtimes that only execute version 4.
//!
//! Under the v1 inbound queue the bridge hub pays AssetHub in teleported DOT and a forwarded
//! transfer is a `DepositReserveAsset` to the destination. Leftover assets are returned to the
//! bridge's sovereign location through an appendix.

use snowbridge_planner_primitives::{
    address::{AccountKey, EthAddress},
    constants::INBOUND_QUEUE_V1_PALLET_INDEX,
    fee::checked_sum,
    location::{
        bridge_location, dot_location, erc20_location, ethereum_network, parachain_location,
        Junction,
    },
    topic::MessageId,
};

use crate::{
    errors::BuilderResult,
    instruction::{AssetAmount, AssetFilter, Instruction, WeightLimit},
    program::{Program, XcmVersion},
};

/// A transfer entering a v4 AssetHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyInbound {
    /// EIP-155 id of the source chain.
    pub chain_id: u64,

    /// The transferred token.
    pub token: EthAddress,

    /// Amount transferred.
    pub amount: u128,

    /// DOT paid for execution on AssetHub.
    pub asset_hub_fee_dot: u128,

    /// The receiving account.
    pub beneficiary: AccountKey,

    /// The transfer's correlation topic.
    pub topic: MessageId,
}

impl LegacyInbound {
    fn prefix(&self, fee_dot: u128) -> Vec<Instruction> {
        let fee = AssetAmount::new(dot_location(), fee_dot);
        vec![
            Instruction::ReceiveTeleportedAsset(vec![fee.clone()]),
            Instruction::BuyExecution {
                fees: fee,
                weight_limit: WeightLimit::Unlimited,
            },
            Instruction::DescendOrigin(vec![Junction::PalletInstance(
                INBOUND_QUEUE_V1_PALLET_INDEX,
            )]),
            Instruction::UniversalOrigin(ethereum_network(self.chain_id)),
            Instruction::ReserveAssetDeposited(vec![self.token_amount()]),
            Instruction::ClearOrigin,
        ]
    }

    fn token_amount(&self) -> AssetAmount {
        AssetAmount::new(erc20_location(self.chain_id, &self.token), self.amount)
    }
}

/// The program a v4 AssetHub executes for a transfer settling there.
pub fn asset_hub_program(inbound: &LegacyInbound) -> BuilderResult<Program> {
    let mut instructions = inbound.prefix(inbound.asset_hub_fee_dot);
    instructions.extend([
        Instruction::DepositAsset {
            assets: AssetFilter::all_counted(2),
            beneficiary: inbound.beneficiary.to_location(),
        },
        Instruction::SetTopic(inbound.topic),
    ]);

    Program::new(XcmVersion::V4, instructions)
}

/// The program a v4 AssetHub executes for a transfer it forwards to `destination_para_id`.
///
/// AssetHub receives the DOT for both hops; `destination_fee_dot` of it travels on with the asset.
pub fn forwarding_program(
    inbound: &LegacyInbound,
    destination_para_id: u32,
    destination_fee_dot: u128,
) -> BuilderResult<Program> {
    let total_fee = checked_sum(
        "legacy forwarding fee",
        [inbound.asset_hub_fee_dot, destination_fee_dot],
    )?;
    let destination_fee = AssetAmount::new(dot_location(), destination_fee_dot);

    let mut instructions = inbound.prefix(total_fee);
    instructions.extend([
        Instruction::SetAppendix(vec![Instruction::DepositAsset {
            assets: AssetFilter::all_counted(2),
            beneficiary: bridge_location(inbound.chain_id),
        }]),
        Instruction::DepositReserveAsset {
            assets: AssetFilter::Definite(vec![destination_fee.clone(), inbound.token_amount()]),
            dest: parachain_location(destination_para_id),
            xcm: vec![
                Instruction::BuyExecution {
                    fees: destination_fee,
                    weight_limit: WeightLimit::Unlimited,
                },
                Instruction::DepositAsset {
                    assets: AssetFilter::all_counted(2),
                    beneficiary: inbound.beneficiary.to_location(),
                },
                Instruction::SetTopic(inbound.topic),
            ],
        },
        Instruction::SetTopic(inbound.topic),
    ]);

    Program::new(XcmVersion::V4, instructions)
}

#[cfg(test)]
mod tests {
    use snowbridge_planner_primitives::{address::AccountId32, errors::PrimitiveError};

    use super::*;
    use crate::errors::BuilderError;

    fn inbound() -> LegacyInbound {
        LegacyInbound {
            chain_id: 1,
            token: EthAddress::new([0x11; 20]),
            amount: 500,
            asset_hub_fee_dot: 10,
            beneficiary: AccountKey::Id32(AccountId32::new([2; 32])),
            topic: MessageId::new([8; 32]),
        }
    }

    #[test]
    fn test_legacy_asset_hub_program() {
        let program = asset_hub_program(&inbound()).unwrap();

        assert_eq!(program.version(), XcmVersion::V4);
        assert!(program.forwarding().is_none());
        assert_eq!(
            program.instructions()[2],
            Instruction::DescendOrigin(vec![Junction::PalletInstance(80)])
        );
    }

    #[test]
    fn test_legacy_forwarding_program() {
        let program = forwarding_program(&inbound(), 2030, 4).unwrap();

        assert_eq!(
            program.instructions()[0],
            Instruction::ReceiveTeleportedAsset(vec![AssetAmount::new(dot_location(), 14)])
        );
        assert!(program.has_refund_before_forwarding());

        let Some(Instruction::DepositReserveAsset { assets, dest, xcm }) = program.forwarding()
        else {
            panic!("expected a reserve deposit");
        };
        assert_eq!(dest, &parachain_location(2030));
        let AssetFilter::Definite(assets) = assets else {
            panic!("expected definite assets");
        };
        assert_eq!(assets[0].id, dot_location());
        assert_eq!(xcm.last(), Some(&Instruction::SetTopic(MessageId::new([8; 32]))));
    }

    #[test]
    fn test_legacy_forwarding_fee_overflow() {
        let mut inbound = inbound();
        inbound.asset_hub_fee_dot = u128::MAX;

        assert!(matches!(
            forwarding_program(&inbound, 2030, 1),
            Err(BuilderError::Input(PrimitiveError::FeeOverflow(_)))
        ));
    }
}
