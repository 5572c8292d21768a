//! Programs for transfers that AssetHub forwards to a further parachain.

use snowbridge_planner_primitives::{
    address::AccountKey,
    location::{bridge_location, dot_location, parachain_location, Junction, Location},
    topic::MessageId,
};

use crate::{
    errors::BuilderResult,
    inbound::InboundMessage,
    instruction::{
        fee_then_asset, AssetAmount, AssetFilter, Instruction, TransferFilter, WeightLimit,
        WildAsset,
    },
    program::{Program, XcmVersion},
};

/// How the destination's execution fee is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteFee {
    /// In ether.
    Ether(u128),

    /// In DOT, bought on AssetHub with ether before forwarding.
    Dot {
        /// Ether given to the exchange.
        ether: u128,

        /// DOT bought and sent along as the destination fee.
        dot: u128,
    },
}

/// Which side of the forward is the reserve of the transferred asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetReserve {
    /// AssetHub holds the reserve; the destination receives a derivative.
    AssetHub,

    /// The destination holds the reserve; AssetHub burns its derivative.
    Destination,
}

impl AssetReserve {
    /// The reserve of an asset at `location` (as seen from AssetHub) when forwarding to
    /// `destination_para_id`.
    pub fn of(location: &Location, destination_para_id: u32) -> Self {
        match location.interior.first() {
            Some(Junction::Parachain(id))
                if location.parents == 1 && *id == destination_para_id =>
            {
                AssetReserve::Destination
            }
            _ => AssetReserve::AssetHub,
        }
    }

    fn filter(self, assets: AssetFilter) -> TransferFilter {
        match self {
            AssetReserve::AssetHub => TransferFilter::ReserveDeposit(assets),
            AssetReserve::Destination => TransferFilter::ReserveWithdraw(assets),
        }
    }
}

/// A forward from AssetHub to a further parachain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forward {
    /// EIP-155 id of the Ethereum chain ether comes from.
    pub chain_id: u64,

    /// The destination parachain.
    pub destination_para_id: u32,

    /// The transferred asset as seen from AssetHub.
    pub asset: AssetAmount,

    /// Reserve of the transferred asset.
    pub reserve: AssetReserve,

    /// Fee paid on the destination.
    pub remote_fee: RemoteFee,

    /// The receiving account on the destination.
    pub beneficiary: AccountKey,

    /// Caller-supplied instructions spliced into the destination program before its topic.
    pub extra: Vec<Instruction>,

    /// The transfer's correlation topic.
    pub topic: MessageId,
}

/// The body the sender attaches to a forwarded transfer.
///
/// AssetHub optionally swaps ether for the DOT fee, forwards the asset and fee to the destination,
/// then refunds and deposits leftover ether to the beneficiary.
pub fn send_message_program(forward: &Forward) -> BuilderResult<Program> {
    let ether = bridge_location(forward.chain_id);
    let mut instructions = Vec::new();

    let remote_fee = match forward.remote_fee {
        RemoteFee::Ether(amount) => AssetAmount::new(ether.clone(), amount),
        RemoteFee::Dot { ether: give, dot } => {
            let dot = AssetAmount::new(dot_location(), dot);
            instructions.push(Instruction::ExchangeAsset {
                give: AssetFilter::definite(AssetAmount::new(ether.clone(), give)),
                want: vec![dot.clone()],
                maximal: true,
            });
            dot
        }
    };

    let mut remote_xcm = vec![
        Instruction::RefundSurplus,
        Instruction::DepositAsset {
            assets: AssetFilter::all_counted(3),
            beneficiary: forward.beneficiary.to_location(),
        },
    ];
    remote_xcm.extend_from_slice(&forward.extra);
    remote_xcm.push(Instruction::SetTopic(forward.topic));

    instructions.extend([
        Instruction::InitiateTransfer {
            destination: parachain_location(forward.destination_para_id),
            remote_fees: Some(TransferFilter::ReserveDeposit(AssetFilter::definite(
                remote_fee,
            ))),
            preserve_origin: true,
            assets: vec![forward
                .reserve
                .filter(AssetFilter::definite(forward.asset.clone()))],
            remote_xcm,
        },
        Instruction::RefundSurplus,
        Instruction::DepositAsset {
            assets: AssetFilter::Wild(WildAsset::AllOf { id: ether }),
            beneficiary: forward.beneficiary.to_location(),
        },
        Instruction::SetTopic(forward.topic),
    ]);

    Program::new(XcmVersion::V5, instructions)
}

/// The full program AssetHub executes for a forwarded transfer.
pub fn received_program(inbound: &InboundMessage, forward: &Forward) -> BuilderResult<Program> {
    inbound.program(send_message_program(forward)?)
}

/// What the destination parachain receives from AssetHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationReceipt {
    /// The fee asset and amount, as seen from the destination.
    pub fee: AssetAmount,

    /// The transferred asset and amount, as seen from the destination.
    pub asset: AssetAmount,

    /// The receiving account.
    pub beneficiary: AccountKey,

    /// The transfer's correlation topic.
    pub topic: MessageId,
}

/// The program the destination executes, in the version it understands.
///
/// Used to price execution on the destination before the real forwarded program exists.
pub fn destination_program(
    version: XcmVersion,
    receipt: &DestinationReceipt,
) -> BuilderResult<Program> {
    let deposited = fee_then_asset(receipt.fee.clone(), receipt.asset.clone());
    let held = deposited.len() as u32;
    let pay_fees = match version {
        XcmVersion::V4 => Instruction::BuyExecution {
            fees: receipt.fee.clone(),
            weight_limit: WeightLimit::Unlimited,
        },
        XcmVersion::V5 => Instruction::PayFees {
            asset: receipt.fee.clone(),
        },
    };

    Program::new(
        version,
        vec![
            Instruction::ReserveAssetDeposited(deposited),
            Instruction::ClearOrigin,
            pay_fees,
            Instruction::DepositAsset {
                assets: AssetFilter::all_counted(held),
                beneficiary: receipt.beneficiary.to_location(),
            },
            Instruction::SetTopic(receipt.topic),
        ],
    )
}

#[cfg(test)]
mod tests {
    use snowbridge_planner_primitives::{
        address::{AccountId32, EthAddress},
        location::erc20_location,
    };

    use proptest::prelude::*;

    use super::*;
    use crate::inbound::InboundAsset;

    const CHAIN_ID: u64 = 1;

    fn token() -> EthAddress {
        EthAddress::new([0x11; 20])
    }

    fn forward(remote_fee: RemoteFee) -> Forward {
        Forward {
            chain_id: CHAIN_ID,
            destination_para_id: 2030,
            asset: AssetAmount::new(erc20_location(CHAIN_ID, &token()), 1_000),
            reserve: AssetReserve::AssetHub,
            remote_fee,
            beneficiary: AccountKey::Key20(EthAddress::new([0xbb; 20])),
            extra: Vec::new(),
            topic: MessageId::new([1; 32]),
        }
    }

    fn inbound() -> InboundMessage {
        InboundMessage {
            chain_id: CHAIN_ID,
            origin: EthAddress::new([0xaa; 20]),
            claimer: Location::here(),
            asset_hub_fee: 10,
            ether_value: 0,
            asset: InboundAsset::Erc20 {
                token: token(),
                amount: 1_000,
            },
        }
    }

    #[test]
    fn test_forwarded_program_refunds_before_forwarding() {
        let program = received_program(&inbound(), &forward(RemoteFee::Ether(5))).unwrap();

        assert!(matches!(
            program.forwarding(),
            Some(Instruction::InitiateTransfer { .. })
        ));
        assert!(program.has_refund_before_forwarding());
        assert_eq!(program.topic(), Some(MessageId::new([1; 32])));
    }

    #[test]
    fn test_remote_program_ends_with_topic() {
        let mut fwd = forward(RemoteFee::Ether(5));
        fwd.extra = vec![Instruction::ClearOrigin];

        let program = send_message_program(&fwd).unwrap();
        let Some(Instruction::InitiateTransfer { remote_xcm, .. }) = program.forwarding() else {
            panic!("expected a forward");
        };

        assert_eq!(remote_xcm.last(), Some(&Instruction::SetTopic(fwd.topic)));
        assert_eq!(remote_xcm[remote_xcm.len() - 2], Instruction::ClearOrigin);
    }

    #[test]
    fn test_dot_fee_swaps_before_forwarding() {
        let program = send_message_program(&forward(RemoteFee::Dot { ether: 7, dot: 3 })).unwrap();

        assert!(matches!(
            program.instructions()[0],
            Instruction::ExchangeAsset { maximal: true, .. }
        ));
        let Some(Instruction::InitiateTransfer { remote_fees, .. }) = program.forwarding() else {
            panic!("expected a forward");
        };
        assert_eq!(
            remote_fees,
            &Some(TransferFilter::ReserveDeposit(AssetFilter::definite(
                AssetAmount::new(dot_location(), 3)
            )))
        );
    }

    #[test]
    fn test_reserve_of_destination_native_asset() {
        let native = Location::new(1, vec![Junction::Parachain(2030), Junction::GeneralIndex(0)]);

        assert_eq!(AssetReserve::of(&native, 2030), AssetReserve::Destination);
        assert_eq!(AssetReserve::of(&native, 2034), AssetReserve::AssetHub);
        assert_eq!(
            AssetReserve::of(&erc20_location(CHAIN_ID, &token()), 2030),
            AssetReserve::AssetHub
        );
    }

    #[test]
    fn test_destination_program_versions() {
        let receipt = DestinationReceipt {
            fee: AssetAmount::new(bridge_location(CHAIN_ID), 5),
            asset: AssetAmount::new(erc20_location(CHAIN_ID, &token()), 10),
            beneficiary: AccountKey::Id32(AccountId32::new([2; 32])),
            topic: MessageId::new([4; 32]),
        };

        let v4 = destination_program(XcmVersion::V4, &receipt).unwrap();
        let v5 = destination_program(XcmVersion::V5, &receipt).unwrap();

        assert!(matches!(v4.instructions()[2], Instruction::BuyExecution { .. }));
        assert!(matches!(v5.instructions()[2], Instruction::PayFees { .. }));
        assert_eq!(
            v4.instructions()[3],
            Instruction::DepositAsset {
                assets: AssetFilter::all_counted(2),
                beneficiary: receipt.beneficiary.to_location(),
            }
        );
    }

    #[test]
    fn test_destination_program_merges_ether() {
        let receipt = DestinationReceipt {
            fee: AssetAmount::new(bridge_location(CHAIN_ID), 5),
            asset: AssetAmount::new(bridge_location(CHAIN_ID), 10),
            beneficiary: AccountKey::Id32(AccountId32::new([2; 32])),
            topic: MessageId::new([4; 32]),
        };

        let program = destination_program(XcmVersion::V4, &receipt).unwrap();

        assert_eq!(
            program.instructions()[0],
            Instruction::ReserveAssetDeposited(vec![AssetAmount::new(
                bridge_location(CHAIN_ID),
                15
            )])
        );
    }

    proptest! {
        #[test]
        fn forwarded_program_is_always_refund_safe(
            para_id in 1000u32..5000,
            amount in any::<u64>(),
            fee in any::<u64>(),
            dot_fee in any::<bool>(),
            topic in any::<[u8; 32]>(),
        ) {
            let mut fwd = forward(if dot_fee {
                RemoteFee::Dot { ether: u128::from(fee), dot: u128::from(fee) }
            } else {
                RemoteFee::Ether(u128::from(fee))
            });
            fwd.destination_para_id = para_id;
            fwd.asset.amount = u128::from(amount);
            fwd.topic = MessageId::new(topic);

            let program = received_program(&inbound(), &fwd).unwrap();

            prop_assert!(program.has_refund_before_forwarding());
            prop_assert_eq!(program.topic(), Some(MessageId::new(topic)));
            prop_assert_eq!(program.clone(), received_program(&inbound(), &fwd).unwrap());
        }
    }
}
