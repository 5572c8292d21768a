//! Programs for transfers between the AssetHubs of two relay networks, across the bridge that
//! links their bridge hubs.
//!
//! The source bridge hub executes an export program that wraps the program the destination
//! AssetHub runs. The destination sees that inner program prefixed with the origin the bridge
//! assigns to the source AssetHub.

use snowbridge_planner_primitives::{
    address::{AccountId32, AccountKey},
    constants::INTER_NETWORK_BRIDGE_PALLET_INDEX,
    fee::checked_sum,
    location::{
        dot_location, network_location, parachain_location, Junction, Location, NetworkId,
    },
    topic::MessageId,
};

use crate::{
    errors::BuilderResult,
    instruction::{AssetAmount, AssetFilter, Instruction, WeightLimit},
    program::{Program, XcmVersion},
};

/// The asset moved across the inter-network bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterNetworkAsset {
    /// The source network's relay token.
    SourceRelayToken,

    /// The destination network's relay token, returning to its home network.
    DestinationRelayToken,

    /// Ether or an ERC20. Its location is the same on both networks.
    Ethereum(Location),
}

/// A transfer between two relay networks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterNetworkTransfer {
    /// The network the transfer leaves.
    pub source_network: NetworkId,

    /// The network the transfer enters.
    pub destination_network: NetworkId,

    /// AssetHub parachain id on the source network.
    pub source_asset_hub: u32,

    /// AssetHub parachain id on the destination network.
    pub destination_asset_hub: u32,

    /// The transferred asset.
    pub asset: InterNetworkAsset,

    /// Amount transferred.
    pub amount: u128,

    /// Total fee in the source relay token.
    pub total_fee: u128,

    /// Part of the fee that pays for execution on the destination.
    pub destination_fee: u128,

    /// The receiving account.
    pub beneficiary: AccountId32,

    /// The transfer's correlation topic.
    pub topic: MessageId,
}

impl InterNetworkTransfer {
    /// The source relay token as seen from the destination AssetHub.
    fn source_token_on_destination(&self) -> Location {
        network_location(self.source_network)
    }

    /// Instructions the destination AssetHub runs after the bridge origin is established.
    fn inner(&self) -> BuilderResult<Vec<Instruction>> {
        let source_token = self.source_token_on_destination();

        let mut deposited = self.total_fee;
        let mut withdrawn = Vec::new();
        match &self.asset {
            InterNetworkAsset::SourceRelayToken => {
                deposited = checked_sum("inter-network deposit", [deposited, self.amount])?;
            }
            InterNetworkAsset::DestinationRelayToken => {
                withdrawn.push(AssetAmount::new(dot_location(), self.amount));
            }
            InterNetworkAsset::Ethereum(location) => {
                withdrawn.push(AssetAmount::new(location.clone(), self.amount));
            }
        }

        let mut inner = vec![
            Instruction::ReserveAssetDeposited(vec![AssetAmount::new(
                source_token.clone(),
                deposited,
            )]),
            Instruction::BuyExecution {
                fees: AssetAmount::new(source_token, self.destination_fee),
                weight_limit: WeightLimit::Unlimited,
            },
        ];
        if !withdrawn.is_empty() {
            inner.push(Instruction::WithdrawAsset(withdrawn));
        }
        inner.extend([
            Instruction::ClearOrigin,
            Instruction::DepositAsset {
                assets: AssetFilter::all_counted(2),
                beneficiary: AccountKey::Id32(self.beneficiary).to_location(),
            },
            Instruction::SetTopic(self.topic),
        ]);

        Ok(inner)
    }
}

/// The program the source bridge hub executes: pay for the export, refund leftovers to the
/// source AssetHub, and export the inner program to the destination AssetHub.
pub fn export_program(transfer: &InterNetworkTransfer) -> BuilderResult<Program> {
    let mut withdrawn = transfer.total_fee;
    if transfer.asset == InterNetworkAsset::SourceRelayToken {
        withdrawn = checked_sum("inter-network withdrawal", [withdrawn, transfer.amount])?;
    }

    Program::new(
        XcmVersion::V4,
        vec![
            Instruction::WithdrawAsset(vec![AssetAmount::new(dot_location(), withdrawn)]),
            Instruction::BuyExecution {
                fees: AssetAmount::new(dot_location(), transfer.total_fee),
                weight_limit: WeightLimit::Unlimited,
            },
            Instruction::SetAppendix(vec![Instruction::DepositAsset {
                assets: AssetFilter::all_counted(1),
                beneficiary: parachain_location(transfer.source_asset_hub),
            }]),
            Instruction::ExportMessage {
                network: transfer.destination_network,
                destination: vec![Junction::Parachain(transfer.destination_asset_hub)],
                xcm: transfer.inner()?,
            },
            Instruction::SetTopic(transfer.topic),
        ],
    )
}

/// The program `sender` executes on the source AssetHub: withdraw the fee and the asset, and move
/// both to the source bridge hub together with the export program. Whatever is left after
/// execution returns to `sender`.
pub fn source_program(
    transfer: &InterNetworkTransfer,
    sender: &AccountKey,
    bridge_hub_para_id: u32,
) -> BuilderResult<Program> {
    let fee = AssetAmount::new(dot_location(), transfer.total_fee);
    let (withdrawn, counted) = match &transfer.asset {
        InterNetworkAsset::SourceRelayToken => (
            vec![AssetAmount::new(
                dot_location(),
                checked_sum("inter-network withdrawal", [transfer.total_fee, transfer.amount])?,
            )],
            1,
        ),
        InterNetworkAsset::DestinationRelayToken => (
            vec![
                fee,
                AssetAmount::new(network_location(transfer.destination_network), transfer.amount),
            ],
            2,
        ),
        InterNetworkAsset::Ethereum(location) => (
            vec![fee, AssetAmount::new(location.clone(), transfer.amount)],
            2,
        ),
    };

    Program::new(
        XcmVersion::V4,
        vec![
            Instruction::WithdrawAsset(withdrawn),
            Instruction::SetAppendix(vec![Instruction::DepositAsset {
                assets: AssetFilter::all_counted(counted),
                beneficiary: sender.to_location(),
            }]),
            Instruction::DepositReserveAsset {
                assets: AssetFilter::all_counted(counted),
                dest: parachain_location(bridge_hub_para_id),
                xcm: export_program(transfer)?.into_instructions(),
            },
            Instruction::SetTopic(transfer.topic),
        ],
    )
}

/// The program the destination AssetHub executes once the message crosses the bridge.
pub fn import_program(transfer: &InterNetworkTransfer) -> BuilderResult<Program> {
    let mut instructions = vec![
        Instruction::DescendOrigin(vec![Junction::PalletInstance(
            INTER_NETWORK_BRIDGE_PALLET_INDEX,
        )]),
        Instruction::UniversalOrigin(Junction::GlobalConsensus(transfer.source_network)),
        Instruction::DescendOrigin(vec![Junction::Parachain(transfer.source_asset_hub)]),
    ];
    instructions.extend(transfer.inner()?);

    Program::new(XcmVersion::V4, instructions)
}

#[cfg(test)]
mod tests {
    use snowbridge_planner_primitives::location::{erc20_location, is_ksm_on_other_consensus};

    use super::*;

    fn transfer(asset: InterNetworkAsset) -> InterNetworkTransfer {
        InterNetworkTransfer {
            source_network: NetworkId::Kusama,
            destination_network: NetworkId::Polkadot,
            source_asset_hub: 1000,
            destination_asset_hub: 1000,
            asset,
            amount: 50,
            total_fee: 10,
            destination_fee: 4,
            beneficiary: AccountId32::new([9; 32]),
            topic: MessageId::new([6; 32]),
        }
    }

    #[test]
    fn test_relay_token_adds_amount_to_fee() {
        let program = export_program(&transfer(InterNetworkAsset::SourceRelayToken)).unwrap();

        assert_eq!(
            program.instructions()[0],
            Instruction::WithdrawAsset(vec![AssetAmount::new(dot_location(), 60)])
        );
        let Some(Instruction::ExportMessage { xcm, network, .. }) = program.forwarding() else {
            panic!("expected an export");
        };
        assert_eq!(*network, NetworkId::Polkadot);
        let Instruction::ReserveAssetDeposited(deposited) = &xcm[0] else {
            panic!("expected a reserve deposit");
        };
        assert!(is_ksm_on_other_consensus(&deposited[0].id));
        assert_eq!(deposited[0].amount, 60);
        assert!(xcm.iter().all(|i| !matches!(i, Instruction::WithdrawAsset(_))));
    }

    #[test]
    fn test_ethereum_asset_is_withdrawn_on_destination() {
        let token = erc20_location(1, &Default::default());
        let program =
            import_program(&transfer(InterNetworkAsset::Ethereum(token.clone()))).unwrap();

        assert_eq!(
            program.instructions()[1],
            Instruction::UniversalOrigin(Junction::GlobalConsensus(NetworkId::Kusama))
        );
        assert!(program
            .instructions()
            .contains(&Instruction::WithdrawAsset(vec![AssetAmount::new(token, 50)])));
    }

    #[test]
    fn test_source_program_hands_export_to_bridge_hub() {
        let sender = AccountKey::Id32(AccountId32::new([2; 32]));
        let program = source_program(
            &transfer(InterNetworkAsset::DestinationRelayToken),
            &sender,
            1002,
        )
        .unwrap();

        assert!(program.has_refund_before_forwarding());
        let Some(Instruction::DepositReserveAsset { dest, xcm, .. }) = program.forwarding() else {
            panic!("expected a reserve deposit");
        };
        assert_eq!(*dest, parachain_location(1002));
        assert!(matches!(xcm[3], Instruction::ExportMessage { .. }));
        assert_eq!(
            program.instructions()[0],
            Instruction::WithdrawAsset(vec![
                AssetAmount::new(dot_location(), 10),
                AssetAmount::new(network_location(NetworkId::Polkadot), 50),
            ])
        );
    }

    #[test]
    fn test_export_refunds_before_forwarding() {
        let program = export_program(&transfer(InterNetworkAsset::DestinationRelayToken)).unwrap();

        assert!(program.has_refund_before_forwarding());
        assert_eq!(program.topic(), Some(MessageId::new([6; 32])));
    }
}
