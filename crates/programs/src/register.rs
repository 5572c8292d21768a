//! Programs that register an Ethereum token as a foreign asset on AssetHub.

use snowbridge_planner_primitives::{
    address::{AccountKey, EthAddress},
    constants::{ETHER_TOKEN_ADDRESS, REGISTERED_ASSET_MIN_BALANCE},
    location::{bridge_location, dot_location, erc20_location, Location},
    topic::{bridge_owner_account, MessageId},
};

use crate::{
    errors::BuilderResult,
    inbound::{InboundAsset, InboundMessage},
    instruction::{AssetAmount, AssetFilter, Instruction, OriginKind, RemoteCall, WildAsset},
    program::{Program, XcmVersion},
};

/// A token registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// EIP-155 id of the Ethereum chain.
    pub chain_id: u64,

    /// The token to register.
    pub token: EthAddress,

    /// The Ethereum account that called the gateway.
    pub origin: EthAddress,

    /// Location allowed to claim assets trapped on AssetHub.
    pub claimer: Location,

    /// Ether paid for execution on AssetHub.
    pub asset_hub_fee: u128,

    /// Ether bridged to AssetHub: the execution fee plus the ether that buys the asset deposit.
    pub total_value: u128,

    /// DOT bought to pay the foreign asset deposit.
    pub asset_deposit_dot: u128,

    /// The registration's correlation topic.
    pub topic: MessageId,
}

/// The instructions that buy the asset deposit, create the foreign asset and return leftovers.
pub fn remote_instructions(registration: &Registration) -> Vec<Instruction> {
    let ether = bridge_location(registration.chain_id);
    let owner = bridge_owner_account(registration.chain_id);
    let deposit = AssetAmount::new(dot_location(), registration.asset_deposit_dot);

    vec![
        Instruction::ExchangeAsset {
            give: AssetFilter::Wild(WildAsset::AllOf { id: ether }),
            want: vec![deposit.clone()],
            maximal: false,
        },
        Instruction::DepositAsset {
            assets: AssetFilter::definite(deposit),
            beneficiary: AccountKey::Id32(owner).to_location(),
        },
        Instruction::Transact {
            origin_kind: OriginKind::Xcm,
            call: RemoteCall::ForeignAssetsCreate {
                asset_id: erc20_location(registration.chain_id, &registration.token),
                admin: owner,
                min_balance: REGISTERED_ASSET_MIN_BALANCE,
            },
        },
        Instruction::RefundSurplus,
        Instruction::DepositAsset {
            assets: AssetFilter::all_counted(2),
            beneficiary: registration.claimer.clone(),
        },
    ]
}

/// The full program AssetHub executes for a registration.
///
/// Bridged ether beyond the execution fee is deposited so the exchange can buy the asset deposit.
pub fn asset_hub_program(registration: &Registration) -> BuilderResult<Program> {
    let inbound = InboundMessage {
        chain_id: registration.chain_id,
        origin: registration.origin,
        claimer: registration.claimer.clone(),
        asset_hub_fee: registration.asset_hub_fee,
        ether_value: 0,
        asset: InboundAsset::Erc20 {
            token: ETHER_TOKEN_ADDRESS,
            amount: registration
                .total_value
                .saturating_sub(registration.asset_hub_fee),
        },
    };

    let mut body = remote_instructions(registration);
    body.push(Instruction::SetTopic(registration.topic));

    inbound.program(Program::new(XcmVersion::V5, body)?)
}

#[cfg(test)]
mod tests {
    use snowbridge_planner_primitives::address::AccountId32;

    use super::*;

    fn registration(total_value: u128) -> Registration {
        Registration {
            chain_id: 1,
            token: EthAddress::new([0x11; 20]),
            origin: EthAddress::new([0xaa; 20]),
            claimer: AccountKey::Id32(AccountId32::new([1; 32])).to_location(),
            asset_hub_fee: 100,
            total_value,
            asset_deposit_dot: 7,
            topic: MessageId::new([3; 32]),
        }
    }

    #[test]
    fn test_registration_creates_asset_owned_by_bridge() {
        let program = asset_hub_program(&registration(1_000)).unwrap();

        let create = program
            .instructions()
            .iter()
            .find_map(|i| match i {
                Instruction::Transact { call, .. } => Some(call.clone()),
                _ => None,
            })
            .unwrap();

        assert_eq!(
            create,
            RemoteCall::ForeignAssetsCreate {
                asset_id: erc20_location(1, &EthAddress::new([0x11; 20])),
                admin: bridge_owner_account(1),
                min_balance: 1,
            }
        );
        assert_eq!(program.topic(), Some(MessageId::new([3; 32])));
    }

    #[test]
    fn test_registration_deposits_remaining_ether() {
        let program = asset_hub_program(&registration(1_000)).unwrap();

        assert_eq!(
            program.instructions()[5],
            Instruction::ReserveAssetDeposited(vec![AssetAmount::new(bridge_location(1), 900)])
        );
    }

    #[test]
    fn test_registration_without_surplus_skips_deposit() {
        let program = asset_hub_program(&registration(100)).unwrap();

        assert!(matches!(
            program.instructions()[5],
            Instruction::DescendOrigin(_)
        ));
    }
}
