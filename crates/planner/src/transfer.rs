//! Transfers: the caller's request, everything derived from it, and the unsigned call to submit.

use serde::Serialize;
use snowbridge_planner_chain_api::tx::{ContractCall, GatewayAsset, UnsignedTx};
use snowbridge_planner_primitives::{
    address::{AccountKey, Beneficiary, EthAddress},
    asset::{Asset, AssetKind, ErcMetadata},
    fee::DeliveryFee,
    registry::{AssetRegistry, Parachain},
    topic::{build_message_id, MessageId, MessageIdInputs},
};
use snowbridge_planner_programs::program::{Program, XcmVersion};

use crate::{
    errors::{PlannerError, PlannerResult},
    options::FeeOptions,
    topology::Topology,
};

/// A request to move `amount` of `token` from an Ethereum account to a Polkadot-side account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRequest {
    /// The Ethereum account that signs the transfer.
    pub source_account: EthAddress,

    /// The receiving account: 20 or 32 bytes of hex, or SS58.
    pub beneficiary: String,

    /// The token, or the zero address for ether.
    pub token: EthAddress,

    /// The parachain the asset settles on.
    pub destination_para_id: u32,

    /// Amount transferred, in the token's smallest unit.
    pub amount: u128,
}

/// What the caller supplied to build a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferInput {
    /// The request.
    pub request: TransferRequest,

    /// The fee the transfer was priced at.
    pub fee: DeliveryFee,

    /// The options the transfer was priced and built with.
    pub options: FeeOptions,
}

/// Everything derived while building a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferComputed {
    /// The topology that built the transfer.
    pub topology: Topology,

    /// The gateway the call is addressed to.
    pub gateway_address: EthAddress,

    /// The source account's hex encoding.
    pub source_account_hex: String,

    /// The classified beneficiary.
    pub beneficiary: Beneficiary,

    /// The token as registered with the gateway.
    pub token_metadata: ErcMetadata,

    /// The asset as registered on AssetHub.
    pub asset_hub_asset: Asset,

    /// The asset as registered on the destination.
    pub destination_asset: Asset,

    /// The smallest amount both AssetHub and the destination accept.
    pub minimal_balance: u128,

    /// The source account nonce the topic was derived with.
    pub nonce: u64,

    /// The correlation identifier.
    pub topic: MessageId,

    /// Ether attached to the call.
    pub total_value: u128,

    /// The program AssetHub executes, prefix included.
    pub asset_hub_program: Program,

    /// The program version the destination receives.
    pub destination_version: XcmVersion,
}

/// A built transfer. Immutable: validation returns a sibling value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    /// What the caller supplied.
    pub input: TransferInput,

    /// What was derived.
    pub computed: TransferComputed,

    /// The unsigned gateway call.
    pub tx: UnsignedTx,
}

/// Builds the ERC20 approval `owner` must submit before `spender` can move `amount` of `token`.
pub fn approve_call(
    owner: EthAddress,
    token: EthAddress,
    spender: EthAddress,
    amount: u128,
) -> UnsignedTx {
    UnsignedTx {
        from: owner,
        to: token,
        value: 0,
        call: ContractCall::Approve { spender, amount },
    }
}

/// A request resolved against the registry.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedInputs<'a> {
    pub(crate) metadata: &'a ErcMetadata,
    pub(crate) destination: &'a Parachain,
    pub(crate) asset_hub_asset: &'a Asset,
    pub(crate) destination_asset: &'a Asset,
    pub(crate) minimal_balance: u128,
}

/// Resolves `token` on AssetHub and on `destination_para_id`.
pub(crate) fn resolve_inputs<'a>(
    registry: &'a AssetRegistry,
    token: &EthAddress,
    destination_para_id: u32,
) -> PlannerResult<ResolvedInputs<'a>> {
    let metadata = registry.ethereum_asset(token)?;
    let asset_hub_asset = registry.asset_hub()?.asset(token)?;
    let destination = registry.parachain(destination_para_id)?;
    let destination_asset = destination.asset(token)?;

    Ok(ResolvedInputs {
        metadata,
        destination,
        asset_hub_asset,
        destination_asset,
        minimal_balance: asset_hub_asset
            .minimum_balance
            .max(destination_asset.minimum_balance),
    })
}

/// Derives the correlation identifier of a transfer from Ethereum.
pub(crate) fn transfer_topic(
    destination_para_id: u32,
    source_account: EthAddress,
    token: &EthAddress,
    beneficiary: &AccountKey,
    amount: u128,
    nonce: u64,
) -> MessageId {
    build_message_id(&MessageIdInputs {
        destination_para_id,
        source_account: &AccountKey::Key20(source_account),
        token,
        beneficiary,
        amount,
        nonce,
    })
}

/// The gateway's 32-byte id of a Polkadot-native token.
pub(crate) fn foreign_token_id(metadata: &ErcMetadata) -> PlannerResult<[u8; 32]> {
    let invalid = || PlannerError::InvalidForeignId(metadata.token.to_string());
    let raw = metadata.foreign_id.as_deref().ok_or_else(invalid)?;

    hex::decode(raw.trim_start_matches("0x"))
        .map_err(|_| PlannerError::InvalidForeignId(raw.to_string()))?
        .try_into()
        .map_err(|_| PlannerError::InvalidForeignId(raw.to_string()))
}

/// The asset entry the gateway call carries for `amount` of the token.
pub(crate) fn gateway_asset(metadata: &ErcMetadata, amount: u128) -> PlannerResult<GatewayAsset> {
    match metadata.kind() {
        AssetKind::Erc20 => Ok(GatewayAsset::Native {
            token: metadata.token,
            amount,
        }),
        AssetKind::Pna => Ok(GatewayAsset::Foreign {
            token_id: foreign_token_id(metadata)?,
            amount,
        }),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use snowbridge_planner_primitives::errors::PrimitiveError;
    use snowbridge_planner_test_utils::{
        arbitrary_generator::{arb_account_key, arb_eth_address, ArbitraryGenerator},
        fixtures,
    };

    use super::*;

    #[test]
    fn test_minimal_balance_is_the_larger_floor() {
        let registry = fixtures::registry();

        let resolved = resolve_inputs(
            &registry,
            &fixtures::INSUFFICIENT_TOKEN,
            fixtures::DESTINATION_PARA_ID,
        )
        .unwrap();

        assert_eq!(resolved.minimal_balance, fixtures::DESTINATION_MIN_BALANCE);
    }

    #[test]
    fn test_unbridgeable_token_is_an_input_error() {
        let registry = fixtures::registry();

        let res = resolve_inputs(
            &registry,
            &EthAddress::new([0xee; 20]),
            fixtures::ASSET_HUB_PARA_ID,
        );

        assert!(matches!(res, Err(PlannerError::Input(PrimitiveError::UnknownToken(_)))));
    }

    #[test]
    fn test_foreign_token_id() {
        let registry = fixtures::registry();
        let metadata = registry.ethereum_asset(&fixtures::PNA_TOKEN).unwrap();

        let asset = gateway_asset(metadata, 5).unwrap();

        assert_eq!(
            asset,
            GatewayAsset::Foreign {
                token_id: fixtures::PNA_FOREIGN_ID,
                amount: 5
            }
        );

        let mut broken = metadata.clone();
        broken.foreign_id = Some("0x1234".to_string());
        assert!(matches!(
            foreign_token_id(&broken),
            Err(PlannerError::InvalidForeignId(_))
        ));
    }

    #[test]
    fn test_approve_call_targets_token() {
        let owner = EthAddress::new([1; 20]);
        let gateway = EthAddress::new([2; 20]);

        let tx = approve_call(owner, fixtures::SUFFICIENT_TOKEN, gateway, 100);

        assert_eq!(tx.to, fixtures::SUFFICIENT_TOKEN);
        assert_eq!(tx.value, 0);
        assert_eq!(
            tx.call,
            ContractCall::Approve {
                spender: gateway,
                amount: 100
            }
        );
    }

    #[test]
    fn test_topic_depends_on_nonce() {
        let mut generator = ArbitraryGenerator::new();
        let beneficiary: AccountKey = generator.generate();
        let source: EthAddress = generator.generate();
        let token = fixtures::SUFFICIENT_TOKEN;

        assert_ne!(
            transfer_topic(1000, source, &token, &beneficiary, 10, 0),
            transfer_topic(1000, source, &token, &beneficiary, 10, 1)
        );
    }

    proptest! {
        #[test]
        fn test_topic_binds_beneficiary(
            source in arb_eth_address(),
            first in arb_account_key(),
            second in arb_account_key(),
        ) {
            prop_assume!(first != second);
            let token = fixtures::SUFFICIENT_TOKEN;

            prop_assert_ne!(
                transfer_topic(1000, source, &token, &first, 10, 0),
                transfer_topic(1000, source, &token, &second, 10, 0)
            );
        }
    }
}
