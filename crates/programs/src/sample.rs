//! Sample programs used to price a transfer before its real amounts are known.
//!
//! Samples carry placeholder amounts that occupy the full width of a fungible amount and all-zero
//! accounts, so a priced sample is never smaller than the real program built from it.

use snowbridge_planner_primitives::{
    address::{AccountId32, AccountKey, EthAddress},
    constants::PLACEHOLDER_AMOUNT,
    fee::FeeAsset,
    location::{bridge_location, dot_location, erc20_location, Location},
    topic::MessageId,
};

use crate::{
    errors::BuilderResult,
    inbound::{InboundAsset, InboundMessage},
    instruction::AssetAmount,
    inter_network::InterNetworkTransfer,
    legacy::{self, LegacyInbound},
    program::{Program, XcmVersion},
    register::{self, Registration},
    to_asset_hub,
    to_parachain::{self, AssetReserve, DestinationReceipt, Forward, RemoteFee},
};

/// Amount used for every placeholder.
///
/// A quarter of [`PLACEHOLDER_AMOUNT`]: still full width, and a sum of up to four placeholders
/// cannot overflow.
pub const SAMPLE_AMOUNT: u128 = PLACEHOLDER_AMOUNT >> 2;

/// The asset a sample transfers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleAsset {
    /// Ether or an Ethereum-native token.
    Erc20(EthAddress),

    /// A Polkadot-native token, by its location as seen from AssetHub.
    Pna(Location),
}

impl SampleAsset {
    /// The asset's location as seen from AssetHub.
    pub fn location_on_asset_hub(&self, chain_id: u64) -> Location {
        match self {
            SampleAsset::Erc20(token) => erc20_location(chain_id, token),
            SampleAsset::Pna(location) => location.clone(),
        }
    }
}

fn zero_account() -> AccountKey {
    AccountKey::Id32(AccountId32::default())
}

/// The implied prefix of a sample message entering AssetHub.
pub fn inbound(chain_id: u64, asset: &SampleAsset) -> InboundMessage {
    let asset = match asset {
        SampleAsset::Erc20(token) => InboundAsset::Erc20 {
            token: *token,
            amount: SAMPLE_AMOUNT,
        },
        SampleAsset::Pna(location) => InboundAsset::Pna {
            location: location.clone(),
            amount: SAMPLE_AMOUNT,
        },
    };

    InboundMessage {
        chain_id,
        origin: EthAddress::ZERO,
        claimer: zero_account().to_location(),
        asset_hub_fee: SAMPLE_AMOUNT,
        ether_value: SAMPLE_AMOUNT,
        asset,
    }
}

/// A sample of the program AssetHub executes for a transfer settling there.
pub fn asset_hub_program(chain_id: u64, asset: &SampleAsset) -> BuilderResult<Program> {
    to_asset_hub::received_program(
        &inbound(chain_id, asset),
        &zero_account(),
        &[],
        MessageId::default(),
    )
}

/// A sample of the program AssetHub executes for a transfer it forwards to `destination_para_id`.
pub fn forwarding_program(
    chain_id: u64,
    asset: &SampleAsset,
    destination_para_id: u32,
    fee_asset: FeeAsset,
) -> BuilderResult<Program> {
    let location = asset.location_on_asset_hub(chain_id);
    let remote_fee = match fee_asset {
        FeeAsset::Ether => RemoteFee::Ether(SAMPLE_AMOUNT),
        FeeAsset::Dot => RemoteFee::Dot {
            ether: SAMPLE_AMOUNT,
            dot: SAMPLE_AMOUNT,
        },
    };

    let forward = Forward {
        chain_id,
        destination_para_id,
        reserve: AssetReserve::of(&location, destination_para_id),
        asset: AssetAmount::new(location, SAMPLE_AMOUNT),
        remote_fee,
        beneficiary: zero_account(),
        extra: Vec::new(),
        topic: MessageId::default(),
    };

    to_parachain::received_program(&inbound(chain_id, asset), &forward)
}

/// A sample of the program the destination parachain executes.
///
/// `asset_on_destination` is the transferred asset as seen from the destination.
pub fn destination_program(
    version: XcmVersion,
    chain_id: u64,
    asset_on_destination: Location,
    fee_asset: FeeAsset,
) -> BuilderResult<Program> {
    let fee_location = match fee_asset {
        FeeAsset::Ether => bridge_location(chain_id),
        FeeAsset::Dot => dot_location(),
    };

    to_parachain::destination_program(
        version,
        &DestinationReceipt {
            fee: AssetAmount::new(fee_location, SAMPLE_AMOUNT),
            asset: AssetAmount::new(asset_on_destination, SAMPLE_AMOUNT),
            beneficiary: zero_account(),
            topic: MessageId::default(),
        },
    )
}

fn legacy_inbound(chain_id: u64, token: EthAddress) -> LegacyInbound {
    LegacyInbound {
        chain_id,
        token,
        amount: SAMPLE_AMOUNT,
        asset_hub_fee_dot: SAMPLE_AMOUNT,
        beneficiary: zero_account(),
        topic: MessageId::default(),
    }
}

/// A sample of the program a v4 AssetHub executes for a transfer settling there.
pub fn legacy_asset_hub_program(chain_id: u64, token: EthAddress) -> BuilderResult<Program> {
    legacy::asset_hub_program(&legacy_inbound(chain_id, token))
}

/// A sample of the program a v4 AssetHub executes for a transfer it forwards.
pub fn legacy_forwarding_program(
    chain_id: u64,
    token: EthAddress,
    destination_para_id: u32,
) -> BuilderResult<Program> {
    legacy::forwarding_program(
        &legacy_inbound(chain_id, token),
        destination_para_id,
        SAMPLE_AMOUNT,
    )
}

/// A sample of the program AssetHub executes for a token registration.
pub fn registration_program(chain_id: u64, token: EthAddress) -> BuilderResult<Program> {
    register::asset_hub_program(&Registration {
        chain_id,
        token,
        origin: EthAddress::ZERO,
        claimer: zero_account().to_location(),
        asset_hub_fee: SAMPLE_AMOUNT,
        total_value: SAMPLE_AMOUNT,
        asset_deposit_dot: SAMPLE_AMOUNT,
        topic: MessageId::default(),
    })
}

/// Replaces the amounts, beneficiary and topic of an inter-network transfer with placeholders.
pub fn inter_network_transfer(transfer: &InterNetworkTransfer) -> InterNetworkTransfer {
    InterNetworkTransfer {
        amount: SAMPLE_AMOUNT,
        total_fee: SAMPLE_AMOUNT,
        destination_fee: SAMPLE_AMOUNT,
        beneficiary: AccountId32::default(),
        topic: MessageId::default(),
        ..transfer.clone()
    }
}

#[cfg(test)]
mod tests {
    use snowbridge_planner_primitives::{constants::ETHER_TOKEN_ADDRESS, location::NetworkId};

    use super::*;
    use crate::{
        instruction::Instruction,
        inter_network::{self, InterNetworkAsset},
    };

    const CHAIN_ID: u64 = 11155111;

    #[test]
    fn test_samples_build_for_every_topology() {
        let erc20 = SampleAsset::Erc20(EthAddress::new([1; 20]));
        let ether = SampleAsset::Erc20(ETHER_TOKEN_ADDRESS);
        let pna = SampleAsset::Pna(Location::parent());

        for asset in [&erc20, &ether, &pna] {
            assert!(asset_hub_program(CHAIN_ID, asset).is_ok());
            assert!(forwarding_program(CHAIN_ID, asset, 2030, FeeAsset::Ether).is_ok());
            assert!(forwarding_program(CHAIN_ID, asset, 2030, FeeAsset::Dot).is_ok());
        }
        assert!(legacy_forwarding_program(CHAIN_ID, EthAddress::new([1; 20]), 2030).is_ok());
        assert!(registration_program(CHAIN_ID, EthAddress::new([1; 20])).is_ok());
        assert!(destination_program(
            XcmVersion::V4,
            CHAIN_ID,
            bridge_location(CHAIN_ID),
            FeeAsset::Ether
        )
        .is_ok());
    }

    #[test]
    fn test_inter_network_sample_does_not_overflow() {
        let transfer = InterNetworkTransfer {
            source_network: NetworkId::Polkadot,
            destination_network: NetworkId::Kusama,
            source_asset_hub: 1000,
            destination_asset_hub: 1000,
            asset: InterNetworkAsset::SourceRelayToken,
            amount: 1,
            total_fee: 1,
            destination_fee: 1,
            beneficiary: AccountId32::new([1; 32]),
            topic: MessageId::new([1; 32]),
        };

        let sample = inter_network_transfer(&transfer);

        assert!(inter_network::export_program(&sample).is_ok());
        assert!(inter_network::import_program(&sample).is_ok());
        assert_eq!(sample.source_network, NetworkId::Polkadot);
    }

    #[test]
    fn test_sample_uses_zero_topic() {
        let program =
            asset_hub_program(CHAIN_ID, &SampleAsset::Erc20(EthAddress::new([1; 20]))).unwrap();

        assert_eq!(program.topic(), Some(MessageId::default()));
        assert!(matches!(
            program.instructions().last(),
            Some(Instruction::SetTopic(_))
        ));
    }
}
