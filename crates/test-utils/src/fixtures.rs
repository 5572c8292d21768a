//! A registry snapshot and chain mocks that agree with it.
//!
//! The numbers are small and round so that expected fees can be worked out by hand: every weight
//! costs [`WEIGHT_FEE`], every delivery [`DELIVERY_FEE`] DOT, and a DOT buys [`ETHER_PER_DOT`]
//! wei.

use std::collections::BTreeMap;

use snowbridge_planner_chain_api::types::{
    AccountInfo, DryRunEffects, ExecutionOutcome, ForwardedPrograms, TokenBalance,
    VersionedLocation,
};
use snowbridge_planner_primitives::{
    address::{classify_beneficiary, AccountKey, EthAddress},
    asset::{Asset, ErcMetadata},
    constants::ETHER_TOKEN_ADDRESS,
    location::{
        bridge_location, dot_location, erc20_location, network_location, Junction, Location,
        NetworkId,
    },
    registry::{
        AssetRegistry, InterNetworkRegistry, L2Asset, L2Chain, Parachain, ParachainFeatures,
    },
    topic::MessageId,
};
use snowbridge_planner_programs::{
    instruction::{AssetAmount, Instruction},
    program::{Program, XcmVersion},
};

use crate::mocks::{chain_properties, MockBridgeHub, MockGateway, MockL2Adaptor, MockParachain};

/// AssetHub.
pub const ASSET_HUB_PARA_ID: u32 = 1000;

/// The bridge hub.
pub const BRIDGE_HUB_PARA_ID: u32 = 1002;

/// A parachain reached through AssetHub.
pub const DESTINATION_PARA_ID: u32 = 2030;

/// A parachain without the payment runtime APIs.
pub const NO_FEE_API_PARA_ID: u32 = 2034;

/// The bridge hub of the remote relay network.
pub const REMOTE_BRIDGE_HUB_PARA_ID: u32 = 1002;

/// The Ethereum chain.
pub const ETH_CHAIN_ID: u64 = 11_155_111;

/// The gateway contract.
pub const GATEWAY_ADDRESS: EthAddress = EthAddress::new([0x9e; 20]);

/// The Ethereum sender of every fixture transfer.
pub const SOURCE_ACCOUNT: EthAddress = EthAddress::new([0xaa; 20]);

/// The Substrate beneficiary of every fixture transfer.
pub const BENEFICIARY: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

/// The Substrate sender of inter-network transfers.
pub const SUBSTRATE_SENDER: &str =
    "0xcccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc";

/// An ERC20 whose balance alone keeps an account alive on every chain.
pub const SUFFICIENT_TOKEN: EthAddress = EthAddress::new([0x11; 20]);

/// An ERC20 that needs an existing account on the chain it lands on.
pub const INSUFFICIENT_TOKEN: EthAddress = EthAddress::new([0x22; 20]);

/// The gateway's ERC20 mirror of a token native to [`DESTINATION_PARA_ID`].
pub const PNA_TOKEN: EthAddress = EthAddress::new([0x33; 20]);

/// The gateway's id of [`PNA_TOKEN`].
pub const PNA_FOREIGN_ID: [u8; 32] = [0x44; 32];

/// Minimum balance of [`INSUFFICIENT_TOKEN`] on the destination.
pub const DESTINATION_MIN_BALANCE: u128 = 1_000;

/// Wei bought by one DOT on AssetHub.
pub const ETHER_PER_DOT: u128 = 2;

/// Fee of any weight, in whatever asset it is asked in.
pub const WEIGHT_FEE: u128 = 1_000;

/// DOT fee of the relayer's message submission on the bridge hub.
pub const INBOUND_SUBMIT_FEE: u128 = 50;

/// DOT fee of any delivery between parachains.
pub const DELIVERY_FEE: u128 = 100;

/// DOT deposit reserved when a foreign asset is created on AssetHub.
pub const ASSET_DEPOSIT: u128 = 100_000;

/// Runtime version of the destination.
pub const DESTINATION_SPEC_VERSION: u32 = 1_005_000;

/// A second-layer chain.
pub const L2_CHAIN_ID: u64 = 84_532;

/// The adaptor contract on [`L2_CHAIN_ID`].
pub const L2_ADAPTOR: EthAddress = EthAddress::new([0x55; 20]);

/// The fee token of [`L2_CHAIN_ID`], its native ether.
pub const L2_FEE_TOKEN: EthAddress = EthAddress::ZERO;

/// A token on [`L2_CHAIN_ID`] that becomes [`SUFFICIENT_TOKEN`] on L1.
pub const L2_TOKEN: EthAddress = EthAddress::new([0x66; 20]);

/// The L1 token the second-layer fee token becomes.
pub const L1_FEE_TOKEN: EthAddress = EthAddress::new([0x88; 20]);

/// The L1 router swapping into [`L1_FEE_TOKEN`].
pub const L1_SWAP_ROUTER: EthAddress = EthAddress::new([0x99; 20]);

/// Pool fee tier of the [`L2_TOKEN`] swap.
pub const L2_TOKEN_POOL_FEE: u32 = 3_000;

/// Balance that covers anything a fixture transfer asks for.
const PLENTY: u128 = 1_000_000_000_000_000_000_000;

const PNA_GENERAL_INDEX: u128 = 7;

fn features(xcm_version: u8) -> ParachainFeatures {
    ParachainFeatures {
        has_pallet_xcm: true,
        has_dry_run_api: true,
        has_tx_payment_api: true,
        has_dry_run_rpc: true,
        has_dot_balance: true,
        xcm_version,
    }
}

fn erc20(token: EthAddress, symbol: &str, minimum_balance: u128, is_sufficient: bool) -> Asset {
    Asset {
        token,
        name: symbol.to_string(),
        symbol: symbol.to_string(),
        decimals: 18,
        minimum_balance,
        is_sufficient,
        location: None,
        location_on_ah: None,
        location_on_ethereum: None,
        asset_id: None,
    }
}

/// [`PNA_TOKEN`]'s native asset, as seen from its reserve.
fn pna_on_destination() -> Location {
    Location::new(
        0,
        vec![
            Junction::PalletInstance(50),
            Junction::GeneralIndex(PNA_GENERAL_INDEX),
        ],
    )
}

fn pna_on_asset_hub() -> Location {
    Location::new(
        1,
        vec![
            Junction::Parachain(DESTINATION_PARA_ID),
            Junction::PalletInstance(50),
            Junction::GeneralIndex(PNA_GENERAL_INDEX),
        ],
    )
}

fn pna(location: Location) -> Asset {
    Asset {
        location: Some(location),
        location_on_ah: Some(pna_on_asset_hub()),
        location_on_ethereum: Some(Location::new(
            1,
            vec![
                Junction::GlobalConsensus(NetworkId::Polkadot),
                Junction::Parachain(DESTINATION_PARA_ID),
                Junction::PalletInstance(50),
                Junction::GeneralIndex(PNA_GENERAL_INDEX),
            ],
        )),
        ..erc20(PNA_TOKEN, "PNA", 1, true)
    }
}

fn metadata(token: EthAddress, symbol: &str, foreign_id: Option<[u8; 32]>) -> ErcMetadata {
    ErcMetadata {
        token,
        name: symbol.to_string(),
        symbol: symbol.to_string(),
        decimals: 18,
        foreign_id: foreign_id.map(|id| format!("0x{}", hex_bytes(&id))),
    }
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn parachain(parachain_id: u32, name: &str, assets: Vec<Asset>) -> Parachain {
    Parachain {
        parachain_id,
        info: chain_properties(name, DESTINATION_SPEC_VERSION),
        features: features(5),
        assets: assets.into_iter().map(|asset| (asset.token, asset)).collect(),
    }
}

/// The registry snapshot every fixture chain agrees with.
///
/// AssetHub holds ether, both ERC20s and the Polkadot-native token; the destination holds all
/// but ether. The remote Kusama AssetHub only knows [`SUFFICIENT_TOKEN`].
pub fn registry() -> AssetRegistry {
    let asset_hub = parachain(
        ASSET_HUB_PARA_ID,
        "Asset Hub",
        vec![
            erc20(ETHER_TOKEN_ADDRESS, "ETH", 1, false),
            erc20(SUFFICIENT_TOKEN, "SUF", 1, true),
            erc20(INSUFFICIENT_TOKEN, "INS", 10, false),
            pna(pna_on_asset_hub()),
        ],
    );
    let destination = parachain(
        DESTINATION_PARA_ID,
        "Destination",
        vec![
            erc20(SUFFICIENT_TOKEN, "SUF", 1, true),
            erc20(INSUFFICIENT_TOKEN, "INS", DESTINATION_MIN_BALANCE, false),
            pna(pna_on_destination()),
        ],
    );
    let mut no_fee_api = parachain(
        NO_FEE_API_PARA_ID,
        "No Fee Api",
        vec![erc20(SUFFICIENT_TOKEN, "SUF", 1, true)],
    );
    no_fee_api.features.has_tx_payment_api = false;

    let l2 = L2Chain {
        chain_id: L2_CHAIN_ID,
        adaptor_address: L2_ADAPTOR,
        fee_token_address: L2_FEE_TOKEN,
        l1_fee_token_address: L1_FEE_TOKEN,
        l1_swap_router_address: L1_SWAP_ROUTER,
        assets: [
            L2Asset {
                token: L2_FEE_TOKEN,
                swap_token_address: ETHER_TOKEN_ADDRESS,
                swap_fee: None,
            },
            L2Asset {
                token: L2_TOKEN,
                swap_token_address: SUFFICIENT_TOKEN,
                swap_fee: Some(L2_TOKEN_POOL_FEE),
            },
        ]
        .into_iter()
        .map(|asset| (asset.token, asset))
        .collect(),
    };

    let remote = InterNetworkRegistry {
        network: NetworkId::Kusama,
        asset_hub_para_id: ASSET_HUB_PARA_ID,
        bridge_hub_para_id: REMOTE_BRIDGE_HUB_PARA_ID,
        parachains: BTreeMap::from([(
            ASSET_HUB_PARA_ID,
            parachain(
                ASSET_HUB_PARA_ID,
                "Kusama Asset Hub",
                vec![erc20(SUFFICIENT_TOKEN, "SUF", 1, true)],
            ),
        )]),
    };

    AssetRegistry {
        environment: "fixtures".to_string(),
        network: NetworkId::Polkadot,
        gateway_address: GATEWAY_ADDRESS,
        eth_chain_id: ETH_CHAIN_ID,
        asset_hub_para_id: ASSET_HUB_PARA_ID,
        bridge_hub_para_id: BRIDGE_HUB_PARA_ID,
        relaychain: chain_properties("Polkadot", 1_005_000),
        bridge_hub: chain_properties("Bridge Hub", 1_005_000),
        ethereum_assets: [
            metadata(ETHER_TOKEN_ADDRESS, "ETH", None),
            metadata(SUFFICIENT_TOKEN, "SUF", None),
            metadata(INSUFFICIENT_TOKEN, "INS", None),
            metadata(PNA_TOKEN, "PNA", Some(PNA_FOREIGN_ID)),
        ]
        .into_iter()
        .map(|asset| (asset.token, asset))
        .collect(),
        l2_chains: BTreeMap::from([(L2_CHAIN_ID, l2)]),
        parachains: [asset_hub, destination, no_fee_api]
            .into_iter()
            .map(|parachain| (parachain.parachain_id, parachain))
            .collect(),
        inter_network: Some(remote),
    }
}

/// The beneficiary's key.
pub fn beneficiary() -> AccountKey {
    classify_beneficiary(BENEFICIARY)
        .expect("fixture beneficiary must classify")
        .key
}

/// The inter-network sender's key.
pub fn substrate_sender() -> AccountKey {
    classify_beneficiary(SUBSTRATE_SENDER)
        .expect("fixture sender must classify")
        .key
}

fn existing_account(free: u128) -> AccountInfo {
    AccountInfo {
        providers: 1,
        free,
        ..Default::default()
    }
}

/// A dry run that completed and forwarded a program to `destination`.
pub fn forwarding_dry_run(destination: VersionedLocation) -> DryRunEffects {
    let program = Program::new(
        destination.version,
        vec![
            Instruction::ClearOrigin,
            Instruction::SetTopic(MessageId::default()),
        ],
    )
    .expect("forwarded fixture program must be valid");

    DryRunEffects {
        execution: ExecutionOutcome::Complete,
        forwarded: vec![ForwardedPrograms {
            destination,
            programs: vec![program],
        }],
    }
}

/// A gateway in normal operation; the sender is rich and has approved everything.
pub fn gateway() -> MockGateway {
    let gateway = MockGateway::new();
    {
        let mut state = gateway.state();
        state.eth_balance = PLENTY;
        state.token_balance = TokenBalance {
            balance: PLENTY,
            gateway_allowance: PLENTY,
        };
        state.estimated_gas = Ok(100_000);
        state.gas_price = Some(1_000_000_000);
        state.block_number = 20_000;
        state.latest_beefy_block = 4_000;
    }
    gateway
}

/// A bridge hub whose light client is at the Ethereum head.
pub fn bridge_hub() -> MockBridgeHub {
    let bridge_hub = MockParachain::new(BRIDGE_HUB_PARA_ID);
    {
        let mut state = bridge_hub.state();
        state.delivery_fees = vec![AssetAmount::new(dot_location(), DELIVERY_FEE)];
        state.inbound_submit_fee = INBOUND_SUBMIT_FEE;
        state.latest_execution_block = 20_000;
        state.latest_beacon_slot = 640_000;
        state.properties = chain_properties("Bridge Hub", 1_005_000);
    }
    bridge_hub
}

/// AssetHub with an ether pool, the beneficiary and a funded Substrate sender.
///
/// Received programs forward to the destination; signed calls export to the bridge hub.
pub fn asset_hub() -> MockParachain {
    let asset_hub = MockParachain::new(ASSET_HUB_PARA_ID);
    {
        let mut state = asset_hub.state();
        state.weight_fee = WEIGHT_FEE;
        state.delivery_fees = vec![AssetAmount::new(dot_location(), DELIVERY_FEE)];
        state
            .pools
            .push((bridge_location(ETH_CHAIN_ID), dot_location(), ETHER_PER_DOT));
        state.dry_run = Ok(forwarding_dry_run(VersionedLocation::sibling(
            XcmVersion::V5,
            DESTINATION_PARA_ID,
        )));
        state.dry_run_execute = Ok(forwarding_dry_run(VersionedLocation::sibling(
            XcmVersion::V4,
            BRIDGE_HUB_PARA_ID,
        )));
        state.accounts.insert(beneficiary(), existing_account(0));
        state
            .accounts
            .insert(substrate_sender(), existing_account(PLENTY));
        state.foreign_balances.insert(
            (substrate_sender(), erc20_location(ETH_CHAIN_ID, &SUFFICIENT_TOKEN)),
            PLENTY,
        );
        state.asset_deposit = ASSET_DEPOSIT;
        state.transaction_fee = Ok(10);
        state.properties = chain_properties("Asset Hub", 1_005_000);
    }
    asset_hub
}

/// The destination parachain, where the beneficiary already exists.
pub fn destination() -> MockParachain {
    let destination = MockParachain::new(DESTINATION_PARA_ID);
    {
        let mut state = destination.state();
        state.weight_fee = WEIGHT_FEE;
        state.accounts.insert(beneficiary(), existing_account(0));
        state.properties = chain_properties("Destination", DESTINATION_SPEC_VERSION);
    }
    destination
}

/// The remote network's AssetHub, with a pool buying the source relay token.
pub fn remote_asset_hub() -> MockParachain {
    let remote = MockParachain::new(ASSET_HUB_PARA_ID);
    {
        let mut state = remote.state();
        state.weight_fee = WEIGHT_FEE;
        state.pools.push((
            network_location(NetworkId::Polkadot),
            dot_location(),
            ETHER_PER_DOT,
        ));
        state.accounts.insert(beneficiary(), existing_account(0));
        state.properties = chain_properties("Kusama Asset Hub", 1_005_000);
    }
    remote
}

/// An adaptor charging a bridge fee of 100 and swapping at three to one.
pub fn l2_adaptor() -> MockL2Adaptor {
    let adaptor = MockL2Adaptor::new();
    {
        let mut state = adaptor.state();
        state.across_fee = 100;
        state.swap_rate = 3;
        state.eth_balance = PLENTY;
        state.token_balance = TokenBalance {
            balance: PLENTY,
            gateway_allowance: PLENTY,
        };
        state.estimated_gas = Ok(100_000);
        state.gas_price = Some(1_000_000);
    }
    adaptor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookups() {
        let registry = registry();

        assert!(registry.asset_hub().is_ok());
        assert_eq!(
            registry
                .ethereum_asset(&PNA_TOKEN)
                .unwrap()
                .foreign_id
                .as_deref(),
            Some("0x4444444444444444444444444444444444444444444444444444444444444444")
        );
        assert!(!registry.parachain(NO_FEE_API_PARA_ID).unwrap().features.has_tx_payment_api);
    }

    #[test]
    fn test_fixture_accounts_classify() {
        assert!(matches!(beneficiary(), AccountKey::Id32(_)));
        assert_ne!(beneficiary(), substrate_sender());
    }
}
