//! The registry snapshot: an immutable description of every chain, asset and feature flag the
//! planner is allowed to use.
//!
//! The snapshot is produced by an external indexer and treated as read-only input.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    address::EthAddress,
    asset::{Asset, ErcMetadata},
    constants::XCM_V5,
    errors::{PrimitiveError, PrimitiveResult},
    location::NetworkId,
};

/// Address width a chain uses for its native accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// 20-byte Ethereum-style accounts.
    AccountId20,

    /// 32-byte Substrate accounts.
    AccountId32,
}

/// Static properties of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainProperties {
    /// Native token symbol.
    pub token_symbols: String,

    /// Native token decimals.
    pub token_decimals: u8,

    /// SS58 address prefix.
    pub ss58_format: u16,

    /// Whether the chain runs an Ethereum-compatible execution environment.
    pub is_ethereum: bool,

    /// Native account width.
    pub account_type: AccountType,

    /// EVM chain id, for Ethereum-compatible parachains.
    #[serde(default)]
    pub evm_chain_id: Option<u64>,

    /// Human readable chain name.
    pub name: String,

    /// Runtime spec name.
    pub spec_name: String,

    /// Runtime spec version.
    pub spec_version: u32,
}

/// Runtime capabilities that change how the planner talks to a parachain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParachainFeatures {
    /// The runtime has `pallet-xcm`.
    pub has_pallet_xcm: bool,

    /// The runtime exposes the dry-run runtime API.
    pub has_dry_run_api: bool,

    /// The runtime exposes the transaction payment and XCM payment runtime APIs.
    pub has_tx_payment_api: bool,

    /// The node exposes a dry-run RPC.
    pub has_dry_run_rpc: bool,

    /// The runtime holds DOT balances and can pay fees in DOT.
    pub has_dot_balance: bool,

    /// Newest version of the message format the runtime understands.
    pub xcm_version: u8,
}

/// A parachain and the bridged assets it knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parachain {
    /// The parachain id.
    pub parachain_id: u32,

    /// Static chain properties.
    pub info: ChainProperties,

    /// Runtime capabilities.
    pub features: ParachainFeatures,

    /// Bridged assets keyed by their Ethereum token address.
    pub assets: BTreeMap<EthAddress, Asset>,
}

impl Parachain {
    /// Looks up the parachain's representation of an Ethereum token.
    pub fn asset(&self, token: &EthAddress) -> PrimitiveResult<&Asset> {
        self.assets
            .get(token)
            .ok_or_else(|| PrimitiveError::AssetNotBridgeable {
                token: token.to_string(),
                para_id: self.parachain_id,
            })
    }

    /// Whether programs executing on this parachain may use the v5 instruction set.
    pub const fn supports_v5(&self) -> bool {
        self.features.xcm_version >= XCM_V5
    }
}

/// A token on a second-layer chain and the L1 token it is swapped into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2Asset {
    /// The token on the second-layer chain.
    pub token: EthAddress,

    /// The L1 token the second-layer token is bridged into.
    pub swap_token_address: EthAddress,

    /// Pool fee tier of the L1 swap pool, if it differs from the default.
    #[serde(default)]
    pub swap_fee: Option<u32>,
}

/// A second-layer execution chain connected to the Ethereum side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2Chain {
    /// The chain's EIP-155 id.
    pub chain_id: u64,

    /// The adaptor contract that bridges to L1 and calls the gateway.
    pub adaptor_address: EthAddress,

    /// The token fees are paid in on the second-layer chain.
    pub fee_token_address: EthAddress,

    /// The L1 token the second-layer fee token is bridged into.
    pub l1_fee_token_address: EthAddress,

    /// The L1 router that swaps a transferred token into the fee token.
    pub l1_swap_router_address: EthAddress,

    /// Supported tokens keyed by their second-layer address.
    pub assets: BTreeMap<EthAddress, L2Asset>,
}

impl L2Chain {
    /// Looks up a token supported on this chain.
    pub fn asset(&self, token: &EthAddress) -> PrimitiveResult<&L2Asset> {
        self.assets
            .get(token)
            .ok_or_else(|| PrimitiveError::UnknownToken(token.to_string()))
    }
}

/// The other relay network reachable through the inter-network bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterNetworkRegistry {
    /// The remote network.
    pub network: NetworkId,

    /// AssetHub parachain id on the remote network.
    pub asset_hub_para_id: u32,

    /// Bridge hub parachain id on the remote network.
    pub bridge_hub_para_id: u32,

    /// Parachains of the remote network.
    pub parachains: BTreeMap<u32, Parachain>,
}

/// The full registry snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRegistry {
    /// Name of the environment, e.g. `polkadot_mainnet`.
    pub environment: String,

    /// The local relay network.
    pub network: NetworkId,

    /// The Ethereum gateway contract.
    pub gateway_address: EthAddress,

    /// EIP-155 id of the Ethereum chain.
    pub eth_chain_id: u64,

    /// AssetHub parachain id.
    pub asset_hub_para_id: u32,

    /// Bridge hub parachain id.
    pub bridge_hub_para_id: u32,

    /// Relay chain properties.
    pub relaychain: ChainProperties,

    /// Bridge hub properties.
    pub bridge_hub: ChainProperties,

    /// Tokens registered with the gateway.
    pub ethereum_assets: BTreeMap<EthAddress, ErcMetadata>,

    /// Connected second-layer chains keyed by chain id.
    #[serde(default)]
    pub l2_chains: BTreeMap<u64, L2Chain>,

    /// Parachains keyed by id.
    pub parachains: BTreeMap<u32, Parachain>,

    /// The remote relay network, if an inter-network bridge is configured.
    #[serde(default)]
    pub inter_network: Option<InterNetworkRegistry>,
}

impl AssetRegistry {
    /// Looks up a parachain.
    pub fn parachain(&self, para_id: u32) -> PrimitiveResult<&Parachain> {
        self.parachains
            .get(&para_id)
            .ok_or(PrimitiveError::UnknownParachain(para_id))
    }

    /// Looks up AssetHub.
    pub fn asset_hub(&self) -> PrimitiveResult<&Parachain> {
        self.parachain(self.asset_hub_para_id)
    }

    /// Looks up a token registered with the gateway.
    pub fn ethereum_asset(&self, token: &EthAddress) -> PrimitiveResult<&ErcMetadata> {
        self.ethereum_assets
            .get(token)
            .ok_or_else(|| PrimitiveError::UnknownToken(token.to_string()))
    }

    /// Looks up a second-layer chain.
    pub fn l2_chain(&self, chain_id: u64) -> PrimitiveResult<&L2Chain> {
        self.l2_chains
            .get(&chain_id)
            .ok_or(PrimitiveError::UnknownL2Chain(chain_id))
    }

    /// Returns the inter-network configuration.
    pub fn inter_network(&self) -> PrimitiveResult<&InterNetworkRegistry> {
        self.inter_network
            .as_ref()
            .ok_or(PrimitiveError::MissingInterNetwork)
    }
}
