//! Asset metadata as recorded in the registry snapshot.

use serde::{Deserialize, Serialize};

use crate::{address::EthAddress, location::Location};

/// How an asset reaches the Polkadot side of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// Native to the Ethereum chain and reserve-backed by the gateway.
    Erc20,

    /// Native to a Polkadot-side chain and mirrored on Ethereum by the gateway.
    Pna,
}

/// Metadata of a token as registered with the Ethereum gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErcMetadata {
    /// The token contract, or the zero address for ether.
    pub token: EthAddress,

    /// Human readable name.
    pub name: String,

    /// Ticker symbol.
    pub symbol: String,

    /// Number of decimals.
    pub decimals: u8,

    /// Gateway foreign token id, present only for Polkadot-native assets.
    #[serde(default)]
    pub foreign_id: Option<String>,
}

impl ErcMetadata {
    /// Whether the token is native to Ethereum or to the Polkadot side.
    pub const fn kind(&self) -> AssetKind {
        match self.foreign_id {
            Some(_) => AssetKind::Pna,
            None => AssetKind::Erc20,
        }
    }
}

/// Metadata of a bridged asset on one parachain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// The Ethereum token this asset mirrors.
    pub token: EthAddress,

    /// Human readable name.
    pub name: String,

    /// Ticker symbol.
    pub symbol: String,

    /// Number of decimals.
    pub decimals: u8,

    /// Smallest balance an account may hold of this asset.
    pub minimum_balance: u128,

    /// Whether holding only this asset keeps an account alive.
    pub is_sufficient: bool,

    /// Canonical location of a Polkadot-native asset, as seen from this parachain.
    #[serde(default)]
    pub location: Option<Location>,

    /// Location of a Polkadot-native asset as seen from AssetHub.
    #[serde(default)]
    pub location_on_ah: Option<Location>,

    /// Location of a Polkadot-native asset as seen from Ethereum.
    #[serde(default)]
    pub location_on_ethereum: Option<Location>,

    /// Pallet-local asset id, if the parachain uses one.
    #[serde(default)]
    pub asset_id: Option<String>,
}
