//! The location model: a structured path identifying an account or asset relative to some chain's
//! point of view.
//!
//! Locations are plain data and compare structurally. A location is only meaningful together with
//! the chain it is expressed from; moving it to another chain requires [`Location::reanchored`].

use arbitrary::Arbitrary;
use serde::{Deserialize, Serialize};

use crate::{
    address::{AccountId32, EthAddress},
    constants::ETHER_TOKEN_ADDRESS,
    errors::{PrimitiveError, PrimitiveResult},
};

/// A global consensus system.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Arbitrary,
)]
#[serde(rename_all = "camelCase")]
pub enum NetworkId {
    /// An Ethereum-style chain identified by its EIP-155 chain id.
    Ethereum {
        /// The EIP-155 chain id.
        chain_id: u64,
    },

    /// The Polkadot relay chain and its parachains.
    Polkadot,

    /// The Kusama relay chain and its parachains.
    Kusama,
}

/// A single segment of a location's interior path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Arbitrary,
)]
#[serde(rename_all = "camelCase")]
pub enum Junction {
    /// A parachain of the current relay chain.
    Parachain(u32),

    /// A pallet of the current chain.
    PalletInstance(u8),

    /// A 32-byte account.
    AccountId32 {
        /// Network the account belongs to, `None` for the local one.
        network: Option<NetworkId>,

        /// The account bytes.
        id: AccountId32,
    },

    /// A 20-byte account or contract.
    AccountKey20 {
        /// Network the account belongs to, `None` for the local one.
        network: Option<NetworkId>,

        /// The account bytes.
        key: EthAddress,
    },

    /// An index into a pallet-defined collection, e.g. an asset id.
    GeneralIndex(u128),

    /// The root of a consensus system.
    GlobalConsensus(NetworkId),
}

/// A relative path: `parents` steps up the hierarchy followed by the `interior` junctions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Number of steps towards the root before descending.
    pub parents: u8,

    /// Junctions to descend through; empty means `Here`.
    pub interior: Vec<Junction>,
}

impl<'a> Arbitrary<'a> for Location {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let parents = u.int_in_range(0..=2)?;
        let len = u.int_in_range(0..=3)?;
        let interior = (0..len)
            .map(|_| Junction::arbitrary(u))
            .collect::<arbitrary::Result<_>>()?;
        Ok(Self { parents, interior })
    }
}

impl Location {
    /// Creates a location from its parts.
    pub const fn new(parents: u8, interior: Vec<Junction>) -> Self {
        Self { parents, interior }
    }

    /// The location of the chain interpreting it.
    pub const fn here() -> Self {
        Self::new(0, Vec::new())
    }

    /// The location of the parent (relay chain) of the chain interpreting it.
    pub const fn parent() -> Self {
        Self::new(1, Vec::new())
    }

    /// Whether the interior is empty.
    pub fn is_here_interior(&self) -> bool {
        self.interior.is_empty()
    }

    /// Returns a copy of this location with `junction` appended to the interior.
    pub fn pushed_with(&self, junction: Junction) -> Self {
        let mut interior = self.interior.clone();
        interior.push(junction);
        Self::new(self.parents, interior)
    }

    /// Expresses this location, currently relative to a chain at `context` (the chain's universal
    /// path, rooted at its global consensus), relative to `target` instead.
    ///
    /// `target` is itself relative to `context`. The result is the shortest path from `target` to
    /// the same place, so a location never carries redundant up-then-down steps.
    pub fn reanchored(&self, target: &Location, context: &[Junction]) -> PrimitiveResult<Location> {
        let absolute = to_universal(self, context)?;
        let target_absolute = to_universal(target, context)?;

        let common = absolute
            .iter()
            .zip(target_absolute.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let parents = u8::try_from(target_absolute.len() - common)
            .map_err(|_| PrimitiveError::Reanchor(format!("{target:?} is too deep")))?;
        Ok(Location::new(parents, absolute[common..].to_vec()))
    }
}

/// Resolves `location` against the universal path of the chain it is expressed from.
fn to_universal(location: &Location, context: &[Junction]) -> PrimitiveResult<Vec<Junction>> {
    let parents = location.parents as usize;
    if parents > context.len() {
        return Err(PrimitiveError::Reanchor(format!(
            "{location:?} climbs above the consensus root of {context:?}"
        )));
    }
    let mut universal = context[..context.len() - parents].to_vec();
    universal.extend_from_slice(&location.interior);
    Ok(universal)
}

/// The relay chain's native token as seen from one of its parachains.
pub fn dot_location() -> Location {
    Location::parent()
}

/// The `GlobalConsensus` junction of an Ethereum chain.
pub const fn ethereum_network(chain_id: u64) -> Junction {
    Junction::GlobalConsensus(NetworkId::Ethereum { chain_id })
}

/// The location of an Ethereum chain as seen from a parachain. Also the location of ether.
pub fn bridge_location(chain_id: u64) -> Location {
    Location::new(2, vec![ethereum_network(chain_id)])
}

/// The location of an ERC20 token (or ether, for the zero address) as seen from a parachain.
pub fn erc20_location(chain_id: u64, token: &EthAddress) -> Location {
    if *token == ETHER_TOKEN_ADDRESS {
        return bridge_location(chain_id);
    }
    Location::new(
        2,
        vec![
            ethereum_network(chain_id),
            Junction::AccountKey20 {
                network: None,
                key: *token,
            },
        ],
    )
}

/// The location of an ERC20 token (or ether) as seen from the Ethereum chain itself.
pub fn erc20_location_reanchored(token: &EthAddress) -> Location {
    if *token == ETHER_TOKEN_ADDRESS {
        return Location::here();
    }
    Location::new(
        0,
        vec![Junction::AccountKey20 {
            network: None,
            key: *token,
        }],
    )
}

/// The location of a sibling parachain.
pub fn parachain_location(para_id: u32) -> Location {
    Location::new(1, vec![Junction::Parachain(para_id)])
}

/// The location of another relay network's consensus root, as seen from a parachain.
pub fn network_location(network: NetworkId) -> Location {
    Location::new(2, vec![Junction::GlobalConsensus(network)])
}

/// The universal path of a parachain.
pub fn universal_parachain(network: NetworkId, para_id: u32) -> Vec<Junction> {
    vec![
        Junction::GlobalConsensus(network),
        Junction::Parachain(para_id),
    ]
}

/// Whether `location` is the relay chain's native token as seen from a parachain.
pub fn is_relay_token(location: &Location) -> bool {
    location.parents == 1 && location.interior.is_empty()
}

/// Whether `location` is ether or an ERC20 of any Ethereum chain, as seen from a parachain.
pub fn is_ethereum_asset(location: &Location) -> bool {
    location.parents == 2
        && matches!(
            location.interior.first(),
            Some(Junction::GlobalConsensus(NetworkId::Ethereum { .. }))
        )
}

/// Whether `location` is DOT as seen from a Kusama parachain.
pub fn is_dot_on_other_consensus(location: &Location) -> bool {
    *location == network_location(NetworkId::Polkadot)
}

/// Whether `location` is KSM as seen from a Polkadot parachain.
pub fn is_ksm_on_other_consensus(location: &Location) -> bool {
    *location == network_location(NetworkId::Kusama)
}
