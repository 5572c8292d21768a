//! Protocol constants that programs and identifiers are built from.
//!
//! These values are fixed by the runtimes on either side of the bridge; changing them would make
//! the produced programs unintelligible to the chains that execute them.

use crate::address::EthAddress;

/// The pseudo token address used by the gateway to denote ether itself.
pub const ETHER_TOKEN_ADDRESS: EthAddress = EthAddress::ZERO;

/// Pallet index of the v2 inbound queue on the bridge hub, used as the origin of programs that
/// enter AssetHub from Ethereum.
pub const INBOUND_QUEUE_V2_PALLET_INDEX: u8 = 91;

/// Pallet index of the v1 inbound queue on the bridge hub.
pub const INBOUND_QUEUE_V1_PALLET_INDEX: u8 = 80;

/// Pallet index of the inter-network bridge messages pallet on each bridge hub.
pub const INTER_NETWORK_BRIDGE_PALLET_INDEX: u8 = 53;

/// Minimum balance of a foreign asset created by a token registration.
pub const REGISTERED_ASSET_MIN_BALANCE: u128 = 1;

/// Placeholder amount used in sample programs so that a priced program is never smaller than the
/// real one. Equal to the maximum representable fungible amount.
pub const PLACEHOLDER_AMOUNT: u128 = u128::MAX;

/// Smallest version of the message format that understands `InitiateTransfer`, `PayFees` and
/// `SetHints`.
pub const XCM_V5: u8 = 5;

/// Storage key under which the bridge hub router keeps the inter-network base fee.
pub const BRIDGE_ROUTER_BASE_FEE_KEY: &[u8] = b":XcmBridgeHubRouterBaseFee:";

/// Storage key under which the bridge hub router keeps the inter-network per-byte fee.
pub const BRIDGE_ROUTER_BYTE_FEE_KEY: &[u8] = b":XcmBridgeHubRouterByteFee:";

/// Prefix hashed together with a chain id to derive the bridge owner account on AssetHub.
pub(crate) const BRIDGE_OWNER_PREFIX: &[u8] = b"ethereum-chain";

/// Prefix hashed together with a topic to derive the topic of a forwarded message.
pub(crate) const FORWARD_ID_PREFIX: &[u8] = b"forward_id_for";

/// Prefix mixed into the SS58 checksum preimage.
pub(crate) const SS58_CHECKSUM_PREFIX: &[u8] = b"SS58PRE";
