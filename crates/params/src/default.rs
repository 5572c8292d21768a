//! Default values for the planner parameters.

/// Default percentage by which execution fees are padded to absorb weight estimation variance.
pub const EXECUTION_FEE_PADDING_PCT: u32 = 33;

/// Default percentage by which the relayer fee is padded when not overridden by the caller.
pub const RELAYER_FEE_PADDING_PCT: u32 = 30;

/// Default percentage by which inter-network export and destination fees are padded.
pub const INTER_NETWORK_FEE_PADDING_PCT: u32 = 33;

/// Default percentage by which second-layer bridge and swap quotes are padded.
pub const L2_FEE_PADDING_PCT: u32 = 33;

/// Default percentage by which the asset deposit for a token registration is padded.
pub const ASSET_DEPOSIT_PADDING_PCT: u32 = 10;

/// Default pool fee tier (in hundredths of a basis point) for second-layer fee swaps, i.e. 0.05%.
pub const L2_SWAP_POOL_FEE: u32 = 500;

/// Default buffer in seconds after which an unfilled second-layer deposit expires.
pub const FILL_DEADLINE_BUFFER_SECS: u64 = 600;

/// Default maximum number of consumers an account may have on a parachain.
pub const MAX_CONSUMERS: u32 = 63;

/// Number of blocks the beacon light client may lag behind before a warning is raised.
///
/// Finality updates are synced every 32 slots, so this allows for 4 epochs.
pub const MAX_BEACON_LATENCY_BLOCKS: u64 = 128;

/// Number of bridge hub blocks to wait for the light client to include the source block.
pub const LIGHT_CLIENT_SCAN_BLOCKS: usize = 10;

/// Number of blocks to scan per hop while waiting for a delivery event.
pub const SCAN_BLOCKS: usize = 200;

/// Fallback base fee of the Kusama side of the inter-network bridge, in KSM planck.
pub const KUSAMA_BASE_FEE: u64 = 10_602_492_378;

/// Fallback per-byte fee of the Kusama side of the inter-network bridge, in KSM planck.
pub const KUSAMA_FEE_PER_BYTE: u64 = 1_000_000;

/// Fallback base fee of the Polkadot side of the inter-network bridge, in DOT planck.
pub const POLKADOT_BASE_FEE: u64 = 333_794_429;

/// Fallback per-byte fee of the Polkadot side of the inter-network bridge, in DOT planck.
pub const POLKADOT_FEE_PER_BYTE: u64 = 16_666;
