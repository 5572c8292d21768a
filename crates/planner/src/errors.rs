//! Errors that abort a planning call.
//!
//! Findings about a transfer that was planned successfully are not errors; they are reported as
//! [`ValidationLog`](crate::validation::ValidationLog)s.

use snowbridge_planner_chain_api::errors::ChainError;
use snowbridge_planner_primitives::{errors::PrimitiveError, fee::FeeAsset, location::Location};
use snowbridge_planner_programs::errors::BuilderError;
use thiserror::Error;

/// Errors that can occur while pricing, building or validating a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// An input could not be resolved against the registry.
    #[error("invalid input: {0}")]
    Input(#[from] PrimitiveError),

    /// A program could not be built.
    #[error("could not build program: {0}")]
    Builder(#[from] BuilderError),

    /// A chain read failed.
    #[error("chain read failed: {0}")]
    Chain(#[from] ChainError),

    /// The destination cannot price execution and the caller supplied no fee for it.
    #[error("parachain {0} cannot quote execution fees and needs a fee override")]
    FeeOverrideRequired(u32),

    /// No pool on AssetHub converts between the two assets.
    #[error("no swap pool between {from:?} and {to:?}")]
    NoSwapPool {
        /// The asset being converted.
        from: Location,

        /// The asset being converted into.
        to: Location,
    },

    /// The fee asset cannot be used for this transfer.
    #[error("fee asset {fee_asset:?} is not supported for parachain {para_id}")]
    UnsupportedFeeAsset {
        /// The requested fee asset.
        fee_asset: FeeAsset,

        /// The destination parachain.
        para_id: u32,
    },

    /// The combination of asset, destination and runtime versions has no transfer path.
    #[error("unsupported transfer topology: {0}")]
    UnsupportedTopology(String),

    /// The registry records a foreign token id that is not 32 bytes of hex.
    #[error("invalid foreign token id {0}")]
    InvalidForeignId(String),

    /// A Polkadot-native asset has no location on a chain it must pass through.
    #[error("asset {token} has no location on parachain {para_id}")]
    MissingLocation {
        /// The token on Ethereum.
        token: String,

        /// The parachain lacking the location.
        para_id: u32,
    },

    /// A chain needed to price the transfer was not connected.
    #[error("no connection to parachain {0}")]
    NoConnection(u32),

    /// The adaptor of a second-layer chain was not connected.
    #[error("no connection to L2 chain {0}")]
    NoL2Connection(u64),

    /// The transfer was planned by a different topology than the one validating it.
    #[error("transfer was planned for {planned} but is being handled as {handled}")]
    TopologyMismatch {
        /// The topology recorded in the transfer.
        planned: String,

        /// The topology asked to handle it.
        handled: String,
    },
}

/// Wrapper type for results that can fail with a [`PlannerError`].
pub type PlannerResult<T> = Result<T, PlannerError>;
