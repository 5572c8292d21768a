//! Errors that end a tracked transfer.

use std::time::Duration;

use snowbridge_planner_chain_api::errors::ChainError;
use thiserror::Error;

use crate::milestone::Hop;

/// Errors that can occur while following a transfer.
///
/// Any of these ends the milestone stream: the transfer was already submitted, so there is only
/// one outcome left to report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// The submission reverted on Ethereum.
    #[error("transaction 0x{0} reverted")]
    Reverted(String),

    /// The submission receipt carries no accepted outbound message.
    #[error("the gateway did not accept an outbound message")]
    MessageNotAccepted,

    /// The hop's block window passed without the expected event.
    #[error("message did not arrive at the {hop} within {blocks} blocks")]
    Timeout {
        /// The hop that was being watched.
        hop: Hop,

        /// The window that elapsed.
        blocks: usize,
    },

    /// The hop's wall-clock bound passed without the expected event.
    #[error("message did not arrive at the {hop} within {after:?}")]
    Deadline {
        /// The hop that was being watched.
        hop: Hop,

        /// The bound that elapsed.
        after: Duration,
    },

    /// The message arrived but failed to execute.
    #[error("message arrived at the {hop} in block {block} but was rejected")]
    Rejected {
        /// The hop that rejected the message.
        hop: Hop,

        /// The block it was processed in.
        block: u32,
    },

    /// The chain stopped streaming before the hop was reached.
    #[error("event stream of the {0} ended")]
    StreamEnded(Hop),

    /// The transfer ends on a parachain no client was given for.
    #[error("no client for destination parachain {0}")]
    MissingDestination(u32),

    /// A chain client failed.
    #[error("chain: {0}")]
    Chain(#[from] ChainError),
}

impl TrackerError {
    /// Whether the message reached the hop at all.
    ///
    /// `true` only for [`TrackerError::Rejected`]; a timeout means the message never arrived.
    pub const fn arrived(&self) -> bool {
        matches!(self, TrackerError::Rejected { .. })
    }
}

/// Wrapper type for results that can fail with a [`TrackerError`].
pub type TrackerResult<T> = Result<T, TrackerError>;
