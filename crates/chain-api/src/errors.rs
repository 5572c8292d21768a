//! Errors reported by chain clients.

use thiserror::Error;

/// Errors that a chain client can return.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The connection to the chain failed. The planner never retries these.
    #[error("transport: {0}")]
    Transport(String),

    /// The chain answered the call with an error payload.
    #[error("{call} rejected: {reason}")]
    Rejected {
        /// The call that was rejected.
        call: &'static str,

        /// The chain-reported reason.
        reason: String,
    },

    /// The chain does not expose the call at all.
    #[error("{0} is not supported by this chain")]
    Unsupported(&'static str),
}

impl ChainError {
    /// Whether the error came from the connection rather than from the chain.
    pub const fn is_transport(&self) -> bool {
        matches!(self, ChainError::Transport(_))
    }
}

/// Wrapper type for results that can fail with a [`ChainError`].
pub type ChainResult<T> = Result<T, ChainError>;
