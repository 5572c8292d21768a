//! Errors for the primitive types.

use thiserror::Error;

/// Errors that can occur while parsing inputs or resolving them against the registry.
///
/// All of these are input errors: they are detected before any network call and are never worth
/// retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrimitiveError {
    /// The address is neither a 20-byte key, a 32-byte account nor a valid SS58 string.
    #[error("unknown beneficiary address format: {0}")]
    InvalidAddress(String),

    /// A hex string could not be decoded into the expected number of bytes.
    #[error("invalid hex for {expected}-byte value: {input}")]
    InvalidHex {
        /// The expected byte length.
        expected: usize,

        /// The offending input.
        input: String,
    },

    /// The SS58 checksum does not match its payload.
    #[error("bad SS58 checksum in {0}")]
    BadChecksum(String),

    /// The parachain is not part of the registry snapshot.
    #[error("parachain {0} is not in the registry")]
    UnknownParachain(u32),

    /// The token is not registered on Ethereum.
    #[error("token {0} is not registered on Ethereum")]
    UnknownToken(String),

    /// The token is known but has no representation on the given parachain.
    #[error("token {token} is not registered on parachain {para_id}")]
    AssetNotBridgeable {
        /// The token that was requested.
        token: String,

        /// The parachain lacking the asset.
        para_id: u32,
    },

    /// The second-layer chain is not part of the registry snapshot.
    #[error("L2 chain {0} is not supported by the registry")]
    UnknownL2Chain(u64),

    /// The registry has no inter-network configuration.
    #[error("registry does not describe an inter-network bridge")]
    MissingInterNetwork,

    /// A location walked above the global consensus root while being reanchored.
    #[error("location cannot be reanchored: {0}")]
    Reanchor(String),

    /// A fee computation overflowed.
    #[error("fee arithmetic overflowed while computing {0}")]
    FeeOverflow(&'static str),
}

/// Wrapper type for results that can fail with a [`PrimitiveError`].
pub type PrimitiveResult<T> = Result<T, PrimitiveError>;
