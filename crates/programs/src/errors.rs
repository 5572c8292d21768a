//! Errors raised while building a program.

use snowbridge_planner_primitives::errors::PrimitiveError;
use thiserror::Error;

use crate::program::XcmVersion;

/// Errors that can occur while assembling a message program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// An input could not be resolved.
    #[error("invalid builder input: {0}")]
    Input(#[from] PrimitiveError),

    /// The instruction does not exist in the requested program version.
    #[error("instruction {instruction} is not available in {version:?}")]
    UnsupportedInstruction {
        /// Name of the offending instruction.
        instruction: &'static str,

        /// The version the program was built for.
        version: XcmVersion,
    },

    /// A program was built without the trailing correlation marker.
    #[error("program does not end with a topic")]
    MissingTopic,

    /// A program prefix and a body were built for different versions.
    #[error("cannot join a {prefix:?} prefix with a {body:?} body")]
    VersionMismatch {
        /// Version of the prefix.
        prefix: XcmVersion,

        /// Version of the body.
        body: XcmVersion,
    },
}

/// Wrapper type for results that can fail with a [`BuilderError`].
pub type BuilderResult<T> = Result<T, BuilderError>;
