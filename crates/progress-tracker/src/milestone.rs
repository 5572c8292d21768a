//! The hops a transfer crosses and the milestone reached at each.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A leg of the delivery path, in the order a transfer crosses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Hop {
    /// The bridge hub's beacon light client learning the Ethereum block of the submission.
    LightClient,

    /// The bridge hub's inbound queue.
    BridgeHub,

    /// AssetHub, where every transfer from Ethereum settles first.
    AssetHub,

    /// A further parachain the transfer is forwarded to.
    Destination(u32),
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hop::LightClient => write!(f, "light client"),
            Hop::BridgeHub => write!(f, "bridge hub"),
            Hop::AssetHub => write!(f, "asset hub"),
            Hop::Destination(para_id) => write!(f, "parachain {para_id}"),
        }
    }
}

/// A point of the delivery path a transfer has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Milestone {
    /// The light client's execution head reached the submission block.
    IncludedByLightClient {
        /// The light client's execution head when the inclusion was observed.
        execution_block: u64,
    },

    /// The bridge hub's inbound queue received the message.
    ReceivedOnBridgeHub {
        /// The bridge hub block.
        block: u32,

        /// The message's nonce on its channel.
        nonce: u64,
    },

    /// AssetHub executed the message.
    ProcessedOnAssetHub {
        /// The AssetHub block.
        block: u32,
    },

    /// The destination parachain executed the forwarded message.
    ProcessedOnDestination {
        /// The destination.
        para_id: u32,

        /// The destination block.
        block: u32,
    },
}

impl Milestone {
    /// The hop this milestone completes.
    pub const fn hop(&self) -> Hop {
        match self {
            Milestone::IncludedByLightClient { .. } => Hop::LightClient,
            Milestone::ReceivedOnBridgeHub { .. } => Hop::BridgeHub,
            Milestone::ProcessedOnAssetHub { .. } => Hop::AssetHub,
            Milestone::ProcessedOnDestination { para_id, .. } => Hop::Destination(*para_id),
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Milestone::IncludedByLightClient { execution_block } => write!(
                f,
                "included by the light client at execution block {execution_block}"
            ),
            Milestone::ReceivedOnBridgeHub { block, nonce } => {
                write!(f, "message {nonce} received on the bridge hub at block {block}")
            }
            Milestone::ProcessedOnAssetHub { block } => {
                write!(f, "processed on AssetHub at block {block}")
            }
            Milestone::ProcessedOnDestination { para_id, block } => {
                write!(f, "processed on parachain {para_id} at block {block}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hops_are_ordered_along_the_path() {
        assert!(Hop::LightClient < Hop::BridgeHub);
        assert!(Hop::BridgeHub < Hop::AssetHub);
        assert!(Hop::AssetHub < Hop::Destination(1000));
    }

    #[test]
    fn test_milestone_display() {
        let milestone = Milestone::ProcessedOnDestination {
            para_id: 2030,
            block: 7,
        };

        assert_eq!(milestone.hop(), Hop::Destination(2030));
        assert_eq!(milestone.to_string(), "processed on parachain 2030 at block 7");
    }
}
