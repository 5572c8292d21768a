//! Events observed on the Polkadot side after a transfer was submitted.

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use snowbridge_planner_primitives::{address::AccountId32, location::Location, topic::MessageId};

use crate::errors::ChainResult;

/// A finalized block hash.
pub type BlockHash = [u8; 32];

/// The events of interest the collaborator decoded from a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainEvent {
    /// The bridge hub's inbound queue accepted a message from Ethereum.
    InboundMessageReceived {
        /// The channel the message arrived on.
        channel_id: [u8; 32],

        /// The message's sequence number on its channel.
        nonce: u64,

        /// The message's correlation id.
        message_id: MessageId,
    },

    /// The message queue finished processing a message.
    MessageQueueProcessed {
        /// The processed message's id.
        id: MessageId,

        /// The sibling parachain the message came from, if any.
        origin_para_id: Option<u32>,

        /// Whether the message executed successfully.
        success: bool,
    },

    /// A foreign asset was minted to an account.
    ForeignAssetIssued {
        /// The asset.
        asset: Location,

        /// The receiving account.
        owner: AccountId32,

        /// The minted amount.
        amount: u128,
    },
}

/// The decoded events of one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEvents {
    /// The block number.
    pub number: u32,

    /// The block hash.
    pub hash: BlockHash,

    /// The events of interest, in block order.
    pub events: Vec<ChainEvent>,
}

/// An update of the Ethereum execution head tracked by the beacon light client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionHeadUpdate {
    /// The bridge hub block that stored the update.
    pub bridge_hub_block: BlockHash,

    /// The newest Ethereum block the light client knows.
    pub execution_block: u64,
}

/// A stream of items a chain client pushes as new blocks are finalized.
pub type ChainStream<T> = BoxStream<'static, ChainResult<T>>;
