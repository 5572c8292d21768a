//! Extraction of the bridge message from a submission receipt.

use serde::{Deserialize, Serialize};
use snowbridge_planner_chain_api::tx::{ReceiptLog, TxReceipt};
use snowbridge_planner_primitives::topic::MessageId;
use tracing::debug;

use crate::errors::{TrackerError, TrackerResult};

/// The outbound message a submitted transfer created on the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    /// The submission transaction.
    pub transaction_hash: [u8; 32],

    /// The Ethereum block that included the submission.
    pub block_number: u64,

    /// Hash of that block.
    pub block_hash: [u8; 32],

    /// The channel the message was queued on.
    pub channel_id: [u8; 32],

    /// The message's sequence number on its channel.
    pub nonce: u64,

    /// The gateway's id of the message.
    pub message_id: MessageId,
}

/// Reads the accepted outbound message out of a mined submission.
pub fn parse_receipt(receipt: &TxReceipt) -> TrackerResult<MessageReceipt> {
    if !receipt.status {
        return Err(TrackerError::Reverted(hex::encode(receipt.transaction_hash)));
    }

    let (channel_id, nonce, message_id) = receipt
        .logs
        .iter()
        .find_map(|log| match log {
            ReceiptLog::OutboundMessageAccepted {
                channel_id,
                nonce,
                message_id,
            } => Some((*channel_id, *nonce, *message_id)),
            ReceiptLog::Other { .. } => None,
        })
        .ok_or(TrackerError::MessageNotAccepted)?;

    debug!(block = receipt.block_number, %nonce, "gateway accepted outbound message");

    Ok(MessageReceipt {
        transaction_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        block_hash: receipt.block_hash,
        channel_id,
        nonce,
        message_id,
    })
}
