//! Unsigned contract calls, the receipts they produce, and their logical arguments.
//!
//! The ABI encoding of each call is owned by the collaborator that submits it.

use serde::{Deserialize, Serialize};
use snowbridge_planner_primitives::{
    address::{AccountKey, EthAddress},
    location::Location,
    topic::MessageId,
};
use snowbridge_planner_programs::program::Program;

/// An asset attached to a gateway message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayAsset {
    /// An Ethereum-native token, locked in the gateway.
    Native {
        /// The token contract.
        token: EthAddress,

        /// Amount locked.
        amount: u128,
    },

    /// A Polkadot-native token, burned by the gateway.
    Foreign {
        /// The gateway's id for the token.
        token_id: [u8; 32],

        /// Amount burned.
        amount: u128,
    },
}

/// Arguments of the gateway's message submission call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessage {
    /// The program appended to the one the bridge hub builds for AssetHub.
    pub program: Program,

    /// Assets attached to the message.
    pub assets: Vec<GatewayAsset>,

    /// Location allowed to claim assets trapped on AssetHub.
    pub claimer: Option<Location>,

    /// Ether paid for execution on AssetHub.
    pub execution_fee: u128,

    /// Ether paid to the relayer.
    pub relayer_fee: u128,
}

/// Deposit leg of a second-layer bridge call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositParams {
    /// The token deposited on the second-layer chain.
    pub input_token: EthAddress,

    /// The token released on L1.
    pub output_token: EthAddress,

    /// Amount deposited, bridge fees included.
    pub input_amount: u128,

    /// Amount released on L1.
    pub output_amount: u128,

    /// EIP-155 id of the L1 chain.
    pub destination_chain_id: u64,

    /// Seconds after which an unfilled deposit expires.
    pub fill_deadline_buffer: u64,
}

/// An exact-output swap through the L1 router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactOutputSingle {
    /// Token sold.
    pub token_in: EthAddress,

    /// Token bought.
    pub token_out: EthAddress,

    /// Pool fee tier.
    pub fee: u32,

    /// Receiver of the bought tokens.
    pub recipient: EthAddress,

    /// Amount bought.
    pub amount_out: u128,

    /// Most that may be sold.
    pub amount_in_maximum: u128,
}

/// Swap leg of a second-layer bridge call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParams {
    /// Amount of the transferred token set aside for the swap.
    pub input_amount: u128,

    /// The L1 router.
    pub router: EthAddress,

    /// The swap the router executes.
    pub swap: ExactOutputSingle,
}

/// A contract call the caller signs and submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractCall {
    /// Gateway message submission.
    SendMessage(SendMessage),

    /// Gateway token registration.
    RegisterToken {
        /// The token to register.
        token: EthAddress,

        /// The Polkadot-side network the token is registered on.
        network: u8,

        /// Ether paid for execution on AssetHub.
        execution_fee: u128,

        /// Ether paid to the relayer.
        relayer_fee: u128,
    },

    /// Gateway token transfer under the first-generation message format.
    SendToken {
        /// The transferred token.
        token: EthAddress,

        /// The destination parachain.
        destination_para_id: u32,

        /// The receiving account.
        beneficiary: AccountKey,

        /// DOT paid for execution on the destination.
        destination_fee: u128,

        /// Amount transferred.
        amount: u128,
    },

    /// ERC20 spend approval.
    Approve {
        /// The approved spender.
        spender: EthAddress,

        /// The approved amount.
        amount: u128,
    },

    /// Second-layer adaptor call bridging ether, then submitting a gateway message.
    SendEtherAndCall {
        /// The bridge deposit.
        deposit: DepositParams,

        /// The gateway message.
        send: SendMessage,

        /// The submitting account.
        source_account: EthAddress,

        /// The transfer's correlation topic.
        topic: MessageId,
    },

    /// Second-layer adaptor call bridging a token, swapping part of it for fees, then submitting a
    /// gateway message.
    SendTokenAndCall {
        /// The bridge deposit.
        deposit: DepositParams,

        /// The fee swap.
        swap: SwapParams,

        /// The gateway message.
        send: SendMessage,

        /// The submitting account.
        source_account: EthAddress,

        /// The transfer's correlation topic.
        topic: MessageId,
    },
}

/// An unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTx {
    /// The signing account.
    pub from: EthAddress,

    /// The called contract.
    pub to: EthAddress,

    /// Ether attached.
    pub value: u128,

    /// The call.
    pub call: ContractCall,
}

/// A gateway log decoded by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptLog {
    /// The gateway accepted an outbound message.
    OutboundMessageAccepted {
        /// The channel the message was queued on.
        channel_id: [u8; 32],

        /// The message's sequence number on its channel.
        nonce: u64,

        /// The message's correlation id.
        message_id: MessageId,
    },

    /// Any other log.
    Other {
        /// The emitting contract.
        address: EthAddress,
    },
}

/// The receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// The transaction hash.
    pub transaction_hash: [u8; 32],

    /// Number of the including block.
    pub block_number: u64,

    /// Hash of the including block.
    pub block_hash: [u8; 32],

    /// Whether execution succeeded.
    pub status: bool,

    /// Logs in emission order.
    pub logs: Vec<ReceiptLog>,
}
