//! The Ethereum gateway and the chain it is deployed on.

use async_trait::async_trait;
use snowbridge_planner_primitives::address::EthAddress;

use crate::{
    errors::ChainResult,
    tx::UnsignedTx,
    types::{FeeData, OperatingMode, TokenBalance},
};

/// Everything the planner reads from Ethereum.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Ether balance of `account`.
    async fn eth_balance(&self, account: &EthAddress) -> ChainResult<u128>;

    /// Balance of `owner` in `token` and the allowance granted to `spender`.
    async fn token_balance(
        &self,
        token: &EthAddress,
        owner: &EthAddress,
        spender: &EthAddress,
    ) -> ChainResult<TokenBalance>;

    /// Gas needed to execute `tx`. A reverting call is reported as `Rejected`.
    async fn estimate_gas(&self, tx: &UnsignedTx) -> ChainResult<u128>;

    /// Current fee market data.
    async fn fee_data(&self) -> ChainResult<FeeData>;

    /// Pending transaction count of `account`.
    async fn transaction_count(&self, account: &EthAddress) -> ChainResult<u64>;

    /// Operating mode of the gateway's outbound channel.
    async fn operating_mode(&self) -> ChainResult<OperatingMode>;

    /// The newest relay chain block the BEEFY light client has verified.
    async fn latest_beefy_block(&self) -> ChainResult<u64>;

    /// The latest block number.
    async fn block_number(&self) -> ChainResult<u64>;
}
