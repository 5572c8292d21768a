//! Second-layer chains and their adaptor contracts.

use async_trait::async_trait;
use snowbridge_planner_primitives::address::EthAddress;

use crate::{
    errors::ChainResult,
    tx::UnsignedTx,
    types::{FeeData, TokenBalance},
};

/// Everything the planner reads from a second-layer chain and the services it bridges through.
#[async_trait]
pub trait L2AdaptorClient: Send + Sync {
    /// Fee charged by the bridge to move `amount` of `input_token` on `l2_chain_id` into
    /// `output_token` on `destination_chain_id`, in the input token.
    async fn across_bridge_fee(
        &self,
        input_token: &EthAddress,
        output_token: &EthAddress,
        l2_chain_id: u64,
        destination_chain_id: u64,
        amount: u128,
    ) -> ChainResult<u128>;

    /// How much of `token_in` the L1 router needs to buy exactly `amount` of `token_out`.
    async fn quote_exact_output_single(
        &self,
        token_in: &EthAddress,
        token_out: &EthAddress,
        amount: u128,
        pool_fee: u32,
    ) -> ChainResult<u128>;

    /// Pending transaction count of `account` on the second-layer chain.
    async fn transaction_count(&self, account: &EthAddress) -> ChainResult<u64>;

    /// Ether balance of `account` on the second-layer chain.
    async fn eth_balance(&self, account: &EthAddress) -> ChainResult<u128>;

    /// Balance of `owner` in `token` and the allowance granted to `spender`.
    async fn token_balance(
        &self,
        token: &EthAddress,
        owner: &EthAddress,
        spender: &EthAddress,
    ) -> ChainResult<TokenBalance>;

    /// Gas needed to execute `tx` on the second-layer chain.
    async fn estimate_gas(&self, tx: &UnsignedTx) -> ChainResult<u128>;

    /// Current fee market data of the second-layer chain.
    async fn fee_data(&self) -> ChainResult<FeeData>;
}
