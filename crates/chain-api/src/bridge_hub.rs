//! The bridge hub: light client and message queue state.

use async_trait::async_trait;

use crate::{
    errors::ChainResult,
    events::{ChainStream, ExecutionHeadUpdate},
    parachain::ParachainClient,
    types::OperatingMode,
};

/// Everything the planner reads from the bridge hub.
#[async_trait]
pub trait BridgeHubClient: ParachainClient {
    /// Operating mode of the beacon light client.
    async fn beacon_operating_mode(&self) -> ChainResult<OperatingMode>;

    /// Operating mode of the inbound queue.
    async fn inbound_operating_mode(&self) -> ChainResult<OperatingMode>;

    /// Operating mode of the outbound queue.
    async fn outbound_operating_mode(&self) -> ChainResult<OperatingMode>;

    /// The newest beacon slot the light client has finalized.
    async fn latest_beacon_slot(&self) -> ChainResult<u64>;

    /// The newest Ethereum execution block the light client knows.
    async fn latest_execution_block(&self) -> ChainResult<u64>;

    /// Native fee of the relayer's inbound message submission.
    async fn inbound_submit_fee(&self) -> ChainResult<u128>;

    /// Updates of the light client's execution head from now on.
    async fn execution_head_updates(&self) -> ChainResult<ChainStream<ExecutionHeadUpdate>>;
}
