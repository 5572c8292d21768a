//! Operating state of the bridge.

use serde::Serialize;
use snowbridge_planner_chain_api::{
    bridge_hub::BridgeHubClient, gateway::GatewayClient, types::OperatingMode,
};
use tracing::debug;

use crate::errors::PlannerResult;

/// Operating modes of every bridge component and how far the beacon light client lags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BridgeStatus {
    /// The gateway's outbound channel.
    pub gateway_mode: OperatingMode,

    /// The beacon light client on the bridge hub.
    pub beacon_mode: OperatingMode,

    /// The bridge hub's inbound queue.
    pub inbound_mode: OperatingMode,

    /// The bridge hub's outbound queue.
    pub outbound_queue_mode: OperatingMode,

    /// The newest finalized beacon slot.
    pub latest_beacon_slot: u64,

    /// The newest Ethereum block the light client knows.
    pub latest_execution_block: u64,

    /// The Ethereum head.
    pub ethereum_block: u64,

    /// Blocks between the Ethereum head and the light client.
    pub beacon_latency_blocks: u64,

    /// The newest relay chain block the BEEFY light client on Ethereum has verified.
    pub latest_beefy_block: u64,
}

impl BridgeStatus {
    /// Whether messages from Ethereum are accepted and can be verified.
    pub const fn is_to_polkadot_operational(&self) -> bool {
        self.gateway_mode.is_normal() && self.beacon_mode.is_normal()
    }

    /// Whether messages to Ethereum are accepted.
    pub const fn is_to_ethereum_operational(&self) -> bool {
        self.outbound_queue_mode.is_normal()
    }
}

/// Reads the operating state from Ethereum and the bridge hub.
pub async fn bridge_status(
    gateway: &dyn GatewayClient,
    bridge_hub: &dyn BridgeHubClient,
) -> PlannerResult<BridgeStatus> {
    let (gateway_mode, ethereum_block, latest_beefy_block) = futures::try_join!(
        gateway.operating_mode(),
        gateway.block_number(),
        gateway.latest_beefy_block(),
    )?;
    let (
        beacon_mode,
        inbound_mode,
        outbound_queue_mode,
        latest_beacon_slot,
        latest_execution_block,
    ) = futures::try_join!(
        bridge_hub.beacon_operating_mode(),
        bridge_hub.inbound_operating_mode(),
        bridge_hub.outbound_operating_mode(),
        bridge_hub.latest_beacon_slot(),
        bridge_hub.latest_execution_block(),
    )?;

    let status = BridgeStatus {
        gateway_mode,
        beacon_mode,
        inbound_mode,
        outbound_queue_mode,
        latest_beacon_slot,
        latest_execution_block,
        ethereum_block,
        beacon_latency_blocks: ethereum_block.saturating_sub(latest_execution_block),
        latest_beefy_block,
    };
    debug!(?status, "read bridge status");

    Ok(status)
}

#[cfg(test)]
mod tests {
    use snowbridge_planner_test_utils::fixtures;

    use super::*;

    #[tokio::test]
    async fn test_latency_is_head_minus_light_client() {
        let gateway = fixtures::gateway();
        let bridge_hub = fixtures::bridge_hub();
        gateway.state().block_number = 1_000;
        bridge_hub.state().latest_execution_block = 900;

        let status = bridge_status(&gateway, &bridge_hub).await.unwrap();

        assert_eq!(status.beacon_latency_blocks, 100);
        assert!(status.is_to_polkadot_operational());
    }

    #[tokio::test]
    async fn test_halted_beacon_stops_inbound_transfers() {
        let gateway = fixtures::gateway();
        let bridge_hub = fixtures::bridge_hub();
        bridge_hub.state().beacon_mode = OperatingMode::Halted;

        let status = bridge_status(&gateway, &bridge_hub).await.unwrap();

        assert!(!status.is_to_polkadot_operational());
        assert!(status.is_to_ethereum_operational());
    }
}
