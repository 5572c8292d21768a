//! The context a planning call runs in: the registry snapshot, the tunables and the caller's chain
//! connections.
//!
//! A [`PlanContext`] lives for one plan. It memoizes chain properties so that pricing, building
//! and validating the same transfer read them once, and it is never shared between plans.

use std::{collections::BTreeMap, fmt};

use parking_lot::Mutex;
use snowbridge_planner_chain_api::{
    bridge_hub::BridgeHubClient, gateway::GatewayClient, l2::L2AdaptorClient,
    parachain::ParachainClient,
};
use snowbridge_planner_params::prelude::PlannerParams;
use snowbridge_planner_primitives::registry::{AssetRegistry, ChainProperties};
use tracing::debug;

use crate::errors::{PlannerError, PlannerResult};

/// Chain connections owned by the caller.
#[derive(Clone, Copy)]
pub struct Connections<'a> {
    gateway: &'a dyn GatewayClient,
    bridge_hub: &'a dyn BridgeHubClient,
    asset_hub: &'a dyn ParachainClient,
    destination: Option<&'a dyn ParachainClient>,
    l2: Option<(u64, &'a dyn L2AdaptorClient)>,
}

impl<'a> Connections<'a> {
    /// Connections every plan needs.
    pub fn new(
        gateway: &'a dyn GatewayClient,
        bridge_hub: &'a dyn BridgeHubClient,
        asset_hub: &'a dyn ParachainClient,
    ) -> Self {
        Self {
            gateway,
            bridge_hub,
            asset_hub,
            destination: None,
            l2: None,
        }
    }

    /// Adds the destination parachain, or the remote AssetHub of an inter-network transfer.
    pub fn with_destination(mut self, destination: &'a dyn ParachainClient) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Adds the adaptor of the second-layer chain `chain_id`.
    pub fn with_l2(mut self, chain_id: u64, adaptor: &'a dyn L2AdaptorClient) -> Self {
        self.l2 = Some((chain_id, adaptor));
        self
    }
}

impl fmt::Debug for Connections<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connections")
            .field("bridge_hub", &self.bridge_hub.para_id())
            .field("asset_hub", &self.asset_hub.para_id())
            .field("destination", &self.destination.map(|d| d.para_id()))
            .field("l2", &self.l2.map(|(chain_id, _)| chain_id))
            .finish_non_exhaustive()
    }
}

/// Everything one planning call reads from.
pub struct PlanContext<'a> {
    registry: &'a AssetRegistry,
    params: PlannerParams,
    connections: Connections<'a>,
    properties: Mutex<BTreeMap<u32, ChainProperties>>,
}

impl<'a> PlanContext<'a> {
    /// Creates a context with default parameters.
    pub fn new(registry: &'a AssetRegistry, connections: Connections<'a>) -> Self {
        Self {
            registry,
            params: PlannerParams::default(),
            connections,
            properties: Mutex::new(BTreeMap::new()),
        }
    }

    /// Replaces the parameters.
    pub fn with_params(mut self, params: PlannerParams) -> Self {
        self.params = params;
        self
    }

    /// The registry snapshot.
    pub const fn registry(&self) -> &'a AssetRegistry {
        self.registry
    }

    /// The tunables.
    pub const fn params(&self) -> &PlannerParams {
        &self.params
    }

    /// The Ethereum gateway.
    pub fn gateway(&self) -> &'a dyn GatewayClient {
        self.connections.gateway
    }

    /// The bridge hub.
    pub fn bridge_hub(&self) -> &'a dyn BridgeHubClient {
        self.connections.bridge_hub
    }

    /// AssetHub.
    pub fn asset_hub(&self) -> &'a dyn ParachainClient {
        self.connections.asset_hub
    }

    /// The connection to `para_id`, if the caller supplied one.
    pub fn destination(&self, para_id: u32) -> Option<&'a dyn ParachainClient> {
        if para_id == self.connections.asset_hub.para_id() {
            return Some(self.connections.asset_hub);
        }
        self.connections
            .destination
            .filter(|destination| destination.para_id() == para_id)
    }

    /// The connection to `para_id`, failing if the caller supplied none.
    pub fn require_destination(&self, para_id: u32) -> PlannerResult<&'a dyn ParachainClient> {
        self.destination(para_id)
            .ok_or(PlannerError::NoConnection(para_id))
    }

    /// The AssetHub of the remote relay network, for inter-network transfers.
    ///
    /// Para ids collide across networks, so this connection is not looked up by id.
    pub fn remote_asset_hub(&self) -> PlannerResult<&'a dyn ParachainClient> {
        self.connections
            .destination
            .ok_or(PlannerError::NoConnection(self.registry.inter_network()?.asset_hub_para_id))
    }

    /// The adaptor of the second-layer chain `chain_id`.
    pub fn l2(&self, chain_id: u64) -> PlannerResult<&'a dyn L2AdaptorClient> {
        match self.connections.l2 {
            Some((connected, adaptor)) if connected == chain_id => Ok(adaptor),
            _ => Err(PlannerError::NoL2Connection(chain_id)),
        }
    }

    /// Properties of the chain behind `client`, read once per plan.
    pub async fn chain_properties(
        &self,
        client: &dyn ParachainClient,
    ) -> PlannerResult<ChainProperties> {
        let para_id = client.para_id();
        let cached = self.properties.lock().get(&para_id).cloned();
        if let Some(properties) = cached {
            return Ok(properties);
        }

        debug!(%para_id, "reading chain properties");
        let properties = client.chain_properties().await?;
        self.properties.lock().insert(para_id, properties.clone());

        Ok(properties)
    }
}

impl fmt::Debug for PlanContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanContext")
            .field("environment", &self.registry.environment)
            .field("params", &self.params)
            .field("connections", &self.connections)
            .finish_non_exhaustive()
    }
}
