//! Mock chains wired into plan contexts.

use snowbridge_planner_primitives::{address::EthAddress, registry::AssetRegistry};
use snowbridge_planner_test_utils::{
    fixtures,
    mocks::{MockBridgeHub, MockGateway, MockL2Adaptor, MockParachain},
};

use crate::{
    context::{Connections, PlanContext},
    create_transfer, get_delivery_fee,
    options::FeeOptions,
    transfer::{Transfer, TransferRequest},
};

/// One mock of every chain a plan can touch, seeded from the fixtures.
#[derive(Debug)]
pub(crate) struct TestChains {
    pub(crate) gateway: MockGateway,
    pub(crate) bridge_hub: MockBridgeHub,
    pub(crate) asset_hub: MockParachain,
    pub(crate) destination: MockParachain,
    pub(crate) l2: MockL2Adaptor,
}

impl TestChains {
    pub(crate) fn new() -> Self {
        Self {
            gateway: fixtures::gateway(),
            bridge_hub: fixtures::bridge_hub(),
            asset_hub: fixtures::asset_hub(),
            destination: fixtures::destination(),
            l2: fixtures::l2_adaptor(),
        }
    }

    pub(crate) fn connections(&self) -> Connections<'_> {
        Connections::new(&self.gateway, &self.bridge_hub, &self.asset_hub)
            .with_destination(&self.destination)
            .with_l2(fixtures::L2_CHAIN_ID, &self.l2)
    }

    pub(crate) fn context<'a>(&'a self, registry: &'a AssetRegistry) -> PlanContext<'a> {
        PlanContext::new(registry, self.connections())
    }

    /// Prices and builds a transfer with default options.
    pub(crate) async fn plan(
        &self,
        ctx: &PlanContext<'_>,
        token: EthAddress,
        destination_para_id: u32,
        amount: u128,
    ) -> Transfer {
        let options = FeeOptions::default();
        let fee = get_delivery_fee(ctx, &token, destination_para_id, &options)
            .await
            .unwrap();

        create_transfer(ctx, request(token, destination_para_id, amount), fee, options)
            .await
            .unwrap()
    }
}

/// A request from the fixture sender to the fixture beneficiary.
pub(crate) fn request(
    token: EthAddress,
    destination_para_id: u32,
    amount: u128,
) -> TransferRequest {
    TransferRequest {
        source_account: fixtures::SOURCE_ACCOUNT,
        beneficiary: fixtures::BENEFICIARY.to_string(),
        token,
        destination_para_id,
        amount,
    }
}
