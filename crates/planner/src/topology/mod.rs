//! Dispatch from a transfer's topology to the strategy that prices, builds and validates it.
//!
//! A topology is fixed by the kind of the transferred asset and by whether the transfer settles
//! on AssetHub or is forwarded to a further parachain. Each topology maps to one static
//! [`TransferStrategy`]; adding a topology adds a variant and a strategy and leaves the others
//! untouched.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use snowbridge_planner_primitives::{
    address::EthAddress, asset::AssetKind, fee::DeliveryFee, registry::AssetRegistry,
};

use crate::{
    context::PlanContext,
    errors::{PlannerError, PlannerResult},
    options::FeeOptions,
    transfer::{Transfer, TransferRequest},
    validation::ValidationResult,
};

mod legacy;
mod shared;
mod to_asset_hub;
mod to_parachain;

pub use to_asset_hub::ToAssetHub;
pub use to_parachain::ToParachain;

static ERC20_TO_ASSET_HUB: ToAssetHub = ToAssetHub {
    kind: AssetKind::Erc20,
};
static PNA_TO_ASSET_HUB: ToAssetHub = ToAssetHub {
    kind: AssetKind::Pna,
};
static ERC20_TO_PARACHAIN: ToParachain = ToParachain {
    kind: AssetKind::Erc20,
};
static PNA_TO_PARACHAIN: ToParachain = ToParachain {
    kind: AssetKind::Pna,
};

/// The shape of a transfer from Ethereum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Topology {
    /// Ether or an Ethereum-native token settling on AssetHub.
    Erc20ToAssetHub,

    /// Ether or an Ethereum-native token forwarded from AssetHub to a further parachain.
    Erc20ToParachain,

    /// A Polkadot-native token returning to AssetHub.
    PnaToAssetHub,

    /// A Polkadot-native token returning through AssetHub to a further parachain.
    PnaToParachain,
}

impl Topology {
    /// Selects the topology of moving `token` to `destination_para_id`.
    pub fn resolve(
        registry: &AssetRegistry,
        token: &EthAddress,
        destination_para_id: u32,
    ) -> PlannerResult<Self> {
        let kind = registry.ethereum_asset(token)?.kind();
        registry.parachain(destination_para_id)?;

        let to_asset_hub = destination_para_id == registry.asset_hub_para_id;
        Ok(match (kind, to_asset_hub) {
            (AssetKind::Erc20, true) => Topology::Erc20ToAssetHub,
            (AssetKind::Erc20, false) => Topology::Erc20ToParachain,
            (AssetKind::Pna, true) => Topology::PnaToAssetHub,
            (AssetKind::Pna, false) => Topology::PnaToParachain,
        })
    }

    /// The kind of the transferred asset.
    pub const fn asset_kind(self) -> AssetKind {
        match self {
            Topology::Erc20ToAssetHub | Topology::Erc20ToParachain => AssetKind::Erc20,
            Topology::PnaToAssetHub | Topology::PnaToParachain => AssetKind::Pna,
        }
    }

    /// Whether the transfer settles on AssetHub.
    pub const fn is_single_hop(self) -> bool {
        matches!(self, Topology::Erc20ToAssetHub | Topology::PnaToAssetHub)
    }

    /// The strategy handling this topology.
    pub fn strategy(self) -> &'static dyn TransferStrategy {
        match self {
            Topology::Erc20ToAssetHub => &ERC20_TO_ASSET_HUB,
            Topology::PnaToAssetHub => &PNA_TO_ASSET_HUB,
            Topology::Erc20ToParachain => &ERC20_TO_PARACHAIN,
            Topology::PnaToParachain => &PNA_TO_PARACHAIN,
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Prices, builds and validates transfers of one topology.
#[async_trait]
pub trait TransferStrategy: Send + Sync + fmt::Debug {
    /// The topology this strategy handles.
    fn topology(&self) -> Topology;

    /// Prices moving `token` to `destination_para_id`.
    async fn delivery_fee(
        &self,
        ctx: &PlanContext<'_>,
        token: &EthAddress,
        destination_para_id: u32,
        options: &FeeOptions,
    ) -> PlannerResult<DeliveryFee>;

    /// Builds the transfer for `request`, paying `fee`.
    async fn create_transfer(
        &self,
        ctx: &PlanContext<'_>,
        request: TransferRequest,
        fee: DeliveryFee,
        options: FeeOptions,
    ) -> PlannerResult<Transfer>;

    /// Dry-runs `transfer` at every hop it crosses.
    async fn validate_transfer(
        &self,
        ctx: &PlanContext<'_>,
        transfer: Transfer,
    ) -> PlannerResult<ValidationResult<Transfer>>;
}

/// Fails unless `transfer` was planned by the strategy handling `handled`.
pub(crate) fn ensure_handles(handled: Topology, transfer: &Transfer) -> PlannerResult<()> {
    let planned = transfer.computed.topology;
    if planned != handled {
        return Err(PlannerError::TopologyMismatch {
            planned: planned.to_string(),
            handled: handled.to_string(),
        });
    }

    Ok(())
}

/// Prices moving `token` from Ethereum to `destination_para_id`.
pub async fn get_delivery_fee(
    ctx: &PlanContext<'_>,
    token: &EthAddress,
    destination_para_id: u32,
    options: &FeeOptions,
) -> PlannerResult<DeliveryFee> {
    Topology::resolve(ctx.registry(), token, destination_para_id)?
        .strategy()
        .delivery_fee(ctx, token, destination_para_id, options)
        .await
}

/// Builds the transfer for `request`, paying a fee priced by [`get_delivery_fee`].
pub async fn create_transfer(
    ctx: &PlanContext<'_>,
    request: TransferRequest,
    fee: DeliveryFee,
    options: FeeOptions,
) -> PlannerResult<Transfer> {
    Topology::resolve(ctx.registry(), &request.token, request.destination_para_id)?
        .strategy()
        .create_transfer(ctx, request, fee, options)
        .await
}

/// Validates a transfer built by [`create_transfer`].
pub async fn validate_transfer(
    ctx: &PlanContext<'_>,
    transfer: Transfer,
) -> PlannerResult<ValidationResult<Transfer>> {
    transfer
        .computed
        .topology
        .strategy()
        .validate_transfer(ctx, transfer)
        .await
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use snowbridge_planner_primitives::constants::ETHER_TOKEN_ADDRESS;
    use snowbridge_planner_test_utils::{arbitrary_generator::arb_para_id, fixtures};

    use super::*;

    #[test]
    fn test_resolve_covers_every_topology() {
        let registry = fixtures::registry();
        let cases = [
            (ETHER_TOKEN_ADDRESS, fixtures::ASSET_HUB_PARA_ID, Topology::Erc20ToAssetHub),
            (
                fixtures::SUFFICIENT_TOKEN,
                fixtures::DESTINATION_PARA_ID,
                Topology::Erc20ToParachain,
            ),
            (fixtures::PNA_TOKEN, fixtures::ASSET_HUB_PARA_ID, Topology::PnaToAssetHub),
            (
                fixtures::PNA_TOKEN,
                fixtures::DESTINATION_PARA_ID,
                Topology::PnaToParachain,
            ),
        ];

        for (token, destination, expected) in cases {
            let topology = Topology::resolve(&registry, &token, destination).unwrap();
            assert_eq!(topology, expected);
            assert_eq!(topology.strategy().topology(), expected);
        }
    }

    #[test]
    fn test_resolve_rejects_unknown_parachain() {
        let registry = fixtures::registry();

        assert!(matches!(
            Topology::resolve(&registry, &ETHER_TOKEN_ADDRESS, 4242),
            Err(PlannerError::Input(_))
        ));
    }

    proptest! {
        #[test]
        fn test_resolve_needs_registered_parachain(para_id in arb_para_id()) {
            let registry = fixtures::registry();

            let res = Topology::resolve(&registry, &fixtures::SUFFICIENT_TOKEN, para_id);

            prop_assert_eq!(res.is_ok(), registry.parachains.contains_key(&para_id));
        }
    }
}
