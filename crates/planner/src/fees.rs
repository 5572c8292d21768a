//! Pricing steps shared by every topology.
//!
//! Fees are quoted in the native currency of the chain that charges them and converted into ether
//! through AssetHub's pools. Conversion happens before padding; every execution component is
//! padded exactly once.

use snowbridge_planner_chain_api::{
    parachain::ParachainClient,
    types::{VersionedAssetId, VersionedLocation},
};
use snowbridge_planner_primitives::{
    fee::{checked_sum, pad_fee_by_percentage, ExtrinsicFee, HopFee},
    location::{bridge_location, dot_location, Location},
};
use snowbridge_planner_programs::program::{Program, XcmVersion};
use tracing::{debug, warn};

use crate::{
    context::PlanContext,
    errors::{PlannerError, PlannerResult},
    options::FeeOptions,
};

/// Converts `amount` of `from` into the amount of `to` that buys it on AssetHub.
///
/// The quote is taken at the current pool price and may drift before the transfer executes; the
/// padding applied afterwards absorbs that drift. A missing pool is an error, never a zero fee.
pub async fn convert(
    asset_hub: &dyn ParachainClient,
    from: &Location,
    to: &Location,
    amount: u128,
) -> PlannerResult<u128> {
    if amount == 0 || from == to {
        return Ok(amount);
    }

    let converted = asset_hub
        .quote_price_tokens_for_exact_tokens(to, from, amount, true)
        .await?
        .ok_or_else(|| PlannerError::NoSwapPool {
            from: from.clone(),
            to: to.clone(),
        })?;
    debug!(?from, ?to, %amount, %converted, "quoted fee conversion");

    Ok(converted)
}

/// The fee for executing `program` on the chain behind `client`, in `fee_asset`.
///
/// Runtimes differ in which version of the asset id they accept; a rejected query is retried
/// once with the other version.
pub async fn execution_fee(
    client: &dyn ParachainClient,
    program: &Program,
    fee_asset: &Location,
) -> PlannerResult<u128> {
    let weight = client.query_xcm_weight(program).await?;
    let primary = VersionedAssetId::new(program.version(), fee_asset.clone());

    match client.query_weight_to_asset_fee(weight, &primary).await {
        Ok(fee) => Ok(fee),
        Err(err) if !err.is_transport() => {
            let fallback = match program.version() {
                XcmVersion::V4 => XcmVersion::V5,
                XcmVersion::V5 => XcmVersion::V4,
            };
            warn!(para_id = %client.para_id(), %err, ?fallback, "retrying weight to fee query");
            let fallback = VersionedAssetId::new(fallback, fee_asset.clone());

            Ok(client.query_weight_to_asset_fee(weight, &fallback).await?)
        }
        Err(err) => Err(err.into()),
    }
}

/// The fee for delivering `program` from the chain behind `client` to `destination`, in
/// `fee_asset`.
///
/// A quote without an entry for `fee_asset` means the route charges nothing in it.
pub async fn delivery_fee(
    client: &dyn ParachainClient,
    destination: &VersionedLocation,
    program: &Program,
    fee_asset: &Location,
) -> PlannerResult<u128> {
    let quoted = client.query_delivery_fees(destination, program).await?;

    match quoted.into_iter().find(|asset| &asset.id == fee_asset) {
        Some(asset) => Ok(asset.amount),
        None => {
            warn!(
                para_id = %client.para_id(),
                ?destination,
                "delivery fee quote has no entry for the fee asset"
            );
            Ok(0)
        }
    }
}

/// The execution fee padding in effect for a plan.
pub(crate) fn execution_padding(ctx: &PlanContext<'_>, options: &FeeOptions) -> u32 {
    options
        .padding_pct()
        .unwrap_or(ctx.params().fees.execution_fee_padding_pct)
}

/// Cost of the AssetHub hop of a transfer entering from Ethereum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AssetHubQuote {
    /// In DOT, unpadded.
    pub(crate) native: HopFee,

    /// In ether, with the execution component padded.
    pub(crate) ether: HopFee,
}

/// Prices delivery from the bridge hub to AssetHub and execution of `sample` there.
pub(crate) async fn quote_asset_hub(
    ctx: &PlanContext<'_>,
    sample: &Program,
    padding: u32,
) -> PlannerResult<AssetHubQuote> {
    let registry = ctx.registry();
    let dot = dot_location();
    let ether = bridge_location(registry.eth_chain_id);
    let asset_hub = VersionedLocation::sibling(sample.version(), registry.asset_hub_para_id);

    let (delivery, execution) = futures::try_join!(
        delivery_fee(ctx.bridge_hub(), &asset_hub, sample, &dot),
        execution_fee(ctx.asset_hub(), sample, &dot),
    )?;
    let (delivery_ether, execution_ether) = futures::try_join!(
        convert(ctx.asset_hub(), &dot, &ether, delivery),
        convert(ctx.asset_hub(), &dot, &ether, execution),
    )?;

    Ok(AssetHubQuote {
        native: HopFee {
            delivery,
            execution,
        },
        ether: HopFee {
            delivery: delivery_ether,
            execution: pad_fee_by_percentage(execution_ether, padding),
        },
    })
}

/// The relayer fee, in ether, and the extrinsic cost it was derived from.
///
/// Without an override the relayer is paid its message-submission extrinsic plus the delivery to
/// AssetHub it fronts, padded by the relayer padding.
pub(crate) async fn relayer_fee(
    ctx: &PlanContext<'_>,
    options: &FeeOptions,
    asset_hub_delivery_ether: u128,
) -> PlannerResult<(u128, Option<ExtrinsicFee>)> {
    if let Some(fee) = options.relayer_fee() {
        return Ok((fee, None));
    }

    let native = ctx.bridge_hub().inbound_submit_fee().await?;
    let converted = convert(
        ctx.asset_hub(),
        &dot_location(),
        &bridge_location(ctx.registry().eth_chain_id),
        native,
    )
    .await?;
    let base = checked_sum("relayer fee", [converted, asset_hub_delivery_ether])?;
    let fee = pad_fee_by_percentage(base, ctx.params().fees.relayer_fee_padding_pct);
    debug!(%native, %converted, %fee, "derived relayer fee");

    Ok((fee, Some(ExtrinsicFee { native, converted })))
}

#[cfg(test)]
mod tests {
    use snowbridge_planner_chain_api::errors::ChainError;
    use snowbridge_planner_programs::sample::{self, SampleAsset};
    use snowbridge_planner_test_utils::{
        fixtures::{self, ETH_CHAIN_ID},
        mocks::MockParachain,
    };

    use super::*;

    fn sample_program() -> Program {
        sample::asset_hub_program(ETH_CHAIN_ID, &SampleAsset::Erc20(fixtures::SUFFICIENT_TOKEN))
            .unwrap()
    }

    #[tokio::test]
    async fn test_convert_uses_exact_output_quote() {
        let asset_hub = fixtures::asset_hub();
        let dot = dot_location();
        let ether = bridge_location(ETH_CHAIN_ID);

        let converted = convert(&asset_hub, &dot, &ether, 1_000).await.unwrap();

        assert_eq!(converted, 1_000 * fixtures::ETHER_PER_DOT);
        assert_eq!(convert(&asset_hub, &dot, &ether, 0).await.unwrap(), 0);
        assert_eq!(convert(&asset_hub, &dot, &dot, 5).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_convert_without_pool_fails() {
        let asset_hub = MockParachain::new(fixtures::ASSET_HUB_PARA_ID);

        let res = convert(
            &asset_hub,
            &dot_location(),
            &bridge_location(ETH_CHAIN_ID),
            1,
        )
        .await;

        assert!(matches!(res, Err(PlannerError::NoSwapPool { .. })));
    }

    #[tokio::test]
    async fn test_execution_fee_retries_with_other_version() {
        let asset_hub = fixtures::asset_hub();
        asset_hub.state().weight_fee_rejected_for = Some(XcmVersion::V5);

        let fee = execution_fee(&asset_hub, &sample_program(), &dot_location())
            .await
            .unwrap();

        assert_eq!(fee, fixtures::WEIGHT_FEE);
        let queried: Vec<_> = asset_hub
            .state()
            .weight_fee_queries
            .iter()
            .map(|id| id.version)
            .collect();
        assert_eq!(queried, vec![XcmVersion::V5, XcmVersion::V4]);
    }

    #[tokio::test]
    async fn test_execution_fee_propagates_transport_errors() {
        let asset_hub = fixtures::asset_hub();
        asset_hub.state().transport_error = Some("connection reset".to_string());

        let res = execution_fee(&asset_hub, &sample_program(), &dot_location()).await;

        assert!(matches!(
            res,
            Err(PlannerError::Chain(ChainError::Transport(_)))
        ));
    }

    #[tokio::test]
    async fn test_missing_delivery_entry_is_free() {
        let bridge_hub = fixtures::bridge_hub();
        bridge_hub.state().delivery_fees.clear();

        let fee = delivery_fee(
            &bridge_hub,
            &VersionedLocation::sibling(XcmVersion::V5, fixtures::ASSET_HUB_PARA_ID),
            &sample_program(),
            &dot_location(),
        )
        .await
        .unwrap();

        assert_eq!(fee, 0);
    }
}
