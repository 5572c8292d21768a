//! Transfers through an AssetHub that only executes v4 programs.
//!
//! The first-generation gateway call pays both Polkadot-side hops in DOT. The fee records those
//! DOT amounts next to their ether value, which is what the caller attaches.

use snowbridge_planner_chain_api::{tx::ContractCall, types::VersionedLocation};
use snowbridge_planner_primitives::{
    asset::AssetKind,
    constants::ETHER_TOKEN_ADDRESS,
    fee::{checked_sum, pad_fee_by_percentage, DeliveryFee, DotFees, FeeAsset, HopFee},
    location::{bridge_location, dot_location, erc20_location},
};
use snowbridge_planner_programs::{
    legacy::{self as legacy_programs, LegacyInbound},
    program::XcmVersion,
    sample,
};
use tracing::debug;

use super::{
    shared::{self, assemble, check_fee_asset, prepare},
    Topology,
};
use crate::{
    context::PlanContext,
    errors::{PlannerError, PlannerResult},
    fees::{
        convert, delivery_fee as hop_delivery_fee, execution_fee, execution_padding,
        quote_asset_hub, relayer_fee,
    },
    options::FeeOptions,
    transfer::{ResolvedInputs, Transfer, TransferRequest},
};

fn ensure_supported(resolved: &ResolvedInputs<'_>) -> PlannerResult<()> {
    if resolved.metadata.kind() == AssetKind::Pna {
        return Err(PlannerError::UnsupportedTopology(
            "Polkadot-native assets need a v5 AssetHub".to_string(),
        ));
    }
    if resolved.metadata.token == ETHER_TOKEN_ADDRESS {
        return Err(PlannerError::UnsupportedTopology(
            "ether cannot be sent through a v4 AssetHub".to_string(),
        ));
    }

    Ok(())
}

/// Prices a transfer through a v4 AssetHub.
pub(super) async fn delivery_fee(
    ctx: &PlanContext<'_>,
    topology: Topology,
    resolved: &ResolvedInputs<'_>,
    options: &FeeOptions,
) -> PlannerResult<DeliveryFee> {
    ensure_supported(resolved)?;

    let registry = ctx.registry();
    let chain_id = registry.eth_chain_id;
    let token = resolved.metadata.token;
    let destination = resolved.destination;
    let destination_para_id = destination.parachain_id;
    let padding = execution_padding(ctx, options);
    let dot = dot_location();
    let ether = bridge_location(chain_id);

    let sample = if topology.is_single_hop() {
        sample::legacy_asset_hub_program(chain_id, token)?
    } else {
        sample::legacy_forwarding_program(chain_id, token, destination_para_id)?
    };
    let asset_hub = quote_asset_hub(ctx, &sample, padding).await?;
    let asset_hub_dot = pad_fee_by_percentage(asset_hub.native.execution, padding);

    let (destination_fee, destination_dot) = if topology.is_single_hop() {
        (HopFee::default(), 0)
    } else {
        check_fee_asset(FeeAsset::Dot, destination)?;
        let version = XcmVersion::for_parachain(destination);
        let received = sample::destination_program(
            version,
            chain_id,
            erc20_location(chain_id, &token),
            FeeAsset::Dot,
        )?;

        let delivery_dot = hop_delivery_fee(
            ctx.asset_hub(),
            &VersionedLocation::sibling(version, destination_para_id),
            &received,
            &dot,
        )
        .await?;
        let execution_dot = match options.destination_fee() {
            Some(fee) => fee,
            None => {
                let client = ctx.require_destination(destination_para_id)?;
                execution_fee(client, &received, &dot).await?
            }
        };

        let (delivery_ether, execution_ether) = futures::try_join!(
            convert(ctx.asset_hub(), &dot, &ether, delivery_dot),
            convert(ctx.asset_hub(), &dot, &ether, execution_dot),
        )?;
        let destination_dot = checked_sum(
            "destination fee",
            [delivery_dot, pad_fee_by_percentage(execution_dot, padding)],
        )?;

        (
            HopFee {
                delivery: delivery_ether,
                execution: pad_fee_by_percentage(execution_ether, padding),
            },
            destination_dot,
        )
    };

    let (relayer, extrinsic) = relayer_fee(ctx, options, asset_hub.ether.delivery).await?;
    let mut fee = DeliveryFee::new(FeeAsset::Dot, asset_hub.ether, destination_fee, relayer)?
        .with_dot_fees(DotFees {
            asset_hub: asset_hub_dot,
            destination: destination_dot,
        });
    if let Some(extrinsic) = extrinsic {
        fee = fee.with_extrinsic(extrinsic);
    }
    debug!(
        %topology,
        total = %fee.total(),
        %asset_hub_dot,
        %destination_dot,
        "priced transfer through v4 AssetHub"
    );

    Ok(fee)
}

/// Builds a first-generation token transfer.
pub(super) async fn create_transfer(
    ctx: &PlanContext<'_>,
    topology: Topology,
    request: TransferRequest,
    fee: DeliveryFee,
    options: FeeOptions,
) -> PlannerResult<Transfer> {
    let prepared = prepare(ctx, &request).await?;
    ensure_supported(&prepared.resolved)?;
    let dot = fee.dot_fees().ok_or_else(|| {
        PlannerError::UnsupportedTopology("a v4 AssetHub needs a fee priced in DOT".to_string())
    })?;

    let inbound = LegacyInbound {
        chain_id: ctx.registry().eth_chain_id,
        token: request.token,
        amount: request.amount,
        asset_hub_fee_dot: dot.asset_hub,
        beneficiary: prepared.beneficiary.key,
        topic: prepared.topic,
    };
    let (program, destination_fee) = if topology.is_single_hop() {
        (legacy_programs::asset_hub_program(&inbound)?, 0)
    } else {
        (
            legacy_programs::forwarding_program(
                &inbound,
                request.destination_para_id,
                dot.destination,
            )?,
            dot.destination,
        )
    };
    let call = ContractCall::SendToken {
        token: request.token,
        destination_para_id: request.destination_para_id,
        beneficiary: prepared.beneficiary.key,
        destination_fee,
        amount: request.amount,
    };
    let total_value = shared::total_value(&request, &fee)?;

    Ok(assemble(
        ctx,
        topology,
        shared::input(request, fee, options),
        prepared,
        program,
        call,
        total_value,
    ))
}
