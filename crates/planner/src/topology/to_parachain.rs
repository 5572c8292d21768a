//! Transfers that AssetHub forwards to a further parachain.

use async_trait::async_trait;
use snowbridge_planner_chain_api::{
    tx::{ContractCall, SendMessage},
    types::VersionedLocation,
};
use snowbridge_planner_primitives::{
    address::EthAddress,
    asset::AssetKind,
    fee::{pad_fee_by_percentage, DeliveryFee, DotFees, FeeAsset, HopFee},
    location::{bridge_location, dot_location},
};
use snowbridge_planner_programs::{
    instruction::AssetAmount,
    program::XcmVersion,
    sample,
    to_parachain::{send_message_program, AssetReserve, Forward, RemoteFee},
};
use tracing::debug;

use super::{
    ensure_handles, legacy,
    shared::{
        self, assemble, check_fee_asset, inbound_message, location_on_asset_hub,
        location_on_destination, prepare, sample_asset,
    },
    Topology, TransferStrategy,
};
use crate::{
    context::PlanContext,
    errors::{PlannerError, PlannerResult},
    fees::{
        convert, delivery_fee as hop_delivery_fee, execution_fee, execution_padding,
        quote_asset_hub, relayer_fee,
    },
    options::FeeOptions,
    transfer::{gateway_asset, resolve_inputs, Transfer, TransferRequest},
    validation::ValidationResult,
};

/// Moves an asset from Ethereum through AssetHub to an account on another parachain.
///
/// AssetHub pays the delivery to the destination out of the ether it receives and hands the
/// destination its execution fee, either in ether or exchanged for DOT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToParachain {
    pub(super) kind: AssetKind,
}

#[async_trait]
impl TransferStrategy for ToParachain {
    fn topology(&self) -> Topology {
        match self.kind {
            AssetKind::Erc20 => Topology::Erc20ToParachain,
            AssetKind::Pna => Topology::PnaToParachain,
        }
    }

    async fn delivery_fee(
        &self,
        ctx: &PlanContext<'_>,
        token: &EthAddress,
        destination_para_id: u32,
        options: &FeeOptions,
    ) -> PlannerResult<DeliveryFee> {
        let topology = self.topology();
        shared::ensure_topology(ctx, token, destination_para_id, topology)?;
        let resolved = resolve_inputs(ctx.registry(), token, destination_para_id)?;
        let destination = resolved.destination;
        if !destination.features.has_tx_payment_api && options.destination_fee().is_none() {
            return Err(PlannerError::FeeOverrideRequired(destination_para_id));
        }
        if shared::asset_hub_is_legacy(ctx)? {
            return legacy::delivery_fee(ctx, topology, &resolved, options).await;
        }

        let fee_asset = options.fee_asset();
        check_fee_asset(fee_asset, destination)?;

        let chain_id = ctx.registry().eth_chain_id;
        let padding = execution_padding(ctx, options);
        let version = XcmVersion::for_parachain(destination);
        let dot = dot_location();
        let ether = bridge_location(chain_id);

        let forwarded = sample::forwarding_program(
            chain_id,
            &sample_asset(ctx, &resolved)?,
            destination_para_id,
            fee_asset,
        )?;
        let received = sample::destination_program(
            version,
            chain_id,
            location_on_destination(ctx, &resolved)?,
            fee_asset,
        )?;
        let asset_hub = quote_asset_hub(ctx, &forwarded, padding).await?;

        let delivery_dot = hop_delivery_fee(
            ctx.asset_hub(),
            &VersionedLocation::sibling(version, destination_para_id),
            &received,
            &dot,
        )
        .await?;
        let delivery_ether = convert(ctx.asset_hub(), &dot, &ether, delivery_dot).await?;

        let fee_location = match fee_asset {
            FeeAsset::Ether => &ether,
            FeeAsset::Dot => &dot,
        };
        let execution = match options.destination_fee() {
            Some(fee) => fee,
            None => {
                let client = ctx.require_destination(destination_para_id)?;
                execution_fee(client, &received, fee_location).await?
            }
        };
        let (execution_ether, execution_dot) = match fee_asset {
            FeeAsset::Ether => (execution, None),
            FeeAsset::Dot => (
                convert(ctx.asset_hub(), &dot, &ether, execution).await?,
                Some(execution),
            ),
        };
        let destination_fee = HopFee {
            delivery: delivery_ether,
            execution: pad_fee_by_percentage(execution_ether, padding),
        };

        let (relayer, extrinsic) = relayer_fee(ctx, options, asset_hub.ether.delivery).await?;
        let mut fee = DeliveryFee::new(fee_asset, asset_hub.ether, destination_fee, relayer)?;
        if let Some(destination) = execution_dot {
            fee = fee.with_dot_fees(DotFees {
                asset_hub: asset_hub.native.execution,
                destination,
            });
        }
        if let Some(extrinsic) = extrinsic {
            fee = fee.with_extrinsic(extrinsic);
        }
        debug!(
            %topology,
            %destination_para_id,
            ?fee_asset,
            total = %fee.total(),
            "priced transfer"
        );

        Ok(fee)
    }

    async fn create_transfer(
        &self,
        ctx: &PlanContext<'_>,
        request: TransferRequest,
        fee: DeliveryFee,
        options: FeeOptions,
    ) -> PlannerResult<Transfer> {
        let topology = self.topology();
        let destination_para_id = request.destination_para_id;
        shared::ensure_topology(ctx, &request.token, destination_para_id, topology)?;
        if shared::asset_hub_is_legacy(ctx)? {
            return legacy::create_transfer(ctx, topology, request, fee, options).await;
        }

        let prepared = prepare(ctx, &request).await?;
        let remote_fee = match fee.fee_asset() {
            FeeAsset::Ether => RemoteFee::Ether(fee.destination_execution_fee()),
            FeeAsset::Dot => {
                let dot = fee
                    .dot_fees()
                    .ok_or(PlannerError::UnsupportedFeeAsset {
                        fee_asset: FeeAsset::Dot,
                        para_id: destination_para_id,
                    })?;
                RemoteFee::Dot {
                    ether: fee.destination_execution_fee(),
                    dot: dot.destination,
                }
            }
        };

        let location = location_on_asset_hub(ctx, &prepared.resolved)?;
        let forward = Forward {
            chain_id: ctx.registry().eth_chain_id,
            destination_para_id,
            reserve: AssetReserve::of(&location, destination_para_id),
            asset: AssetAmount::new(location, request.amount),
            remote_fee,
            beneficiary: prepared.beneficiary.key,
            extra: options.extra_instructions().to_vec(),
            topic: prepared.topic,
        };
        let body = send_message_program(&forward)?;

        let total_value = shared::total_value(&request, &fee)?;
        let inbound = inbound_message(ctx, &request, &prepared, &fee, total_value)?;
        let program = inbound.program(body.clone())?;

        let call = ContractCall::SendMessage(SendMessage {
            program: body,
            assets: vec![gateway_asset(prepared.resolved.metadata, request.amount)?],
            claimer: Some(prepared.beneficiary.claimer_location()),
            execution_fee: fee.asset_hub_execution_fee(),
            relayer_fee: fee.relayer_fee(),
        });

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

    async fn validate_transfer(
        &self,
        ctx: &PlanContext<'_>,
        transfer: Transfer,
    ) -> PlannerResult<ValidationResult<Transfer>> {
        ensure_handles(self.topology(), &transfer)?;
        shared::validate_from_ethereum(ctx, transfer).await
    }
}
