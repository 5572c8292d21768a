//! Steps every transfer from Ethereum takes, whatever its topology.

use snowbridge_planner_chain_api::{
    parachain::ParachainClient,
    tx::{ContractCall, UnsignedTx},
    types::{TokenBalance, VersionedLocation},
};
use snowbridge_planner_primitives::{
    address::{classify_beneficiary, Beneficiary, EthAddress},
    asset::{Asset, AssetKind},
    constants::ETHER_TOKEN_ADDRESS,
    fee::{checked_sum, DeliveryFee, FeeAsset},
    location::{erc20_location, Location},
    registry::Parachain,
    topic::MessageId,
};
use snowbridge_planner_programs::{
    inbound::{InboundAsset, InboundMessage},
    program::{Program, XcmVersion},
    sample::SampleAsset,
};
use tracing::{debug, info};

use super::Topology;
use crate::{
    context::PlanContext,
    errors::{PlannerError, PlannerResult},
    options::FeeOptions,
    transfer::{
        resolve_inputs, transfer_topic, ResolvedInputs, Transfer, TransferComputed,
        TransferInput, TransferRequest,
    },
    validation::{
        check_account, check_bridge_status, check_fee_affordability, check_minimum_amount,
        check_token_balance, dry_run_hop, estimate_on_gateway, token_balance, DryRunStatus,
        ValidationData, ValidationLogs, ValidationReason, ValidationResult,
    },
};

/// Fails unless moving `token` to `destination_para_id` has the shape `handled`.
pub(super) fn ensure_topology(
    ctx: &PlanContext<'_>,
    token: &EthAddress,
    destination_para_id: u32,
    handled: Topology,
) -> PlannerResult<()> {
    let planned = Topology::resolve(ctx.registry(), token, destination_para_id)?;
    if planned != handled {
        return Err(PlannerError::TopologyMismatch {
            planned: planned.to_string(),
            handled: handled.to_string(),
        });
    }

    Ok(())
}

/// Whether the AssetHub of `ctx` only executes v4 programs.
pub(super) fn asset_hub_is_legacy(ctx: &PlanContext<'_>) -> PlannerResult<bool> {
    Ok(XcmVersion::for_parachain(ctx.registry().asset_hub()?) == XcmVersion::V4)
}

/// The transferred asset as seen from AssetHub.
pub(super) fn location_on_asset_hub(
    ctx: &PlanContext<'_>,
    resolved: &ResolvedInputs<'_>,
) -> PlannerResult<Location> {
    let registry = ctx.registry();
    asset_location(
        registry.eth_chain_id,
        resolved.metadata.kind(),
        resolved.asset_hub_asset,
        registry.asset_hub_para_id,
    )
}

/// The transferred asset as seen from the destination.
pub(super) fn location_on_destination(
    ctx: &PlanContext<'_>,
    resolved: &ResolvedInputs<'_>,
) -> PlannerResult<Location> {
    asset_location(
        ctx.registry().eth_chain_id,
        resolved.metadata.kind(),
        resolved.destination_asset,
        resolved.destination.parachain_id,
    )
}

fn asset_location(
    chain_id: u64,
    kind: AssetKind,
    asset: &Asset,
    para_id: u32,
) -> PlannerResult<Location> {
    match kind {
        AssetKind::Erc20 => Ok(erc20_location(chain_id, &asset.token)),
        AssetKind::Pna => asset
            .location
            .clone()
            .ok_or_else(|| PlannerError::MissingLocation {
                token: asset.token.to_string(),
                para_id,
            }),
    }
}

/// The placeholder asset used to price a transfer of the resolved token.
pub(super) fn sample_asset(
    ctx: &PlanContext<'_>,
    resolved: &ResolvedInputs<'_>,
) -> PlannerResult<SampleAsset> {
    Ok(match resolved.metadata.kind() {
        AssetKind::Erc20 => SampleAsset::Erc20(resolved.metadata.token),
        AssetKind::Pna => SampleAsset::Pna(location_on_asset_hub(ctx, resolved)?),
    })
}

/// Fails unless `fee_asset` may pay for a transfer to `destination`.
pub(super) fn check_fee_asset(fee_asset: FeeAsset, destination: &Parachain) -> PlannerResult<()> {
    if fee_asset == FeeAsset::Dot && !destination.features.has_dot_balance {
        return Err(PlannerError::UnsupportedFeeAsset {
            fee_asset,
            para_id: destination.parachain_id,
        });
    }

    Ok(())
}

/// A request resolved, classified and correlated.
#[derive(Debug, Clone)]
pub(super) struct Prepared<'a> {
    pub(super) resolved: ResolvedInputs<'a>,
    pub(super) beneficiary: Beneficiary,
    pub(super) nonce: u64,
    pub(super) topic: MessageId,
}

/// Resolves `request` and derives its topic from the sender's current nonce.
pub(super) async fn prepare<'a>(
    ctx: &PlanContext<'a>,
    request: &TransferRequest,
) -> PlannerResult<Prepared<'a>> {
    let resolved = resolve_inputs(ctx.registry(), &request.token, request.destination_para_id)?;
    let beneficiary = classify_beneficiary(&request.beneficiary)?;
    let nonce = ctx
        .gateway()
        .transaction_count(&request.source_account)
        .await?;
    let topic = transfer_topic(
        request.destination_para_id,
        request.source_account,
        &request.token,
        &beneficiary.key,
        request.amount,
        nonce,
    );

    Ok(Prepared {
        resolved,
        beneficiary,
        nonce,
        topic,
    })
}

/// Ether attached to a transfer: the fee total, plus the amount when ether itself is sent.
pub(super) fn total_value(request: &TransferRequest, fee: &DeliveryFee) -> PlannerResult<u128> {
    Ok(checked_sum("transfer value", [fee.total(), ether_sent(request)])?)
}

fn ether_sent(request: &TransferRequest) -> u128 {
    if request.token == ETHER_TOKEN_ADDRESS {
        request.amount
    } else {
        0
    }
}

/// The message AssetHub receives for `request`.
///
/// Ether beyond AssetHub's execution fee, the relayer fee and the transferred amount pays for the
/// hops after AssetHub.
pub(super) fn inbound_message(
    ctx: &PlanContext<'_>,
    request: &TransferRequest,
    prepared: &Prepared<'_>,
    fee: &DeliveryFee,
    total_value: u128,
) -> PlannerResult<InboundMessage> {
    let registry = ctx.registry();
    let asset = match prepared.resolved.metadata.kind() {
        AssetKind::Erc20 => InboundAsset::Erc20 {
            token: request.token,
            amount: request.amount,
        },
        AssetKind::Pna => InboundAsset::Pna {
            location: location_on_asset_hub(ctx, &prepared.resolved)?,
            amount: request.amount,
        },
    };

    Ok(InboundMessage {
        chain_id: registry.eth_chain_id,
        origin: request.source_account,
        claimer: prepared.beneficiary.claimer_location(),
        asset_hub_fee: fee.asset_hub_execution_fee(),
        ether_value: total_value
            .saturating_sub(fee.asset_hub_execution_fee())
            .saturating_sub(fee.relayer_fee())
            .saturating_sub(ether_sent(request)),
        asset,
    })
}

/// Assembles a transfer from its parts.
pub(super) fn assemble(
    ctx: &PlanContext<'_>,
    topology: Topology,
    input: TransferInput,
    prepared: Prepared<'_>,
    asset_hub_program: Program,
    call: ContractCall,
    total_value: u128,
) -> Transfer {
    let registry = ctx.registry();
    let request = &input.request;
    let tx = UnsignedTx {
        from: request.source_account,
        to: registry.gateway_address,
        value: total_value,
        call,
    };
    info!(%topology, topic = %prepared.topic, nonce = %prepared.nonce, "built transfer");

    let computed = TransferComputed {
        topology,
        gateway_address: registry.gateway_address,
        source_account_hex: request.source_account.to_hex(),
        beneficiary: prepared.beneficiary,
        token_metadata: prepared.resolved.metadata.clone(),
        asset_hub_asset: prepared.resolved.asset_hub_asset.clone(),
        destination_asset: prepared.resolved.destination_asset.clone(),
        minimal_balance: prepared.resolved.minimal_balance,
        nonce: prepared.nonce,
        topic: prepared.topic,
        total_value,
        asset_hub_program,
        destination_version: XcmVersion::for_parachain(prepared.resolved.destination),
    };

    Transfer {
        input,
        computed,
        tx,
    }
}

/// Records the input a transfer was built from.
pub(super) fn input(
    request: TransferRequest,
    fee: DeliveryFee,
    options: FeeOptions,
) -> TransferInput {
    TransferInput {
        request,
        fee,
        options,
    }
}

/// Validates a transfer from Ethereum.
///
/// The checks against Ethereum and the bridge status always run. AssetHub is dry-run from the
/// bridge hub; a forwarded transfer's destination is dry-run with the program AssetHub forwarded,
/// and only when AssetHub succeeded. Beneficiary checks run on the final hop when its dry run did
/// not succeed and the asset cannot create the account by itself.
pub(super) async fn validate_from_ethereum(
    ctx: &PlanContext<'_>,
    transfer: Transfer,
) -> PlannerResult<ValidationResult<Transfer>> {
    let registry = ctx.registry();
    let gateway = ctx.gateway();
    let request = &transfer.input.request;
    let computed = &transfer.computed;
    let mut logs = ValidationLogs::default();
    let mut data = ValidationData::default();

    check_minimum_amount(&mut logs, request.amount, computed.minimal_balance);

    let ether_balance = gateway.eth_balance(&request.source_account).await?;
    let balance = token_balance(
        gateway,
        &request.token,
        &request.source_account,
        &computed.gateway_address,
        ether_balance,
    )
    .await?;
    let balance = match computed.token_metadata.kind() {
        AssetKind::Erc20 => balance,
        AssetKind::Pna => TokenBalance {
            gateway_allowance: u128::MAX,
            ..balance
        },
    };
    check_token_balance(&mut logs, &balance, request.amount);
    data.ether_balance = Some(ether_balance);
    data.token_balance = Some(balance);

    let estimate = estimate_on_gateway(gateway, &transfer.tx).await?;
    data.fee_info = Some(check_fee_affordability(
        &mut logs,
        estimate,
        transfer.tx.value,
        ether_balance,
    ));

    data.bridge_status = Some(check_bridge_status(ctx, &mut logs).await?);

    let destination_para_id = request.destination_para_id;
    let single_hop = computed.topology.is_single_hop();
    let next_hop = (!single_hop)
        .then(|| VersionedLocation::sibling(computed.destination_version, destination_para_id));

    let program = &computed.asset_hub_program;
    let asset_hub_status = if registry.asset_hub()?.features.has_dry_run_api {
        let origin = VersionedLocation::sibling(program.version(), registry.bridge_hub_para_id);
        dry_run_hop(&mut logs, ctx.asset_hub(), &origin, program, next_hop.as_ref()).await?
    } else {
        logs.warning(
            ValidationReason::DryRunNotSupportedOnDestination,
            format!("parachain {} does not support dry runs", registry.asset_hub_para_id),
        );
        DryRunStatus::NotRun
    };

    let (final_status, final_client) = match next_hop {
        None => (asset_hub_status.clone(), Some(ctx.asset_hub())),
        Some(next_hop) => {
            let destination = registry.parachain(destination_para_id)?;
            let client = ctx.destination(destination_para_id);
            let status = validate_destination(
                ctx,
                &mut logs,
                destination,
                client,
                &asset_hub_status,
                &next_hop,
                computed.destination_version,
            )
            .await?;
            if let Some(client) = client {
                data.destination_spec_version =
                    Some(ctx.chain_properties(client).await?.spec_version);
            }
            (status, client)
        }
    };

    if !final_status.succeeded() && !computed.destination_asset.is_sufficient {
        if let Some(client) = final_client {
            let location = asset_location(
                registry.eth_chain_id,
                computed.token_metadata.kind(),
                &computed.destination_asset,
                destination_para_id,
            )?;
            check_account(
                ctx,
                &mut logs,
                client,
                &computed.beneficiary.key,
                &location,
            )
            .await?;
        }
    }

    data.asset_hub_dry_run = Some(asset_hub_status);
    if !single_hop {
        data.destination_dry_run = Some(final_status);
    }
    debug!(topic = %computed.topic, "validated transfer");

    Ok(ValidationResult::new(logs, data, transfer))
}

async fn validate_destination(
    ctx: &PlanContext<'_>,
    logs: &mut ValidationLogs,
    destination: &Parachain,
    client: Option<&dyn ParachainClient>,
    asset_hub_status: &DryRunStatus,
    next_hop: &VersionedLocation,
    version: XcmVersion,
) -> PlannerResult<DryRunStatus> {
    let para_id = destination.parachain_id;
    let DryRunStatus::Succeeded(effects) = asset_hub_status else {
        return Ok(DryRunStatus::NotRun);
    };
    if !destination.features.has_dry_run_api {
        logs.warning(
            ValidationReason::DryRunNotSupportedOnDestination,
            format!("parachain {para_id} does not support dry runs"),
        );
        return Ok(DryRunStatus::NotRun);
    }
    let Some(client) = client else {
        logs.error(
            ValidationReason::NoDestinationParachainConnection,
            format!("no connection to parachain {para_id} to dry run the transfer"),
        );
        return Ok(DryRunStatus::NotRun);
    };
    let Some(forwarded) = effects.forwarded_to(next_hop) else {
        return Ok(DryRunStatus::NotRun);
    };

    let origin = VersionedLocation::sibling(version, ctx.registry().asset_hub_para_id);
    dry_run_hop(logs, client, &origin, forwarded, None).await
}
