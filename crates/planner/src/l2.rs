//! Transfers that start on a second-layer chain and settle on AssetHub.
//!
//! The sender calls the chain's adaptor contract, which bridges the token to L1, optionally swaps
//! part of it into the fee token, and submits a gateway message on the sender's behalf. From the
//! gateway on, the transfer is an ordinary transfer into AssetHub of the token's L1 counterpart.

use serde::Serialize;
use snowbridge_planner_chain_api::{
    tx::{ContractCall, DepositParams, ExactOutputSingle, SendMessage, SwapParams, UnsignedTx},
    types::{TokenBalance, VersionedLocation},
};
use snowbridge_planner_primitives::{
    address::{classify_beneficiary, Beneficiary, EthAddress},
    asset::AssetKind,
    constants::ETHER_TOKEN_ADDRESS,
    fee::{checked_sum, pad_fee_by_percentage, DeliveryFee, L2Fees},
    location::erc20_location,
    registry::{L2Asset, L2Chain},
    topic::MessageId,
};
use snowbridge_planner_programs::{
    inbound::{InboundAsset, InboundMessage},
    program::Program,
    to_asset_hub::send_message_program,
};
use tracing::{debug, info};

use crate::{
    context::PlanContext,
    errors::{PlannerError, PlannerResult},
    get_delivery_fee,
    options::FeeOptions,
    transfer::{gateway_asset, transfer_topic},
    validation::{
        check_account, check_bridge_status, check_fee_affordability, check_minimum_amount,
        check_token_balance, dry_run_hop, estimate_on_l2, DryRunStatus, ValidationData,
        ValidationLogs, ValidationReason, ValidationResult,
    },
};

/// A request to move `amount` of `token` from an account on a second-layer chain to an account on
/// AssetHub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct L2TransferRequest {
    /// EIP-155 id of the second-layer chain.
    pub l2_chain_id: u64,

    /// The account that signs the transfer on the second-layer chain.
    pub source_account: EthAddress,

    /// The receiving account on AssetHub: 20 or 32 bytes of hex, or SS58.
    pub beneficiary: String,

    /// The token on the second-layer chain.
    pub token: EthAddress,

    /// Amount transferred, in the token's smallest unit.
    pub amount: u128,
}

/// Everything derived while building a second-layer transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct L2TransferComputed {
    /// The adaptor contract the call is addressed to.
    pub adaptor_address: EthAddress,

    /// The L1 token the transferred token is bridged into.
    pub l1_token: EthAddress,

    /// The classified beneficiary.
    pub beneficiary: Beneficiary,

    /// The source account nonce on the second-layer chain.
    pub nonce: u64,

    /// The correlation identifier.
    pub topic: MessageId,

    /// Amount of the transferred token the adaptor pulls from the sender.
    pub deposit_amount: u128,

    /// Seconds after which an unfilled deposit expires.
    pub fill_deadline_buffer: u64,

    /// The program AssetHub executes, prefix included.
    pub asset_hub_program: Program,
}

/// A built second-layer transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct L2Transfer {
    /// What the caller supplied.
    pub request: L2TransferRequest,

    /// The fee the transfer was priced at.
    pub fee: DeliveryFee,

    /// The options the transfer was priced and built with.
    pub options: FeeOptions,

    /// What was derived.
    pub computed: L2TransferComputed,

    /// The unsigned adaptor call.
    pub tx: UnsignedTx,
}

fn resolve<'a>(
    ctx: &PlanContext<'a>,
    l2_chain_id: u64,
    token: &EthAddress,
) -> PlannerResult<(&'a L2Chain, &'a L2Asset)> {
    let l2 = ctx.registry().l2_chain(l2_chain_id)?;
    let asset = l2.asset(token)?;

    Ok((l2, asset))
}

fn swap_pool_fee(ctx: &PlanContext<'_>, asset: &L2Asset) -> u32 {
    asset
        .swap_fee
        .unwrap_or(ctx.params().fees.default_l2_swap_pool_fee)
}

/// Prices moving `amount` of `token` from the second-layer chain `l2_chain_id` to AssetHub.
///
/// The fee token itself pays the bridge fee out of the deposit, so that fee is part of the total.
/// Any other token is bridged whole and part of it is swapped on L1 into enough of the fee token
/// to pay the AssetHub leg; the bridge fee then stays in the transferred token.
pub async fn get_l2_delivery_fee(
    ctx: &PlanContext<'_>,
    l2_chain_id: u64,
    token: &EthAddress,
    amount: u128,
    options: &FeeOptions,
) -> PlannerResult<DeliveryFee> {
    let registry = ctx.registry();
    let (l2, asset) = resolve(ctx, l2_chain_id, token)?;
    let adaptor = ctx.l2(l2_chain_id)?;
    let padding = options
        .padding_pct()
        .unwrap_or(ctx.params().fees.l2_fee_padding_pct);

    let base = get_delivery_fee(
        ctx,
        &asset.swap_token_address,
        registry.asset_hub_para_id,
        options,
    )
    .await?;

    let bridge_fee = adaptor
        .across_bridge_fee(
            token,
            &asset.swap_token_address,
            l2_chain_id,
            registry.eth_chain_id,
            amount,
        )
        .await?;
    let bridge_fee = pad_fee_by_percentage(bridge_fee, padding);

    if *token == l2.fee_token_address {
        debug!(%l2_chain_id, %bridge_fee, "priced second-layer transfer of the fee token");
        return Ok(base.with_l2_fees(
            L2Fees {
                bridge_fee_in_l2_token: bridge_fee,
                swap_fee_in_l1_token: 0,
            },
            true,
        )?);
    }

    let pool_fee = swap_pool_fee(ctx, asset);
    let swap_fee = adaptor
        .quote_exact_output_single(
            &asset.swap_token_address,
            &l2.l1_fee_token_address,
            base.total(),
            pool_fee,
        )
        .await?;
    let swap_fee = pad_fee_by_percentage(swap_fee, padding);
    debug!(%l2_chain_id, %bridge_fee, %swap_fee, %pool_fee, "priced second-layer transfer");

    Ok(base.with_l2_fees(
        L2Fees {
            bridge_fee_in_l2_token: bridge_fee,
            swap_fee_in_l1_token: swap_fee,
        },
        false,
    )?)
}

/// Builds the second-layer transfer for `request`, paying `fee`.
pub async fn create_l2_transfer(
    ctx: &PlanContext<'_>,
    request: L2TransferRequest,
    fee: DeliveryFee,
    options: FeeOptions,
) -> PlannerResult<L2Transfer> {
    let registry = ctx.registry();
    let (l2, asset) = resolve(ctx, request.l2_chain_id, &request.token)?;
    let l2_fees = fee.l2().ok_or_else(|| {
        PlannerError::UnsupportedTopology("fee was not priced for a second-layer transfer".into())
    })?;
    let l1_token = asset.swap_token_address;
    let metadata = registry.ethereum_asset(&l1_token)?;
    if metadata.kind() != AssetKind::Erc20 {
        return Err(PlannerError::UnsupportedTopology(
            "only Ethereum-native tokens leave second-layer chains".into(),
        ));
    }

    let beneficiary = classify_beneficiary(&request.beneficiary)?;
    let nonce = ctx
        .l2(request.l2_chain_id)?
        .transaction_count(&request.source_account)
        .await?;
    let topic = transfer_topic(
        registry.asset_hub_para_id,
        request.source_account,
        &l1_token,
        &beneficiary.key,
        request.amount,
        nonce,
    );

    let inbound = InboundMessage {
        chain_id: registry.eth_chain_id,
        origin: l2.adaptor_address,
        claimer: beneficiary.claimer_location(),
        asset_hub_fee: fee.asset_hub_execution_fee(),
        ether_value: 0,
        asset: InboundAsset::Erc20 {
            token: l1_token,
            amount: request.amount,
        },
    };
    let body = send_message_program(
        &beneficiary.key,
        inbound.held_asset_count(),
        options.extra_instructions(),
        topic,
    )?;
    let asset_hub_program = inbound.program(body.clone())?;
    let send = SendMessage {
        program: body,
        assets: vec![gateway_asset(metadata, request.amount)?],
        claimer: Some(beneficiary.claimer_location()),
        execution_fee: fee.asset_hub_execution_fee(),
        relayer_fee: fee.relayer_fee(),
    };

    let fill_deadline_buffer = options
        .fill_deadline_buffer_secs()
        .unwrap_or(ctx.params().fees.fill_deadline_buffer_secs);
    let (call, deposit_amount, value) = if request.token == l2.fee_token_address {
        let input_amount = checked_sum("second-layer deposit", [request.amount, fee.total()])?;
        let deposit = DepositParams {
            input_token: request.token,
            output_token: l2.l1_fee_token_address,
            input_amount,
            output_amount: input_amount.saturating_sub(l2_fees.bridge_fee_in_l2_token),
            destination_chain_id: registry.eth_chain_id,
            fill_deadline_buffer,
        };
        let value = if request.token == ETHER_TOKEN_ADDRESS {
            input_amount
        } else {
            0
        };
        let call = ContractCall::SendEtherAndCall {
            deposit,
            send,
            source_account: request.source_account,
            topic,
        };
        (call, input_amount, value)
    } else {
        let output_amount = checked_sum(
            "second-layer deposit output",
            [request.amount, l2_fees.swap_fee_in_l1_token],
        )?;
        let input_amount = checked_sum(
            "second-layer deposit",
            [output_amount, l2_fees.bridge_fee_in_l2_token],
        )?;
        let deposit = DepositParams {
            input_token: request.token,
            output_token: l1_token,
            input_amount,
            output_amount,
            destination_chain_id: registry.eth_chain_id,
            fill_deadline_buffer,
        };
        let swap = SwapParams {
            input_amount: l2_fees.swap_fee_in_l1_token,
            router: l2.l1_swap_router_address,
            swap: ExactOutputSingle {
                token_in: l1_token,
                token_out: l2.l1_fee_token_address,
                fee: swap_pool_fee(ctx, asset),
                recipient: l2.adaptor_address,
                amount_out: fee.total(),
                amount_in_maximum: l2_fees.swap_fee_in_l1_token,
            },
        };
        let call = ContractCall::SendTokenAndCall {
            deposit,
            swap,
            send,
            source_account: request.source_account,
            topic,
        };
        (call, input_amount, 0)
    };

    let tx = UnsignedTx {
        from: request.source_account,
        to: l2.adaptor_address,
        value,
        call,
    };
    info!(l2_chain_id = %request.l2_chain_id, %topic, %nonce, "built second-layer transfer");

    Ok(L2Transfer {
        request,
        fee,
        options,
        computed: L2TransferComputed {
            adaptor_address: l2.adaptor_address,
            l1_token,
            beneficiary,
            nonce,
            topic,
            deposit_amount,
            fill_deadline_buffer,
            asset_hub_program,
        },
        tx,
    })
}

/// Validates a second-layer transfer.
///
/// Balances and the submission cost are checked on the second-layer chain. The gateway leg is
/// not simulated; the AssetHub program is dry-run from the bridge hub as for a transfer from
/// Ethereum.
pub async fn validate_l2_transfer(
    ctx: &PlanContext<'_>,
    transfer: L2Transfer,
) -> PlannerResult<ValidationResult<L2Transfer>> {
    let registry = ctx.registry();
    let request = &transfer.request;
    let computed = &transfer.computed;
    let adaptor = ctx.l2(request.l2_chain_id)?;
    let asset_hub_asset = registry.asset_hub()?.asset(&computed.l1_token)?;
    let mut logs = ValidationLogs::default();
    let mut data = ValidationData::default();

    check_minimum_amount(&mut logs, request.amount, asset_hub_asset.minimum_balance);

    let ether_balance = adaptor.eth_balance(&request.source_account).await?;
    data.ether_balance = Some(ether_balance);
    if transfer.tx.value == 0 {
        let balance = adaptor
            .token_balance(
                &request.token,
                &request.source_account,
                &computed.adaptor_address,
            )
            .await?;
        check_token_balance(&mut logs, &balance, computed.deposit_amount);
        data.token_balance = Some(balance);
    } else {
        data.token_balance = Some(TokenBalance {
            balance: ether_balance,
            gateway_allowance: u128::MAX,
        });
    }

    let estimate = estimate_on_l2(adaptor, &transfer.tx).await?;
    data.fee_info = Some(check_fee_affordability(
        &mut logs,
        estimate,
        transfer.tx.value,
        ether_balance,
    ));

    data.bridge_status = Some(check_bridge_status(ctx, &mut logs).await?);

    let program = &computed.asset_hub_program;
    let status = if registry.asset_hub()?.features.has_dry_run_api {
        let origin = VersionedLocation::sibling(program.version(), registry.bridge_hub_para_id);
        dry_run_hop(&mut logs, ctx.asset_hub(), &origin, program, None).await?
    } else {
        logs.warning(
            ValidationReason::DryRunNotSupportedOnDestination,
            format!("parachain {} does not support dry runs", registry.asset_hub_para_id),
        );
        DryRunStatus::NotRun
    };

    if !status.succeeded() && !asset_hub_asset.is_sufficient {
        check_account(
            ctx,
            &mut logs,
            ctx.asset_hub(),
            &computed.beneficiary.key,
            &erc20_location(registry.eth_chain_id, &computed.l1_token),
        )
        .await?;
    }
    data.asset_hub_dry_run = Some(status);
    debug!(topic = %computed.topic, "validated second-layer transfer");

    Ok(ValidationResult::new(logs, data, transfer))
}
