//! Validation results and the checks every flow shares.
//!
//! Checks never abort a validation: each records its finding as a [`ValidationLog`] and the next
//! check runs regardless. Only chain transport failures end a validation early. The one deliberate
//! gate is between hops: a program forwarded by a failed dry run is undefined, so the next hop is
//! not simulated.

use serde::Serialize;
use snowbridge_planner_chain_api::{
    errors::{ChainError, ChainResult},
    gateway::GatewayClient,
    l2::L2AdaptorClient,
    parachain::{ExecuteCall, ParachainClient},
    tx::UnsignedTx,
    types::{DryRunEffects, TokenBalance, VersionedLocation},
};
use snowbridge_planner_primitives::{
    address::{AccountId32, AccountKey, EthAddress},
    constants::ETHER_TOKEN_ADDRESS,
    location::Location,
};
use snowbridge_planner_programs::program::Program;
use tracing::{debug, warn};

use crate::{
    context::PlanContext,
    errors::PlannerResult,
    status::{bridge_status, BridgeStatus},
};

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationKind {
    /// The transfer may still succeed.
    Warning,

    /// The transfer will fail if submitted.
    Error,
}

/// What a validation finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationReason {
    /// The amount is below the smallest balance a hop accepts.
    MinimumAmountValidation,

    /// The gateway may not spend the amount on the sender's behalf.
    GatewaySpenderLimitReached,

    /// The sender holds less of the token than the amount.
    InsufficientTokenBalance,

    /// The submission cost could not be estimated.
    FeeEstimationError,

    /// The sender cannot pay the attached value plus the submission cost.
    InsufficientEther,

    /// The sender cannot pay the transfer's fees on the source chain.
    InsufficientFee,

    /// The bridge is halted.
    BridgeStatusNotOperational,

    /// A hop cannot simulate programs, so its outcome is unknown.
    DryRunNotSupportedOnDestination,

    /// No connection to the destination was supplied, so it could not be simulated.
    NoDestinationParachainConnection,

    /// A simulated execution failed.
    DryRunFailed,

    /// The beneficiary does not exist and the asset cannot create it.
    AccountDoesNotExist,

    /// The beneficiary cannot hold another asset.
    MaxConsumersReached,

    /// The beacon light client lags behind Ethereum.
    LightClientLatency,

    /// The token is already registered.
    AlreadyRegistered,
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationLog {
    /// Severity.
    pub kind: ValidationKind,

    /// What it is about.
    pub reason: ValidationReason,

    /// Human readable detail.
    pub message: String,
}

/// Ether-side cost of submitting a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeInfo {
    /// Estimated gas.
    pub estimated_gas: u128,

    /// Gas price used for the estimate.
    pub gas_price: u128,

    /// `estimated_gas * gas_price`.
    pub execution_fee: u128,

    /// Attached value plus execution fee.
    pub total_tx_cost: u128,
}

/// Outcome of simulating one hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DryRunStatus {
    /// The hop was not simulated.
    NotRun,

    /// The hop executed the program and forwarded what it had to.
    Succeeded(DryRunEffects),

    /// The simulation failed with the chain-reported reason.
    Failed(String),
}

impl DryRunStatus {
    /// Whether the hop was simulated successfully.
    pub const fn succeeded(&self) -> bool {
        matches!(self, DryRunStatus::Succeeded(_))
    }
}

/// Chain state gathered while validating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationData {
    /// Ether balance of the sender on the chain it submits on.
    pub ether_balance: Option<u128>,

    /// Token balance and gateway allowance of the sender.
    pub token_balance: Option<TokenBalance>,

    /// Native balance of the sender on a Polkadot-side source chain.
    pub native_balance: Option<u128>,

    /// Submission cost.
    pub fee_info: Option<FeeInfo>,

    /// Bridge operating state.
    pub bridge_status: Option<BridgeStatus>,

    /// Simulation of the source chain's call, for sources that execute programs.
    pub source_dry_run: Option<DryRunStatus>,

    /// Simulation of the AssetHub hop.
    pub asset_hub_dry_run: Option<DryRunStatus>,

    /// Simulation of the destination hop.
    pub destination_dry_run: Option<DryRunStatus>,

    /// Spec version of the runtime the destination was validated against.
    pub destination_spec_version: Option<u32>,
}

/// The result of validating `T`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult<T> {
    /// Findings in the order they were made.
    pub logs: Vec<ValidationLog>,

    /// Whether no finding is an error.
    pub success: bool,

    /// Chain state gathered while validating.
    pub data: ValidationData,

    /// The validated value, unchanged.
    pub transfer: T,
}

impl<T> ValidationResult<T> {
    /// Assembles a result, deriving `success` from the logs.
    pub fn new(logs: ValidationLogs, data: ValidationData, transfer: T) -> Self {
        let logs = logs.into_inner();
        Self {
            success: logs.iter().all(|log| log.kind != ValidationKind::Error),
            logs,
            data,
            transfer,
        }
    }
}

/// An append-only list of findings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationLogs(Vec<ValidationLog>);

impl ValidationLogs {
    /// Records an error.
    pub fn error(&mut self, reason: ValidationReason, message: impl Into<String>) {
        let message = message.into();
        warn!(?reason, %message, "validation error");
        self.0.push(ValidationLog {
            kind: ValidationKind::Error,
            reason,
            message,
        });
    }

    /// Records a warning.
    pub fn warning(&mut self, reason: ValidationReason, message: impl Into<String>) {
        let message = message.into();
        debug!(?reason, %message, "validation warning");
        self.0.push(ValidationLog {
            kind: ValidationKind::Warning,
            reason,
            message,
        });
    }

    /// Whether an error was recorded.
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|log| log.kind == ValidationKind::Error)
    }

    /// Consumes the list.
    pub fn into_inner(self) -> Vec<ValidationLog> {
        self.0
    }
}

pub(crate) fn check_minimum_amount(logs: &mut ValidationLogs, amount: u128, minimum: u128) {
    if amount < minimum {
        logs.error(
            ValidationReason::MinimumAmountValidation,
            format!("amount {amount} is below the minimum balance {minimum}"),
        );
    }
}

/// Compares the sender's token balance and allowance against `amount`.
pub(crate) fn check_token_balance(
    logs: &mut ValidationLogs,
    balance: &TokenBalance,
    amount: u128,
) {
    if balance.gateway_allowance < amount {
        logs.error(
            ValidationReason::GatewaySpenderLimitReached,
            format!(
                "allowance {} does not cover amount {amount}",
                balance.gateway_allowance
            ),
        );
    }
    if balance.balance < amount {
        logs.error(
            ValidationReason::InsufficientTokenBalance,
            format!("token balance {} is below amount {amount}", balance.balance),
        );
    }
}

/// Reads the sender's balance of `token`. Ether needs no approval.
pub(crate) async fn token_balance(
    gateway: &dyn GatewayClient,
    token: &EthAddress,
    owner: &EthAddress,
    spender: &EthAddress,
    ether_balance: u128,
) -> PlannerResult<TokenBalance> {
    if *token == ETHER_TOKEN_ADDRESS {
        return Ok(TokenBalance {
            balance: ether_balance,
            gateway_allowance: u128::MAX,
        });
    }

    Ok(gateway.token_balance(token, owner, spender).await?)
}

/// The ether-side surface needed to estimate a call, shared by the gateway and second-layer
/// chains.
pub(crate) struct Estimate {
    pub(crate) estimated_gas: Result<u128, String>,
    pub(crate) gas_price: Option<u128>,
}

/// Turns a gas estimate into findings: a failed or zero estimate is an estimation error, and a
/// balance below value plus cost is insufficient ether.
pub(crate) fn check_fee_affordability(
    logs: &mut ValidationLogs,
    estimate: Estimate,
    value: u128,
    ether_balance: u128,
) -> FeeInfo {
    let (estimated_gas, estimated) = match estimate.estimated_gas {
        Ok(gas) => (gas, true),
        Err(reason) => {
            logs.error(
                ValidationReason::FeeEstimationError,
                format!("could not estimate gas: {reason}"),
            );
            (0, false)
        }
    };
    let gas_price = estimate.gas_price.unwrap_or_default();
    let execution_fee = estimated_gas.saturating_mul(gas_price);
    if estimated && execution_fee == 0 {
        logs.error(
            ValidationReason::FeeEstimationError,
            "fee estimate is zero",
        );
    }

    let total_tx_cost = value.saturating_add(execution_fee);
    if ether_balance < total_tx_cost {
        logs.error(
            ValidationReason::InsufficientEther,
            format!("ether balance {ether_balance} does not cover {total_tx_cost}"),
        );
    }

    FeeInfo {
        estimated_gas,
        gas_price,
        execution_fee,
        total_tx_cost,
    }
}

/// Estimates `tx` on Ethereum. Reverts become findings; transport failures abort.
pub(crate) async fn estimate_on_gateway(
    gateway: &dyn GatewayClient,
    tx: &UnsignedTx,
) -> PlannerResult<Estimate> {
    let estimated_gas = match gateway.estimate_gas(tx).await {
        Ok(gas) => Ok(gas),
        Err(err @ ChainError::Transport(_)) => return Err(err.into()),
        Err(err) => Err(err.to_string()),
    };
    let fee_data = gateway.fee_data().await?;

    Ok(Estimate {
        estimated_gas,
        gas_price: fee_data.gas_price,
    })
}

/// Estimates `tx` on a second-layer chain, with the same error split as [`estimate_on_gateway`].
pub(crate) async fn estimate_on_l2(
    adaptor: &dyn L2AdaptorClient,
    tx: &UnsignedTx,
) -> PlannerResult<Estimate> {
    let estimated_gas = match adaptor.estimate_gas(tx).await {
        Ok(gas) => Ok(gas),
        Err(err @ ChainError::Transport(_)) => return Err(err.into()),
        Err(err) => Err(err.to_string()),
    };
    let fee_data = adaptor.fee_data().await?;

    Ok(Estimate {
        estimated_gas,
        gas_price: fee_data.gas_price,
    })
}

/// Reads the bridge's operating state and records halts and light client lag.
pub(crate) async fn check_bridge_status(
    ctx: &PlanContext<'_>,
    logs: &mut ValidationLogs,
) -> PlannerResult<BridgeStatus> {
    let status = bridge_status(ctx.gateway(), ctx.bridge_hub()).await?;

    if !status.is_to_polkadot_operational() {
        logs.error(
            ValidationReason::BridgeStatusNotOperational,
            "bridge operations have been paused by onchain governance",
        );
    }

    let max_latency = ctx.params().validation.max_beacon_latency_blocks;
    if status.beacon_latency_blocks > max_latency {
        logs.warning(
            ValidationReason::LightClientLatency,
            format!(
                "beacon light client is {} blocks behind",
                status.beacon_latency_blocks
            ),
        );
    }

    Ok(status)
}

/// Simulates `program` arriving at the chain behind `client` from `origin`.
///
/// The run succeeds when execution completes and, if `next_hop` is given, a program was forwarded
/// to it in the expected version.
pub(crate) async fn dry_run_hop(
    logs: &mut ValidationLogs,
    client: &dyn ParachainClient,
    origin: &VersionedLocation,
    program: &Program,
    next_hop: Option<&VersionedLocation>,
) -> PlannerResult<DryRunStatus> {
    let result = client.dry_run_xcm(origin, program).await;
    interpret_dry_run(logs, client.para_id(), result, next_hop)
}

/// Simulates `signer` submitting `call` on the chain behind `client`, with the same success rule
/// as [`dry_run_hop`].
pub(crate) async fn dry_run_call(
    logs: &mut ValidationLogs,
    client: &dyn ParachainClient,
    signer: &AccountId32,
    call: &ExecuteCall,
    next_hop: Option<&VersionedLocation>,
) -> PlannerResult<DryRunStatus> {
    let result = client.dry_run_execute(signer, call).await;
    interpret_dry_run(logs, client.para_id(), result, next_hop)
}

fn interpret_dry_run(
    logs: &mut ValidationLogs,
    para_id: u32,
    result: ChainResult<DryRunEffects>,
    next_hop: Option<&VersionedLocation>,
) -> PlannerResult<DryRunStatus> {
    let effects = match result {
        Ok(effects) => effects,
        Err(err @ ChainError::Transport(_)) => return Err(err.into()),
        Err(ChainError::Unsupported(call)) => {
            logs.warning(
                ValidationReason::DryRunNotSupportedOnDestination,
                format!("parachain {para_id} does not support {call}"),
            );
            return Ok(DryRunStatus::NotRun);
        }
        Err(err) => return Ok(dry_run_failed(logs, para_id, err.to_string())),
    };

    if let Some(error) = effects.execution.error() {
        return Ok(dry_run_failed(logs, para_id, error.to_string()));
    }

    if let Some(next_hop) = next_hop {
        if effects.forwarded_to(next_hop).is_none() {
            let reason = format!("no message forwarded to {:?}", next_hop.location);
            return Ok(dry_run_failed(logs, para_id, reason));
        }
    }

    debug!(%para_id, "dry run succeeded");
    Ok(DryRunStatus::Succeeded(effects))
}

fn dry_run_failed(logs: &mut ValidationLogs, para_id: u32, reason: String) -> DryRunStatus {
    logs.error(
        ValidationReason::DryRunFailed,
        format!("dry run on parachain {para_id} failed: {reason}"),
    );
    DryRunStatus::Failed(reason)
}

/// Checks that `beneficiary` can receive a non-sufficient asset on the chain behind `client`:
/// the account must exist and have room for another consumer unless it already holds the asset.
pub(crate) async fn check_account(
    ctx: &PlanContext<'_>,
    logs: &mut ValidationLogs,
    client: &dyn ParachainClient,
    beneficiary: &AccountKey,
    asset: &Location,
) -> PlannerResult<()> {
    let para_id = client.para_id();
    let (account, balance, max_consumers) = futures::try_join!(
        client.account_info(beneficiary),
        client.foreign_asset_balance(beneficiary, asset),
        client.max_consumers(),
    )?;
    let max_consumers = max_consumers.unwrap_or(ctx.params().validation.default_max_consumers);

    if balance == 0 && account.consumers >= max_consumers {
        logs.error(
            ValidationReason::MaxConsumersReached,
            format!("beneficiary has reached the max consumer limit on parachain {para_id}"),
        );
    }
    if !account.exists() {
        logs.error(
            ValidationReason::AccountDoesNotExist,
            format!("beneficiary does not exist on parachain {para_id}"),
        );
    }

    Ok(())
}
