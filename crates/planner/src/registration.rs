//! Registration of an ERC20 as a foreign asset on AssetHub.
//!
//! The gateway sends a message whose ether buys the asset deposit on AssetHub and creates the
//! foreign asset, owned by the bridge's account for the Ethereum chain.

use serde::Serialize;
use snowbridge_planner_chain_api::{
    tx::{ContractCall, UnsignedTx},
    types::VersionedLocation,
};
use snowbridge_planner_primitives::{
    address::{AccountKey, EthAddress},
    constants::ETHER_TOKEN_ADDRESS,
    fee::{checked_sum, pad_fee_by_percentage, HopFee},
    location::{bridge_location, dot_location, erc20_location, Location, NetworkId},
    topic::{bridge_owner_account, MessageId},
};
use snowbridge_planner_programs::{
    program::Program,
    register::{asset_hub_program, Registration},
    sample,
};
use tracing::{debug, info};

use crate::{
    context::PlanContext,
    errors::{PlannerError, PlannerResult},
    fees::{convert, execution_padding, quote_asset_hub, relayer_fee},
    options::FeeOptions,
    transfer::transfer_topic,
    validation::{
        check_bridge_status, check_fee_affordability, dry_run_hop, estimate_on_gateway,
        DryRunStatus, ValidationData, ValidationLogs, ValidationReason, ValidationResult,
    },
};

/// The price of a registration, in ether unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistrationFee {
    /// Delivery to and execution on AssetHub.
    pub asset_hub: HopFee,

    /// Ether that buys the asset deposit.
    pub asset_deposit: u128,

    /// The padded asset deposit, in DOT.
    pub asset_deposit_dot: u128,

    /// Ether paid to the relayer.
    pub relayer_fee: u128,

    /// Ether attached to the registration call.
    pub total: u128,
}

/// A request to register `token` on AssetHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistrationRequest {
    /// The Ethereum account that signs the registration.
    pub source_account: EthAddress,

    /// The token to register.
    pub token: EthAddress,
}

/// Everything derived while building a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationComputed {
    /// The foreign asset's location on AssetHub.
    pub asset_location: Location,

    /// Location allowed to claim assets trapped on AssetHub.
    pub claimer: Location,

    /// The source account nonce the topic was derived with.
    pub nonce: u64,

    /// The correlation identifier.
    pub topic: MessageId,

    /// The program AssetHub executes, prefix included.
    pub asset_hub_program: Program,
}

/// A built registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRegistration {
    /// What the caller supplied.
    pub request: RegistrationRequest,

    /// The fee the registration was priced at.
    pub fee: RegistrationFee,

    /// What was derived.
    pub computed: RegistrationComputed,

    /// The unsigned gateway call.
    pub tx: UnsignedTx,
}

fn ensure_registrable(token: &EthAddress) -> PlannerResult<()> {
    if *token == ETHER_TOKEN_ADDRESS {
        return Err(PlannerError::UnsupportedTopology(
            "ether is bridged without registration".into(),
        ));
    }

    Ok(())
}

/// The gateway's code for the Polkadot-side network a token is registered on.
fn network_code(network: NetworkId) -> PlannerResult<u8> {
    match network {
        NetworkId::Polkadot => Ok(0),
        NetworkId::Kusama => Ok(1),
        NetworkId::Ethereum { .. } => Err(PlannerError::UnsupportedTopology(
            "tokens are registered on a relay network".into(),
        )),
    }
}

/// Prices registering `token`.
///
/// The asset deposit is read from AssetHub, padded, and converted into the ether that buys it.
pub async fn get_registration_fee(
    ctx: &PlanContext<'_>,
    token: &EthAddress,
    options: &FeeOptions,
) -> PlannerResult<RegistrationFee> {
    ensure_registrable(token)?;
    let registry = ctx.registry();
    let fees = &ctx.params().fees;

    let program = sample::registration_program(registry.eth_chain_id, *token)?;
    let asset_hub = quote_asset_hub(ctx, &program, execution_padding(ctx, options)).await?;

    let deposit = ctx.asset_hub().foreign_asset_deposit().await?;
    let asset_deposit_dot = pad_fee_by_percentage(deposit, fees.asset_deposit_padding_pct);
    let asset_deposit = convert(
        ctx.asset_hub(),
        &dot_location(),
        &bridge_location(registry.eth_chain_id),
        asset_deposit_dot,
    )
    .await?;

    let (relayer_fee, _) = relayer_fee(ctx, options, asset_hub.ether.delivery).await?;
    let total = checked_sum(
        "registration fee",
        [asset_hub.ether.execution, asset_deposit, relayer_fee],
    )?;
    debug!(%token, %deposit, %asset_deposit, %total, "priced registration");

    Ok(RegistrationFee {
        asset_hub: asset_hub.ether,
        asset_deposit,
        asset_deposit_dot,
        relayer_fee,
        total,
    })
}

/// Builds the registration for `request`, paying `fee`.
pub async fn create_registration(
    ctx: &PlanContext<'_>,
    request: RegistrationRequest,
    fee: RegistrationFee,
) -> PlannerResult<TokenRegistration> {
    ensure_registrable(&request.token)?;
    let registry = ctx.registry();
    let network = network_code(registry.network)?;

    let nonce = ctx
        .gateway()
        .transaction_count(&request.source_account)
        .await?;
    let owner = AccountKey::Id32(bridge_owner_account(registry.eth_chain_id));
    let topic = transfer_topic(
        registry.asset_hub_para_id,
        request.source_account,
        &request.token,
        &owner,
        0,
        nonce,
    );
    let claimer = AccountKey::Key20(request.source_account).to_location();

    let registration = Registration {
        chain_id: registry.eth_chain_id,
        token: request.token,
        origin: request.source_account,
        claimer: claimer.clone(),
        asset_hub_fee: fee.asset_hub.execution,
        total_value: checked_sum(
            "registration value",
            [fee.asset_hub.execution, fee.asset_deposit],
        )?,
        asset_deposit_dot: fee.asset_deposit_dot,
        topic,
    };
    let program = asset_hub_program(&registration)?;

    let tx = UnsignedTx {
        from: request.source_account,
        to: registry.gateway_address,
        value: fee.total,
        call: ContractCall::RegisterToken {
            token: request.token,
            network,
            execution_fee: fee.asset_hub.execution,
            relayer_fee: fee.relayer_fee,
        },
    };
    info!(token = %request.token, %topic, %nonce, "built registration");

    Ok(TokenRegistration {
        request,
        fee,
        computed: RegistrationComputed {
            asset_location: erc20_location(registry.eth_chain_id, &request.token),
            claimer,
            nonce,
            topic,
            asset_hub_program: program,
        },
        tx,
    })
}

/// Validates a registration: the token must not exist on AssetHub yet, the sender must afford the
/// call, and AssetHub must execute the program.
pub async fn validate_registration(
    ctx: &PlanContext<'_>,
    registration: TokenRegistration,
) -> PlannerResult<ValidationResult<TokenRegistration>> {
    let registry = ctx.registry();
    let gateway = ctx.gateway();
    let request = &registration.request;
    let computed = &registration.computed;
    let mut logs = ValidationLogs::default();
    let mut data = ValidationData::default();

    if ctx
        .asset_hub()
        .asset_details(&computed.asset_location)
        .await?
        .is_some()
    {
        logs.error(
            ValidationReason::AlreadyRegistered,
            format!("token {} is already registered on AssetHub", request.token),
        );
    }

    let ether_balance = gateway.eth_balance(&request.source_account).await?;
    data.ether_balance = Some(ether_balance);
    let estimate = estimate_on_gateway(gateway, &registration.tx).await?;
    data.fee_info = Some(check_fee_affordability(
        &mut logs,
        estimate,
        registration.tx.value,
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
    data.asset_hub_dry_run = Some(status);
    debug!(topic = %computed.topic, "validated registration");

    Ok(ValidationResult::new(logs, data, registration))
}

#[cfg(test)]
mod tests {
    use snowbridge_planner_chain_api::types::{AssetDetails, OperatingMode};
    use snowbridge_planner_programs::instruction::Instruction;
    use snowbridge_planner_test_utils::fixtures;

    use super::*;
    use crate::testing::TestChains;

    const NEW_TOKEN: EthAddress = EthAddress::new([0x77; 20]);

    fn request() -> RegistrationRequest {
        RegistrationRequest {
            source_account: fixtures::SOURCE_ACCOUNT,
            token: NEW_TOKEN,
        }
    }

    async fn plan(ctx: &PlanContext<'_>) -> TokenRegistration {
        let fee = get_registration_fee(ctx, &NEW_TOKEN, &FeeOptions::default())
            .await
            .unwrap();
        create_registration(ctx, request(), fee).await.unwrap()
    }

    #[tokio::test]
    async fn test_fee_buys_padded_deposit() {
        let registry = fixtures::registry();
        let chains = TestChains::new();
        let ctx = chains.context(&registry);

        let fee = get_registration_fee(&ctx, &NEW_TOKEN, &FeeOptions::default())
            .await
            .unwrap();

        // The deposit padded by 10%, bought at 2 wei per DOT.
        let deposit_dot = fixtures::ASSET_DEPOSIT * 110 / 100;
        assert_eq!(fee.asset_deposit_dot, deposit_dot);
        assert_eq!(fee.asset_deposit, deposit_dot * fixtures::ETHER_PER_DOT);
        assert_eq!(fee.asset_hub.execution, 2_660);
        assert_eq!(fee.relayer_fee, 390);
        assert_eq!(fee.total, 2_660 + fee.asset_deposit + 390);
    }

    #[tokio::test]
    async fn test_ether_cannot_be_registered() {
        let registry = fixtures::registry();
        let chains = TestChains::new();
        let ctx = chains.context(&registry);

        let res = get_registration_fee(&ctx, &ETHER_TOKEN_ADDRESS, &FeeOptions::default()).await;

        assert!(matches!(res, Err(PlannerError::UnsupportedTopology(_))));
    }

    #[tokio::test]
    async fn test_registration_call() {
        let registry = fixtures::registry();
        let chains = TestChains::new();
        chains.gateway.state().transaction_count = 2;
        let ctx = chains.context(&registry);

        let registration = plan(&ctx).await;

        assert_eq!(registration.computed.nonce, 2);
        assert_eq!(registration.tx.to, fixtures::GATEWAY_ADDRESS);
        assert_eq!(registration.tx.value, registration.fee.total);
        assert_eq!(
            registration.tx.call,
            ContractCall::RegisterToken {
                token: NEW_TOKEN,
                network: 0,
                execution_fee: 2_660,
                relayer_fee: 390,
            }
        );
        let program = &registration.computed.asset_hub_program;
        assert_eq!(program.topic(), Some(registration.computed.topic));
        assert!(program
            .instructions()
            .iter()
            .any(|i| matches!(i, Instruction::Transact { .. })));
    }

    #[tokio::test]
    async fn test_valid_registration_has_no_findings() {
        let registry = fixtures::registry();
        let chains = TestChains::new();
        let ctx = chains.context(&registry);
        let registration = plan(&ctx).await;

        let result = validate_registration(&ctx, registration).await.unwrap();

        assert!(result.success, "{:?}", result.logs);
        assert!(result.data.asset_hub_dry_run.unwrap().succeeded());
    }

    #[tokio::test]
    async fn test_existing_asset_and_halted_bridge() {
        let registry = fixtures::registry();
        let chains = TestChains::new();
        let ctx = chains.context(&registry);
        let registration = plan(&ctx).await;
        chains.asset_hub.state().asset_details.insert(
            erc20_location(fixtures::ETH_CHAIN_ID, &NEW_TOKEN),
            AssetDetails {
                min_balance: 1,
                is_sufficient: false,
            },
        );
        chains.gateway.state().operating_mode = OperatingMode::RejectingOutboundMessages;

        let result = validate_registration(&ctx, registration).await.unwrap();

        let reasons: Vec<_> = result.logs.iter().map(|l| l.reason).collect();
        assert_eq!(
            reasons,
            vec![
                ValidationReason::AlreadyRegistered,
                ValidationReason::BridgeStatusNotOperational
            ]
        );
    }
}
