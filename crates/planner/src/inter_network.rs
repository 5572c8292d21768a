//! Transfers between the AssetHubs of two relay networks across the inter-network bridge.
//!
//! The sender executes a program on the source AssetHub that hands the asset and the fee to the
//! source bridge hub, which exports the transfer to the remote AssetHub. Fees are paid in the
//! source relay token:
//!
//! - the bridge hub router's export fee, a base fee plus a per-byte fee on the exported program,
//! - delivery from the source AssetHub to its bridge hub,
//! - execution on the remote AssetHub, converted through the remote AssetHub's pools.
//!
//! The export fee and the remote execution fee are padded; delivery is not.

use serde::Serialize;
use snowbridge_planner_chain_api::{parachain::ExecuteCall, types::VersionedLocation};
use snowbridge_planner_params::prelude::InterNetworkFeeParams;
use snowbridge_planner_primitives::{
    address::{classify_beneficiary, AccountId32, AccountKey, EthAddress},
    constants::{BRIDGE_ROUTER_BASE_FEE_KEY, BRIDGE_ROUTER_BYTE_FEE_KEY},
    errors::PrimitiveError,
    fee::{checked_sum, pad_fee_by_percentage, InterNetworkFee},
    location::{dot_location, erc20_location, network_location, Location, NetworkId},
    registry::{AssetRegistry, InterNetworkRegistry, Parachain},
    topic::{blake2_256, build_message_id, MessageId, MessageIdInputs},
};
use snowbridge_planner_programs::{
    inter_network::{
        export_program, import_program, source_program, InterNetworkAsset,
        InterNetworkTransfer as TransferPrograms,
    },
    program::{Program, XcmVersion},
    sample,
};
use tracing::{debug, info};

use crate::{
    context::PlanContext,
    errors::{PlannerError, PlannerResult},
    fees::{convert, delivery_fee, execution_fee},
    options::FeeOptions,
    validation::{
        check_account, check_minimum_amount, dry_run_call, dry_run_hop, DryRunStatus,
        ValidationData, ValidationLogs, ValidationReason, ValidationResult,
    },
};

/// The asset of an inter-network transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InterNetworkToken {
    /// The source relay chain's token.
    SourceRelayToken,

    /// The remote relay chain's token, returning to its home network.
    DestinationRelayToken,

    /// Ether or an ERC20 registered on both AssetHubs.
    Ethereum(EthAddress),
}

/// A request to move `amount` of `token` from an account on the source AssetHub to an account on
/// the remote AssetHub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterNetworkRequest {
    /// The signing account on the source AssetHub: 32 bytes of hex, or SS58.
    pub source_account: String,

    /// The receiving account on the remote AssetHub: 32 bytes of hex, or SS58.
    pub beneficiary: String,

    /// The transferred asset.
    pub token: InterNetworkToken,

    /// Amount transferred, in the asset's smallest unit.
    pub amount: u128,
}

/// Everything derived while building an inter-network transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterNetworkComputed {
    /// The signing account.
    pub source_account: AccountId32,

    /// The receiving account.
    pub beneficiary: AccountId32,

    /// The network the transfer leaves.
    pub source_network: NetworkId,

    /// The network the transfer enters.
    pub destination_network: NetworkId,

    /// The source account's nonce on the source AssetHub.
    pub nonce: u64,

    /// The correlation identifier.
    pub topic: MessageId,

    /// The asset as seen from the source AssetHub.
    pub source_location: Location,

    /// The asset as seen from the remote AssetHub.
    pub destination_location: Location,

    /// The program the remote AssetHub executes, bridge origin included.
    pub import_program: Program,
}

/// A built inter-network transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterNetworkPlan {
    /// What the caller supplied.
    pub request: InterNetworkRequest,

    /// The fee the transfer was priced at.
    pub fee: InterNetworkFee,

    /// What was derived.
    pub computed: InterNetworkComputed,

    /// The unsigned call the source account submits on the source AssetHub.
    pub call: ExecuteCall,
}

/// The router's fallback fees for bridging out of `network`.
fn router_defaults(
    network: NetworkId,
    params: &InterNetworkFeeParams,
) -> PlannerResult<(u128, u128)> {
    match network {
        NetworkId::Kusama => Ok((params.kusama_base_fee.into(), params.kusama_fee_per_byte.into())),
        NetworkId::Polkadot => Ok((
            params.polkadot_base_fee.into(),
            params.polkadot_fee_per_byte.into(),
        )),
        NetworkId::Ethereum { .. } => Err(PlannerError::UnsupportedTopology(
            "inter-network transfers start on a relay network".to_string(),
        )),
    }
}

fn remote_asset_hub_entry(remote: &InterNetworkRegistry) -> PlannerResult<&Parachain> {
    remote
        .parachains
        .get(&remote.asset_hub_para_id)
        .ok_or(PlannerError::Input(PrimitiveError::UnknownParachain(
            remote.asset_hub_para_id,
        )))
}

fn program_asset(
    registry: &AssetRegistry,
    token: &InterNetworkToken,
) -> PlannerResult<InterNetworkAsset> {
    Ok(match token {
        InterNetworkToken::SourceRelayToken => InterNetworkAsset::SourceRelayToken,
        InterNetworkToken::DestinationRelayToken => InterNetworkAsset::DestinationRelayToken,
        InterNetworkToken::Ethereum(token) => {
            registry.asset_hub()?.asset(token)?;
            remote_asset_hub_entry(registry.inter_network()?)?.asset(token)?;
            InterNetworkAsset::Ethereum(erc20_location(registry.eth_chain_id, token))
        }
    })
}

fn locations(
    asset: &InterNetworkAsset,
    source_network: NetworkId,
    destination_network: NetworkId,
) -> (Location, Location) {
    match asset {
        InterNetworkAsset::SourceRelayToken => (dot_location(), network_location(source_network)),
        InterNetworkAsset::DestinationRelayToken => {
            (network_location(destination_network), dot_location())
        }
        InterNetworkAsset::Ethereum(location) => (location.clone(), location.clone()),
    }
}

const RELAY_TOKEN_TAG: &[u8] = b"relay-token";

/// The token a transfer's topic is derived from. Relay tokens have no Ethereum address, so each is
/// keyed by its home network.
fn topic_token(token: &InterNetworkToken, source: NetworkId, remote: NetworkId) -> EthAddress {
    let home = match token {
        InterNetworkToken::Ethereum(token) => return *token,
        InterNetworkToken::SourceRelayToken => source,
        InterNetworkToken::DestinationRelayToken => remote,
    };
    let mut tag = [0u8; 9];
    match home {
        NetworkId::Ethereum { chain_id } => tag[1..].copy_from_slice(&chain_id.to_le_bytes()),
        NetworkId::Polkadot => tag[0] = 1,
        NetworkId::Kusama => tag[0] = 2,
    }

    let hash = blake2_256([RELAY_TOKEN_TAG, &tag[..]]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[..20]);
    EthAddress::new(address)
}

fn account_id32(address: &str) -> PlannerResult<AccountId32> {
    match classify_beneficiary(address)?.key {
        AccountKey::Id32(id) => Ok(id),
        AccountKey::Key20(_) => Err(PrimitiveError::InvalidAddress(address.to_string()).into()),
    }
}

fn template(
    registry: &AssetRegistry,
    asset: InterNetworkAsset,
) -> PlannerResult<TransferPrograms> {
    let remote = registry.inter_network()?;

    Ok(TransferPrograms {
        source_network: registry.network,
        destination_network: remote.network,
        source_asset_hub: registry.asset_hub_para_id,
        destination_asset_hub: remote.asset_hub_para_id,
        asset,
        amount: 0,
        total_fee: 0,
        destination_fee: 0,
        beneficiary: AccountId32::default(),
        topic: MessageId::default(),
    })
}

/// Prices moving `token` to the remote AssetHub.
///
/// Needs the remote AssetHub connection to price execution there.
pub async fn get_inter_network_fee(
    ctx: &PlanContext<'_>,
    token: &InterNetworkToken,
    options: &FeeOptions,
) -> PlannerResult<InterNetworkFee> {
    let registry = ctx.registry();
    let (base_default, byte_default) =
        router_defaults(registry.network, &ctx.params().inter_network)?;
    let asset = program_asset(registry, token)?;
    let sample = sample::inter_network_transfer(&template(registry, asset)?);
    let export = export_program(&sample)?;
    let import = import_program(&sample)?;
    let asset_hub = ctx.asset_hub();
    let remote_asset_hub = ctx.remote_asset_hub()?;
    let padding = options
        .padding_pct()
        .unwrap_or(ctx.params().fees.inter_network_fee_padding_pct);

    let (base_fee, byte_fee) = futures::try_join!(
        asset_hub.storage_u128(BRIDGE_ROUTER_BASE_FEE_KEY),
        asset_hub.storage_u128(BRIDGE_ROUTER_BYTE_FEE_KEY),
    )?;
    let base_fee = base_fee.filter(|fee| *fee != 0).unwrap_or(base_default);
    let byte_fee = byte_fee.filter(|fee| *fee != 0).unwrap_or(byte_default);
    let bytes = asset_hub.encoded_program_len(&export) as u128;
    let bytes_fee = bytes
        .checked_mul(byte_fee)
        .ok_or(PrimitiveError::FeeOverflow("inter-network bytes fee"))?;
    let xcm_bridge_fee = pad_fee_by_percentage(
        checked_sum("inter-network bridge fee", [base_fee, bytes_fee])?,
        padding,
    );

    let bridge_hub = VersionedLocation::sibling(XcmVersion::V4, registry.bridge_hub_para_id);
    let dot = dot_location();
    let (bridge_hub_delivery, remote_execution) = futures::try_join!(
        delivery_fee(asset_hub, &bridge_hub, &export, &dot),
        execution_fee(remote_asset_hub, &import, &dot),
    )?;
    let remote_execution_in_source = convert(
        remote_asset_hub,
        &dot,
        &network_location(registry.network),
        remote_execution,
    )
    .await?;
    let destination_fee = pad_fee_by_percentage(remote_execution_in_source, padding);

    let fee = InterNetworkFee::new(xcm_bridge_fee, bridge_hub_delivery, destination_fee)?;
    debug!(
        %base_fee,
        %bytes_fee,
        %bridge_hub_delivery,
        %remote_execution,
        total = %fee.total_fee_in_native(),
        "priced inter-network transfer"
    );

    Ok(fee)
}

/// Builds the inter-network transfer for `request`, paying `fee`.
pub async fn create_inter_network_transfer(
    ctx: &PlanContext<'_>,
    request: InterNetworkRequest,
    fee: InterNetworkFee,
) -> PlannerResult<InterNetworkPlan> {
    let registry = ctx.registry();
    let remote = registry.inter_network()?;
    let source_account = account_id32(&request.source_account)?;
    let beneficiary = account_id32(&request.beneficiary)?;
    let asset = program_asset(registry, &request.token)?;
    let sender = AccountKey::Id32(source_account);

    let nonce = ctx.asset_hub().account_info(&sender).await?.nonce;
    let token = topic_token(&request.token, registry.network, remote.network);
    let topic = build_message_id(&MessageIdInputs {
        destination_para_id: remote.asset_hub_para_id,
        source_account: &sender,
        token: &token,
        beneficiary: &AccountKey::Id32(beneficiary),
        amount: request.amount,
        nonce,
    });

    let (source_location, destination_location) =
        locations(&asset, registry.network, remote.network);
    let transfer = TransferPrograms {
        amount: request.amount,
        total_fee: fee.total_fee_in_native(),
        destination_fee: fee.destination_fee(),
        beneficiary,
        topic,
        ..template(registry, asset)?
    };
    let program = source_program(&transfer, &sender, registry.bridge_hub_para_id)?;
    let import_program = import_program(&transfer)?;
    let max_weight = ctx.asset_hub().query_xcm_weight(&program).await?;
    info!(%topic, %nonce, destination = ?remote.network, "built inter-network transfer");

    Ok(InterNetworkPlan {
        request,
        fee,
        computed: InterNetworkComputed {
            source_account,
            beneficiary,
            source_network: registry.network,
            destination_network: remote.network,
            nonce,
            topic,
            source_location,
            destination_location,
            import_program,
        },
        call: ExecuteCall {
            program,
            max_weight,
        },
    })
}

/// Validates an inter-network transfer.
///
/// The call is dry-run on the source AssetHub and must hand a program to the bridge hub. The
/// import program is then dry-run on the remote AssetHub unless the source run failed.
pub async fn validate_inter_network_transfer(
    ctx: &PlanContext<'_>,
    plan: InterNetworkPlan,
) -> PlannerResult<ValidationResult<InterNetworkPlan>> {
    let registry = ctx.registry();
    let remote = registry.inter_network()?;
    let remote_entry = remote_asset_hub_entry(remote)?;
    let asset_hub = ctx.asset_hub();
    let request = &plan.request;
    let computed = &plan.computed;
    let sender = AccountKey::Id32(computed.source_account);
    let mut logs = ValidationLogs::default();
    let mut data = ValidationData::default();

    let destination_sufficient = match request.token {
        InterNetworkToken::Ethereum(token) => {
            let source_asset = registry.asset_hub()?.asset(&token)?;
            let destination_asset = remote_entry.asset(&token)?;
            check_minimum_amount(
                &mut logs,
                request.amount,
                source_asset
                    .minimum_balance
                    .max(destination_asset.minimum_balance),
            );
            destination_asset.is_sufficient
        }
        InterNetworkToken::DestinationRelayToken => true,
        InterNetworkToken::SourceRelayToken => false,
    };

    let account = asset_hub.account_info(&sender).await?;
    data.native_balance = Some(account.free);
    let mut native_needed = plan.fee.total_fee_in_native();
    if request.token == InterNetworkToken::SourceRelayToken {
        native_needed = native_needed.saturating_add(request.amount);
    } else {
        let balance = asset_hub
            .foreign_asset_balance(&sender, &computed.source_location)
            .await?;
        if balance < request.amount {
            logs.error(
                ValidationReason::InsufficientTokenBalance,
                format!("token balance {balance} is below amount {}", request.amount),
            );
        }
    }

    let tx_fee = match asset_hub
        .transaction_fee(&computed.source_account, &plan.call)
        .await
    {
        Ok(fee) => fee,
        Err(err) if err.is_transport() => return Err(err.into()),
        Err(err) => {
            logs.error(
                ValidationReason::FeeEstimationError,
                format!("could not estimate the transaction fee: {err}"),
            );
            0
        }
    };
    let total_cost = native_needed.saturating_add(tx_fee);
    if account.free < total_cost {
        logs.error(
            ValidationReason::InsufficientFee,
            format!("native balance {} does not cover {total_cost}", account.free),
        );
    }

    let bridge_hub = VersionedLocation::sibling(XcmVersion::V4, registry.bridge_hub_para_id);
    let source_status = if registry.asset_hub()?.features.has_dry_run_api {
        dry_run_call(
            &mut logs,
            asset_hub,
            &computed.source_account,
            &plan.call,
            Some(&bridge_hub),
        )
        .await?
    } else {
        logs.warning(
            ValidationReason::DryRunNotSupportedOnDestination,
            format!("parachain {} does not support dry runs", registry.asset_hub_para_id),
        );
        DryRunStatus::NotRun
    };

    let client = ctx.remote_asset_hub().ok();
    let destination_status = match client {
        _ if matches!(source_status, DryRunStatus::Failed(_)) => DryRunStatus::NotRun,
        None => {
            logs.error(
                ValidationReason::NoDestinationParachainConnection,
                format!(
                    "no connection to the {:?} AssetHub to dry run the transfer",
                    remote.network
                ),
            );
            DryRunStatus::NotRun
        }
        Some(_) if !remote_entry.features.has_dry_run_api => {
            logs.warning(
                ValidationReason::DryRunNotSupportedOnDestination,
                format!("the {:?} AssetHub does not support dry runs", remote.network),
            );
            DryRunStatus::NotRun
        }
        Some(client) => {
            let origin = VersionedLocation::sibling(XcmVersion::V4, remote.bridge_hub_para_id);
            dry_run_hop(&mut logs, client, &origin, &computed.import_program, None).await?
        }
    };

    if let Some(client) = client {
        if !destination_status.succeeded() && !destination_sufficient {
            check_account(
                ctx,
                &mut logs,
                client,
                &AccountKey::Id32(computed.beneficiary),
                &computed.destination_location,
            )
            .await?;
        }
        data.destination_spec_version = Some(ctx.chain_properties(client).await?.spec_version);
    }

    data.source_dry_run = Some(source_status);
    data.destination_dry_run = Some(destination_status);
    debug!(topic = %computed.topic, "validated inter-network transfer");

    Ok(ValidationResult::new(logs, data, plan))
}

#[cfg(test)]
mod tests {
    use snowbridge_planner_chain_api::{
        errors::ChainError,
        types::{AccountInfo, DryRunEffects, ExecutionOutcome},
    };
    use snowbridge_planner_primitives::{
        constants::{ETHER_TOKEN_ADDRESS, INTER_NETWORK_BRIDGE_PALLET_INDEX},
        location::Junction,
    };
    use snowbridge_planner_programs::instruction::Instruction;
    use snowbridge_planner_test_utils::{fixtures, mocks::MockParachain};

    use super::*;
    use crate::{
        context::{Connections, PlanContext},
        testing::TestChains,
    };

    struct InterNetworkChains {
        chains: TestChains,
        remote: MockParachain,
    }

    impl InterNetworkChains {
        fn new() -> Self {
            let chains = TestChains::new();
            chains.asset_hub.state().encoded_len = Some(100);
            Self {
                chains,
                remote: fixtures::remote_asset_hub(),
            }
        }

        fn context<'a>(&'a self, registry: &'a AssetRegistry) -> PlanContext<'a> {
            let chains = &self.chains;
            let connections =
                Connections::new(&chains.gateway, &chains.bridge_hub, &chains.asset_hub)
                    .with_destination(&self.remote);
            PlanContext::new(registry, connections)
        }
    }

    fn request(token: InterNetworkToken, amount: u128) -> InterNetworkRequest {
        InterNetworkRequest {
            source_account: fixtures::SUBSTRATE_SENDER.to_string(),
            beneficiary: fixtures::BENEFICIARY.to_string(),
            token,
            amount,
        }
    }

    async fn plan(ctx: &PlanContext<'_>, token: InterNetworkToken) -> InterNetworkPlan {
        let fee = get_inter_network_fee(ctx, &token, &FeeOptions::default())
            .await
            .unwrap();
        create_inter_network_transfer(ctx, request(token, 10_000), fee)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_fee_reads_router_storage() {
        let registry = fixtures::registry();
        let chains = InterNetworkChains::new();
        {
            let mut asset_hub = chains.chains.asset_hub.state();
            asset_hub
                .storage
                .insert(BRIDGE_ROUTER_BASE_FEE_KEY.to_vec(), 1_000);
            asset_hub
                .storage
                .insert(BRIDGE_ROUTER_BYTE_FEE_KEY.to_vec(), 10);
        }
        let ctx = chains.context(&registry);

        let fee = get_inter_network_fee(
            &ctx,
            &InterNetworkToken::SourceRelayToken,
            &FeeOptions::default(),
        )
        .await
        .unwrap();

        // (1_000 base + 100 bytes at 10 each) padded by 33%.
        assert_eq!(fee.xcm_bridge_fee(), 2_660);
        assert_eq!(fee.bridge_hub_delivery_fee(), fixtures::DELIVERY_FEE);
        // 1_000 of the remote relay token bought with the source token at 2:1, padded by 33%.
        assert_eq!(fee.destination_fee(), 2_660);
        assert_eq!(fee.total_fee_in_native(), 2_660 + fixtures::DELIVERY_FEE + 2_660);
    }

    #[tokio::test]
    async fn test_fee_falls_back_to_router_defaults() {
        let registry = fixtures::registry();
        let chains = InterNetworkChains::new();
        chains
            .chains
            .asset_hub
            .state()
            .storage
            .insert(BRIDGE_ROUTER_BASE_FEE_KEY.to_vec(), 0);
        let ctx = chains.context(&registry);

        let fee = get_inter_network_fee(
            &ctx,
            &InterNetworkToken::SourceRelayToken,
            &FeeOptions::default(),
        )
        .await
        .unwrap();

        let defaults = InterNetworkFeeParams::default();
        let expected = u128::from(defaults.polkadot_base_fee)
            + 100 * u128::from(defaults.polkadot_fee_per_byte);
        assert_eq!(fee.xcm_bridge_fee(), pad_fee_by_percentage(expected, 33));
    }

    #[tokio::test]
    async fn test_fee_needs_remote_connection() {
        let registry = fixtures::registry();
        let chains = TestChains::new();
        let connections = Connections::new(&chains.gateway, &chains.bridge_hub, &chains.asset_hub);
        let ctx = PlanContext::new(&registry, connections);

        let res = get_inter_network_fee(
            &ctx,
            &InterNetworkToken::SourceRelayToken,
            &FeeOptions::default(),
        )
        .await;

        assert!(matches!(res, Err(PlannerError::NoConnection(_))));
    }

    #[tokio::test]
    async fn test_unregistered_token_is_rejected() {
        let registry = fixtures::registry();
        let chains = InterNetworkChains::new();
        let ctx = chains.context(&registry);

        let res = get_inter_network_fee(
            &ctx,
            &InterNetworkToken::Ethereum(fixtures::PNA_TOKEN),
            &FeeOptions::default(),
        )
        .await;

        assert!(matches!(res, Err(PlannerError::Input(_))));
    }

    #[test]
    fn test_relay_tokens_have_distinct_topics() {
        let ether = InterNetworkToken::Ethereum(fixtures::SUFFICIENT_TOKEN);
        let source = topic_token(
            &InterNetworkToken::SourceRelayToken,
            NetworkId::Polkadot,
            NetworkId::Kusama,
        );
        let destination = topic_token(
            &InterNetworkToken::DestinationRelayToken,
            NetworkId::Polkadot,
            NetworkId::Kusama,
        );

        assert_ne!(source, destination);
        assert_ne!(source, ETHER_TOKEN_ADDRESS);
        assert_ne!(destination, ETHER_TOKEN_ADDRESS);
        assert_eq!(
            topic_token(&ether, NetworkId::Polkadot, NetworkId::Kusama),
            fixtures::SUFFICIENT_TOKEN
        );
    }

    #[tokio::test]
    async fn test_transfer_uses_source_nonce() {
        let registry = fixtures::registry();
        let chains = InterNetworkChains::new();
        let sender = AccountKey::Id32(account_id32(fixtures::SUBSTRATE_SENDER).unwrap());
        if let Some(account) = chains.chains.asset_hub.state().accounts.get_mut(&sender) {
            account.nonce = 4;
        }
        let ctx = chains.context(&registry);

        let plan = plan(&ctx, InterNetworkToken::Ethereum(fixtures::SUFFICIENT_TOKEN)).await;

        assert_eq!(plan.computed.nonce, 4);
        assert_eq!(plan.computed.destination_network, NetworkId::Kusama);
        assert_eq!(plan.call.program.topic(), Some(plan.computed.topic));
        assert!(plan.call.program.has_refund_before_forwarding());
        assert_eq!(
            plan.computed.import_program.instructions()[0],
            Instruction::DescendOrigin(vec![Junction::PalletInstance(
                INTER_NETWORK_BRIDGE_PALLET_INDEX
            )])
        );
        assert_eq!(plan.call.max_weight, chains.chains.asset_hub.state().weight);
    }

    #[tokio::test]
    async fn test_valid_transfer_has_no_findings() {
        let registry = fixtures::registry();
        let chains = InterNetworkChains::new();
        let ctx = chains.context(&registry);
        let plan = plan(&ctx, InterNetworkToken::SourceRelayToken).await;

        let result = validate_inter_network_transfer(&ctx, plan).await.unwrap();

        assert!(result.success, "{:?}", result.logs);
        assert!(result.logs.is_empty());
        assert!(result.data.source_dry_run.unwrap().succeeded());
        assert!(result.data.destination_dry_run.unwrap().succeeded());
        assert_eq!(
            chains.remote.state().dry_run_origins,
            vec![VersionedLocation::sibling(
                XcmVersion::V4,
                fixtures::REMOTE_BRIDGE_HUB_PARA_ID
            )]
        );
    }

    #[tokio::test]
    async fn test_source_failure_skips_remote_dry_run() {
        let registry = fixtures::registry();
        let chains = InterNetworkChains::new();
        let ctx = chains.context(&registry);
        let plan = plan(&ctx, InterNetworkToken::SourceRelayToken).await;
        chains.chains.asset_hub.state().dry_run_execute = Ok(DryRunEffects {
            execution: ExecutionOutcome::Complete,
            forwarded: Vec::new(),
        });

        let result = validate_inter_network_transfer(&ctx, plan).await.unwrap();

        let reasons: Vec<_> = result.logs.iter().map(|l| l.reason).collect();
        assert_eq!(reasons, vec![ValidationReason::DryRunFailed]);
        assert!(chains.remote.state().dry_run_origins.is_empty());
        assert_eq!(result.data.destination_dry_run, Some(DryRunStatus::NotRun));
    }

    #[tokio::test]
    async fn test_balance_findings_accumulate() {
        let registry = fixtures::registry();
        let chains = InterNetworkChains::new();
        let ctx = chains.context(&registry);
        let plan = plan(&ctx, InterNetworkToken::Ethereum(fixtures::SUFFICIENT_TOKEN)).await;
        let sender = AccountKey::Id32(plan.computed.source_account);
        {
            let mut asset_hub = chains.chains.asset_hub.state();
            asset_hub.accounts.insert(
                sender,
                AccountInfo {
                    providers: 1,
                    free: 1,
                    ..Default::default()
                },
            );
            asset_hub.foreign_balances.clear();
            asset_hub.transaction_fee = Err(ChainError::Rejected {
                call: "payment_info",
                reason: "bad signature".to_string(),
            });
        }

        let result = validate_inter_network_transfer(&ctx, plan).await.unwrap();

        let reasons: Vec<_> = result.logs.iter().map(|l| l.reason).collect();
        assert_eq!(
            reasons,
            vec![
                ValidationReason::InsufficientTokenBalance,
                ValidationReason::FeeEstimationError,
                ValidationReason::InsufficientFee,
            ]
        );
        assert_eq!(result.data.native_balance, Some(1));
    }

    #[tokio::test]
    async fn test_missing_remote_connection_is_an_error() {
        let registry = fixtures::registry();
        let chains = InterNetworkChains::new();
        let plan = {
            let ctx = chains.context(&registry);
            plan(&ctx, InterNetworkToken::SourceRelayToken).await
        };
        let connections = Connections::new(
            &chains.chains.gateway,
            &chains.chains.bridge_hub,
            &chains.chains.asset_hub,
        );
        let ctx = PlanContext::new(&registry, connections);

        let result = validate_inter_network_transfer(&ctx, plan).await.unwrap();

        assert!(!result.success);
        assert_eq!(
            result.logs[0].reason,
            ValidationReason::NoDestinationParachainConnection
        );
    }

    #[tokio::test]
    async fn test_failed_import_checks_beneficiary() {
        let registry = fixtures::registry();
        let chains = InterNetworkChains::new();
        let ctx = chains.context(&registry);
        let plan = plan(&ctx, InterNetworkToken::SourceRelayToken).await;
        {
            let mut remote = chains.remote.state();
            remote.dry_run = Ok(DryRunEffects {
                execution: ExecutionOutcome::Incomplete {
                    error: "TooExpensive".to_string(),
                },
                forwarded: Vec::new(),
            });
            remote.accounts.clear();
        }

        let result = validate_inter_network_transfer(&ctx, plan).await.unwrap();

        let reasons: Vec<_> = result.logs.iter().map(|l| l.reason).collect();
        assert_eq!(
            reasons,
            vec![
                ValidationReason::DryRunFailed,
                ValidationReason::AccountDoesNotExist
            ]
        );
        assert!(result.logs[0].message.contains("TooExpensive"));
    }
}
