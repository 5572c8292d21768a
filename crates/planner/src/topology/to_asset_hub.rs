//! Transfers that settle on AssetHub.

use async_trait::async_trait;
use snowbridge_planner_chain_api::tx::{ContractCall, SendMessage};
use snowbridge_planner_primitives::{
    address::EthAddress,
    asset::AssetKind,
    fee::{DeliveryFee, FeeAsset, HopFee},
};
use snowbridge_planner_programs::{sample, to_asset_hub::send_message_program};
use tracing::debug;

use super::{
    ensure_handles, legacy,
    shared::{self, assemble, inbound_message, prepare, sample_asset},
    Topology, TransferStrategy,
};
use crate::{
    context::PlanContext,
    errors::{PlannerError, PlannerResult},
    fees::{execution_padding, quote_asset_hub, relayer_fee},
    options::FeeOptions,
    transfer::{gateway_asset, resolve_inputs, Transfer, TransferRequest},
    validation::ValidationResult,
};

/// Moves an asset from Ethereum to an account on AssetHub.
///
/// AssetHub executes the whole transfer; the only fees are its execution and the relayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToAssetHub {
    pub(super) kind: AssetKind,
}

#[async_trait]
impl TransferStrategy for ToAssetHub {
    fn topology(&self) -> Topology {
        match self.kind {
            AssetKind::Erc20 => Topology::Erc20ToAssetHub,
            AssetKind::Pna => Topology::PnaToAssetHub,
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
        if shared::asset_hub_is_legacy(ctx)? {
            return legacy::delivery_fee(ctx, topology, &resolved, options).await;
        }
        if options.fee_asset() != FeeAsset::Ether {
            return Err(PlannerError::UnsupportedFeeAsset {
                fee_asset: options.fee_asset(),
                para_id: destination_para_id,
            });
        }

        let chain_id = ctx.registry().eth_chain_id;
        let sample = sample::asset_hub_program(chain_id, &sample_asset(ctx, &resolved)?)?;
        let asset_hub = quote_asset_hub(ctx, &sample, execution_padding(ctx, options)).await?;
        let (relayer, extrinsic) = relayer_fee(ctx, options, asset_hub.ether.delivery).await?;

        let mut fee =
            DeliveryFee::new(FeeAsset::Ether, asset_hub.ether, HopFee::default(), relayer)?;
        if let Some(extrinsic) = extrinsic {
            fee = fee.with_extrinsic(extrinsic);
        }
        debug!(%topology, total = %fee.total(), "priced transfer");

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
        shared::ensure_topology(ctx, &request.token, request.destination_para_id, topology)?;
        if shared::asset_hub_is_legacy(ctx)? {
            return legacy::create_transfer(ctx, topology, request, fee, options).await;
        }

        let prepared = prepare(ctx, &request).await?;
        let total_value = shared::total_value(&request, &fee)?;
        let inbound = inbound_message(ctx, &request, &prepared, &fee, total_value)?;
        let body = send_message_program(
            &prepared.beneficiary.key,
            inbound.held_asset_count(),
            options.extra_instructions(),
            prepared.topic,
        )?;
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

#[cfg(test)]
mod tests {
    use snowbridge_planner_chain_api::{
        errors::ChainError,
        tx::GatewayAsset,
        types::{DryRunEffects, ExecutionOutcome, OperatingMode, TokenBalance},
    };
    use snowbridge_planner_primitives::{
        constants::ETHER_TOKEN_ADDRESS, location::parachain_location,
    };
    use snowbridge_planner_programs::{instruction::Instruction, program::XcmVersion};
    use snowbridge_planner_test_utils::fixtures;

    use super::*;
    use crate::{
        create_transfer, get_delivery_fee,
        testing::{request, TestChains},
        transfer::transfer_topic,
        validate_transfer,
        validation::{ValidationKind, ValidationReason},
    };

    #[tokio::test]
    async fn test_fee_composition() {
        let registry = fixtures::registry();
        let chains = TestChains::new();
        let ctx = chains.context(&registry);

        let fee = get_delivery_fee(
            &ctx,
            &fixtures::SUFFICIENT_TOKEN,
            fixtures::ASSET_HUB_PARA_ID,
            &FeeOptions::default(),
        )
        .await
        .unwrap();

        // 100 DOT delivery and 1_000 DOT execution at 2 wei per DOT, execution padded by 33%.
        assert_eq!(fee.asset_hub_delivery_fee(), 200);
        assert_eq!(fee.asset_hub_execution_fee(), 2_660);
        // (50 DOT extrinsic + 200 wei delivery) padded by 30%.
        assert_eq!(fee.relayer_fee(), 390);
        assert_eq!(fee.total(), 3_050);
        assert_eq!(fee.destination_total().unwrap(), 0);
        assert_eq!(fee.extrinsic().map(|e| e.native), Some(fixtures::INBOUND_SUBMIT_FEE));
    }

    #[tokio::test]
    async fn test_relayer_override_skips_bridge_hub_query() {
        let registry = fixtures::registry();
        let chains = TestChains::new();
        chains.bridge_hub.state().inbound_submit_fee = u128::MAX;
        let ctx = chains.context(&registry);

        let fee = get_delivery_fee(
            &ctx,
            &fixtures::SUFFICIENT_TOKEN,
            fixtures::ASSET_HUB_PARA_ID,
            &FeeOptions::default().with_relayer_fee(5),
        )
        .await
        .unwrap();

        assert_eq!(fee.relayer_fee(), 5);
        assert!(fee.extrinsic().is_none());
    }

    #[tokio::test]
    async fn test_dot_fee_asset_is_rejected() {
        let registry = fixtures::registry();
        let chains = TestChains::new();
        let ctx = chains.context(&registry);

        let res = get_delivery_fee(
            &ctx,
            &fixtures::SUFFICIENT_TOKEN,
            fixtures::ASSET_HUB_PARA_ID,
            &FeeOptions::default().with_fee_asset(FeeAsset::Dot),
        )
        .await;

        assert!(matches!(res, Err(PlannerError::UnsupportedFeeAsset { .. })));
    }

    #[tokio::test]
    async fn test_single_hop_pna_transfer() {
        let registry = fixtures::registry();
        let chains = TestChains::new();
        chains.gateway.state().transaction_count = 7;
        let ctx = chains.context(&registry);
        let request = request(fixtures::PNA_TOKEN, fixtures::ASSET_HUB_PARA_ID, 1_000_000);
        let options = FeeOptions::default();

        let fee = get_delivery_fee(&ctx, &request.token, request.destination_para_id, &options)
            .await
            .unwrap();
        let transfer = create_transfer(&ctx, request.clone(), fee, options)
            .await
            .unwrap();

        let program = &transfer.computed.asset_hub_program;
        assert!(program.forwarding().is_none());
        assert!(program
            .instructions()
            .iter()
            .all(|i| !matches!(i, Instruction::SetAppendix(_))));

        let expected = transfer_topic(
            fixtures::ASSET_HUB_PARA_ID,
            fixtures::SOURCE_ACCOUNT,
            &fixtures::PNA_TOKEN,
            &transfer.computed.beneficiary.key,
            1_000_000,
            7,
        );
        assert_eq!(transfer.computed.nonce, 7);
        assert_eq!(transfer.computed.topic, expected);
        assert_eq!(program.topic(), Some(expected));

        let ContractCall::SendMessage(send) = &transfer.tx.call else {
            panic!("expected a message submission");
        };
        assert_eq!(
            send.assets,
            vec![GatewayAsset::Foreign {
                token_id: fixtures::PNA_FOREIGN_ID,
                amount: 1_000_000
            }]
        );
        assert_eq!(transfer.tx.value, fee.total());
    }

    #[tokio::test]
    async fn test_ether_transfer_attaches_amount() {
        let registry = fixtures::registry();
        let chains = TestChains::new();
        let ctx = chains.context(&registry);
        let request = request(ETHER_TOKEN_ADDRESS, fixtures::ASSET_HUB_PARA_ID, 5_000);
        let options = FeeOptions::default();

        let fee = get_delivery_fee(&ctx, &request.token, request.destination_para_id, &options)
            .await
            .unwrap();
        let transfer = create_transfer(&ctx, request, fee, options).await.unwrap();

        assert_eq!(transfer.tx.value, fee.total() + 5_000);
        assert_eq!(transfer.tx.to, fixtures::GATEWAY_ADDRESS);
        let ContractCall::SendMessage(send) = &transfer.tx.call else {
            panic!("expected a message submission");
        };
        assert_eq!(
            send.assets,
            vec![GatewayAsset::Native {
                token: ETHER_TOKEN_ADDRESS,
                amount: 5_000
            }]
        );
    }

    #[tokio::test]
    async fn test_valid_transfer_has_no_findings() {
        let registry = fixtures::registry();
        let chains = TestChains::new();
        let ctx = chains.context(&registry);
        let transfer = chains
            .plan(&ctx, fixtures::SUFFICIENT_TOKEN, fixtures::ASSET_HUB_PARA_ID, 10_000)
            .await;

        let result = validate_transfer(&ctx, transfer).await.unwrap();

        assert!(result.success, "{:?}", result.logs);
        assert!(result.logs.is_empty());
        assert!(result.data.asset_hub_dry_run.unwrap().succeeded());
        assert!(result.data.destination_dry_run.is_none());

        let origins = chains.asset_hub.state().dry_run_origins.clone();
        assert_eq!(origins.len(), 1);
        assert_eq!(
            origins[0].location,
            parachain_location(fixtures::BRIDGE_HUB_PARA_ID)
        );
    }

    #[tokio::test]
    async fn test_low_balance_and_allowance_are_both_reported() {
        let registry = fixtures::registry();
        let chains = TestChains::new();
        let ctx = chains.context(&registry);
        let transfer = chains
            .plan(&ctx, fixtures::SUFFICIENT_TOKEN, fixtures::ASSET_HUB_PARA_ID, 10_000)
            .await;
        chains.gateway.state().token_balance = TokenBalance {
            balance: 1,
            gateway_allowance: 1,
        };

        let result = validate_transfer(&ctx, transfer).await.unwrap();

        assert!(!result.success);
        let reasons: Vec<_> = result.logs.iter().map(|log| log.reason).collect();
        assert_eq!(
            reasons,
            vec![
                ValidationReason::GatewaySpenderLimitReached,
                ValidationReason::InsufficientTokenBalance
            ]
        );
    }

    #[tokio::test]
    async fn test_findings_accumulate_across_checks() {
        let registry = fixtures::registry();
        let chains = TestChains::new();
        let ctx = chains.context(&registry);
        let transfer = chains
            .plan(&ctx, fixtures::SUFFICIENT_TOKEN, fixtures::ASSET_HUB_PARA_ID, 10_000)
            .await;
        chains.gateway.state().eth_balance = 0;
        chains.gateway.state().estimated_gas = Err(ChainError::Rejected {
            call: "eth_estimateGas",
            reason: "execution reverted".to_string(),
        });
        chains.bridge_hub.state().beacon_mode = OperatingMode::Halted;
        chains.asset_hub.state().dry_run = Ok(DryRunEffects {
            execution: ExecutionOutcome::Incomplete {
                error: "FailedToTransactAsset".to_string(),
            },
            forwarded: Vec::new(),
        });

        let result = validate_transfer(&ctx, transfer).await.unwrap();

        let reasons: Vec<_> = result.logs.iter().map(|log| log.reason).collect();
        assert_eq!(
            reasons,
            vec![
                ValidationReason::FeeEstimationError,
                ValidationReason::InsufficientEther,
                ValidationReason::BridgeStatusNotOperational,
                ValidationReason::DryRunFailed,
            ]
        );
        assert!(result.logs[3].message.contains("FailedToTransactAsset"));
    }

    #[tokio::test]
    async fn test_missing_dry_run_api_is_a_warning() {
        let mut registry = fixtures::registry();
        if let Some(asset_hub) = registry.parachains.get_mut(&fixtures::ASSET_HUB_PARA_ID) {
            asset_hub.features.has_dry_run_api = false;
        }
        let chains = TestChains::new();
        let ctx = chains.context(&registry);
        let transfer = chains
            .plan(&ctx, fixtures::SUFFICIENT_TOKEN, fixtures::ASSET_HUB_PARA_ID, 10_000)
            .await;

        let result = validate_transfer(&ctx, transfer).await.unwrap();

        assert!(result.success);
        assert_eq!(result.logs.len(), 1);
        assert_eq!(result.logs[0].kind, ValidationKind::Warning);
        assert_eq!(
            result.logs[0].reason,
            ValidationReason::DryRunNotSupportedOnDestination
        );
        assert!(chains.asset_hub.state().dry_run_origins.is_empty());
    }

    #[tokio::test]
    async fn test_below_minimum_with_missing_beneficiary() {
        let registry = fixtures::registry();
        let chains = TestChains::new();
        let ctx = chains.context(&registry);
        let transfer = chains
            .plan(&ctx, fixtures::INSUFFICIENT_TOKEN, fixtures::ASSET_HUB_PARA_ID, 0)
            .await;
        chains.asset_hub.state().accounts.clear();
        chains.asset_hub.state().dry_run = Err(ChainError::Rejected {
            call: "dry_run_xcm",
            reason: "Unroutable".to_string(),
        });

        let result = validate_transfer(&ctx, transfer).await.unwrap();

        let reasons: Vec<_> = result.logs.iter().map(|log| log.reason).collect();
        assert_eq!(
            reasons,
            vec![
                ValidationReason::MinimumAmountValidation,
                ValidationReason::DryRunFailed,
                ValidationReason::AccountDoesNotExist,
            ]
        );
    }

    #[tokio::test]
    async fn test_legacy_asset_hub_uses_first_generation_call() {
        let mut registry = fixtures::registry();
        if let Some(asset_hub) = registry.parachains.get_mut(&fixtures::ASSET_HUB_PARA_ID) {
            asset_hub.features.xcm_version = 4;
        }
        let chains = TestChains::new();
        let ctx = chains.context(&registry);
        let request = request(fixtures::SUFFICIENT_TOKEN, fixtures::ASSET_HUB_PARA_ID, 10_000);
        let options = FeeOptions::default();

        let fee = get_delivery_fee(&ctx, &request.token, request.destination_para_id, &options)
            .await
            .unwrap();
        let transfer = create_transfer(&ctx, request, fee, options).await.unwrap();

        // 1_000 DOT of AssetHub execution padded by 33%.
        assert_eq!(fee.dot_fees().map(|dot| dot.asset_hub), Some(1_330));
        assert_eq!(
            transfer.computed.asset_hub_program.version(),
            XcmVersion::V4
        );
        assert!(matches!(
            transfer.tx.call,
            ContractCall::SendToken {
                destination_fee: 0,
                amount: 10_000,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_legacy_asset_hub_rejects_pna() {
        let mut registry = fixtures::registry();
        if let Some(asset_hub) = registry.parachains.get_mut(&fixtures::ASSET_HUB_PARA_ID) {
            asset_hub.features.xcm_version = 4;
        }
        let chains = TestChains::new();
        let ctx = chains.context(&registry);

        let res = get_delivery_fee(
            &ctx,
            &fixtures::PNA_TOKEN,
            fixtures::ASSET_HUB_PARA_ID,
            &FeeOptions::default(),
        )
        .await;

        assert!(matches!(res, Err(PlannerError::UnsupportedTopology(_))));
    }

    #[tokio::test]
    async fn test_strategy_rejects_other_topology() {
        let registry = fixtures::registry();
        let chains = TestChains::new();
        let ctx = chains.context(&registry);
        let transfer = chains
            .plan(&ctx, fixtures::SUFFICIENT_TOKEN, fixtures::ASSET_HUB_PARA_ID, 10_000)
            .await;

        let res = Topology::PnaToAssetHub
            .strategy()
            .validate_transfer(&ctx, transfer)
            .await;

        assert!(matches!(res, Err(PlannerError::TopologyMismatch { .. })));
    }
}
