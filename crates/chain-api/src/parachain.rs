//! Runtime APIs of a parachain, as the planner uses them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use snowbridge_planner_primitives::{
    address::{AccountId32, AccountKey},
    location::Location,
    registry::ChainProperties,
};
use snowbridge_planner_programs::{
    instruction::{AssetAmount, Weight},
    program::Program,
};

use crate::{
    errors::ChainResult,
    events::{BlockEvents, ChainStream},
    types::{AccountInfo, AssetDetails, DryRunEffects, VersionedAssetId, VersionedLocation},
};

/// A call to execute a program locally, signed by a Substrate account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteCall {
    /// The program.
    pub program: Program,

    /// Upper bound on the weight the program may consume.
    pub max_weight: Weight,
}

/// Pricing of program execution and delivery.
#[async_trait]
pub trait XcmPaymentApi {
    /// The weight of executing `program` on this chain.
    async fn query_xcm_weight(&self, program: &Program) -> ChainResult<Weight>;

    /// The fee for `weight`, in `asset`.
    async fn query_weight_to_asset_fee(
        &self,
        weight: Weight,
        asset: &VersionedAssetId,
    ) -> ChainResult<u128>;

    /// The fee for delivering `program` from this chain to `destination`.
    async fn query_delivery_fees(
        &self,
        destination: &VersionedLocation,
        program: &Program,
    ) -> ChainResult<Vec<AssetAmount>>;
}

/// Non-committing execution.
#[async_trait]
pub trait DryRunApi {
    /// Simulates receiving `program` from `origin`.
    async fn dry_run_xcm(
        &self,
        origin: &VersionedLocation,
        program: &Program,
    ) -> ChainResult<DryRunEffects>;

    /// Simulates `signer` submitting `call`.
    async fn dry_run_execute(
        &self,
        signer: &AccountId32,
        call: &ExecuteCall,
    ) -> ChainResult<DryRunEffects>;
}

/// Quotes from the chain's automated market maker.
#[async_trait]
pub trait AssetConversionApi {
    /// How much of `asset_in` buys exactly `amount_out` of `asset_out`, or `None` when no pool
    /// connects the two.
    async fn quote_price_tokens_for_exact_tokens(
        &self,
        asset_in: &Location,
        asset_out: &Location,
        amount_out: u128,
        include_fee: bool,
    ) -> ChainResult<Option<u128>>;
}

/// Account and asset state.
#[async_trait]
pub trait AccountApi {
    /// The system record of `account`.
    async fn account_info(&self, account: &AccountKey) -> ChainResult<AccountInfo>;

    /// The balance `account` holds of the foreign asset at `asset`.
    async fn foreign_asset_balance(&self, account: &AccountKey, asset: &Location)
        -> ChainResult<u128>;

    /// Details of the foreign asset at `asset`, or `None` if it is not registered.
    async fn asset_details(&self, asset: &Location) -> ChainResult<Option<AssetDetails>>;

    /// The chain's consumer limit, if it exposes one.
    async fn max_consumers(&self) -> ChainResult<Option<u32>>;

    /// Native deposit reserved when a foreign asset is created.
    async fn foreign_asset_deposit(&self) -> ChainResult<u128>;
}

/// Raw storage.
#[async_trait]
pub trait StorageApi {
    /// Reads a well-known `u128` storage item by its raw key.
    async fn storage_u128(&self, key: &[u8]) -> ChainResult<Option<u128>>;

    /// The latest finalized block number.
    async fn block_number(&self) -> ChainResult<u32>;
}

/// Everything the planner reads from a parachain.
#[async_trait]
pub trait ParachainClient:
    XcmPaymentApi + DryRunApi + AssetConversionApi + AccountApi + StorageApi + Send + Sync
{
    /// The parachain id.
    fn para_id(&self) -> u32;

    /// Length of `program` in the chain's wire encoding.
    fn encoded_program_len(&self, program: &Program) -> usize;

    /// Static chain properties.
    async fn chain_properties(&self) -> ChainResult<ChainProperties>;

    /// Estimated fee of `signer` submitting `call`, in the native currency.
    async fn transaction_fee(&self, signer: &AccountId32, call: &ExecuteCall)
        -> ChainResult<u128>;

    /// Events of every block finalized from now on.
    async fn block_events(&self) -> ChainResult<ChainStream<BlockEvents>>;
}
