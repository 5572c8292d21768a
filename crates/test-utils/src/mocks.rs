//! In-memory chain clients.
//!
//! Each mock answers from a state struct that tests rewrite through `state()`. The mocks also
//! record the queries that tests assert on. Setting `transport_error` makes every call fail the
//! way a dropped connection would.

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use parking_lot::{Mutex, MutexGuard};
use snowbridge_planner_chain_api::{
    bridge_hub::BridgeHubClient,
    errors::{ChainError, ChainResult},
    events::{BlockEvents, ChainStream, ExecutionHeadUpdate},
    gateway::GatewayClient,
    l2::L2AdaptorClient,
    parachain::{
        AccountApi, AssetConversionApi, DryRunApi, ExecuteCall, ParachainClient, StorageApi,
        XcmPaymentApi,
    },
    tx::UnsignedTx,
    types::{
        AccountInfo, AssetDetails, DryRunEffects, ExecutionOutcome, FeeData, OperatingMode,
        TokenBalance, VersionedAssetId, VersionedLocation,
    },
};
use snowbridge_planner_primitives::{
    address::{AccountId32, AccountKey, EthAddress},
    location::Location,
    registry::{AccountType, ChainProperties},
};
use snowbridge_planner_programs::{
    instruction::{AssetAmount, Weight},
    program::{Program, XcmVersion},
};

/// Items already buffered, followed by a stream that never ends, as a live chain subscription.
fn live_stream<T: Send + 'static>(items: Vec<T>) -> ChainStream<T> {
    stream::iter(items.into_iter().map(Ok))
        .chain(stream::pending())
        .boxed()
}

fn transport(error: &Option<String>) -> ChainResult<()> {
    match error {
        Some(reason) => Err(ChainError::Transport(reason.clone())),
        None => Ok(()),
    }
}

/// A dry run that executed fully and forwarded nothing.
pub fn completed_dry_run() -> DryRunEffects {
    DryRunEffects {
        execution: ExecutionOutcome::Complete,
        forwarded: Vec::new(),
    }
}

/// Properties of a generic Substrate parachain.
pub fn chain_properties(name: &str, spec_version: u32) -> ChainProperties {
    ChainProperties {
        token_symbols: "DOT".to_string(),
        token_decimals: 10,
        ss58_format: 0,
        is_ethereum: false,
        account_type: AccountType::AccountId32,
        evm_chain_id: None,
        name: name.to_string(),
        spec_name: name.to_lowercase().replace(' ', "-"),
        spec_version,
    }
}

/// What a [`MockParachain`] answers with, and what it was asked.
#[derive(Debug)]
pub struct ParachainState {
    /// Weight of every program.
    pub weight: Weight,

    /// Fee of any weight, in any asset.
    pub weight_fee: u128,

    /// Asset id version the weight-to-fee query rejects.
    pub weight_fee_rejected_for: Option<XcmVersion>,

    /// Asset ids the weight-to-fee query was asked about.
    pub weight_fee_queries: Vec<VersionedAssetId>,

    /// Delivery quote for any destination.
    pub delivery_fees: Vec<AssetAmount>,

    /// Destinations delivery was quoted to.
    pub delivery_fee_queries: Vec<VersionedLocation>,

    /// Swap pools as `(asset_in, asset_out, rate)`; buying `n` of `asset_out` costs `n * rate`.
    pub pools: Vec<(Location, Location, u128)>,

    /// Result of dry-running a received program.
    pub dry_run: ChainResult<DryRunEffects>,

    /// Origins received programs were dry-run from.
    pub dry_run_origins: Vec<VersionedLocation>,

    /// Result of dry-running a signed call.
    pub dry_run_execute: ChainResult<DryRunEffects>,

    /// System records; unknown accounts read as empty.
    pub accounts: BTreeMap<AccountKey, AccountInfo>,

    /// Accounts whose system record was read.
    pub account_queries: Vec<AccountKey>,

    /// Foreign asset balances.
    pub foreign_balances: BTreeMap<(AccountKey, Location), u128>,

    /// Registered foreign assets.
    pub asset_details: BTreeMap<Location, AssetDetails>,

    /// Consumer limit, if the chain exposes one.
    pub max_consumers: Option<u32>,

    /// Deposit reserved when a foreign asset is created.
    pub asset_deposit: u128,

    /// Raw `u128` storage.
    pub storage: BTreeMap<Vec<u8>, u128>,

    /// The latest finalized block.
    pub block_number: u32,

    /// Static chain properties.
    pub properties: ChainProperties,

    /// How often the chain properties were read.
    pub chain_properties_calls: usize,

    /// Fee of any signed call.
    pub transaction_fee: ChainResult<u128>,

    /// Encoded length of every program; the instruction count when unset.
    pub encoded_len: Option<usize>,

    /// Blocks the event subscription replays before going quiet.
    pub events: Vec<BlockEvents>,

    /// Beacon light client mode, when the mock stands in for the bridge hub.
    pub beacon_mode: OperatingMode,

    /// Inbound queue mode.
    pub inbound_mode: OperatingMode,

    /// Outbound queue mode.
    pub outbound_mode: OperatingMode,

    /// The newest finalized beacon slot.
    pub latest_beacon_slot: u64,

    /// The newest Ethereum block the light client knows.
    pub latest_execution_block: u64,

    /// Native fee of the relayer's submission extrinsic.
    pub inbound_submit_fee: u128,

    /// Execution head updates the subscription replays before going quiet.
    pub head_updates: Vec<ExecutionHeadUpdate>,

    /// Fails every call with a transport error when set.
    pub transport_error: Option<String>,
}

/// A parachain, or the bridge hub, held in memory.
#[derive(Debug)]
pub struct MockParachain {
    para_id: u32,
    state: Mutex<ParachainState>,
}

/// The bridge hub is a parachain with light client and queue state.
pub type MockBridgeHub = MockParachain;

impl MockParachain {
    /// A parachain with no pools, no accounts and free fees, whose dry runs complete.
    pub fn new(para_id: u32) -> Self {
        let state = ParachainState {
            weight: Weight {
                ref_time: 1_000_000_000,
                proof_size: 65_536,
            },
            weight_fee: 0,
            weight_fee_rejected_for: None,
            weight_fee_queries: Vec::new(),
            delivery_fees: Vec::new(),
            delivery_fee_queries: Vec::new(),
            pools: Vec::new(),
            dry_run: Ok(completed_dry_run()),
            dry_run_origins: Vec::new(),
            dry_run_execute: Ok(completed_dry_run()),
            accounts: BTreeMap::new(),
            account_queries: Vec::new(),
            foreign_balances: BTreeMap::new(),
            asset_details: BTreeMap::new(),
            max_consumers: None,
            asset_deposit: 0,
            storage: BTreeMap::new(),
            block_number: 1,
            properties: chain_properties(&format!("Parachain {para_id}"), 1),
            chain_properties_calls: 0,
            transaction_fee: Ok(0),
            encoded_len: None,
            events: Vec::new(),
            beacon_mode: OperatingMode::Normal,
            inbound_mode: OperatingMode::Normal,
            outbound_mode: OperatingMode::Normal,
            latest_beacon_slot: 0,
            latest_execution_block: 0,
            inbound_submit_fee: 0,
            head_updates: Vec::new(),
            transport_error: None,
        };

        Self {
            para_id,
            state: Mutex::new(state),
        }
    }

    /// Locks the state for reading or rewriting.
    pub fn state(&self) -> MutexGuard<'_, ParachainState> {
        self.state.lock()
    }

    fn with<T>(&self, f: impl FnOnce(&mut ParachainState) -> ChainResult<T>) -> ChainResult<T> {
        let mut state = self.state.lock();
        transport(&state.transport_error)?;
        f(&mut state)
    }
}

#[async_trait]
impl XcmPaymentApi for MockParachain {
    async fn query_xcm_weight(&self, _program: &Program) -> ChainResult<Weight> {
        self.with(|state| Ok(state.weight))
    }

    async fn query_weight_to_asset_fee(
        &self,
        _weight: Weight,
        asset: &VersionedAssetId,
    ) -> ChainResult<u128> {
        self.with(|state| {
            state.weight_fee_queries.push(asset.clone());
            if state.weight_fee_rejected_for == Some(asset.version) {
                return Err(ChainError::Rejected {
                    call: "query_weight_to_asset_fee",
                    reason: "UnhandledXcmVersion".to_string(),
                });
            }
            Ok(state.weight_fee)
        })
    }

    async fn query_delivery_fees(
        &self,
        destination: &VersionedLocation,
        _program: &Program,
    ) -> ChainResult<Vec<AssetAmount>> {
        self.with(|state| {
            state.delivery_fee_queries.push(destination.clone());
            Ok(state.delivery_fees.clone())
        })
    }
}

#[async_trait]
impl DryRunApi for MockParachain {
    async fn dry_run_xcm(
        &self,
        origin: &VersionedLocation,
        _program: &Program,
    ) -> ChainResult<DryRunEffects> {
        self.with(|state| {
            state.dry_run_origins.push(origin.clone());
            state.dry_run.clone()
        })
    }

    async fn dry_run_execute(
        &self,
        _signer: &AccountId32,
        _call: &ExecuteCall,
    ) -> ChainResult<DryRunEffects> {
        self.with(|state| state.dry_run_execute.clone())
    }
}

#[async_trait]
impl AssetConversionApi for MockParachain {
    async fn quote_price_tokens_for_exact_tokens(
        &self,
        asset_in: &Location,
        asset_out: &Location,
        amount_out: u128,
        _include_fee: bool,
    ) -> ChainResult<Option<u128>> {
        self.with(|state| {
            Ok(state
                .pools
                .iter()
                .find(|(pool_in, pool_out, _)| pool_in == asset_in && pool_out == asset_out)
                .map(|(_, _, rate)| amount_out.saturating_mul(*rate)))
        })
    }
}

#[async_trait]
impl AccountApi for MockParachain {
    async fn account_info(&self, account: &AccountKey) -> ChainResult<AccountInfo> {
        self.with(|state| {
            state.account_queries.push(*account);
            Ok(state.accounts.get(account).copied().unwrap_or_default())
        })
    }

    async fn foreign_asset_balance(
        &self,
        account: &AccountKey,
        asset: &Location,
    ) -> ChainResult<u128> {
        self.with(|state| {
            Ok(state
                .foreign_balances
                .get(&(*account, asset.clone()))
                .copied()
                .unwrap_or_default())
        })
    }

    async fn asset_details(&self, asset: &Location) -> ChainResult<Option<AssetDetails>> {
        self.with(|state| Ok(state.asset_details.get(asset).copied()))
    }

    async fn max_consumers(&self) -> ChainResult<Option<u32>> {
        self.with(|state| Ok(state.max_consumers))
    }

    async fn foreign_asset_deposit(&self) -> ChainResult<u128> {
        self.with(|state| Ok(state.asset_deposit))
    }
}

#[async_trait]
impl StorageApi for MockParachain {
    async fn storage_u128(&self, key: &[u8]) -> ChainResult<Option<u128>> {
        self.with(|state| Ok(state.storage.get(key).copied()))
    }

    async fn block_number(&self) -> ChainResult<u32> {
        self.with(|state| Ok(state.block_number))
    }
}

#[async_trait]
impl ParachainClient for MockParachain {
    fn para_id(&self) -> u32 {
        self.para_id
    }

    fn encoded_program_len(&self, program: &Program) -> usize {
        self.state.lock().encoded_len.unwrap_or_else(|| program.len())
    }

    async fn chain_properties(&self) -> ChainResult<ChainProperties> {
        self.with(|state| {
            state.chain_properties_calls += 1;
            Ok(state.properties.clone())
        })
    }

    async fn transaction_fee(
        &self,
        _signer: &AccountId32,
        _call: &ExecuteCall,
    ) -> ChainResult<u128> {
        self.with(|state| state.transaction_fee.clone())
    }

    async fn block_events(&self) -> ChainResult<ChainStream<BlockEvents>> {
        self.with(|state| Ok(live_stream(state.events.clone())))
    }
}

#[async_trait]
impl BridgeHubClient for MockParachain {
    async fn beacon_operating_mode(&self) -> ChainResult<OperatingMode> {
        self.with(|state| Ok(state.beacon_mode))
    }

    async fn inbound_operating_mode(&self) -> ChainResult<OperatingMode> {
        self.with(|state| Ok(state.inbound_mode))
    }

    async fn outbound_operating_mode(&self) -> ChainResult<OperatingMode> {
        self.with(|state| Ok(state.outbound_mode))
    }

    async fn latest_beacon_slot(&self) -> ChainResult<u64> {
        self.with(|state| Ok(state.latest_beacon_slot))
    }

    async fn latest_execution_block(&self) -> ChainResult<u64> {
        self.with(|state| Ok(state.latest_execution_block))
    }

    async fn inbound_submit_fee(&self) -> ChainResult<u128> {
        self.with(|state| Ok(state.inbound_submit_fee))
    }

    async fn execution_head_updates(&self) -> ChainResult<ChainStream<ExecutionHeadUpdate>> {
        self.with(|state| Ok(live_stream(state.head_updates.clone())))
    }
}

/// What a [`MockGateway`] answers with.
#[derive(Debug)]
pub struct GatewayState {
    /// Ether balance of any account.
    pub eth_balance: u128,

    /// Balance and allowance of any account in any token.
    pub token_balance: TokenBalance,

    /// Gas estimate of any call.
    pub estimated_gas: ChainResult<u128>,

    /// Calls that were estimated.
    pub estimated_txs: Vec<UnsignedTx>,

    /// Legacy gas price.
    pub gas_price: Option<u128>,

    /// Transaction count of any account.
    pub transaction_count: u64,

    /// Outbound channel mode.
    pub operating_mode: OperatingMode,

    /// The newest relay chain block verified by the BEEFY light client.
    pub latest_beefy_block: u64,

    /// The Ethereum head.
    pub block_number: u64,

    /// Fails every call with a transport error when set.
    pub transport_error: Option<String>,
}

/// The Ethereum gateway and its chain, held in memory.
#[derive(Debug)]
pub struct MockGateway {
    state: Mutex<GatewayState>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// A gateway in normal operation where every account is empty.
    pub fn new() -> Self {
        let state = GatewayState {
            eth_balance: 0,
            token_balance: TokenBalance {
                balance: 0,
                gateway_allowance: 0,
            },
            estimated_gas: Ok(0),
            estimated_txs: Vec::new(),
            gas_price: None,
            transaction_count: 0,
            operating_mode: OperatingMode::Normal,
            latest_beefy_block: 0,
            block_number: 0,
            transport_error: None,
        };

        Self {
            state: Mutex::new(state),
        }
    }

    /// Locks the state for reading or rewriting.
    pub fn state(&self) -> MutexGuard<'_, GatewayState> {
        self.state.lock()
    }

    fn with<T>(&self, f: impl FnOnce(&mut GatewayState) -> ChainResult<T>) -> ChainResult<T> {
        let mut state = self.state.lock();
        transport(&state.transport_error)?;
        f(&mut state)
    }
}

#[async_trait]
impl GatewayClient for MockGateway {
    async fn eth_balance(&self, _account: &EthAddress) -> ChainResult<u128> {
        self.with(|state| Ok(state.eth_balance))
    }

    async fn token_balance(
        &self,
        _token: &EthAddress,
        _owner: &EthAddress,
        _spender: &EthAddress,
    ) -> ChainResult<TokenBalance> {
        self.with(|state| Ok(state.token_balance))
    }

    async fn estimate_gas(&self, tx: &UnsignedTx) -> ChainResult<u128> {
        self.with(|state| {
            state.estimated_txs.push(tx.clone());
            state.estimated_gas.clone()
        })
    }

    async fn fee_data(&self) -> ChainResult<FeeData> {
        self.with(|state| {
            Ok(FeeData {
                gas_price: state.gas_price,
            })
        })
    }

    async fn transaction_count(&self, _account: &EthAddress) -> ChainResult<u64> {
        self.with(|state| Ok(state.transaction_count))
    }

    async fn operating_mode(&self) -> ChainResult<OperatingMode> {
        self.with(|state| Ok(state.operating_mode))
    }

    async fn latest_beefy_block(&self) -> ChainResult<u64> {
        self.with(|state| Ok(state.latest_beefy_block))
    }

    async fn block_number(&self) -> ChainResult<u64> {
        self.with(|state| Ok(state.block_number))
    }
}

/// What a [`MockL2Adaptor`] answers with, and what it was asked.
#[derive(Debug)]
pub struct L2State {
    /// Bridge fee of any deposit.
    pub across_fee: u128,

    /// Units of the input token per unit of output token on the L1 router.
    pub swap_rate: u128,

    /// Swap quotes as `(token_in, token_out, amount, pool_fee)`.
    pub swap_queries: Vec<(EthAddress, EthAddress, u128, u32)>,

    /// Transaction count of any account.
    pub transaction_count: u64,

    /// Ether balance of any account.
    pub eth_balance: u128,

    /// Balance and allowance of any account in any token.
    pub token_balance: TokenBalance,

    /// Gas estimate of any call.
    pub estimated_gas: ChainResult<u128>,

    /// Legacy gas price.
    pub gas_price: Option<u128>,

    /// Fails every call with a transport error when set.
    pub transport_error: Option<String>,
}

/// A second-layer chain, its adaptor and the services it bridges through, held in memory.
#[derive(Debug)]
pub struct MockL2Adaptor {
    state: Mutex<L2State>,
}

impl Default for MockL2Adaptor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockL2Adaptor {
    /// An adaptor that charges nothing and swaps one for one.
    pub fn new() -> Self {
        let state = L2State {
            across_fee: 0,
            swap_rate: 1,
            swap_queries: Vec::new(),
            transaction_count: 0,
            eth_balance: 0,
            token_balance: TokenBalance {
                balance: 0,
                gateway_allowance: 0,
            },
            estimated_gas: Ok(0),
            gas_price: None,
            transport_error: None,
        };

        Self {
            state: Mutex::new(state),
        }
    }

    /// Locks the state for reading or rewriting.
    pub fn state(&self) -> MutexGuard<'_, L2State> {
        self.state.lock()
    }

    fn with<T>(&self, f: impl FnOnce(&mut L2State) -> ChainResult<T>) -> ChainResult<T> {
        let mut state = self.state.lock();
        transport(&state.transport_error)?;
        f(&mut state)
    }
}

#[async_trait]
impl L2AdaptorClient for MockL2Adaptor {
    async fn across_bridge_fee(
        &self,
        _input_token: &EthAddress,
        _output_token: &EthAddress,
        _l2_chain_id: u64,
        _destination_chain_id: u64,
        _amount: u128,
    ) -> ChainResult<u128> {
        self.with(|state| Ok(state.across_fee))
    }

    async fn quote_exact_output_single(
        &self,
        token_in: &EthAddress,
        token_out: &EthAddress,
        amount: u128,
        pool_fee: u32,
    ) -> ChainResult<u128> {
        self.with(|state| {
            state
                .swap_queries
                .push((*token_in, *token_out, amount, pool_fee));
            Ok(amount.saturating_mul(state.swap_rate))
        })
    }

    async fn transaction_count(&self, _account: &EthAddress) -> ChainResult<u64> {
        self.with(|state| Ok(state.transaction_count))
    }

    async fn eth_balance(&self, _account: &EthAddress) -> ChainResult<u128> {
        self.with(|state| Ok(state.eth_balance))
    }

    async fn token_balance(
        &self,
        _token: &EthAddress,
        _owner: &EthAddress,
        _spender: &EthAddress,
    ) -> ChainResult<TokenBalance> {
        self.with(|state| Ok(state.token_balance))
    }

    async fn estimate_gas(&self, _tx: &UnsignedTx) -> ChainResult<u128> {
        self.with(|state| state.estimated_gas.clone())
    }

    async fn fee_data(&self) -> ChainResult<FeeData> {
        self.with(|state| {
            Ok(FeeData {
                gas_price: state.gas_price,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;
    use snowbridge_planner_primitives::location::dot_location;

    use super::*;

    #[test]
    fn test_transport_error_fails_every_call() {
        let parachain = MockParachain::new(1000);
        parachain.state().transport_error = Some("reset".to_string());

        let res = futures::executor::block_on(parachain.max_consumers());

        assert_eq!(res, Err(ChainError::Transport("reset".to_string())));
    }

    #[test]
    fn test_pools_quote_by_direction() {
        let parachain = MockParachain::new(1000);
        let ether = Location::new(2, Vec::new());
        parachain
            .state()
            .pools
            .push((ether.clone(), dot_location(), 3));

        let quoted = futures::executor::block_on(async {
            (
                parachain
                    .quote_price_tokens_for_exact_tokens(&ether, &dot_location(), 10, true)
                    .await,
                parachain
                    .quote_price_tokens_for_exact_tokens(&dot_location(), &ether, 10, true)
                    .await,
            )
        });

        assert_eq!(quoted, (Ok(Some(30)), Ok(None)));
    }

    #[test]
    fn test_event_stream_stays_open() {
        let parachain = MockParachain::new(1000);
        parachain.state().events.push(BlockEvents {
            number: 7,
            hash: [7; 32],
            events: Vec::new(),
        });

        let mut events = futures::executor::block_on(parachain.block_events()).unwrap();
        let first = futures::executor::block_on(events.next());

        assert_eq!(first.map(|block| block.map(|b| b.number)), Some(Ok(7)));
        assert!(events.next().now_or_never().is_none());
    }
}
