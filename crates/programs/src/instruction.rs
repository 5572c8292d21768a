//! The instruction algebra.
//!
//! Instructions are a closed set of typed variants. Builders compose them into programs; nested
//! programs (appendices, forwarded messages) are plain instruction lists executed on the chain
//! that receives them.

use serde::{Deserialize, Serialize};
use snowbridge_planner_primitives::{
    address::AccountId32,
    location::{Junction, Location, NetworkId},
    topic::MessageId,
};

use crate::program::XcmVersion;

/// Computational and proof-size cost of executing a program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Weight {
    /// Execution time.
    pub ref_time: u64,

    /// Size of the storage proof.
    pub proof_size: u64,
}

/// A fungible amount of the asset identified by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetAmount {
    /// The asset, relative to the chain executing the instruction.
    pub id: Location,

    /// The amount in the asset's smallest unit.
    pub amount: u128,
}

impl AssetAmount {
    /// Creates an asset amount.
    pub const fn new(id: Location, amount: u128) -> Self {
        Self { id, amount }
    }
}

/// A selector over assets in holding that does not name them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WildAsset {
    /// The first `n` distinct assets in holding, whatever their locations.
    AllCounted(u32),

    /// All of the fungible asset with the given id.
    AllOf {
        /// The asset to select.
        id: Location,
    },
}

/// A selector over assets in holding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetFilter {
    /// Exactly these assets.
    Definite(Vec<AssetAmount>),

    /// A wildcard selection.
    Wild(WildAsset),
}

impl AssetFilter {
    /// Selects the first `n` distinct assets in holding.
    pub const fn all_counted(n: u32) -> Self {
        AssetFilter::Wild(WildAsset::AllCounted(n))
    }

    /// Selects exactly `asset`.
    pub fn definite(asset: AssetAmount) -> Self {
        AssetFilter::Definite(vec![asset])
    }
}

/// Upper bound on the weight a program may buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightLimit {
    /// Buy as much as the fee allows.
    Unlimited,

    /// Buy at most this much.
    Limited(Weight),
}

/// How assets move to the destination of an `InitiateTransfer`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferFilter {
    /// The assets are burnt here and minted at the destination.
    Teleport(AssetFilter),

    /// This chain is the reserve; the destination receives a derivative.
    ReserveDeposit(AssetFilter),

    /// The destination is the reserve; the derivative is burnt here.
    ReserveWithdraw(AssetFilter),
}

/// Out-of-band execution hints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hint {
    /// The location allowed to claim assets trapped by a failed program.
    AssetClaimer {
        /// The claimer.
        location: Location,
    },
}

/// The origin a `Transact` dispatches its call with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OriginKind {
    /// The native origin of the message's sender.
    Native,

    /// The sovereign account of the message's sender.
    SovereignAccount,

    /// Root.
    Superuser,

    /// The message origin as a location.
    Xcm,
}

/// A runtime call dispatched by a `Transact`.
///
/// Only the calls the planner issues are modeled; encoding them is the collaborator codec's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteCall {
    /// `ForeignAssets::create`.
    ForeignAssetsCreate {
        /// Location the new asset is registered under.
        asset_id: Location,

        /// Admin and owner of the new asset.
        admin: AccountId32,

        /// Minimum balance of the new asset.
        min_balance: u128,
    },
}

/// A single step of a message program.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    /// Withdraws assets from the origin into holding.
    WithdrawAsset(Vec<AssetAmount>),

    /// Mints derivatives of assets held by the origin as reserve into holding.
    ReserveAssetDeposited(Vec<AssetAmount>),

    /// Mints assets teleported from the origin into holding.
    ReceiveTeleportedAsset(Vec<AssetAmount>),

    /// Drops the origin.
    ClearOrigin,

    /// Pays for execution out of holding.
    BuyExecution {
        /// Asset paying for execution.
        fees: AssetAmount,

        /// Upper bound on the weight bought.
        weight_limit: WeightLimit,
    },

    /// Pays for execution and delivery out of holding.
    PayFees {
        /// Asset paying the fees.
        asset: AssetAmount,
    },

    /// Narrows the origin to an interior location.
    DescendOrigin(Vec<Junction>),

    /// Switches the origin to another global consensus system.
    UniversalOrigin(Junction),

    /// Sets execution hints.
    SetHints(Vec<Hint>),

    /// Sets instructions to run after the program, whether or not it fails.
    SetAppendix(Vec<Instruction>),

    /// Returns unused prepaid weight to holding.
    RefundSurplus,

    /// Deposits assets from holding into an account.
    DepositAsset {
        /// Assets to deposit.
        assets: AssetFilter,

        /// The receiving account.
        beneficiary: Location,
    },

    /// Deposits assets into the sovereign account of `dest` and sends it a program.
    DepositReserveAsset {
        /// Assets to deposit.
        assets: AssetFilter,

        /// The receiving chain.
        dest: Location,

        /// The program the receiving chain runs after the reserve deposit.
        xcm: Vec<Instruction>,
    },

    /// Moves assets to `destination` and sends it a program.
    InitiateTransfer {
        /// The receiving chain.
        destination: Location,

        /// Assets paying fees at the destination.
        remote_fees: Option<TransferFilter>,

        /// Whether the destination keeps this program's origin.
        preserve_origin: bool,

        /// Assets transferred.
        assets: Vec<TransferFilter>,

        /// The program the destination runs.
        remote_xcm: Vec<Instruction>,
    },

    /// Swaps assets in holding on a local exchange.
    ExchangeAsset {
        /// Assets given.
        give: AssetFilter,

        /// Assets wanted.
        want: Vec<AssetAmount>,

        /// Whether to take as much of `want` as `give` buys, rather than exactly `want`.
        maximal: bool,
    },

    /// Dispatches a runtime call.
    Transact {
        /// Origin of the call.
        origin_kind: OriginKind,

        /// The call.
        call: RemoteCall,
    },

    /// Exports a program to another global consensus system through a bridge.
    ExportMessage {
        /// The remote consensus system.
        network: NetworkId,

        /// The destination inside `network`.
        destination: Vec<Junction>,

        /// The exported program.
        xcm: Vec<Instruction>,
    },

    /// Sets the correlation topic of the program.
    SetTopic(MessageId),
}

impl Instruction {
    /// The instruction's name, for diagnostics.
    pub const fn name(&self) -> &'static str {
        match self {
            Instruction::WithdrawAsset(_) => "WithdrawAsset",
            Instruction::ReserveAssetDeposited(_) => "ReserveAssetDeposited",
            Instruction::ReceiveTeleportedAsset(_) => "ReceiveTeleportedAsset",
            Instruction::ClearOrigin => "ClearOrigin",
            Instruction::BuyExecution { .. } => "BuyExecution",
            Instruction::PayFees { .. } => "PayFees",
            Instruction::DescendOrigin(_) => "DescendOrigin",
            Instruction::UniversalOrigin(_) => "UniversalOrigin",
            Instruction::SetHints(_) => "SetHints",
            Instruction::SetAppendix(_) => "SetAppendix",
            Instruction::RefundSurplus => "RefundSurplus",
            Instruction::DepositAsset { .. } => "DepositAsset",
            Instruction::DepositReserveAsset { .. } => "DepositReserveAsset",
            Instruction::InitiateTransfer { .. } => "InitiateTransfer",
            Instruction::ExchangeAsset { .. } => "ExchangeAsset",
            Instruction::Transact { .. } => "Transact",
            Instruction::ExportMessage { .. } => "ExportMessage",
            Instruction::SetTopic(_) => "SetTopic",
        }
    }

    /// The oldest program version that has this instruction.
    pub const fn min_version(&self) -> XcmVersion {
        match self {
            Instruction::PayFees { .. }
            | Instruction::SetHints(_)
            | Instruction::InitiateTransfer { .. } => XcmVersion::V5,
            _ => XcmVersion::V4,
        }
    }

    /// Programs nested inside this instruction.
    pub fn nested(&self) -> Option<&[Instruction]> {
        match self {
            Instruction::SetAppendix(xcm)
            | Instruction::DepositReserveAsset { xcm, .. }
            | Instruction::ExportMessage { xcm, .. } => Some(xcm),
            Instruction::InitiateTransfer { remote_xcm, .. } => Some(remote_xcm),
            _ => None,
        }
    }

    /// Whether this instruction hands assets to another chain and cannot be undone locally.
    pub const fn is_forwarding(&self) -> bool {
        matches!(
            self,
            Instruction::DepositReserveAsset { .. }
                | Instruction::InitiateTransfer { .. }
                | Instruction::ExportMessage { .. }
        )
    }

    /// Whether this instruction returns leftover assets to the sender or their claimer.
    pub fn is_refund_path(&self) -> bool {
        match self {
            Instruction::RefundSurplus => true,
            Instruction::SetHints(hints) => hints
                .iter()
                .any(|hint| matches!(hint, Hint::AssetClaimer { .. })),
            Instruction::SetAppendix(xcm) => xcm
                .iter()
                .any(|i| matches!(i, Instruction::DepositAsset { .. })),
            _ => false,
        }
    }
}

/// Collapses `fee` and `asset` into one entry when they are the same asset, listing the fee first
/// otherwise.
pub fn fee_then_asset(fee: AssetAmount, asset: AssetAmount) -> Vec<AssetAmount> {
    if fee.id == asset.id {
        vec![AssetAmount::new(
            fee.id,
            fee.amount.saturating_add(asset.amount),
        )]
    } else {
        vec![fee, asset]
    }
}
