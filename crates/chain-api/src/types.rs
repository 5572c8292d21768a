//! Plain-data results of chain reads.

use serde::{Deserialize, Serialize};
use snowbridge_planner_primitives::location::{parachain_location, Location};
use snowbridge_planner_programs::program::{Program, XcmVersion};

/// A location tagged with the program version it is encoded in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionedLocation {
    /// The encoding version.
    pub version: XcmVersion,

    /// The location.
    pub location: Location,
}

impl VersionedLocation {
    /// Tags `location` with `version`.
    pub const fn new(version: XcmVersion, location: Location) -> Self {
        Self { version, location }
    }

    /// A sibling parachain, as seen from another parachain.
    pub fn sibling(version: XcmVersion, para_id: u32) -> Self {
        Self::new(version, parachain_location(para_id))
    }
}

/// An asset id tagged with the program version it is encoded in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionedAssetId {
    /// The encoding version.
    pub version: XcmVersion,

    /// The asset.
    pub id: Location,
}

impl VersionedAssetId {
    /// Tags `id` with `version`.
    pub const fn new(version: XcmVersion, id: Location) -> Self {
        Self { version, id }
    }
}

/// How a simulated program execution ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionOutcome {
    /// Every instruction executed.
    Complete,

    /// Execution stopped part way.
    Incomplete {
        /// The chain-reported error.
        error: String,
    },

    /// Execution did not start.
    Error {
        /// The chain-reported error.
        error: String,
    },
}

impl ExecutionOutcome {
    /// Whether the program executed fully.
    pub const fn is_complete(&self) -> bool {
        matches!(self, ExecutionOutcome::Complete)
    }

    /// The chain-reported error, if execution did not complete.
    pub fn error(&self) -> Option<&str> {
        match self {
            ExecutionOutcome::Complete => None,
            ExecutionOutcome::Incomplete { error } | ExecutionOutcome::Error { error } => {
                Some(error)
            }
        }
    }
}

/// Programs a simulated execution queued for one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardedPrograms {
    /// Where the programs are sent.
    pub destination: VersionedLocation,

    /// The queued programs.
    pub programs: Vec<Program>,
}

/// The result of a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DryRunEffects {
    /// How execution ended.
    pub execution: ExecutionOutcome,

    /// Programs queued for other chains.
    pub forwarded: Vec<ForwardedPrograms>,
}

impl DryRunEffects {
    /// The first program queued for `destination`, matched on both location and version.
    pub fn forwarded_to(&self, destination: &VersionedLocation) -> Option<&Program> {
        self.forwarded
            .iter()
            .filter(|fwd| &fwd.destination == destination)
            .find_map(|fwd| fwd.programs.first())
    }
}

/// The system account record of a Substrate account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Transaction count.
    pub nonce: u64,

    /// Number of modules that depend on the account existing.
    pub consumers: u32,

    /// Number of modules that allow the account to exist.
    pub providers: u32,

    /// Number of sufficient assets the account holds.
    pub sufficients: u32,

    /// Free native balance.
    pub free: u128,
}

impl AccountInfo {
    /// Whether the account exists on chain.
    pub const fn exists(&self) -> bool {
        self.consumers != 0 || self.providers != 0 || self.sufficients != 0
    }
}

/// On-chain details of a foreign asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDetails {
    /// Smallest balance an account may hold.
    pub min_balance: u128,

    /// Whether holding only this asset keeps an account alive.
    pub is_sufficient: bool,
}

/// An ERC20 balance and the amount the gateway may spend of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    /// The owner's balance.
    pub balance: u128,

    /// The allowance granted to the spender.
    pub gateway_allowance: u128,
}

/// Current Ethereum fee market data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeData {
    /// Legacy gas price, if the node reports one.
    pub gas_price: Option<u128>,
}

/// Operating mode of a bridge component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatingMode {
    /// Accepting messages.
    #[default]
    Normal,

    /// The gateway refuses new outbound messages.
    RejectingOutboundMessages,

    /// Halted by governance.
    Halted,
}

impl OperatingMode {
    /// Whether the component is operating normally.
    pub const fn is_normal(&self) -> bool {
        matches!(self, OperatingMode::Normal)
    }
}
