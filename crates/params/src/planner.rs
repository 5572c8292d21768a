//! The full parameter set handed to a planning call.

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// All tunables of the planner, loadable from a single TOML document with one table per concern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerParams {
    /// Fee padding and second-layer pricing.
    #[serde(default)]
    pub fees: FeeParams,

    /// Validator thresholds.
    #[serde(default)]
    pub validation: ValidationParams,

    /// Progress tracker scan windows.
    #[serde(default)]
    pub tracker: TrackerParams,

    /// Inter-network export fee fallbacks.
    #[serde(default)]
    pub inter_network: InterNetworkFeeParams,
}
