//! Re-exports of all the parameter types.

pub use super::{
    fees::FeeParams, inter_network::InterNetworkFeeParams, planner::PlannerParams,
    tracker::TrackerParams, validation::ValidationParams,
};
