//! This crate plans transfers from Ethereum into the Polkadot side of the bridge.
//!
//! A plan runs in three steps, each a pure function of its inputs plus live chain reads:
//!
//! 1. price the transfer into a [`DeliveryFee`](snowbridge_planner_primitives::fee::DeliveryFee),
//! 2. build the [`Transfer`](transfer::Transfer) holding the unsigned gateway call,
//! 3. validate the transfer by dry-running it at every hop it crosses.
//!
//! The topology of a transfer (asset kind and destination) selects the strategy that runs each
//! step; see [`topology`]. Inter-network transfers, transfers starting on a second-layer chain and
//! token registrations have their own flows in [`inter_network`], [`l2`] and [`registration`].

pub mod context;
pub mod errors;
pub mod fees;
pub mod inter_network;
pub mod l2;
pub mod options;
pub mod prelude;
pub mod registration;
pub mod status;
#[cfg(test)]
mod testing;
pub mod topology;
pub mod transfer;
pub mod validation;

pub use topology::{create_transfer, get_delivery_fee, validate_transfer};
