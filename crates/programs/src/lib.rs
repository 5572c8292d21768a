//! This crate contains the instruction algebra for cross-chain message programs and the builders
//! that assemble a program for every supported transfer topology.
//!
//! Builders are pure: the same inputs always produce the same program. Encoding a program for the
//! wire is left to the chain client that submits or simulates it.

pub mod errors;
pub mod inbound;
pub mod instruction;
pub mod inter_network;
pub mod legacy;
pub mod prelude;
pub mod program;
pub mod register;
pub mod sample;
pub mod to_asset_hub;
pub mod to_parachain;
