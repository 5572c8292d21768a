//! This crate contains the tunable parameters that dictate how conservatively the planner prices,
//! validates and tracks a transfer.
//!
//! None of these values are consensus-critical: they only widen or narrow safety margins. Every
//! parameter set can be loaded from a TOML file and falls back to the defaults in [`default`].

pub mod default;
pub mod fees;
pub mod inter_network;
pub mod planner;
pub mod prelude;
pub mod tracker;
pub mod validation;
