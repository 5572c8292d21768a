//! This crate contains general types and pure functions that need to be shared across multiple
//! crates: the location model, account classification, the registry snapshot, fee value objects
//! and correlation identifiers.
//!
//! It is not intended to be used directly by end users, but rather to be used as a dependency by
//! other crates. Also note that this crate lies at the bottom of the crate-hierarchy in this
//! workspace i.e., it does not depend on any other crate in this workspace.

pub mod address;
pub mod asset;
pub mod constants;
pub mod errors;
pub mod fee;
pub mod location;
pub mod registry;
pub mod topic;
