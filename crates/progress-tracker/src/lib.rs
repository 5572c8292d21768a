//! # `snowbridge-progress`
//!
//! Follows a submitted transfer across the bridge. The submission receipt is parsed into a
//! [`MessageReceipt`](receipt::MessageReceipt), and [`track`](tracker::track) turns it into a
//! finite stream of milestones, one per hop, in hop order.

pub mod config;
pub mod errors;
pub mod milestone;
pub mod receipt;
pub mod tracker;

pub use tracker::{track, MilestoneStream, TrackedTransfer, TrackerChains};
