//! This crate defines the read-only surface the planner needs from the chains it plans across:
//! parachain runtime APIs, the Ethereum gateway, the bridge hub and second-layer adaptors.
//!
//! Nothing in this crate talks to a network. Implementations live with the caller, who owns the
//! chain connections; the wire encoding of programs and contract calls is theirs as well.

pub mod bridge_hub;
pub mod errors;
pub mod events;
pub mod gateway;
pub mod l2;
pub mod parachain;
pub mod tx;
pub mod types;
