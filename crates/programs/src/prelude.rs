//! Re-exports of the types most builders' callers need.

pub use crate::{
    errors::{BuilderError, BuilderResult},
    inbound::{InboundAsset, InboundMessage},
    instruction::{AssetAmount, AssetFilter, Instruction, Weight, WeightLimit},
    inter_network::{InterNetworkAsset, InterNetworkTransfer},
    legacy::LegacyInbound,
    program::{Program, XcmVersion},
    register::Registration,
    sample::SampleAsset,
    to_parachain::{AssetReserve, DestinationReceipt, Forward, RemoteFee},
};
