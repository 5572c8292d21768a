//! The part of every program entering AssetHub from Ethereum that the bridge hub prepends on
//! behalf of the sender.
//!
//! The sender only chooses the body of the message. The prefix is implied by the gateway call:
//! it establishes the Ethereum origin, mints the fee and the transferred assets, registers the
//! claimer and narrows the origin to the sending account. The planner rebuilds it to price and
//! dry-run the exact program AssetHub will execute.

use snowbridge_planner_primitives::{
    address::EthAddress,
    constants::{ETHER_TOKEN_ADDRESS, INBOUND_QUEUE_V2_PALLET_INDEX},
    location::{bridge_location, erc20_location, ethereum_network, Junction, Location},
};

use crate::{
    errors::{BuilderError, BuilderResult},
    instruction::{AssetAmount, Hint, Instruction},
    program::{Program, XcmVersion},
};

/// The asset a message carries into AssetHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundAsset {
    /// Ether or an Ethereum-native token, reserve-backed by the gateway.
    Erc20 {
        /// The token contract, or the zero address for ether.
        token: EthAddress,

        /// Amount transferred.
        amount: u128,
    },

    /// A Polkadot-native token released from the bridge's holdings.
    Pna {
        /// The token's location as seen from AssetHub.
        location: Location,

        /// Amount transferred.
        amount: u128,
    },
}

/// Everything the implied prefix of an inbound message depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// EIP-155 id of the source chain.
    pub chain_id: u64,

    /// The Ethereum account that called the gateway.
    pub origin: EthAddress,

    /// Location allowed to claim assets trapped on AssetHub.
    pub claimer: Location,

    /// Ether paid for execution on AssetHub.
    pub asset_hub_fee: u128,

    /// Ether attached to the message on top of the fees.
    pub ether_value: u128,

    /// The transferred asset.
    pub asset: InboundAsset,
}

impl InboundMessage {
    /// Number of distinct assets in holding once the prefix has run.
    pub fn held_asset_count(&self) -> u32 {
        match &self.asset {
            InboundAsset::Erc20 { token, .. } if *token == ETHER_TOKEN_ADDRESS => 1,
            _ => 2,
        }
    }

    /// The instructions the bridge hub prepends.
    pub fn prefix(&self) -> Vec<Instruction> {
        let ether = bridge_location(self.chain_id);
        let fee = AssetAmount::new(ether.clone(), self.asset_hub_fee);

        let mut prefix = vec![
            Instruction::DescendOrigin(vec![Junction::PalletInstance(
                INBOUND_QUEUE_V2_PALLET_INDEX,
            )]),
            Instruction::UniversalOrigin(ethereum_network(self.chain_id)),
            Instruction::ReserveAssetDeposited(vec![fee.clone()]),
            Instruction::SetHints(vec![Hint::AssetClaimer {
                location: self.claimer.clone(),
            }]),
            Instruction::PayFees { asset: fee },
        ];

        match &self.asset {
            InboundAsset::Erc20 { token, amount } if *token == ETHER_TOKEN_ADDRESS => {
                push_reserve_deposit(
                    &mut prefix,
                    vec![AssetAmount::new(
                        ether,
                        amount.saturating_add(self.ether_value),
                    )],
                );
            }
            InboundAsset::Erc20 { token, amount } => {
                push_reserve_deposit(
                    &mut prefix,
                    vec![
                        AssetAmount::new(ether, self.ether_value),
                        AssetAmount::new(erc20_location(self.chain_id, token), *amount),
                    ],
                );
            }
            InboundAsset::Pna { location, amount } => {
                push_reserve_deposit(
                    &mut prefix,
                    vec![AssetAmount::new(ether, self.ether_value)],
                );
                prefix.push(Instruction::WithdrawAsset(vec![AssetAmount::new(
                    location.clone(),
                    *amount,
                )]));
            }
        }

        prefix.push(Instruction::DescendOrigin(vec![Junction::AccountKey20 {
            network: None,
            key: self.origin,
        }]));

        prefix
    }

    /// Joins the prefix with the sender-chosen `body` into the program AssetHub executes.
    pub fn program(&self, body: Program) -> BuilderResult<Program> {
        if body.version() != XcmVersion::V5 {
            return Err(BuilderError::VersionMismatch {
                prefix: XcmVersion::V5,
                body: body.version(),
            });
        }

        body.with_prefix(self.prefix())
    }
}

/// Pushes a `ReserveAssetDeposited` of the non-zero entries of `assets`, if any.
fn push_reserve_deposit(prefix: &mut Vec<Instruction>, assets: Vec<AssetAmount>) {
    let assets: Vec<_> = assets.into_iter().filter(|a| a.amount > 0).collect();
    if !assets.is_empty() {
        prefix.push(Instruction::ReserveAssetDeposited(assets));
    }
}
