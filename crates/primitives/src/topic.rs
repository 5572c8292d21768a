//! Correlation identifiers and derived accounts.
//!
//! A transfer is traced across hops by a 32-byte topic embedded in every program it produces and
//! echoed in the events each hop emits. The topic is derived from the transfer's content, so no
//! session store is needed to correlate hops.

use std::{fmt, str::FromStr};

use blake2::{digest::consts::U32, Blake2b, Digest};

use crate::{
    address::{impl_hex_bytes, AccountId32, AccountKey, EthAddress},
    constants::{BRIDGE_OWNER_PREFIX, FORWARD_ID_PREFIX},
};

type Blake2b256 = Blake2b<U32>;

/// Hashes `parts` with 256-bit blake2b.
pub fn blake2_256<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// A 32-byte correlation identifier.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId([u8; 32]);

impl_hex_bytes!(MessageId, 32);

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({self})")
    }
}

/// Everything a transfer's correlation identifier is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageIdInputs<'a> {
    /// Destination parachain.
    pub destination_para_id: u32,

    /// The account submitting the transfer.
    pub source_account: &'a AccountKey,

    /// The token being transferred, as addressed on the source chain.
    pub token: &'a EthAddress,

    /// The receiving account.
    pub beneficiary: &'a AccountKey,

    /// Amount transferred.
    pub amount: u128,

    /// The source account's transaction count at planning time.
    pub nonce: u64,
}

/// Derives the correlation identifier of a transfer.
///
/// Every field is encoded with a fixed width or a length prefix so that distinct inputs never
/// produce the same preimage.
pub fn build_message_id(inputs: &MessageIdInputs<'_>) -> MessageId {
    let source = inputs.source_account.as_slice();
    let beneficiary = inputs.beneficiary.as_slice();

    let dest = inputs.destination_para_id.to_le_bytes();
    let amount = inputs.amount.to_le_bytes();
    let nonce = inputs.nonce.to_le_bytes();
    let preimage: [&[u8]; 8] = [
        &dest,
        &[source.len() as u8],
        source,
        inputs.token.as_bytes(),
        &[beneficiary.len() as u8],
        beneficiary,
        &amount,
        &nonce,
    ];

    MessageId(blake2_256(preimage))
}

/// Derives the topic a bridge hub assigns to a message it forwards on behalf of `id`.
pub fn forwarded_topic_id(id: &MessageId) -> MessageId {
    let preimage: [&[u8]; 2] = [FORWARD_ID_PREFIX, id.as_bytes()];
    MessageId(blake2_256(preimage))
}

/// Relationship between a parachain and the chain holding its sovereign account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SovereignKind {
    /// The account of a parachain on one of its siblings.
    Sibling,

    /// The account of a parachain on its relay chain.
    Child,
}

impl SovereignKind {
    const fn tag(self) -> &'static [u8; 4] {
        match self {
            SovereignKind::Sibling => b"sibl",
            SovereignKind::Child => b"para",
        }
    }
}

/// Derives the sovereign account of a parachain.
pub fn para_id_to_sovereign_account(kind: SovereignKind, para_id: u32) -> AccountId32 {
    let mut account = [0u8; 32];
    account[..4].copy_from_slice(kind.tag());
    account[4..8].copy_from_slice(&para_id.to_le_bytes());
    AccountId32::new(account)
}

/// Derives the account that owns every asset bridged from the given Ethereum chain on AssetHub.
pub fn bridge_owner_account(chain_id: u64) -> AccountId32 {
    let chain_id = chain_id.to_le_bytes();
    let preimage: [&[u8]; 2] = [BRIDGE_OWNER_PREFIX, &chain_id];
    AccountId32::new(blake2_256(preimage))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn inputs<'a>(
        source: &'a AccountKey,
        token: &'a EthAddress,
        beneficiary: &'a AccountKey,
    ) -> MessageIdInputs<'a> {
        MessageIdInputs {
            destination_para_id: 1000,
            source_account: source,
            token,
            beneficiary,
            amount: 1_000_000,
            nonce: 7,
        }
    }

    #[test]
    fn test_message_id_is_deterministic() {
        let source = AccountKey::Key20(EthAddress::new([1; 20]));
        let token = EthAddress::new([2; 20]);
        let beneficiary = AccountKey::Id32(AccountId32::new([3; 32]));

        let a = build_message_id(&inputs(&source, &token, &beneficiary));
        let b = build_message_id(&inputs(&source, &token, &beneficiary));

        assert_eq!(a, b);
    }

    #[test]
    fn test_sibling_sovereign_account() {
        let account = para_id_to_sovereign_account(SovereignKind::Sibling, 1000);

        assert_eq!(
            account.to_hex(),
            "0x7369626ce8030000000000000000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn test_child_sovereign_account() {
        let account = para_id_to_sovereign_account(SovereignKind::Child, 2030);

        assert_eq!(&account.as_bytes()[..4], b"para");
        assert_eq!(&account.as_bytes()[4..8], &2030u32.to_le_bytes());
    }

    #[test]
    fn test_forwarded_topic_differs() {
        let id = MessageId::new([9; 32]);

        assert_ne!(forwarded_topic_id(&id), id);
        assert_eq!(forwarded_topic_id(&id), forwarded_topic_id(&id));
    }

    #[test]
    fn test_bridge_owner_depends_on_chain() {
        assert_ne!(bridge_owner_account(1), bridge_owner_account(11155111));
    }

    proptest! {
        #[test]
        fn message_id_changes_with_any_field(
            dest in any::<u32>(),
            source_raw in any::<[u8; 20]>(),
            token_raw in any::<[u8; 20]>(),
            beneficiary_raw in any::<[u8; 32]>(),
            amount in any::<u128>(),
            nonce in any::<u64>(),
            field in 0usize..6,
        ) {
            let source = AccountKey::Key20(EthAddress::new(source_raw));
            let token = EthAddress::new(token_raw);
            let beneficiary = AccountKey::Id32(AccountId32::new(beneficiary_raw));
            let base = MessageIdInputs {
                destination_para_id: dest,
                source_account: &source,
                token: &token,
                beneficiary: &beneficiary,
                amount,
                nonce,
            };

            let mut bumped_source = source_raw;
            bumped_source[0] = bumped_source[0].wrapping_add(1);
            let changed_source = AccountKey::Key20(EthAddress::new(bumped_source));

            let mut bumped_token = token_raw;
            bumped_token[19] = bumped_token[19].wrapping_add(1);
            let changed_token = EthAddress::new(bumped_token);

            // A 20-byte key can never equal the 32-byte base beneficiary.
            let changed_beneficiary = AccountKey::Key20(EthAddress::new([0; 20]));

            let changed = match field {
                0 => MessageIdInputs { destination_para_id: dest.wrapping_add(1), ..base },
                1 => MessageIdInputs { source_account: &changed_source, ..base },
                2 => MessageIdInputs { token: &changed_token, ..base },
                3 => MessageIdInputs { beneficiary: &changed_beneficiary, ..base },
                4 => MessageIdInputs { amount: amount.wrapping_add(1), ..base },
                _ => MessageIdInputs { nonce: nonce.wrapping_add(1), ..base },
            };

            prop_assert_ne!(build_message_id(&base), build_message_id(&changed));
        }
    }
}
