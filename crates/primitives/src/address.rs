//! Account and contract addresses on both sides of the bridge, and the classification of a
//! free-form beneficiary string into one of the two supported account-key widths.

use std::{fmt, str::FromStr};

use arbitrary::Arbitrary;
use blake2::{Blake2b512, Digest};
use serde::{Deserialize, Serialize};

use crate::{
    constants::SS58_CHECKSUM_PREFIX,
    errors::{PrimitiveError, PrimitiveResult},
    location::{Junction, Location},
};

/// Implements `0x`-prefixed hex display, parsing and string serde for a fixed-size byte newtype.
macro_rules! impl_hex_bytes {
    ($name:ident, $len:expr) => {
        impl $name {
            /// Creates the value from its raw bytes.
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Returns the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Returns the lowercase `0x`-prefixed hex encoding.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = $crate::errors::PrimitiveError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let invalid = || $crate::errors::PrimitiveError::InvalidHex {
                    expected: $len,
                    input: s.to_string(),
                };
                let stripped = s.strip_prefix("0x").unwrap_or(s);
                let mut bytes = [0u8; $len];
                hex::decode_to_slice(stripped, &mut bytes).map_err(|_| invalid())?;
                Ok(Self(bytes))
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use impl_hex_bytes;

/// A 20-byte account or contract address on an Ethereum-style chain.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Arbitrary)]
pub struct EthAddress([u8; 20]);

impl_hex_bytes!(EthAddress, 20);

impl EthAddress {
    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Whether this is the all-zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EthAddress({self})")
    }
}

/// A 32-byte Substrate account identifier.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Arbitrary)]
pub struct AccountId32([u8; 32]);

impl_hex_bytes!(AccountId32, 32);

impl fmt::Debug for AccountId32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId32({self})")
    }
}

/// An account key in one of the two supported widths.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Arbitrary,
)]
pub enum AccountKey {
    /// A 32-byte Substrate account.
    Id32(AccountId32),

    /// A 20-byte Ethereum-style account.
    Key20(EthAddress),
}

impl AccountKey {
    /// Returns the raw key bytes.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            AccountKey::Id32(id) => id.as_bytes(),
            AccountKey::Key20(key) => key.as_bytes(),
        }
    }

    /// Returns the lowercase `0x`-prefixed hex encoding.
    pub fn to_hex(&self) -> String {
        match self {
            AccountKey::Id32(id) => id.to_hex(),
            AccountKey::Key20(key) => key.to_hex(),
        }
    }

    /// The gateway's multi-address discriminant for this key width.
    pub const fn kind(&self) -> MultiAddressKind {
        match self {
            AccountKey::Id32(_) => MultiAddressKind::AccountId32,
            AccountKey::Key20(_) => MultiAddressKind::AccountKey20,
        }
    }

    /// The junction addressing this account on the local chain.
    pub const fn to_junction(&self) -> Junction {
        match self {
            AccountKey::Id32(id) => Junction::AccountId32 {
                network: None,
                id: *id,
            },
            AccountKey::Key20(key) => Junction::AccountKey20 {
                network: None,
                key: *key,
            },
        }
    }

    /// The location of this account relative to the chain it lives on.
    pub fn to_location(&self) -> Location {
        Location::new(0, vec![self.to_junction()])
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Discriminant the gateway contract uses to tell account-key widths apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MultiAddressKind {
    /// A 32-byte account.
    AccountId32 = 1,

    /// A 20-byte account.
    AccountKey20 = 2,
}

/// A beneficiary after classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    /// The classified key.
    pub key: AccountKey,

    /// The key's lowercase hex encoding, which is what gets hashed into correlation identifiers.
    pub hex: String,
}

impl Beneficiary {
    /// The gateway's multi-address discriminant for this beneficiary.
    pub const fn kind(&self) -> MultiAddressKind {
        self.key.kind()
    }

    /// The asset-claimer location derived from this beneficiary.
    pub fn claimer_location(&self) -> Location {
        self.key.to_location()
    }
}

impl From<AccountKey> for Beneficiary {
    fn from(key: AccountKey) -> Self {
        Self {
            hex: key.to_hex(),
            key,
        }
    }
}

/// Classifies a beneficiary string into one of the supported account-key widths.
///
/// `0x`-prefixed strings of 20 or 32 bytes are taken verbatim; anything else is decoded as SS58.
pub fn classify_beneficiary(beneficiary: &str) -> PrimitiveResult<Beneficiary> {
    let invalid = || PrimitiveError::InvalidAddress(beneficiary.to_string());

    let key = if let Some(stripped) = beneficiary.strip_prefix("0x") {
        match stripped.len() {
            40 => AccountKey::Key20(beneficiary.parse().map_err(|_| invalid())?),
            64 => AccountKey::Id32(beneficiary.parse().map_err(|_| invalid())?),
            _ => return Err(invalid()),
        }
    } else {
        AccountKey::Id32(decode_ss58(beneficiary)?)
    };

    Ok(key.into())
}

/// Decodes an SS58 address into its 32-byte account, verifying the checksum.
///
/// Both the single-byte and the two-byte network prefix forms are accepted.
pub fn decode_ss58(address: &str) -> PrimitiveResult<AccountId32> {
    let invalid = || PrimitiveError::InvalidAddress(address.to_string());

    let data = bs58::decode(address).into_vec().map_err(|_| invalid())?;
    let prefix_len = match data.first().copied() {
        Some(0..=63) => 1,
        Some(64..=127) => 2,
        _ => return Err(invalid()),
    };
    if data.len() != prefix_len + 32 + 2 {
        return Err(invalid());
    }

    let (body, checksum) = data.split_at(prefix_len + 32);
    let hash = Blake2b512::new()
        .chain_update(SS58_CHECKSUM_PREFIX)
        .chain_update(body)
        .finalize();
    if hash[..2] != checksum[..] {
        return Err(PrimitiveError::BadChecksum(address.to_string()));
    }

    let mut id = [0u8; 32];
    id.copy_from_slice(&body[prefix_len..]);
    Ok(AccountId32::new(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Alice's well-known dev account in generic substrate format.
    const ALICE_SS58: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
    const ALICE_HEX: &str = "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";

    #[test]
    fn test_classify_20_byte_hex() {
        let b = classify_beneficiary("0x00000000000000000000000000000000000000aa").unwrap();

        assert_eq!(b.kind(), MultiAddressKind::AccountKey20);
        assert_eq!(b.hex, "0x00000000000000000000000000000000000000aa");
    }

    #[test]
    fn test_classify_32_byte_hex() {
        let b = classify_beneficiary(ALICE_HEX).unwrap();

        assert_eq!(b.kind(), MultiAddressKind::AccountId32);
        assert_eq!(b.hex, ALICE_HEX);
    }

    #[test]
    fn test_classify_ss58() {
        let b = classify_beneficiary(ALICE_SS58).unwrap();

        assert_eq!(b.kind(), MultiAddressKind::AccountId32);
        assert_eq!(b.hex, ALICE_HEX);
    }

    #[test]
    fn test_classify_rejects_bad_inputs() {
        assert!(matches!(
            classify_beneficiary("0x1234"),
            Err(PrimitiveError::InvalidAddress(_))
        ));
        assert!(matches!(
            classify_beneficiary("0xzz000000000000000000000000000000000000aa"),
            Err(PrimitiveError::InvalidAddress(_))
        ));
        assert!(classify_beneficiary("not an address").is_err());

        // Flip the last character so the checksum no longer matches.
        let mut tampered = ALICE_SS58.to_string();
        tampered.pop();
        tampered.push('Z');
        assert!(classify_beneficiary(&tampered).is_err());
    }

    #[test]
    fn test_claimer_location_is_local_account() {
        let b = classify_beneficiary(ALICE_HEX).unwrap();
        let claimer = b.claimer_location();

        assert_eq!(claimer.parents, 0);
        assert_eq!(claimer.interior.len(), 1);
        assert!(matches!(claimer.interior[0], Junction::AccountId32 { network: None, .. }));
    }

    #[test]
    fn test_hex_serde() {
        let addr: EthAddress = "0x00000000000000000000000000000000000000aa".parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();

        assert_eq!(json, "\"0x00000000000000000000000000000000000000aa\"");
        assert_eq!(serde_json::from_str::<EthAddress>(&json).unwrap(), addr);
        assert!(serde_json::from_str::<EthAddress>("\"0x00\"").is_err());
    }
}
