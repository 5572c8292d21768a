//! Generators for arbitrary values: a buffer-backed [`Arbitrary`] driver and proptest strategies
//! for the planner's primitive types.

use arbitrary::{Arbitrary, Unstructured};
use proptest::prelude::*;
use rand_core::{OsRng, TryCryptoRng};
use snowbridge_planner_primitives::address::{AccountId32, AccountKey, EthAddress};

/// Bytes of entropy backing each generated value.
const ARB_GEN_LEN: usize = 1024;

/// Produces [`Arbitrary`] values from a buffer refilled with fresh entropy on every call.
#[derive(Debug)]
pub struct ArbitraryGenerator {
    buf: Vec<u8>,
}

impl Default for ArbitraryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ArbitraryGenerator {
    /// Creates a generator with the default buffer size.
    pub fn new() -> Self {
        Self::new_with_size(ARB_GEN_LEN)
    }

    /// Creates a generator backed by `size` bytes, for types that need more entropy.
    pub fn new_with_size(size: usize) -> Self {
        Self {
            buf: vec![0u8; size],
        }
    }

    /// Generates a `T` from the operating system's RNG.
    pub fn generate<'a, T>(&'a mut self) -> T
    where
        T: Arbitrary<'a> + Clone,
    {
        self.generate_with_rng::<T, OsRng>(&mut OsRng)
    }

    /// Generates a `T` from `rng`.
    pub fn generate_with_rng<'a, T, R>(&'a mut self, rng: &mut R) -> T
    where
        T: Arbitrary<'a> + Clone,
        R: TryCryptoRng,
    {
        rng.try_fill_bytes(&mut self.buf)
            .expect("must be able to generate random bytes");
        let mut u = Unstructured::new(&self.buf);
        T::arbitrary(&mut u).expect("must be able to generate an arbitrary instance")
    }
}

/// Generates an arbitrary Ethereum address.
pub fn arb_eth_address() -> impl Strategy<Value = EthAddress> {
    any::<[u8; 20]>().prop_map(EthAddress::new)
}

/// Generates an arbitrary account key of either width.
pub fn arb_account_key() -> impl Strategy<Value = AccountKey> {
    prop_oneof![
        any::<[u8; 32]>().prop_map(|bytes| AccountKey::Id32(AccountId32::new(bytes))),
        arb_eth_address().prop_map(AccountKey::Key20),
    ]
}

/// Generates an amount that leaves room for fees to be added without overflowing.
pub fn arb_amount() -> impl Strategy<Value = u128> {
    1u128..=u128::from(u64::MAX)
}

/// Generates a parachain id outside the system range.
pub fn arb_para_id() -> impl Strategy<Value = u32> {
    2_000u32..10_000
}
