//! Asset and account identity.
//!
//! Every monitored asset is addressed by a 20-byte [`Address`] and keyed in
//! the limiter table by its [`AssetId`], a deterministic 64-bit digest of the
//! address. The chain's native currency is represented by a reserved
//! placeholder address so it shares the identifier keyspace with real token
//! addresses without colliding.

use ahash::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

/// A 20-byte account, contract, or asset address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Reserved placeholder for the native currency (`0xee…ee`).
    ///
    /// Lets the native asset flow through the same accounting path as token
    /// assets; no real contract is ever deployed at this address.
    pub const NATIVE: Address = Address([0xee; 20]);

    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create an address from raw bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// Convenience constructor for tests and examples: the byte `b` repeated.
    pub const fn repeating(b: u8) -> Self {
        Address([b; 20])
    }

    /// Raw bytes of the address.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the native-currency placeholder.
    pub fn is_native(&self) -> bool {
        *self == Self::NATIVE
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

// Fixed seeds so identifiers are stable across processes and restarts.
const ID_SEEDS: (u64, u64, u64, u64) = (
    0x666c_6f77_6775_6172, // "flowguar"
    0x645f_6173_7365_7469, // "d_asseti"
    0x9e37_79b9_7f4a_7c15,
    0x2545_f491_4f6c_dd1d,
);

/// Deterministic identifier keying an asset's limiter record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetId(u64);

impl AssetId {
    /// Compute the identifier for an asset address.
    pub fn of(address: Address) -> Self {
        let state = RandomState::with_seeds(ID_SEEDS.0, ID_SEEDS.1, ID_SEEDS.2, ID_SEEDS.3);
        let mut hasher = state.build_hasher();
        address.0.hash(&mut hasher);
        AssetId(hasher.finish())
    }

    /// Identifier of the native currency placeholder.
    pub fn native() -> Self {
        Self::of(Address::NATIVE)
    }

    /// Raw digest value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_is_deterministic() {
        let addr = Address::repeating(0x42);
        assert_eq!(AssetId::of(addr), AssetId::of(addr));
    }

    #[test]
    fn distinct_addresses_get_distinct_identifiers() {
        let a = AssetId::of(Address::repeating(0x01));
        let b = AssetId::of(Address::repeating(0x02));
        assert_ne!(a, b);
    }

    #[test]
    fn native_placeholder_shares_keyspace_without_colliding() {
        let native = AssetId::native();
        assert_eq!(native, AssetId::of(Address::NATIVE));
        assert_ne!(native, AssetId::of(Address::ZERO));
        assert_ne!(native, AssetId::of(Address::repeating(0x42)));
    }

    #[test]
    fn address_display_is_hex() {
        let addr = Address::new([
            0xde, 0xad, 0xbe, 0xef, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01,
        ]);
        assert_eq!(
            addr.to_string(),
            "0xdeadbeef00000000000000000000000000000001"
        );
    }
}
