//! Core ledger types shared across the crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use solana_pubkey::{ParsePubkeyError, Pubkey};

/// A Solana public key that serializes as a base58 string.
///
/// Caller-facing values (trees, belonging results, metadata) use this
/// wrapper so their JSON form carries the familiar base58 spelling instead
/// of a byte array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(Pubkey);

impl Address {
    /// Wraps a public key.
    #[must_use]
    pub const fn new(pubkey: Pubkey) -> Self {
        Self(pubkey)
    }

    /// Returns the wrapped public key.
    #[must_use]
    pub const fn pubkey(&self) -> &Pubkey {
        &self.0
    }
}

impl From<Pubkey> for Address {
    fn from(pubkey: Pubkey) -> Self {
        Self(pubkey)
    }
}

impl From<Address> for Pubkey {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Address {
    type Err = ParsePubkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pubkey::from_str(s).map(Self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Largest holding account for a mint, as reported by the ledger.
#[derive(Debug, Clone, Copy)]
pub struct TokenHolder {
    /// The token account holding the largest balance.
    pub address: Pubkey,
    /// Balance in base units.
    pub amount: u64,
    /// Decimal places of the mint.
    pub decimals: u8,
}

impl TokenHolder {
    /// Whether this holding behaves as a single non-fungible unit.
    #[must_use]
    pub const fn is_nft_unit(&self) -> bool {
        self.amount == 1 && self.decimals == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_serializes_as_base58() {
        let pubkey = Pubkey::new_unique();
        let address = Address::new(pubkey);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{pubkey}\""));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }

    #[test]
    fn test_nft_unit_classification() {
        let holder = |amount, decimals| TokenHolder {
            address: Pubkey::new_unique(),
            amount,
            decimals,
        };
        assert!(holder(1, 0).is_nft_unit());
        assert!(!holder(2, 0).is_nft_unit());
        assert!(!holder(1, 6).is_nft_unit());
        assert!(!holder(0, 0).is_nft_unit());
    }
}
