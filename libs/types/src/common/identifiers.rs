//! Account identifiers
//!
//! `Address` names a ledger account: a liquidity provider, a trader, a pool or
//! a token contract. It is a plain 20-byte value with a `0x`-prefixed hex
//! representation.

use crate::common::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 20-byte account address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Self = Self([0u8; 20]);

    /// Address with every byte set to `byte`; handy for fixtures
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    /// Parse a hex string with or without the `0x` prefix
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        let hex_clean = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(hex_clean).map_err(|e| ValidationError::InvalidHex {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        let array: [u8; 20] = bytes.try_into().map_err(|b: Vec<u8>| {
            ValidationError::InvalidLength {
                expected: 20,
                actual: b.len(),
            }
        })?;
        Ok(Self(array))
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let address = Address::from_hex("0x2791bca1f2de4661ed88a30c99a7a9449aa84174").unwrap();
        assert_eq!(
            address.to_string(),
            "0x2791bca1f2de4661ed88a30c99a7a9449aa84174"
        );
        assert_eq!("2791bca1f2de4661ed88a30c99a7a9449aa84174".parse::<Address>().unwrap(), address);
    }

    #[test]
    fn test_invalid_length() {
        assert_eq!(
            Address::from_hex("0x1234"),
            Err(ValidationError::InvalidLength {
                expected: 20,
                actual: 2
            })
        );
    }

    #[test]
    fn test_invalid_hex_is_validation_error() {
        let err = "0xzz91bca1f2de4661ed88a30c99a7a9449aa84174"
            .parse::<Address>()
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidHex { ref input, .. } if input.starts_with("0xzz")));
    }
}
