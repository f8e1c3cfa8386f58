// Copyright (c) 2024 Botho Foundation

//! Account addresses.
//!
//! An address is the 20-byte script hash of an account. Anything that is not
//! exactly 20 bytes is rejected at the boundary, so the engine never sees a
//! malformed address. The textual form is 40 lowercase hex characters, with
//! an optional `0x` prefix accepted on input.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of an address in bytes
pub const ADDRESS_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must be {ADDRESS_LEN} bytes, got {0}")]
    InvalidLength(usize),

    #[error("address is not valid hex: {0}")]
    InvalidHex(String),
}

/// A 20-byte account address
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = AddressError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(bytes))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::try_from(bytes.as_slice())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_bytes() {
        let addr = Address::try_from(&[7u8; 20][..]).unwrap();
        assert_eq!(addr.as_bytes(), &[7u8; 20]);

        assert_eq!(
            Address::try_from(&[7u8; 19][..]),
            Err(AddressError::InvalidLength(19))
        );
        assert_eq!(
            Address::try_from(&[7u8; 21][..]),
            Err(AddressError::InvalidLength(21))
        );
    }

    #[test]
    fn test_address_hex_parsing() {
        let addr: Address = "0x23ba2703c53263e8d6e522dc32203339dcd8eee9".parse().unwrap();
        assert_eq!(addr.to_hex(), "23ba2703c53263e8d6e522dc32203339dcd8eee9");

        let same: Address = "23BA2703C53263E8D6E522DC32203339DCD8EEE9".parse().unwrap();
        assert_eq!(addr, same);

        assert!(matches!(
            "zz".parse::<Address>(),
            Err(AddressError::InvalidHex(_))
        ));
        assert_eq!("abcd".parse::<Address>(), Err(AddressError::InvalidLength(2)));
    }

    #[test]
    fn test_address_serde_as_hex() {
        let addr = Address::new([0xab; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(20)));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
