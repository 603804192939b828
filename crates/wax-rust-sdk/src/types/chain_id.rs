//! Chain identifier.
//!
//! A 32-byte value that binds every signature to one network. It is mixed
//! into the signing digest, so a transaction signed for testnet can never be
//! replayed on mainnet.

use crate::error::{WaxError, WaxResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of a chain id in bytes.
pub const CHAIN_ID_LENGTH: usize = 32;

const MAINNET: [u8; CHAIN_ID_LENGTH] = [
    0x10, 0x64, 0x48, 0x7b, 0x3c, 0xd1, 0xa8, 0x97, 0xce, 0x03, 0xae, 0x5b, 0x6a, 0x86, 0x56, 0x51,
    0x74, 0x7e, 0x2e, 0x15, 0x20, 0x90, 0xf9, 0x9c, 0x1d, 0x19, 0xd4, 0x4e, 0x01, 0xae, 0xa5, 0xa4,
];
const TESTNET: [u8; CHAIN_ID_LENGTH] = [
    0xf1, 0x6b, 0x18, 0x33, 0xc7, 0x47, 0xc4, 0x36, 0x82, 0xf4, 0x38, 0x6f, 0xca, 0x9c, 0xbb, 0x32,
    0x79, 0x29, 0x33, 0x4a, 0x76, 0x27, 0x55, 0xeb, 0xec, 0x17, 0xf6, 0xf2, 0x3c, 0x9b, 0x8a, 0x12,
];

/// A 32-byte chain identifier, rendered as 64 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId([u8; CHAIN_ID_LENGTH]);

impl ChainId {
    /// Wraps raw bytes.
    pub const fn new(bytes: [u8; CHAIN_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// WAX mainnet.
    pub const fn mainnet() -> Self {
        Self(MAINNET)
    }

    /// WAX testnet.
    pub const fn testnet() -> Self {
        Self(TESTNET)
    }

    /// Parses a chain id from 64 hex characters.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not exactly 64 hex characters.
    pub fn from_hex(hex_str: &str) -> WaxResult<Self> {
        if hex_str.len() != CHAIN_ID_LENGTH * 2 {
            return Err(WaxError::Config(format!(
                "invalid chain id length: expected {} hex characters, got {}",
                CHAIN_ID_LENGTH * 2,
                hex_str.len()
            )));
        }
        let mut bytes = [0u8; CHAIN_ID_LENGTH];
        hex::decode_to_slice(hex_str, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; CHAIN_ID_LENGTH] {
        &self.0
    }

    /// Returns the lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for ChainId {
    type Err = WaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({})", self.to_hex())
    }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
