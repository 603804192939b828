//! Account, action and permission names.
//!
//! Names are restricted-alphabet identifiers (`.`, `1`-`5`, `a`-`z`) packed
//! into a `u64` with the chain's base-32 bit-packing rule. Only the packing
//! direction is needed; decoding back to text is never required.

use crate::error::{WaxError, WaxResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Longest name the chain accepts.
pub const MAX_NAME_LENGTH: usize = 13;

/// Stateless name packer.
///
/// [`NameCodec::encode`] is total: characters outside the alphabet map to 0
/// and characters beyond the thirteenth are ignored. Use [`Name::new`] when
/// the input should be validated first.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameCodec;

impl NameCodec {
    /// Packs `name` into its 64-bit integer form. The empty name packs to 0.
    pub fn encode(name: &str) -> u64 {
        let bytes = name.as_bytes();
        let mut value = 0u64;

        for position in 0..MAX_NAME_LENGTH {
            let c = bytes.get(position).map_or(0, |b| symbol(*b));
            if position < 12 {
                value |= (c & 0x1f) << (64 - 5 * (position + 1));
            } else {
                value |= c & 0x0f;
            }
        }

        value
    }
}

fn symbol(c: u8) -> u64 {
    match c {
        b'a'..=b'z' => u64::from(c - b'a') + 6,
        b'1'..=b'5' => u64::from(c - b'1') + 1,
        _ => 0,
    }
}

/// A validated chain name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    /// Validates and wraps `name`.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::InvalidName`] if the name is longer than 13
    /// characters, contains characters outside `.12345a-z`, or has a 13th
    /// character outside `.12345a-j`.
    pub fn new(name: impl Into<String>) -> WaxResult<Self> {
        let name = name.into();
        validate(&name)?;
        Ok(Self(name))
    }

    /// The `active` permission.
    pub fn active() -> Self {
        Self("active".to_string())
    }

    /// Returns the packed integer form.
    pub fn value(&self) -> u64 {
        NameCodec::encode(&self.0)
    }

    /// Returns the packed integer form as little-endian bytes.
    pub fn to_le_bytes(&self) -> [u8; 8] {
        self.value().to_le_bytes()
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the empty name.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn validate(name: &str) -> WaxResult<()> {
    if name.len() > MAX_NAME_LENGTH {
        return Err(WaxError::InvalidName(format!(
            "'{name}' is longer than {MAX_NAME_LENGTH} characters"
        )));
    }

    for (i, c) in name.bytes().enumerate() {
        let allowed = if i == 12 {
            matches!(c, b'.' | b'1'..=b'5' | b'a'..=b'j')
        } else {
            matches!(c, b'.' | b'1'..=b'5' | b'a'..=b'z')
        };
        if !allowed {
            return Err(WaxError::InvalidName(format!(
                "'{name}' contains invalid character at position {i}"
            )));
        }
    }

    Ok(())
}

impl FromStr for Name {
    type Err = WaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for Name {
    type Error = WaxError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for Name {
    type Error = WaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}
