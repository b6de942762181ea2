//! # Identity Newtypes
//!
//! Fixed-width newtypes for every value that crosses a module boundary:
//! account and principal addresses, oracle-derived identifiers, and
//! 32-byte words (message digests, vkey hashes, public inputs).
//!
//! ## Security Invariant
//!
//! Type-level distinction prevents passing a message hash where a guardian
//! identifier is expected, or an owner address where an account is
//! expected. All three types reserve the all-zero value to mean "unset" or
//! "null", and expose it as `ZERO`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ZkrError;
use crate::hex;

macro_rules! fixed_hex_type {
    ($name:ident, $len:expr) => {
        impl $name {
            /// The all-zero value.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Wrap raw bytes.
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Access the raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Whether this is the all-zero value.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// Render as `0x`-prefixed lowercase hex.
            pub fn to_hex(&self) -> String {
                hex::encode_prefixed(&self.0)
            }

            /// Parse from hex, with or without `0x`.
            pub fn from_hex(s: &str) -> Result<Self, ZkrError> {
                hex::decode_fixed::<$len>(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = ZkrError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// A 20-byte principal address: a Safe, an owner key, a module, or an
/// administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

/// A 256-bit identifier derived by the proof oracle from a verified
/// identity and proof scope. `Identifier::ZERO` means "no guardian".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identifier(pub [u8; 32]);

/// A generic 32-byte word: message digests, vkey hashes, public inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Bytes32(pub [u8; 32]);

fixed_hex_type!(Address, 20);
fixed_hex_type!(Identifier, 32);
fixed_hex_type!(Bytes32, 32);

impl Address {
    /// Sentinel marking the head of a Safe's owner list (`0x…01`).
    ///
    /// Passed as `previous_owner` when the owner being replaced is the
    /// first entry.
    pub const SENTINEL: Self = {
        let mut bytes = [0u8; 20];
        bytes[19] = 1;
        Self(bytes)
    };

    /// Whether this is the owner-list sentinel.
    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    /// Build an address whose last byte is `n`. Handy for fixtures.
    pub const fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        let be = n.to_be_bytes();
        let mut i = 0;
        while i < 8 {
            bytes[12 + i] = be[i];
            i += 1;
        }
        Self(bytes)
    }
}
