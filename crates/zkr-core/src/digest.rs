//! # Digests: Proof Fingerprints and Content Digests
//!
//! Two kinds of 32-byte SHA-256 digests circulate in the stack:
//!
//! - [`ProofFingerprint`]: the hash of a proof's raw bytes. The replay
//!   ledgers store these and nothing else from a submitted proof.
//! - [`ContentDigest`]: the hash of structured data, computed only from
//!   [`CanonicalBytes`] so every digest of structured data flows through
//!   canonicalization.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::ZkrError;
use crate::hex;

/// SHA-256 of a proof's raw bytes.
///
/// Two submissions carrying the same raw proof bytes have the same
/// fingerprint regardless of the other proof parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProofFingerprint(#[serde(with = "fixed32")] [u8; 32]);

impl ProofFingerprint {
    /// Fingerprint raw proof bytes.
    pub fn of(raw_proof: &[u8]) -> Self {
        Self(sha256(raw_proof))
    }

    /// Wrap a precomputed fingerprint.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode_prefixed(&self.0)
    }

    /// Parse from hex, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, ZkrError> {
        hex::decode_fixed::<32>(s).map(Self)
    }
}

impl fmt::Display for ProofFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A SHA-256 digest of canonicalized structured data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(#[serde(with = "fixed32")] [u8; 32]);

impl ContentDigest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode_prefixed(&self.0)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
///
/// Accepts only `&CanonicalBytes`, so no code path can digest structured
/// data without canonicalizing it first.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    ContentDigest(sha256(data.as_bytes()))
}

fn sha256(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    bytes
}

mod fixed32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&crate::hex::encode_prefixed(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        crate::hex::decode_fixed::<32>(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_known_vector() {
        // SHA256 of the empty input.
        assert_eq!(
            ProofFingerprint::of(b"").to_hex(),
            "0xe3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn fingerprint_depends_only_on_raw_bytes() {
        assert_eq!(
            ProofFingerprint::of(&[0x12, 0x34]),
            ProofFingerprint::of(&[0x12, 0x34])
        );
        assert_ne!(
            ProofFingerprint::of(&[0x12, 0x34]),
            ProofFingerprint::of(&[0x12, 0x35])
        );
    }

    #[test]
    fn fingerprint_hex_roundtrip() {
        let fp = ProofFingerprint::of(b"proof");
        assert_eq!(ProofFingerprint::from_hex(&fp.to_hex()).unwrap(), fp);
    }

    #[test]
    fn content_digest_display_is_tagged() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        let digest = sha256_digest(&cb);
        // SHA256("{}")
        assert_eq!(
            digest.to_hex(),
            "0x44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
        assert!(digest.to_string().starts_with("sha256:0x"));
    }
}
