//! # Hex Encoding
//!
//! `0x`-prefixed lowercase hex is the textual form of every byte value in
//! the stack (addresses, identifiers, proof blobs). Decoding accepts either
//! case and an optional `0x` prefix, and never panics on malformed input:
//! encoded proofs arrive from untrusted callers through a read path that
//! must not fail outright.

use crate::error::ZkrError;

/// Render bytes as `0x`-prefixed lowercase hex.
pub fn encode_prefixed(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Decode hex with an optional `0x` prefix.
///
/// # Errors
///
/// Returns `ZkrError::Parse` on odd length or non-hex characters.
pub fn decode(s: &str) -> Result<Vec<u8>, ZkrError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.len() % 2 != 0 {
        return Err(ZkrError::Parse(format!(
            "hex string has odd length {}",
            digits.len()
        )));
    }
    if !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
        return Err(ZkrError::Parse("hex string contains non-hex characters".to_string()));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| ZkrError::Parse(format!("invalid hex byte: {e}")))
        })
        .collect()
}

/// Decode hex into a fixed-width array.
///
/// # Errors
///
/// Returns `ZkrError::Parse` if the decoded length is not `N`.
pub fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], ZkrError> {
    let bytes = decode(s)?;
    if bytes.len() != N {
        return Err(ZkrError::Parse(format!(
            "expected {N} bytes, got {}",
            bytes.len()
        )));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Serde helper for hex-encoding `Vec<u8>` fields.
pub mod serde_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::encode_prefixed(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_prefixed_lowercase() {
        assert_eq!(encode_prefixed(&[0xAB, 0x01]), "0xab01");
        assert_eq!(encode_prefixed(&[]), "0x");
    }

    #[test]
    fn decode_accepts_prefix_and_mixed_case() {
        assert_eq!(decode("0xAbCd").unwrap(), vec![0xab, 0xcd]);
        assert_eq!(decode("abcd").unwrap(), vec![0xab, 0xcd]);
        assert_eq!(decode("0x").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decode_rejects_odd_length() {
        assert!(decode("0xabc").is_err());
    }

    #[test]
    fn decode_rejects_non_hex_without_panicking() {
        assert!(decode("0xzz").is_err());
        // Multi-byte UTF-8 must not cause a slicing panic.
        assert!(decode("0xé1").is_err());
    }

    #[test]
    fn decode_fixed_checks_width() {
        assert!(decode_fixed::<2>("0x0102").is_ok());
        assert!(decode_fixed::<3>("0x0102").is_err());
    }
}
