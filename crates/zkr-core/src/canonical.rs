//! # Canonical Serialization: JCS Byte Production
//!
//! `CanonicalBytes` is the sole construction path for bytes that are hashed
//! or sent over the proof wire encoding. The inner buffer is private; the
//! only constructor runs float rejection followed by RFC 8785 (JCS)
//! serialization via `serde_jcs`: sorted keys, compact separators, a
//! deterministic byte sequence for equal values.
//!
//! Two encodings of the same proof therefore always produce the same bytes,
//! and two swap bindings with the same fields always produce the same
//! digest.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - Numeric values are integers; floats are rejected.
/// - Object keys are sorted, separators are compact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// `FloatRejected` if the value contains a non-integer number,
    /// `SerializationFailed` if JSON serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the underlying buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Object(map) => map.values().try_for_each(reject_floats),
        Value::Array(arr) => arr.iter().try_for_each(reject_floats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_sorted_and_compact() {
        let data = serde_json::json!({"scope": "s", "domain": "d", "dev_mode": false});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(
            std::str::from_utf8(cb.as_bytes()).unwrap(),
            r#"{"dev_mode":false,"domain":"d","scope":"s"}"#
        );
    }

    #[test]
    fn nested_float_rejected() {
        let data = serde_json::json!({"a": [{"b": 0.5}]});
        match CanonicalBytes::new(&data) {
            Err(CanonicalizationError::FloatRejected(f)) => assert_eq!(f, 0.5),
            other => panic!("expected FloatRejected, got: {other:?}"),
        }
    }

    #[test]
    fn large_unsigned_integers_accepted() {
        let data = serde_json::json!({"validity": u64::MAX});
        assert!(CanonicalBytes::new(&data).is_ok());
    }

    #[test]
    fn deterministic_for_equal_values() {
        let a = CanonicalBytes::new(&serde_json::json!({"x": 1, "y": [1, 2]})).unwrap();
        let b = CanonicalBytes::new(&serde_json::json!({"y": [1, 2], "x": 1})).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
        assert_eq!(a.len(), a.as_bytes().len());
    }
}
