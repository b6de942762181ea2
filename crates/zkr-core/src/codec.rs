//! # Proof Wire Codec
//!
//! Transcodes a [`Proof`] to and from the byte string carried in a
//! signature field, so the proof can travel through any interface typed as
//! "bytes". The encoding is the JCS-canonical JSON of the proof, which
//! makes encoding deterministic: equal proofs always encode to equal bytes.
//!
//! Decoding is strict. Empty input, invalid UTF-8, unknown or missing
//! fields, and malformed hex all fail with a [`CodecError`]; decoding never
//! panics, whatever bytes it is handed.

use crate::canonical::CanonicalBytes;
use crate::error::CodecError;
use crate::proof::Proof;

/// Encode proof parameters into their wire form.
///
/// # Errors
///
/// `CodecError::Encoding` if canonicalization fails. A `Proof` holds only
/// strings, integers, booleans and hex strings, so this does not happen in
/// practice.
pub fn encode_proof_params(proof: &Proof) -> Result<Vec<u8>, CodecError> {
    CanonicalBytes::new(proof)
        .map(CanonicalBytes::into_vec)
        .map_err(|e| CodecError::Encoding(e.to_string()))
}

/// Decode proof parameters from their wire form.
///
/// # Errors
///
/// `CodecError::Empty` on empty input, `CodecError::Malformed` on anything
/// that is not a complete proof encoding.
pub fn decode_proof_params(encoded: &[u8]) -> Result<Proof, CodecError> {
    if encoded.is_empty() {
        return Err(CodecError::Empty);
    }
    serde_json::from_slice(encoded).map_err(|e| CodecError::Malformed(e.to_string()))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Arbitrary bytes never panic the decoder.
        #[test]
        fn decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            let _ = decode_proof_params(&bytes);
        }

        /// Any proof survives the wire.
        #[test]
        fn any_proof_survives_encoding(
            raw in prop::collection::vec(any::<u8>(), 0..64),
            counts in prop::collection::vec(0u64..1_000_000, 0..4),
            validity in 0u64..=u64::from(u32::MAX),
            domain in "[a-z.]{0,20}",
            scope in "[a-z_]{0,20}",
            dev_mode in any::<bool>(),
        ) {
            let proof = Proof {
                vkey_hash: crate::identity::Bytes32::default(),
                proof: raw.clone(),
                public_inputs: vec![],
                committed_inputs: raw,
                committed_input_counts: counts,
                validity_period_secs: validity,
                domain,
                scope,
                dev_mode,
            };
            let encoded = encode_proof_params(&proof).unwrap();
            prop_assert_eq!(decode_proof_params(&encoded).unwrap(), proof);
        }
    }
}
