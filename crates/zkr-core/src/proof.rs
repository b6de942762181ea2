//! # Proof Parameters
//!
//! The opaque proof bundle a caller submits, the purpose tag a module
//! attaches when it asks the oracle to verify it, and the data a proof can
//! commit to ("bound data").
//!
//! ## Bound data
//!
//! Proof requests may bind arbitrary values into the proof. The front-end
//! binds the Safe address into registration proofs, and the new owner plus
//! the ABI encoding of `(previous_owner, old_owner, new_owner, account)`
//! into recovery proofs. [`SwapBinding`] reproduces that encoding so the
//! recovery module can check a proof was produced for exactly the swap it
//! is about to perform.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalBytes;
use crate::digest::{sha256_digest, ContentDigest, ProofFingerprint};
use crate::error::CanonicalizationError;
use crate::hex;
use crate::identity::{Address, Bytes32};

/// Parameters of a single proof submission.
///
/// Immutable once submitted. Modules never retain a `Proof` beyond the
/// verification call; only its [`ProofFingerprint`] may be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Proof {
    /// Hash of the verification key the proof was produced against.
    pub vkey_hash: Bytes32,
    /// Raw proof bytes.
    #[serde(with = "hex::serde_bytes")]
    pub proof: Vec<u8>,
    /// Ordered public-input words.
    pub public_inputs: Vec<Bytes32>,
    /// Committed-inputs blob.
    #[serde(with = "hex::serde_bytes")]
    pub committed_inputs: Vec<u8>,
    /// Sizes of the groups within `committed_inputs`.
    pub committed_input_counts: Vec<u64>,
    /// How long the proof stays valid after generation.
    #[serde(rename = "validityPeriodInSeconds")]
    pub validity_period_secs: u64,
    /// Domain of the requesting service.
    pub domain: String,
    /// Scope of the request; identifiers are unique per scope.
    pub scope: String,
    /// Whether the proof came from a mock/dev passport.
    pub dev_mode: bool,
}

impl Proof {
    /// Fingerprint of the raw proof bytes.
    pub fn fingerprint(&self) -> ProofFingerprint {
        ProofFingerprint::of(&self.proof)
    }
}

/// Why a module is asking the oracle to verify a proof.
///
/// Carried with every verification request so a registration proof is
/// never silently accepted as a recovery proof or vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofPurpose {
    /// Binding a guardian identity to a Safe.
    Registration,
    /// Authorizing an owner swap on a registered Safe.
    Recovery,
    /// Standing in for a signature in the validator.
    Signature,
}

impl ProofPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Recovery => "recovery",
            Self::Signature => "signature",
        }
    }
}

impl fmt::Display for ProofPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values a proof committed to, as disclosed by the oracle after
/// verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundData {
    /// Address bound as `user_address`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_address: Option<Address>,
    /// Bytes bound as `custom_data`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "optional_hex_bytes"
    )]
    pub custom_data: Option<Vec<u8>>,
}

impl BoundData {
    /// Bound data of a recovery proof produced for `binding`.
    pub fn for_swap(binding: &SwapBinding) -> Self {
        Self {
            user_address: Some(binding.new_owner),
            custom_data: Some(binding.encode()),
        }
    }

    /// Bound data of a registration proof produced for `account`.
    pub fn for_registration(account: Address) -> Self {
        Self {
            user_address: Some(account),
            custom_data: None,
        }
    }

    /// Whether this bound data commits to exactly `binding`.
    ///
    /// `custom_data` must decode to `binding`. A bound `user_address`, when
    /// present, must be the new owner.
    pub fn matches_swap(&self, binding: &SwapBinding) -> bool {
        let custom_ok = self
            .custom_data
            .as_deref()
            .and_then(SwapBinding::decode)
            .is_some_and(|bound| bound == *binding);
        let user_ok = self
            .user_address
            .map_or(true, |user| user == binding.new_owner);
        custom_ok && user_ok
    }
}

/// The exact owner swap a recovery proof authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapBinding {
    pub previous_owner: Address,
    pub old_owner: Address,
    pub new_owner: Address,
    pub account: Address,
}

impl SwapBinding {
    /// Encoded length: four left-padded 32-byte address words.
    pub const ENCODED_LEN: usize = 128;

    /// ABI encoding of `(previous_owner, old_owner, new_owner, account)`.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::ENCODED_LEN);
        for addr in [
            self.previous_owner,
            self.old_owner,
            self.new_owner,
            self.account,
        ] {
            out.extend_from_slice(&[0u8; 12]);
            out.extend_from_slice(addr.as_bytes());
        }
        out
    }

    /// SHA-256 of the canonical JSON form, for logs and tooling.
    pub fn digest(&self) -> Result<ContentDigest, CanonicalizationError> {
        CanonicalBytes::new(self).map(|c| sha256_digest(&c))
    }

    /// Inverse of [`SwapBinding::encode`]. Returns `None` unless `bytes`
    /// is exactly four words with zero padding.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::ENCODED_LEN {
            return None;
        }
        let mut words = bytes.chunks_exact(32).map(|word| {
            if word[..12].iter().any(|b| *b != 0) {
                return None;
            }
            let mut addr = [0u8; 20];
            addr.copy_from_slice(&word[12..]);
            Some(Address(addr))
        });
        Some(Self {
            previous_owner: words.next()??,
            old_owner: words.next()??,
            new_owner: words.next()??,
            account: words.next()??,
        })
    }
}

mod optional_hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(b) => serializer.serialize_str(&crate::hex::encode_prefixed(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| crate::hex::decode(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding() -> SwapBinding {
        SwapBinding {
            previous_owner: Address::SENTINEL,
            old_owner: Address::from_low_u64(0xa1),
            new_owner: Address::from_low_u64(0xb2),
            account: Address::from_low_u64(0xc3),
        }
    }

    fn sample_proof() -> Proof {
        Proof {
            vkey_hash: Bytes32::new([7u8; 32]),
            proof: vec![0x12, 0x34],
            public_inputs: vec![Bytes32::new([1u8; 32])],
            committed_inputs: vec![0x56, 0x78],
            committed_input_counts: vec![1, 2, 3],
            validity_period_secs: 30 * 24 * 3600,
            domain: "test.domain".to_string(),
            scope: "test_scope".to_string(),
            dev_mode: true,
        }
    }

    #[test]
    fn swap_binding_encoding_is_four_padded_words() {
        let encoded = binding().encode();
        assert_eq!(encoded.len(), SwapBinding::ENCODED_LEN);
        assert_eq!(encoded[31], 0x01);
        assert!(encoded[..12].iter().all(|b| *b == 0));
        assert_eq!(SwapBinding::decode(&encoded), Some(binding()));
    }

    #[test]
    fn swap_binding_digest_depends_on_every_field() {
        let a = binding().digest().unwrap();
        let mut other = binding();
        other.previous_owner = other.old_owner;
        assert_eq!(a, binding().digest().unwrap());
        assert_ne!(a, other.digest().unwrap());
    }

    #[test]
    fn swap_binding_decode_rejects_dirty_padding() {
        let mut encoded = binding().encode();
        encoded[0] = 1;
        assert_eq!(SwapBinding::decode(&encoded), None);
        assert_eq!(SwapBinding::decode(&encoded[..64]), None);
    }

    #[test]
    fn bound_data_matches_only_its_swap() {
        let bound = BoundData::for_swap(&binding());
        assert!(bound.matches_swap(&binding()));

        let mut other = binding();
        other.new_owner = Address::from_low_u64(0xdd);
        assert!(!bound.matches_swap(&other));
    }

    #[test]
    fn bound_data_without_custom_data_never_matches() {
        let bound = BoundData::for_registration(Address::from_low_u64(0xc3));
        assert!(!bound.matches_swap(&binding()));
    }

    #[test]
    fn bound_user_address_must_be_new_owner() {
        let mut bound = BoundData::for_swap(&binding());
        bound.user_address = Some(Address::from_low_u64(0xee));
        assert!(!bound.matches_swap(&binding()));
        bound.user_address = None;
        assert!(bound.matches_swap(&binding()));
    }

    #[test]
    fn proof_json_uses_wire_field_names() {
        let json = serde_json::to_value(sample_proof()).unwrap();
        assert!(json.get("vkeyHash").is_some());
        assert!(json.get("committedInputCounts").is_some());
        assert!(json.get("validityPeriodInSeconds").is_some());
        assert_eq!(json["proof"], "0x1234");
    }

    #[test]
    fn fingerprint_ignores_non_proof_fields() {
        let a = sample_proof();
        let mut b = sample_proof();
        b.scope = "other".to_string();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn purpose_display() {
        assert_eq!(ProofPurpose::Registration.to_string(), "registration");
        assert_eq!(ProofPurpose::Recovery.to_string(), "recovery");
        assert_eq!(ProofPurpose::Signature.to_string(), "signature");
    }
}
