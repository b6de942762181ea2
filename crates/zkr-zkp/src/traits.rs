//! # Proof Oracle Trait
//!
//! The external ZK verifier as the modules see it: a synchronous,
//! trusted oracle that says whether a proof is valid and, if so, which
//! identifier the proven identity maps to within the proof's scope.
//!
//! ## Security Invariant
//!
//! The oracle is the trust boundary. The modules never inspect proof bytes
//! themselves; they act only on the returned [`Verification`]. The trait
//! requires `Send + Sync` so a module holding an oracle can be shared
//! behind a lock.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use zkr_core::{BoundData, Identifier, Proof, ProofPurpose};

/// Error raised by the oracle itself, as opposed to a proof it rejects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// The proof could not be parsed by the verifier.
    #[error("malformed proof: {0}")]
    MalformedProof(String),
    /// The proof was produced against an unknown verification key.
    #[error("key mismatch: {0}")]
    KeyMismatch(String),
    /// The verifier could not be reached or aborted.
    #[error("verifier unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a verification call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    /// Whether the proof verified.
    pub valid: bool,
    /// Identifier derived from the proven identity and the proof's scope.
    /// Meaningless when `valid` is false.
    pub unique_identifier: Identifier,
    /// Values the proof committed to.
    #[serde(default)]
    pub bound_data: BoundData,
}

impl Verification {
    /// A successful verification with no bound data.
    pub fn accepted(identifier: Identifier) -> Self {
        Self {
            valid: true,
            unique_identifier: identifier,
            bound_data: BoundData::default(),
        }
    }

    /// A rejected proof.
    pub fn rejected() -> Self {
        Self {
            valid: false,
            unique_identifier: Identifier::ZERO,
            bound_data: BoundData::default(),
        }
    }

    /// Attach bound data.
    pub fn with_bound_data(mut self, bound_data: BoundData) -> Self {
        self.bound_data = bound_data;
        self
    }

    /// The identifier, if the proof verified.
    pub fn identifier(&self) -> Option<Identifier> {
        self.valid.then_some(self.unique_identifier)
    }
}

/// A trusted proof verifier.
///
/// Implementations must be deterministic: the same proof always yields the
/// same identifier when valid.
pub trait ProofOracle: Send + Sync {
    /// Verify `proof` for `purpose`.
    ///
    /// `Ok` with `valid == false` means the oracle rejected the proof.
    /// `Err` means the oracle could not give an answer; callers treat both
    /// the same way.
    fn verify(&self, proof: &Proof, purpose: ProofPurpose) -> Result<Verification, VerifyError>;
}

impl<T: ProofOracle + ?Sized> ProofOracle for &T {
    fn verify(&self, proof: &Proof, purpose: ProofPurpose) -> Result<Verification, VerifyError> {
        (**self).verify(proof, purpose)
    }
}

impl<T: ProofOracle + ?Sized> ProofOracle for Box<T> {
    fn verify(&self, proof: &Proof, purpose: ProofPurpose) -> Result<Verification, VerifyError> {
        (**self).verify(proof, purpose)
    }
}

impl<T: ProofOracle + ?Sized> ProofOracle for Arc<T> {
    fn verify(&self, proof: &Proof, purpose: ProofPurpose) -> Result<Verification, VerifyError> {
        (**self).verify(proof, purpose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_only_when_valid() {
        let id = Identifier::new([3; 32]);
        assert_eq!(Verification::accepted(id).identifier(), Some(id));
        assert_eq!(Verification::rejected().identifier(), None);
    }

    #[test]
    fn verification_serde_defaults_bound_data() {
        let json = serde_json::json!({
            "valid": true,
            "uniqueIdentifier": Identifier::new([3; 32]).to_hex(),
        });
        let v: Verification = serde_json::from_value(json).unwrap();
        assert!(v.valid);
        assert_eq!(v.bound_data, BoundData::default());
    }
}
