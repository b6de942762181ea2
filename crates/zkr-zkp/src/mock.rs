//! # Mock Proof Oracle
//!
//! A scriptable, transparent stand-in for the ZK verifier. It performs no
//! cryptographic verification; it answers from a script:
//!
//! 1. A per-proof result, keyed by the proof's fingerprint, if one was set
//!    with [`MockProofOracle::script`].
//! 2. Otherwise the default result set with
//!    [`MockProofOracle::set_verification_result`].
//! 3. In deriving mode, with no default set, a deterministic identifier
//!    `SHA256(JCS({domain, scope, committedInputs}))` for any proof with
//!    non-empty proof bytes.
//!
//! The oracle records every call so tests can assert that a check ran (or
//! did not run) before the oracle was consulted. State sits behind a
//! `parking_lot::Mutex`, so a test can keep an `Arc` to the oracle and
//! re-script it after handing it to a module.
//!
//! ## Security Warning
//!
//! **NOT A VERIFIER.** Never wire this into anything that protects real
//! accounts.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::Serialize;

use zkr_core::{
    hex, sha256_digest, BoundData, CanonicalBytes, Identifier, Proof, ProofFingerprint,
    ProofPurpose,
};

use crate::traits::{ProofOracle, Verification, VerifyError};

/// One recorded call into the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleCall {
    pub fingerprint: ProofFingerprint,
    pub purpose: ProofPurpose,
}

#[derive(Debug, Default)]
struct MockState {
    deriving: bool,
    default: Option<Verification>,
    per_proof: HashMap<ProofFingerprint, Verification>,
    failure: Option<VerifyError>,
    calls: Vec<OracleCall>,
}

/// Scriptable proof oracle for tests and simulation.
#[derive(Debug, Default)]
pub struct MockProofOracle {
    state: Mutex<MockState>,
}

impl MockProofOracle {
    /// An oracle that rejects every proof until scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// An oracle that derives identifiers deterministically from proof
    /// contents when no result is scripted.
    pub fn deriving() -> Self {
        let oracle = Self::default();
        oracle.state.lock().deriving = true;
        oracle
    }

    /// Set the default result returned for proofs without a per-proof
    /// script. Clears any default bound data.
    pub fn set_verification_result(&self, valid: bool, identifier: Identifier) {
        let result = if valid {
            Verification::accepted(identifier)
        } else {
            Verification {
                valid: false,
                unique_identifier: identifier,
                bound_data: BoundData::default(),
            }
        };
        self.state.lock().default = Some(result);
    }

    /// Set the bound data reported with the default result.
    pub fn set_bound_data(&self, bound_data: BoundData) {
        let mut state = self.state.lock();
        let default = state.default.get_or_insert_with(Verification::rejected);
        default.bound_data = bound_data;
    }

    /// Script the result for one specific proof.
    pub fn script(&self, proof: &Proof, result: Verification) {
        self.state
            .lock()
            .per_proof
            .insert(proof.fingerprint(), result);
    }

    /// Make every subsequent call fail with `error`.
    pub fn fail_with(&self, error: VerifyError) {
        self.state.lock().failure = Some(error);
    }

    /// Stop failing.
    pub fn clear_failure(&self) {
        self.state.lock().failure = None;
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<OracleCall> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// The identifier deriving mode assigns to `proof`.
    ///
    /// Depends on the domain, scope and committed inputs only, so two
    /// proofs of the same identity in the same scope share an identifier.
    pub fn derive_identifier(proof: &Proof) -> Result<Identifier, VerifyError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct IdentityClaim<'a> {
            domain: &'a str,
            scope: &'a str,
            committed_inputs: String,
        }

        let claim = IdentityClaim {
            domain: &proof.domain,
            scope: &proof.scope,
            committed_inputs: hex::encode_prefixed(&proof.committed_inputs),
        };
        let canonical = CanonicalBytes::new(&claim)
            .map_err(|e| VerifyError::MalformedProof(format!("failed to canonicalize claim: {e}")))?;
        Ok(Identifier::new(*sha256_digest(&canonical).as_bytes()))
    }
}

impl ProofOracle for MockProofOracle {
    fn verify(&self, proof: &Proof, purpose: ProofPurpose) -> Result<Verification, VerifyError> {
        let fingerprint = proof.fingerprint();
        let mut state = self.state.lock();
        state.calls.push(OracleCall {
            fingerprint,
            purpose,
        });

        if let Some(err) = &state.failure {
            return Err(err.clone());
        }
        if let Some(result) = state.per_proof.get(&fingerprint) {
            return Ok(result.clone());
        }
        if let Some(result) = &state.default {
            return Ok(result.clone());
        }
        if state.deriving && !proof.proof.is_empty() {
            drop(state);
            let identifier = Self::derive_identifier(proof)?;
            tracing::trace!(%identifier, %purpose, "mock oracle derived identifier");
            return Ok(Verification::accepted(identifier));
        }
        Ok(Verification::rejected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkr_core::{Address, Bytes32, SwapBinding};

    fn proof(raw: &[u8], scope: &str) -> Proof {
        Proof {
            vkey_hash: Bytes32::default(),
            proof: raw.to_vec(),
            public_inputs: vec![],
            committed_inputs: vec![0x01, 0x02],
            committed_input_counts: vec![2],
            validity_period_secs: 3600,
            domain: "zkpassport.id".to_string(),
            scope: scope.to_string(),
            dev_mode: true,
        }
    }

    #[test]
    fn unscripted_oracle_rejects() {
        let oracle = MockProofOracle::new();
        let v = oracle.verify(&proof(b"p", "s"), ProofPurpose::Registration).unwrap();
        assert!(!v.valid);
    }

    #[test]
    fn default_result_applies_to_all_proofs() {
        let oracle = MockProofOracle::new();
        let id = Identifier::new([9; 32]);
        oracle.set_verification_result(true, id);
        let v = oracle.verify(&proof(b"a", "s"), ProofPurpose::Recovery).unwrap();
        assert_eq!(v.identifier(), Some(id));
        let v = oracle.verify(&proof(b"b", "s"), ProofPurpose::Recovery).unwrap();
        assert_eq!(v.identifier(), Some(id));
    }

    #[test]
    fn per_proof_script_overrides_default() {
        let oracle = MockProofOracle::new();
        oracle.set_verification_result(true, Identifier::new([1; 32]));
        let p2 = proof(b"p2", "s");
        oracle.script(&p2, Verification::accepted(Identifier::new([2; 32])));
        let v = oracle.verify(&p2, ProofPurpose::Recovery).unwrap();
        assert_eq!(v.unique_identifier, Identifier::new([2; 32]));
    }

    #[test]
    fn bound_data_rides_on_default() {
        let oracle = MockProofOracle::new();
        oracle.set_verification_result(true, Identifier::new([1; 32]));
        let binding = SwapBinding {
            previous_owner: Address::SENTINEL,
            old_owner: Address::from_low_u64(2),
            new_owner: Address::from_low_u64(3),
            account: Address::from_low_u64(4),
        };
        oracle.set_bound_data(BoundData::for_swap(&binding));
        let v = oracle.verify(&proof(b"p", "s"), ProofPurpose::Recovery).unwrap();
        assert!(v.bound_data.matches_swap(&binding));
    }

    #[test]
    fn failure_is_reported_and_recorded() {
        let oracle = MockProofOracle::new();
        oracle.fail_with(VerifyError::Unavailable("down".to_string()));
        assert!(oracle.verify(&proof(b"p", "s"), ProofPurpose::Signature).is_err());
        assert_eq!(oracle.call_count(), 1);
        assert_eq!(oracle.calls()[0].purpose, ProofPurpose::Signature);

        oracle.clear_failure();
        assert!(oracle.verify(&proof(b"p", "s"), ProofPurpose::Signature).is_ok());
    }

    #[test]
    fn deriving_mode_is_deterministic_per_scope() {
        let oracle = MockProofOracle::deriving();
        let a = oracle.verify(&proof(b"first", "recovery"), ProofPurpose::Recovery).unwrap();
        let b = oracle.verify(&proof(b"second", "recovery"), ProofPurpose::Recovery).unwrap();
        let c = oracle.verify(&proof(b"third", "other"), ProofPurpose::Recovery).unwrap();
        assert!(a.valid && b.valid && c.valid);
        assert_eq!(a.unique_identifier, b.unique_identifier);
        assert_ne!(a.unique_identifier, c.unique_identifier);
    }

    #[test]
    fn deriving_mode_rejects_empty_proof_bytes() {
        let oracle = MockProofOracle::deriving();
        let v = oracle.verify(&proof(b"", "s"), ProofPurpose::Recovery).unwrap();
        assert!(!v.valid);
    }
}
