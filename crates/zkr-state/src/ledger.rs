//! # Used-Proof Ledger
//!
//! Insert-only set of proof fingerprints. Once a fingerprint is recorded
//! it stays recorded for the life of the owning module.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use zkr_core::ProofFingerprint;

/// Fingerprints of consumed proofs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsedProofSet {
    used: HashSet<ProofFingerprint>,
}

impl UsedProofSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, fingerprint: &ProofFingerprint) -> bool {
        self.used.contains(fingerprint)
    }

    /// Record a fingerprint. Returns `false` if it was already present.
    pub fn insert(&mut self, fingerprint: ProofFingerprint) -> bool {
        self.used.insert(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let mut set = UsedProofSet::new();
        let fp = ProofFingerprint::of(b"proof");
        assert!(!set.contains(&fp));
        assert!(set.insert(fp));
        assert!(!set.insert(fp));
        assert!(set.contains(&fp));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn serializes_as_hex_list() {
        let mut set = UsedProofSet::new();
        set.insert(ProofFingerprint::of(b""));
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                "0xe3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
            ])
        );
    }
}
