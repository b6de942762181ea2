//! # Signature Validator
//!
//! Treats a verified identity proof as a signature, behind an
//! EIP-1271-style interface. The "signature" is the wire encoding of a
//! [`Proof`]; it is accepted when the oracle verifies it and the derived
//! identifier is on the administrator's allow-list.
//!
//! ## Read path and write path
//!
//! [`SignatureValidator::is_valid_signature`] and
//! [`SignatureValidator::is_valid_signature_now`] never fail: every failure
//! mode collapses into [`SignatureVerdict::Invalid`].
//! [`SignatureValidator::validate_signature`] performs the same checks but
//! fails with a specific [`ModuleError`], and consumes the proof when
//! replay protection is on.
//!
//! The message hash is accepted but not bound to the proof. The proof's
//! own domain and scope are its binding context; the zero hash is legal.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use zkr_core::{
    codec, Address, Bytes32, EventLog, EventRecord, Identifier, ModuleError, ModuleEvent, Proof,
    ProofFingerprint, ProofPurpose,
};
use zkr_zkp::ProofOracle;

use crate::config::ValidatorConfig;
use crate::ledger::UsedProofSet;

/// Returned for an accepted signature (`isValidSignature.selector`).
pub const MAGIC_VALUE: [u8; 4] = [0x16, 0x26, 0xba, 0x7e];

/// Returned for a rejected signature.
pub const INVALID_SIGNATURE: [u8; 4] = [0xff, 0xff, 0xff, 0xff];

/// Outcome of a read-path signature check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureVerdict {
    Magic,
    Invalid,
}

impl SignatureVerdict {
    /// The four-byte value an EIP-1271 caller compares against.
    pub fn as_bytes(&self) -> [u8; 4] {
        match self {
            Self::Magic => MAGIC_VALUE,
            Self::Invalid => INVALID_SIGNATURE,
        }
    }

    pub fn is_magic(&self) -> bool {
        matches!(self, Self::Magic)
    }
}

impl fmt::Display for SignatureVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&zkr_core::hex::encode_prefixed(&self.as_bytes()))
    }
}

/// Proof-backed signature validator with an identifier allow-list.
#[derive(Debug)]
pub struct SignatureValidator<O> {
    address: Address,
    owner: Address,
    oracle: O,
    expected: ValidatorConfig,
    replay_protection: bool,
    authorized: HashSet<Identifier>,
    used_proofs: UsedProofSet,
    events: EventLog,
}

impl<O: ProofOracle> SignatureValidator<O> {
    /// Create a validator at `address`, administered by `owner`.
    pub fn new(
        oracle: O,
        address: Address,
        owner: Address,
        config: ValidatorConfig,
    ) -> Result<Self, ModuleError> {
        if address.is_zero() {
            return Err(ModuleError::ZeroAddress { field: "validator" });
        }
        if owner.is_zero() {
            return Err(ModuleError::ZeroAddress { field: "owner" });
        }
        Ok(Self {
            address,
            owner,
            oracle,
            replay_protection: config.replay_protection,
            expected: config,
            authorized: HashSet::new(),
            used_proofs: UsedProofSet::new(),
            events: EventLog::new(),
        })
    }

    // ─── Administration ─────────────────────────────────────────────

    /// Add `identifier` to the allow-list. Emits even if already present.
    /// The zero identifier means "unset" and is refused with
    /// `ZeroAddress { field: "identifier" }`.
    pub fn authorize_signer(
        &mut self,
        sender: Address,
        identifier: Identifier,
    ) -> Result<(), ModuleError> {
        self.only_owner(sender)?;
        if identifier.is_zero() {
            return Err(ModuleError::ZeroAddress { field: "identifier" });
        }
        self.authorized.insert(identifier);
        self.events.emit(ModuleEvent::SignerAuthorized { identifier });
        tracing::info!(%identifier, "signer authorized");
        Ok(())
    }

    /// Remove `identifier` from the allow-list. Emits even if absent.
    pub fn revoke_signer(
        &mut self,
        sender: Address,
        identifier: Identifier,
    ) -> Result<(), ModuleError> {
        self.only_owner(sender)?;
        self.authorized.remove(&identifier);
        self.events.emit(ModuleEvent::SignerRevoked { identifier });
        tracing::info!(%identifier, "signer revoked");
        Ok(())
    }

    pub fn set_replay_protection(
        &mut self,
        sender: Address,
        enabled: bool,
    ) -> Result<(), ModuleError> {
        self.only_owner(sender)?;
        self.replay_protection = enabled;
        tracing::info!(enabled, "replay protection updated");
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        sender: Address,
        new_owner: Address,
    ) -> Result<(), ModuleError> {
        self.only_owner(sender)?;
        if new_owner.is_zero() {
            return Err(ModuleError::ZeroAddress { field: "new_owner" });
        }
        let previous_owner = std::mem::replace(&mut self.owner, new_owner);
        self.events.emit(ModuleEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        tracing::info!(%previous_owner, %new_owner, "validator ownership transferred");
        Ok(())
    }

    // ─── Signature checks ───────────────────────────────────────────

    /// EIP-1271 check. Never fails.
    pub fn is_valid_signature(&self, hash: &Bytes32, signature: &[u8]) -> SignatureVerdict {
        match self.authenticate(signature) {
            Ok((_, identifier)) => {
                tracing::debug!(%hash, %identifier, "signature accepted");
                SignatureVerdict::Magic
            }
            Err(e) => {
                tracing::debug!(%hash, error = %e, "signature rejected");
                SignatureVerdict::Invalid
            }
        }
    }

    /// As [`is_valid_signature`](Self::is_valid_signature), for a claimed
    /// signer that must be this validator or the null address.
    pub fn is_valid_signature_now(
        &self,
        hash: &Bytes32,
        signer: Address,
        signature: &[u8],
    ) -> SignatureVerdict {
        if signer != self.address && !signer.is_zero() {
            tracing::debug!(%hash, %signer, "signature rejected: foreign signer");
            return SignatureVerdict::Invalid;
        }
        self.is_valid_signature(hash, signature)
    }

    /// Stateful validation. Fails with the specific reason and, with
    /// replay protection on, consumes the proof.
    pub fn validate_signature(
        &mut self,
        hash: &Bytes32,
        signature: &[u8],
    ) -> Result<Identifier, ModuleError> {
        let (proof, identifier) = self.authenticate(signature).map_err(|e| {
            tracing::warn!(%hash, error = %e, "signature validation failed");
            e
        })?;

        let fingerprint = proof.fingerprint();
        if self.replay_protection {
            if self.used_proofs.contains(&fingerprint) {
                tracing::warn!(%hash, %fingerprint, "signature validation failed: proof already used");
                return Err(ModuleError::ProofAlreadyUsed {
                    fingerprint: fingerprint.to_hex(),
                });
            }
            self.used_proofs.insert(fingerprint);
        }

        self.events.emit(ModuleEvent::SignatureValidated {
            hash: *hash,
            identifier,
        });
        tracing::info!(%hash, %identifier, "signature validated");
        Ok(identifier)
    }

    // ─── Codec ──────────────────────────────────────────────────────

    pub fn encode_proof_params(proof: &Proof) -> Result<Vec<u8>, ModuleError> {
        Ok(codec::encode_proof_params(proof)?)
    }

    pub fn decode_proof_params(encoded: &[u8]) -> Result<Proof, ModuleError> {
        Ok(codec::decode_proof_params(encoded)?)
    }

    // ─── Queries ────────────────────────────────────────────────────

    /// Whether `identifier` is on the allow-list.
    pub fn is_authorized(&self, identifier: &Identifier) -> bool {
        self.authorized.contains(identifier)
    }

    /// Whether the stateful path records and rejects reused proofs.
    pub fn replay_protection_enabled(&self) -> bool {
        self.replay_protection
    }

    pub fn is_proof_used(&self, fingerprint: &ProofFingerprint) -> bool {
        self.used_proofs.contains(fingerprint)
    }

    /// Administrator address.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Alias of [`owner`](Self::owner).
    pub fn get_owner(&self) -> Address {
        self.owner
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// The proof oracle every verification goes through.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<EventRecord> {
        self.events.take()
    }

    fn only_owner(&self, sender: Address) -> Result<(), ModuleError> {
        if sender != self.owner {
            tracing::warn!(%sender, "administrative call rejected: not the owner");
            return Err(ModuleError::OnlyOwner);
        }
        Ok(())
    }

    /// Decode, verify and check the allow-list.
    fn authenticate(&self, signature: &[u8]) -> Result<(Proof, Identifier), ModuleError> {
        let proof = codec::decode_proof_params(signature)?;
        if !self.expected.admits(&proof) {
            return Err(ModuleError::InvalidProof);
        }
        let identifier = match self.oracle.verify(&proof, ProofPurpose::Signature) {
            Ok(v) => v.identifier().ok_or(ModuleError::InvalidProof)?,
            Err(e) => {
                tracing::debug!(error = %e, "oracle error treated as rejection");
                return Err(ModuleError::InvalidProof);
            }
        };
        if !self.is_authorized(&identifier) {
            return Err(ModuleError::SignerNotAuthorized {
                identifier: identifier.to_hex(),
            });
        }
        Ok((proof, identifier))
    }
}
