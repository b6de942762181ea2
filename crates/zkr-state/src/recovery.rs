//! # Recovery Module
//!
//! Binds each Safe to a guardian identifier derived from an identity
//! proof, and lets a fresh proof from the same identity replace one of the
//! Safe's owners.
//!
//! ## Lifecycle (per account)
//!
//! ```text
//! UNREGISTERED ──register──▶ REGISTERED ──register / recover──▶ REGISTERED
//! ```
//!
//! There is no terminal state. Re-registration overwrites the guardian;
//! recovery never touches the registration.
//!
//! ## Check order
//!
//! `recover` runs every check before any write:
//!
//! 1. Null `account`, `old_owner` or `new_owner` → `ZeroAddress`, before
//!    the oracle is consulted.
//! 2. No guardian bound → `SafeNotRegistered`.
//! 3. One indistinguishable gate → `InvalidProof`: the oracle must accept
//!    the proof, derive the registered identifier, and (when configured)
//!    report bound data for exactly this swap. Scope and domain
//!    constraints belong to the same gate.
//! 4. Replay protection → `ProofAlreadyUsed`.
//! 5. The account's owner swap → `OwnerSwapFailed`.
//!
//! Only after the swap succeeds is the proof fingerprint recorded and
//! `OwnerRecovered` emitted.

use std::collections::HashMap;

use zkr_core::{
    Address, EventLog, EventRecord, Identifier, ModuleError, ModuleEvent, Proof,
    ProofFingerprint, ProofPurpose, SwapBinding,
};
use zkr_zkp::{ProofOracle, Verification};

use crate::config::RecoveryConfig;
use crate::ledger::UsedProofSet;
use crate::safe::OwnerSwap;

/// The owner swap a recovery call asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryRequest {
    pub account: Address,
    pub old_owner: Address,
    pub new_owner: Address,
    pub previous_owner: Address,
}

impl RecoveryRequest {
    /// The binding a recovery proof for this request commits to.
    pub fn binding(&self) -> SwapBinding {
        SwapBinding {
            previous_owner: self.previous_owner,
            old_owner: self.old_owner,
            new_owner: self.new_owner,
            account: self.account,
        }
    }
}

/// Guardian registration and proof-gated owner recovery.
#[derive(Debug)]
pub struct RecoveryModule<O, G> {
    address: Address,
    oracle: O,
    gateway: G,
    config: RecoveryConfig,
    recoverers: HashMap<Address, Identifier>,
    used_proofs: UsedProofSet,
    events: EventLog,
}

impl<O: ProofOracle, G: OwnerSwap> RecoveryModule<O, G> {
    /// Create a module at `address` that verifies through `oracle` and
    /// swaps owners through `gateway`.
    pub fn new(
        address: Address,
        oracle: O,
        gateway: G,
        config: RecoveryConfig,
    ) -> Result<Self, ModuleError> {
        if address.is_zero() {
            return Err(ModuleError::ZeroAddress { field: "module" });
        }
        Ok(Self {
            address,
            oracle,
            gateway,
            config,
            recoverers: HashMap::new(),
            used_proofs: UsedProofSet::new(),
            events: EventLog::new(),
        })
    }

    // ─── Mutating entry points ──────────────────────────────────────

    /// Bind the identity behind `proof` as `account`'s guardian.
    ///
    /// Only the account itself may register. Re-registration replaces the
    /// previous guardian.
    pub fn register(
        &mut self,
        caller: Address,
        proof: &Proof,
        account: Address,
    ) -> Result<Identifier, ModuleError> {
        if caller != account {
            tracing::warn!(%caller, %account, "registration rejected: caller is not the account");
            return Err(ModuleError::OnlySafe);
        }
        if account.is_zero() {
            return Err(ModuleError::ZeroAddress { field: "account" });
        }

        let identifier = self
            .verify(proof, ProofPurpose::Registration)
            .filter(|_| self.config.admits_registration(proof))
            .filter(|v| {
                v.bound_data
                    .user_address
                    .map_or(true, |bound| bound == account)
            })
            .and_then(|v| v.identifier())
            .filter(|id| !id.is_zero())
            .ok_or_else(|| {
                tracing::warn!(%account, fingerprint = %proof.fingerprint(), "registration rejected: invalid proof");
                ModuleError::InvalidProof
            })?;

        let previous = self.recoverers.insert(account, identifier);
        self.events.emit(ModuleEvent::SafeRegistered {
            account,
            identifier,
        });
        tracing::info!(
            %account,
            %identifier,
            replaced = previous.is_some_and(|p| p != identifier),
            "safe registered for recovery"
        );
        Ok(identifier)
    }

    /// Replace `old_owner` with `new_owner` on `account`, authorized by a
    /// fresh proof from the account's guardian.
    pub fn recover(
        &mut self,
        proof: &Proof,
        account: Address,
        old_owner: Address,
        new_owner: Address,
        previous_owner: Address,
    ) -> Result<(), ModuleError> {
        self.recover_with(
            proof,
            RecoveryRequest {
                account,
                old_owner,
                new_owner,
                previous_owner,
            },
        )
    }

    /// [`recover`](Self::recover) taking the swap as a single value.
    pub fn recover_with(
        &mut self,
        proof: &Proof,
        request: RecoveryRequest,
    ) -> Result<(), ModuleError> {
        let RecoveryRequest {
            account,
            old_owner,
            new_owner,
            previous_owner,
        } = request;

        for (field, value) in [
            ("account", account),
            ("old_owner", old_owner),
            ("new_owner", new_owner),
        ] {
            if value.is_zero() {
                return Err(ModuleError::ZeroAddress { field });
            }
        }

        let guardian = self.safe_to_recoverer(account);
        if guardian.is_zero() {
            tracing::warn!(%account, "recovery rejected: safe not registered");
            return Err(ModuleError::SafeNotRegistered {
                account: account.to_hex(),
            });
        }

        let fingerprint = proof.fingerprint();
        let binding = request.binding();
        let authorized = self
            .verify(proof, ProofPurpose::Recovery)
            .filter(|_| self.config.admits_recovery(proof))
            .filter(|v| v.identifier() == Some(guardian))
            .is_some_and(|v| !self.config.require_swap_binding || v.bound_data.matches_swap(&binding));
        if !authorized {
            tracing::warn!(%account, %fingerprint, "recovery rejected: invalid proof");
            return Err(ModuleError::InvalidProof);
        }

        if self.config.recovery_replay_protection && self.used_proofs.contains(&fingerprint) {
            tracing::warn!(%account, %fingerprint, "recovery rejected: proof already used");
            return Err(ModuleError::ProofAlreadyUsed {
                fingerprint: fingerprint.to_hex(),
            });
        }

        self.gateway
            .swap_owner(self.address, account, previous_owner, old_owner, new_owner)
            .map_err(|e| {
                tracing::warn!(%account, %old_owner, %new_owner, error = %e, "recovery rejected: owner swap failed");
                ModuleError::OwnerSwapFailed {
                    reason: e.to_string(),
                }
            })?;

        if self.config.recovery_replay_protection {
            self.used_proofs.insert(fingerprint);
        }
        self.events.emit(ModuleEvent::OwnerRecovered {
            account,
            old_owner,
            new_owner,
            recoverer: guardian,
        });
        tracing::info!(%account, %old_owner, %new_owner, recoverer = %guardian, "owner recovered");
        Ok(())
    }

    // ─── Queries ────────────────────────────────────────────────────

    /// Guardian identifier bound to `account`, `Identifier::ZERO` if none.
    pub fn safe_to_recoverer(&self, account: Address) -> Identifier {
        self.recoverers
            .get(&account)
            .copied()
            .unwrap_or(Identifier::ZERO)
    }

    /// Whether a guardian is bound to `account`.
    pub fn is_registered(&self, account: Address) -> bool {
        !self.safe_to_recoverer(account).is_zero()
    }

    /// Alias of [`safe_to_recoverer`](Self::safe_to_recoverer).
    pub fn get_recovery_identifier(&self, account: Address) -> Identifier {
        self.safe_to_recoverer(account)
    }

    /// Whether a recovery proof with this fingerprint has been consumed.
    pub fn is_proof_used(&self, fingerprint: &ProofFingerprint) -> bool {
        self.used_proofs.contains(fingerprint)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The account gateway, for enabling modules or adding accounts.
    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Drain the event log.
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        self.events.take()
    }

    /// Oracle verdict, with oracle errors folded into rejection.
    fn verify(&self, proof: &Proof, purpose: ProofPurpose) -> Option<Verification> {
        match self.oracle.verify(proof, purpose) {
            Ok(v) if v.valid => Some(v),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(%purpose, error = %e, "oracle error treated as rejection");
                None
            }
        }
    }
}
