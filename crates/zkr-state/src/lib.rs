//! # zkr-state: Recovery and Signature-Validation Modules
//!
//! The two stateful components of proof-gated Safe recovery, and the
//! account model they act on.
//!
//! - [`RecoveryModule`]: binds a Safe to a guardian identifier, then
//!   authorizes an owner swap for a fresh proof from that guardian.
//! - [`SignatureValidator`]: answers EIP-1271-style "is this a valid
//!   signature" queries with verified identity proofs, gated by an
//!   administrator allow-list and optional replay protection.
//! - [`SafeAccount`] / [`SafeRegistry`]: in-memory accounts with the
//!   Safe's sentinel-linked owner list, reached through [`OwnerSwap`].
//!
//! ## Atomicity
//!
//! Every mutating entry point takes `&mut self` and runs all of its checks
//! before its first write. A call that returns an error has changed
//! nothing and emitted no event. Read-only entry points take `&self`.
//! Callers sharing a module across threads put it behind a lock.
//!
//! ## Crate Policy
//!
//! - Module state lives in module fields; there is no global state.
//! - The oracle is a generic parameter, so tests substitute
//!   `zkr_zkp::MockProofOracle` without dynamic dispatch.

pub mod config;
pub mod ledger;
pub mod recovery;
pub mod safe;
pub mod validator;

pub use config::{ModuleConfig, RecoveryConfig, ValidatorConfig};
pub use ledger::UsedProofSet;
pub use recovery::{RecoveryModule, RecoveryRequest};
pub use safe::{OwnerSwap, SafeAccount, SafeRegistry, SwapError};
pub use validator::{SignatureValidator, SignatureVerdict, INVALID_SIGNATURE, MAGIC_VALUE};
