//! # zkr-core: Foundational Types for Proof-Gated Safe Recovery
//!
//! The leaf crate of the workspace. Defines the primitives every other
//! crate builds on and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Fixed-width newtypes.** `Address`, `Identifier` and `Bytes32` are
//!    distinct types; an owner address cannot be passed where a guardian
//!    identifier is expected. The all-zero value of each is `ZERO`.
//!
//! 2. **`CanonicalBytes` newtype.** Structured data is hashed and put on the
//!    wire only through `CanonicalBytes::new()` (JCS).
//!
//! 3. **Proofs are values, fingerprints are state.** A `Proof` is never
//!    stored by a module; replay ledgers hold `ProofFingerprint`s.
//!
//! 4. **One failure taxonomy.** `ModuleError` enumerates every way a
//!    mutating entry point can fail.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `zkr-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod codec;
pub mod digest;
pub mod error;
pub mod event;
pub mod hex;
pub mod identity;
pub mod proof;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use codec::{decode_proof_params, encode_proof_params};
pub use digest::{sha256_digest, ContentDigest, ProofFingerprint};
pub use error::{CanonicalizationError, CodecError, ModuleError, ZkrError};
pub use event::{EventLog, EventRecord, ModuleEvent};
pub use identity::{Address, Bytes32, Identifier};
pub use proof::{BoundData, Proof, ProofPurpose, SwapBinding};
pub use temporal::Timestamp;
