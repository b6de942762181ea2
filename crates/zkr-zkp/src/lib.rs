//! # zkr-zkp: Proof Oracle Abstraction
//!
//! The recovery module and the signature validator never verify proofs
//! themselves. They ask a [`ProofOracle`], a synchronous trait-typed
//! dependency, and act on the [`Verification`] it returns.
//!
//! ## Architecture
//!
//! - **Traits** (`traits.rs`): `ProofOracle`, `Verification`, `VerifyError`.
//!   Blanket impls for `&T`, `Box<T>` and `Arc<T>` let a caller keep a
//!   handle on the oracle it gave to a module.
//!
//! - **Mock** (`mock.rs`, feature `mock`, on by default):
//!   `MockProofOracle`, scriptable per proof or globally, with a
//!   deterministic deriving mode for simulations.
//!
//! ## Crate Policy
//!
//! - Depends on `zkr-core` only.
//! - The mock is transparent and must never protect a real account.

#[cfg(feature = "mock")]
pub mod mock;
pub mod traits;

#[cfg(feature = "mock")]
pub use mock::{MockProofOracle, OracleCall};
pub use traits::{ProofOracle, Verification, VerifyError};
