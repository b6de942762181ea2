//! # Error Types: Structured Error Hierarchy
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - [`ModuleError`] is the single failure taxonomy shared by the recovery
//!   module and the signature validator. Every mutating entry point fails
//!   with exactly one of its variants, never a catch-all, so callers can
//!   tell "not authorized" apart from "bad proof" apart from "swap failed".
//! - [`CodecError`] covers the proof wire encoding.
//! - [`ZkrError`] covers textual input: hex values that do not parse and
//!   configuration that fails validation.

use thiserror::Error;

/// Errors from parsing and validating textual input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZkrError {
    /// A textual value (address, identifier, hex blob) could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Failure kinds of the recovery module and the signature validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// A required address argument was the null address, or an identifier
    /// argument was the zero ("unset") identifier.
    #[error("zero address supplied for `{field}`")]
    ZeroAddress {
        /// Name of the offending argument.
        field: &'static str,
    },

    /// The oracle rejected the proof, or the proof's identity did not match
    /// the registered guardian. The two causes are deliberately merged.
    #[error("invalid proof")]
    InvalidProof,

    /// Recovery attempted against an account with no guardian bound.
    #[error("safe {account} is not registered for recovery")]
    SafeNotRegistered {
        /// The unregistered account, rendered as hex.
        account: String,
    },

    /// The account rejected the owner replacement.
    #[error("owner swap failed: {reason}")]
    OwnerSwapFailed {
        /// Reason reported by the account.
        reason: String,
    },

    /// A replay-protected proof was submitted a second time.
    #[error("proof {fingerprint} already used")]
    ProofAlreadyUsed {
        /// Fingerprint of the consumed proof, rendered as hex.
        fingerprint: String,
    },

    /// The encoded proof could not be decoded.
    #[error("invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    /// Caller is not the administrator.
    #[error("only the owner may call this function")]
    OnlyOwner,

    /// Registration attempted by a principal other than the account itself.
    #[error("only Safe can register a guardian")]
    OnlySafe,

    /// The proof's identifier is not on the validator's allow-list.
    #[error("signer {identifier} is not authorized")]
    SignerNotAuthorized {
        /// The rejected identifier, rendered as hex.
        identifier: String,
    },
}

impl ModuleError {
    /// Variant name, stable across message changes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ZeroAddress { .. } => "ZeroAddress",
            Self::InvalidProof => "InvalidProof",
            Self::SafeNotRegistered { .. } => "SafeNotRegistered",
            Self::OwnerSwapFailed { .. } => "OwnerSwapFailed",
            Self::ProofAlreadyUsed { .. } => "ProofAlreadyUsed",
            Self::InvalidSignatureFormat(_) => "InvalidSignatureFormat",
            Self::OnlyOwner => "OnlyOwner",
            Self::OnlySafe => "OnlySafe",
            Self::SignerNotAuthorized { .. } => "SignerNotAuthorized",
        }
    }
}

impl From<CodecError> for ModuleError {
    fn from(err: CodecError) -> Self {
        ModuleError::InvalidSignatureFormat(err.to_string())
    }
}

/// Error in the proof wire codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The encoded signature was empty.
    #[error("encoded proof is empty")]
    Empty,

    /// The encoded signature is not a well-formed proof encoding.
    #[error("malformed encoded proof: {0}")]
    Malformed(String),

    /// Encoding failed.
    #[error("proof encoding failed: {0}")]
    Encoding(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
