//! # Proof Subcommand
//!
//! Transcodes proof parameters between their JSON form and the wire
//! encoding carried in a signature field.
//!
//! ## Subcommands
//!
//! - `encode`: Proof JSON → `0x`-prefixed wire encoding.
//! - `decode`: Wire encoding → pretty-printed proof JSON.
//! - `fingerprint`: Proof JSON → fingerprint of its raw proof bytes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use zkr_core::{decode_proof_params, encode_proof_params, hex, Proof};

/// Arguments for the `zkr proof` subcommand.
#[derive(Args, Debug)]
pub struct ProofArgs {
    #[command(subcommand)]
    pub command: ProofCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProofCommand {
    /// Encode proof parameters for use as a signature.
    Encode {
        /// Proof parameters as JSON.
        input: PathBuf,
    },

    /// Decode a wire-encoded proof.
    Decode {
        /// Hex wire encoding, with or without `0x`.
        #[arg(long, conflicts_with = "file")]
        hex: Option<String>,
        /// File holding the hex wire encoding.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print the fingerprint replay ledgers record for a proof.
    Fingerprint {
        /// Proof parameters as JSON.
        input: PathBuf,
    },
}

/// Execute the proof subcommand.
pub fn run_proof(args: &ProofArgs) -> Result<u8> {
    match &args.command {
        ProofCommand::Encode { input } => {
            let proof = read_proof(input)?;
            let encoded = encode_proof_params(&proof).context("failed to encode proof")?;
            println!("{}", hex::encode_prefixed(&encoded));
        }
        ProofCommand::Decode { hex: inline, file } => {
            let text = match (inline, file) {
                (Some(h), _) => h.clone(),
                (None, Some(path)) => std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, None) => anyhow::bail!("pass --hex or --file"),
            };
            let proof = decode_hex_proof(&text)?;
            println!("{}", serde_json::to_string_pretty(&proof)?);
        }
        ProofCommand::Fingerprint { input } => {
            let proof = read_proof(input)?;
            println!("{}", proof.fingerprint());
        }
    }
    Ok(0)
}

/// Parse proof parameters from a JSON file.
pub fn read_proof(path: &Path) -> Result<Proof> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read proof: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse proof: {}", path.display()))
}

/// Decode a hex wire encoding into proof parameters.
pub fn decode_hex_proof(text: &str) -> Result<Proof> {
    let bytes = hex::decode(text.trim()).context("wire encoding is not valid hex")?;
    Ok(decode_proof_params(&bytes)?)
}
