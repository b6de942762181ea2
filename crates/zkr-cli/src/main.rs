//! # zkr CLI entry point
//!
//! Parses command-line arguments, initializes tracing and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zkr_cli::proof::{run_proof, ProofArgs};
use zkr_cli::safe::{run_safe, SafeArgs};
use zkr_cli::simulate::{run_simulate, SimulateArgs};

/// Proof-gated Safe recovery toolkit.
///
/// Transcodes proof parameters, prepares owner swaps, and simulates
/// registration, recovery and signature validation against a scripted
/// proof oracle.
#[derive(Parser, Debug)]
#[command(name = "zkr", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Module configuration file (YAML or JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode, decode and fingerprint proof parameters.
    Proof(ProofArgs),

    /// Safe owner-list helpers.
    Safe(SafeArgs),

    /// Run a scenario against both modules with a scripted oracle.
    Simulate(SimulateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!("zkr CLI starting");

    let result = cli
        .config
        .as_deref()
        .map(zkr_cli::load_module_config)
        .transpose()
        .and_then(|config| match &cli.command {
            Commands::Proof(args) => run_proof(args),
            Commands::Safe(args) => run_safe(args),
            Commands::Simulate(args) => run_simulate(args, config.as_ref()),
        });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_proof_encode() {
        let cli = Cli::try_parse_from(["zkr", "proof", "encode", "proof.json"]).unwrap();
        if let Commands::Proof(args) = cli.command {
            assert!(matches!(
                args.command,
                zkr_cli::proof::ProofCommand::Encode { .. }
            ));
        } else {
            panic!("expected proof command");
        }
    }

    #[test]
    fn cli_parse_proof_decode_conflicting_sources() {
        let result = Cli::try_parse_from([
            "zkr", "proof", "decode", "--hex", "0x00", "--file", "sig.hex",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_safe_previous_owner() {
        let cli = Cli::try_parse_from([
            "zkr",
            "safe",
            "previous-owner",
            "--safe",
            "0x0000000000000000000000000000000000005afe",
            "--owners",
            "0x00000000000000000000000000000000000000a0,0x00000000000000000000000000000000000000b0",
            "--owner",
            "0x00000000000000000000000000000000000000b0",
        ])
        .unwrap();
        if let Commands::Safe(args) = cli.command {
            match args.command {
                zkr_cli::safe::SafeCommand::PreviousOwner { owners, .. } => {
                    assert_eq!(owners.len(), 2);
                }
                other => panic!("unexpected command {other:?}"),
            }
        } else {
            panic!("expected safe command");
        }
    }

    #[test]
    fn cli_parse_rejects_bad_address() {
        let result = Cli::try_parse_from([
            "zkr",
            "safe",
            "previous-owner",
            "--safe",
            "0x5afe",
            "--owners",
            "0x00000000000000000000000000000000000000a0",
            "--owner",
            "0x00000000000000000000000000000000000000a0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "zkr",
            "-vv",
            "--log-json",
            "--config",
            "modules.yaml",
            "simulate",
            "scenario.yaml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_json);
        assert_eq!(cli.config, Some(PathBuf::from("modules.yaml")));
        assert!(matches!(cli.command, Commands::Simulate(_)));
    }
}
