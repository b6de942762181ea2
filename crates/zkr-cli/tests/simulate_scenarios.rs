//! # Integration Tests for `zkr simulate`
//!
//! Runs the bundled demo scenario and scenarios written to temporary files,
//! with and without a configuration override.

use std::io::Write;
use std::path::PathBuf;

use zkr_cli::simulate::{load_scenario, run_simulate, SimulateArgs, Simulation};
use zkr_core::Address;
use zkr_state::{ModuleConfig, RecoveryConfig};

/// Helper: path of the bundled demo scenario.
fn demo_scenario() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/recovery.yaml")
}

/// Helper: write `yaml` to a temporary scenario file.
fn scenario_file(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

const UNBOUND_RECOVERY: &str = r#"
safes:
  - address: "0x0000000000000000000000000000000000005afe"
    owners: ["0x00000000000000000000000000000000000000a1"]
proofs:
  reg: { identity: bob }
  rec: { identity: bob }
steps:
  - action: register
    account: "0x0000000000000000000000000000000000005afe"
    proof: reg
    expect: ok
  - action: recover
    proof: rec
    account: "0x0000000000000000000000000000000000005afe"
    old_owner: "0x00000000000000000000000000000000000000a1"
    new_owner: "0x00000000000000000000000000000000000000b2"
    expect: ok
"#;

// -- Demo ---------------------------------------------------------------------

#[test]
fn test_demo_scenario_passes() {
    let scenario = load_scenario(&demo_scenario()).unwrap();
    let simulation = Simulation::build(&scenario, &ModuleConfig::default()).unwrap();
    let report = simulation.run(scenario.name.clone(), &scenario.steps).unwrap();

    for step in &report.steps {
        assert!(step.passed, "step {} ({}) got {}", step.index, step.action, step.outcome);
    }
    let safe = Address::from_low_u64(0x5afe);
    assert_eq!(
        report.owners[&safe],
        vec![Address::from_low_u64(0xa1), Address::from_low_u64(0xc3)]
    );

    let recover_outcomes: Vec<_> = report
        .steps
        .iter()
        .filter(|s| s.action == "recover")
        .map(|s| s.outcome.as_str())
        .collect();
    assert_eq!(
        recover_outcomes,
        vec!["InvalidProof", "ok", "ProofAlreadyUsed", "InvalidProof"]
    );

    let recovery: Vec<_> = report.recovery_events.iter().map(|r| r.event.name()).collect();
    assert_eq!(recovery, vec!["SafeRegistered", "OwnerRecovered"]);
    let validator: Vec<_> = report.validator_events.iter().map(|r| r.event.name()).collect();
    assert_eq!(
        validator,
        vec!["SignerAuthorized", "SignatureValidated", "SignerRevoked"]
    );
}

#[test]
fn test_demo_scenario_exit_code() {
    let args = SimulateArgs {
        scenario: demo_scenario(),
    };
    assert_eq!(run_simulate(&args, None).unwrap(), 0);
}

// -- Configuration ------------------------------------------------------------

#[test]
fn test_unbound_recovery_rejected_by_default() {
    let file = scenario_file(UNBOUND_RECOVERY);
    let args = SimulateArgs {
        scenario: file.path().to_path_buf(),
    };
    assert_eq!(run_simulate(&args, None).unwrap(), 1);
}

#[test]
fn test_unbound_recovery_accepted_when_unhardened() {
    let file = scenario_file(UNBOUND_RECOVERY);
    let args = SimulateArgs {
        scenario: file.path().to_path_buf(),
    };
    let config = ModuleConfig {
        recovery: RecoveryConfig::unhardened(),
        ..ModuleConfig::default()
    };
    assert_eq!(run_simulate(&args, Some(&config)).unwrap(), 0);
}

#[test]
fn test_scenario_embedded_config() {
    let yaml = format!("config:\n  recovery:\n    require_swap_binding: false\n{UNBOUND_RECOVERY}");
    let file = scenario_file(&yaml);
    let args = SimulateArgs {
        scenario: file.path().to_path_buf(),
    };
    assert_eq!(run_simulate(&args, None).unwrap(), 0);
}

#[test]
fn test_invalid_config_is_an_error() {
    let file = scenario_file(UNBOUND_RECOVERY);
    let args = SimulateArgs {
        scenario: file.path().to_path_buf(),
    };
    let config = ModuleConfig {
        recovery: RecoveryConfig {
            recovery_scope: Some(String::new()),
            ..RecoveryConfig::default()
        },
        ..ModuleConfig::default()
    };
    let err = run_simulate(&args, Some(&config)).unwrap_err();
    assert!(format!("{err:#}").contains("recovery_scope"));
}

#[test]
fn test_unknown_scenario_field_rejected() {
    let file = scenario_file("steps: []\nsafe: []\n");
    let err = load_scenario(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse scenario"));
}
