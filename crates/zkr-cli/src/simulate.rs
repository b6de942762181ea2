//! # Simulate Subcommand
//!
//! Runs a YAML scenario against a recovery module and a signature
//! validator sharing one scripted proof oracle, then prints a JSON report
//! of every step outcome, both event logs and the final owner lists.
//!
//! ## Scenario format
//!
//! ```yaml
//! name: happy path
//! safes:
//!   - address: "0x…5afe"
//!     owners: ["0x…10", "0x…20"]
//! proofs:
//!   registration: { identity: alice, bind_account: "0x…5afe" }
//!   recovery:
//!     identity: alice
//!     bind_swap: { account: "0x…5afe", old_owner: "0x…10", new_owner: "0x…30" }
//! steps:
//!   - { action: register, account: "0x…5afe", proof: registration, expect: ok }
//!   - { action: recover, proof: recovery, account: "0x…5afe",
//!       old_owner: "0x…10", new_owner: "0x…30", expect: ok }
//! ```
//!
//! Proofs without an explicit `identifier` get one derived from their
//! domain, scope and `identity`, so two proofs of the same identity in the
//! same scope agree. A step with `expect` passes when its outcome (`ok`,
//! an error kind such as `InvalidProof`, or `magic` / `invalid` for
//! read-path checks) matches.
//!
//! Both modules sit behind `parking_lot::RwLock`s: read-path checks take
//! shared locks, mutating steps take exclusive ones.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use zkr_core::{
    Address, BoundData, Bytes32, EventRecord, Identifier, ModuleError, Proof, SwapBinding,
};
use zkr_state::{
    ModuleConfig, RecoveryModule, SafeAccount, SafeRegistry, SignatureValidator,
    SignatureVerdict,
};
use zkr_zkp::{MockProofOracle, Verification};

const DEFAULT_MODULE: Address = Address::from_low_u64(0x1000);
const DEFAULT_VALIDATOR: Address = Address::from_low_u64(0x2000);
const DEFAULT_ADMIN: Address = Address::from_low_u64(0xad);

/// Arguments for the `zkr simulate` subcommand.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Scenario file (YAML).
    pub scenario: PathBuf,
}

// ─── Scenario ───────────────────────────────────────────────────────

/// A simulation scenario.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    /// Module configuration; `--config` takes precedence.
    #[serde(default)]
    pub config: Option<ModuleConfig>,
    #[serde(default = "default_module")]
    pub module: Address,
    #[serde(default)]
    pub validator: ValidatorSetup,
    #[serde(default)]
    pub safes: Vec<SafeSetup>,
    #[serde(default)]
    pub proofs: BTreeMap<String, ProofSetup>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorSetup {
    #[serde(default = "default_validator")]
    pub address: Address,
    #[serde(default = "default_admin")]
    pub admin: Address,
}

impl Default for ValidatorSetup {
    fn default() -> Self {
        Self {
            address: DEFAULT_VALIDATOR,
            admin: DEFAULT_ADMIN,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SafeSetup {
    pub address: Address,
    pub owners: Vec<Address>,
    /// Enable the recovery module on this Safe.
    #[serde(default = "yes")]
    pub enable_module: bool,
}

/// How the oracle answers for one named proof.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProofSetup {
    /// Raw proof bytes as text; defaults to the proof's name.
    #[serde(default)]
    pub raw: Option<String>,
    /// Identity the proof attests to.
    #[serde(default)]
    pub identity: String,
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "yes")]
    pub valid: bool,
    /// Identifier to report instead of the derived one.
    #[serde(default)]
    pub identifier: Option<Identifier>,
    /// Account bound as `user_address` (registration proofs).
    #[serde(default)]
    pub bind_account: Option<Address>,
    /// Swap bound as `custom_data` (recovery proofs).
    #[serde(default)]
    pub bind_swap: Option<SwapSetup>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwapSetup {
    pub account: Address,
    pub old_owner: Address,
    pub new_owner: Address,
    /// Resolved from the Safe's initial owner list when absent.
    #[serde(default)]
    pub previous_owner: Option<Address>,
}

/// One scenario step.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: Action,
    #[serde(default)]
    pub expect: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// `caller` defaults to `account`.
    Register {
        #[serde(default)]
        caller: Option<Address>,
        account: Address,
        proof: String,
    },
    /// `previous_owner` defaults to the current predecessor of `old_owner`.
    Recover {
        proof: String,
        account: Address,
        old_owner: Address,
        new_owner: Address,
        #[serde(default)]
        previous_owner: Option<Address>,
    },
    /// Authorize `identifier`, or the identifier `proof` derives.
    AuthorizeSigner {
        #[serde(default)]
        sender: Option<Address>,
        #[serde(default)]
        identifier: Option<Identifier>,
        #[serde(default)]
        proof: Option<String>,
    },
    RevokeSigner {
        #[serde(default)]
        sender: Option<Address>,
        #[serde(default)]
        identifier: Option<Identifier>,
        #[serde(default)]
        proof: Option<String>,
    },
    /// Read-path check; with `signer`, the claimed-signer variant.
    IsValidSignature {
        #[serde(default)]
        hash: Bytes32,
        proof: String,
        #[serde(default)]
        signer: Option<Address>,
    },
    ValidateSignature {
        #[serde(default)]
        hash: Bytes32,
        proof: String,
    },
    SetReplayProtection {
        #[serde(default)]
        sender: Option<Address>,
        enabled: bool,
    },
    TransferOwnership {
        #[serde(default)]
        sender: Option<Address>,
        new_owner: Address,
    },
    /// Make a Safe reject (or accept again) owner swaps.
    SetShouldFail { account: Address, fail: bool },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Recover { .. } => "recover",
            Self::AuthorizeSigner { .. } => "authorize_signer",
            Self::RevokeSigner { .. } => "revoke_signer",
            Self::IsValidSignature { .. } => "is_valid_signature",
            Self::ValidateSignature { .. } => "validate_signature",
            Self::SetReplayProtection { .. } => "set_replay_protection",
            Self::TransferOwnership { .. } => "transfer_ownership",
            Self::SetShouldFail { .. } => "set_should_fail",
        }
    }
}

fn yes() -> bool {
    true
}

fn default_module() -> Address {
    DEFAULT_MODULE
}

fn default_validator() -> Address {
    DEFAULT_VALIDATOR
}

fn default_admin() -> Address {
    DEFAULT_ADMIN
}

fn default_domain() -> String {
    "zkpassport.id".to_string()
}

fn default_scope() -> String {
    "zkr-simulation".to_string()
}

// ─── Report ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub action: &'static str,
    /// `ok`, an error kind, `magic` or `invalid`.
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub passed: bool,
    pub steps: Vec<StepReport>,
    pub recovery_events: Vec<EventRecord>,
    pub validator_events: Vec<EventRecord>,
    pub owners: BTreeMap<Address, Vec<Address>>,
}

// ─── Simulation ─────────────────────────────────────────────────────

type Recovery = RecoveryModule<Arc<MockProofOracle>, SafeRegistry>;
type Validator = SignatureValidator<Arc<MockProofOracle>>;

/// Both modules wired to one scripted oracle and a registry of Safes.
pub struct Simulation {
    recovery: RwLock<Recovery>,
    validator: RwLock<Validator>,
    admin: Address,
    safes: Vec<Address>,
    proofs: BTreeMap<String, Proof>,
    identifiers: BTreeMap<String, Identifier>,
}

impl Simulation {
    /// Build the Safes, script the oracle and construct both modules.
    pub fn build(scenario: &Scenario, config: &ModuleConfig) -> Result<Self> {
        let mut registry = SafeRegistry::new();
        for setup in &scenario.safes {
            if registry.contains(setup.address) {
                bail!("safe {} is declared twice", setup.address);
            }
            let mut safe = SafeAccount::new(setup.address, &setup.owners)
                .with_context(|| format!("invalid safe {}", setup.address))?;
            if setup.enable_module {
                safe.enable_module(scenario.module);
            }
            registry.insert(safe);
        }

        let oracle = Arc::new(MockProofOracle::deriving());
        let mut proofs = BTreeMap::new();
        let mut identifiers = BTreeMap::new();
        let mut fingerprints = BTreeMap::new();
        for (name, setup) in &scenario.proofs {
            let proof = build_proof(name, setup);
            if let Some(other) = fingerprints.insert(proof.fingerprint(), name.as_str()) {
                bail!("proofs {other} and {name} share raw bytes; give one a distinct `raw`");
            }
            let identifier = match setup.identifier {
                Some(id) => id,
                None => MockProofOracle::derive_identifier(&proof)
                    .with_context(|| format!("cannot derive identifier for proof {name}"))?,
            };
            let verification = if setup.valid {
                Verification::accepted(identifier)
                    .with_bound_data(bound_data(name, setup, &registry)?)
            } else {
                Verification::rejected()
            };
            oracle.script(&proof, verification);
            identifiers.insert(name.clone(), identifier);
            proofs.insert(name.clone(), proof);
        }

        let registry_len = registry.len();
        let recovery = RecoveryModule::new(
            scenario.module,
            Arc::clone(&oracle),
            registry,
            config.recovery.clone(),
        )?;
        let validator = SignatureValidator::new(
            Arc::clone(&oracle),
            scenario.validator.address,
            scenario.validator.admin,
            config.validator.clone(),
        )?;
        tracing::debug!(
            safes = registry_len,
            proofs = proofs.len(),
            "simulation built"
        );

        Ok(Self {
            recovery: RwLock::new(recovery),
            validator: RwLock::new(validator),
            admin: scenario.validator.admin,
            safes: scenario.safes.iter().map(|s| s.address).collect(),
            proofs,
            identifiers,
        })
    }

    /// Run `steps` in order and collect the report.
    pub fn run(&self, name: Option<String>, steps: &[Step]) -> Result<SimulationReport> {
        let mut reports = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            let (outcome, detail) = self
                .execute(&step.action)
                .with_context(|| format!("step {index} ({})", step.action.name()))?;
            let passed = step
                .expect
                .as_deref()
                .map_or(true, |expected| expected.eq_ignore_ascii_case(&outcome));
            if !passed {
                tracing::warn!(index, action = step.action.name(), %outcome, "step did not match expectation");
            }
            reports.push(StepReport {
                index,
                action: step.action.name(),
                outcome,
                detail,
                expected: step.expect.clone(),
                passed,
            });
        }

        let recovery = self.recovery.read();
        let owners = self
            .safes
            .iter()
            .filter_map(|address| {
                recovery
                    .gateway()
                    .get(*address)
                    .map(|safe| (*address, safe.owners()))
            })
            .collect();

        Ok(SimulationReport {
            name,
            passed: reports.iter().all(|r| r.passed),
            steps: reports,
            recovery_events: recovery.events().records().to_vec(),
            validator_events: self.validator.read().events().records().to_vec(),
            owners,
        })
    }

    fn execute(&self, action: &Action) -> Result<(String, Option<String>)> {
        let outcome = match action {
            Action::Register {
                caller,
                account,
                proof,
            } => {
                let proof = self.proof(proof)?;
                let caller = caller.unwrap_or(*account);
                self.recovery
                    .write()
                    .register(caller, proof, *account)
                    .map(|id| Some(id.to_hex()))
            }
            Action::Recover {
                proof,
                account,
                old_owner,
                new_owner,
                previous_owner,
            } => {
                let proof = self.proof(proof)?;
                let previous = previous_owner
                    .or_else(|| self.current_previous_owner(*account, *old_owner))
                    .unwrap_or(Address::SENTINEL);
                self.recovery
                    .write()
                    .recover(proof, *account, *old_owner, *new_owner, previous)
                    .map(|()| None)
            }
            Action::AuthorizeSigner {
                sender,
                identifier,
                proof,
            } => {
                let identifier = self.signer(identifier, proof)?;
                self.validator
                    .write()
                    .authorize_signer(sender.unwrap_or(self.admin), identifier)
                    .map(|()| Some(identifier.to_hex()))
            }
            Action::RevokeSigner {
                sender,
                identifier,
                proof,
            } => {
                let identifier = self.signer(identifier, proof)?;
                self.validator
                    .write()
                    .revoke_signer(sender.unwrap_or(self.admin), identifier)
                    .map(|()| Some(identifier.to_hex()))
            }
            Action::IsValidSignature {
                hash,
                proof,
                signer,
            } => {
                let signature = self.signature(proof)?;
                let validator = self.validator.read();
                let verdict = match signer {
                    Some(signer) => validator.is_valid_signature_now(hash, *signer, &signature),
                    None => validator.is_valid_signature(hash, &signature),
                };
                let outcome = match verdict {
                    SignatureVerdict::Magic => "magic",
                    SignatureVerdict::Invalid => "invalid",
                };
                return Ok((outcome.to_string(), Some(verdict.to_string())));
            }
            Action::ValidateSignature { hash, proof } => {
                let signature = self.signature(proof)?;
                self.validator
                    .write()
                    .validate_signature(hash, &signature)
                    .map(|id| Some(id.to_hex()))
            }
            Action::SetReplayProtection { sender, enabled } => self
                .validator
                .write()
                .set_replay_protection(sender.unwrap_or(self.admin), *enabled)
                .map(|()| None),
            Action::TransferOwnership { sender, new_owner } => self
                .validator
                .write()
                .transfer_ownership(sender.unwrap_or(self.admin), *new_owner)
                .map(|()| None),
            Action::SetShouldFail { account, fail } => {
                let mut recovery = self.recovery.write();
                let safe = recovery
                    .gateway_mut()
                    .get_mut(*account)
                    .with_context(|| format!("unknown safe {account}"))?;
                safe.set_should_fail(*fail);
                Ok(None)
            }
        };
        Ok(match outcome {
            Ok(detail) => ("ok".to_string(), detail),
            Err(e) => outcome_of_error(&e),
        })
    }

    fn proof(&self, name: &str) -> Result<&Proof> {
        self.proofs
            .get(name)
            .with_context(|| format!("unknown proof {name:?}"))
    }

    fn signature(&self, name: &str) -> Result<Vec<u8>> {
        Ok(Validator::encode_proof_params(self.proof(name)?)?)
    }

    fn signer(&self, identifier: &Option<Identifier>, proof: &Option<String>) -> Result<Identifier> {
        match (identifier, proof) {
            (Some(id), _) => Ok(*id),
            (None, Some(name)) => self
                .identifiers
                .get(name)
                .copied()
                .with_context(|| format!("unknown proof {name:?}")),
            (None, None) => bail!("signer step needs `identifier` or `proof`"),
        }
    }

    fn current_previous_owner(&self, account: Address, old_owner: Address) -> Option<Address> {
        self.recovery
            .read()
            .gateway()
            .get(account)
            .and_then(|safe| safe.previous_owner_of(old_owner))
    }
}

fn outcome_of_error(err: &ModuleError) -> (String, Option<String>) {
    (err.kind().to_string(), Some(err.to_string()))
}

fn build_proof(name: &str, setup: &ProofSetup) -> Proof {
    let raw = setup.raw.as_deref().unwrap_or(name);
    Proof {
        vkey_hash: Bytes32::ZERO,
        proof: raw.as_bytes().to_vec(),
        public_inputs: Vec::new(),
        committed_inputs: setup.identity.as_bytes().to_vec(),
        committed_input_counts: vec![setup.identity.len() as u64],
        validity_period_secs: 7 * 24 * 3600,
        domain: setup.domain.clone(),
        scope: setup.scope.clone(),
        dev_mode: true,
    }
}

fn bound_data(name: &str, setup: &ProofSetup, registry: &SafeRegistry) -> Result<BoundData> {
    let mut bound = BoundData {
        user_address: setup.bind_account,
        custom_data: None,
    };
    if let Some(swap) = &setup.bind_swap {
        let previous_owner = match swap.previous_owner {
            Some(previous) => previous,
            None => registry
                .get(swap.account)
                .and_then(|safe| safe.previous_owner_of(swap.old_owner))
                .with_context(|| {
                    format!(
                        "proof {name}: cannot resolve previous owner of {} in {}",
                        swap.old_owner, swap.account
                    )
                })?,
        };
        let binding = SwapBinding {
            previous_owner,
            old_owner: swap.old_owner,
            new_owner: swap.new_owner,
            account: swap.account,
        };
        bound = BoundData::for_swap(&binding);
    }
    Ok(bound)
}

/// Parse a scenario file.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse scenario: {}", path.display()))
}

/// Execute the simulate subcommand.
///
/// Exit code 0 when every step met its expectation, 1 otherwise.
pub fn run_simulate(args: &SimulateArgs, config: Option<&ModuleConfig>) -> Result<u8> {
    let scenario = load_scenario(&args.scenario)?;
    let config = config
        .cloned()
        .or_else(|| scenario.config.clone())
        .unwrap_or_default();
    crate::check_module_config(&config)?;

    let simulation = Simulation::build(&scenario, &config)?;
    let report = simulation.run(scenario.name.clone(), &scenario.steps)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.passed {
        tracing::info!(steps = report.steps.len(), "scenario passed");
        Ok(0)
    } else {
        let failed = report.steps.iter().filter(|s| !s.passed).count();
        tracing::error!(failed, "scenario failed");
        Ok(1)
    }
}
