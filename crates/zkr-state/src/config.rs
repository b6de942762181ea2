//! # Module Configuration
//!
//! Hardening switches and proof-context constraints for the recovery
//! module and the signature validator. Both structs deserialize from YAML
//! or JSON with every field optional, and validate themselves.

use serde::{Deserialize, Serialize};

use zkr_core::{Proof, ZkrError};

/// Configuration of a [`RecoveryModule`](crate::RecoveryModule).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Require recovery proofs to commit to the exact owner swap
    /// `(previous_owner, old_owner, new_owner, account)` being performed.
    pub require_swap_binding: bool,
    /// Accept each recovery proof at most once.
    pub recovery_replay_protection: bool,
    /// Scope registration proofs must carry, if set.
    pub registration_scope: Option<String>,
    /// Scope recovery proofs must carry, if set.
    pub recovery_scope: Option<String>,
    /// Domain every proof must carry, if set.
    pub expected_domain: Option<String>,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            require_swap_binding: true,
            recovery_replay_protection: true,
            registration_scope: None,
            recovery_scope: None,
            expected_domain: None,
        }
    }
}

impl RecoveryConfig {
    /// Both hardening switches off: any valid proof from the guardian
    /// authorizes any swap, any number of times.
    pub fn unhardened() -> Self {
        Self {
            require_swap_binding: false,
            recovery_replay_protection: false,
            ..Self::default()
        }
    }

    /// Validate the configuration. Returns a list of error messages
    /// (empty = valid).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_non_empty(&mut errors, "registration_scope", &self.registration_scope);
        check_non_empty(&mut errors, "recovery_scope", &self.recovery_scope);
        check_non_empty(&mut errors, "expected_domain", &self.expected_domain);
        if let (Some(reg), Some(rec)) = (&self.registration_scope, &self.recovery_scope) {
            if reg == rec {
                errors.push(format!(
                    "registration_scope and recovery_scope must differ (both are {reg:?})"
                ));
            }
        }
        errors
    }

    pub(crate) fn admits_registration(&self, proof: &Proof) -> bool {
        scope_matches(&self.registration_scope, proof)
            && domain_matches(&self.expected_domain, proof)
    }

    pub(crate) fn admits_recovery(&self, proof: &Proof) -> bool {
        scope_matches(&self.recovery_scope, proof) && domain_matches(&self.expected_domain, proof)
    }
}

/// Configuration of a [`SignatureValidator`](crate::SignatureValidator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Initial state of replay protection. The administrator can toggle it
    /// afterwards.
    pub replay_protection: bool,
    /// Scope signature proofs must carry, if set.
    pub expected_scope: Option<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            replay_protection: true,
            expected_scope: None,
        }
    }
}

impl ValidatorConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_non_empty(&mut errors, "expected_scope", &self.expected_scope);
        errors
    }

    pub(crate) fn admits(&self, proof: &Proof) -> bool {
        scope_matches(&self.expected_scope, proof)
    }
}

/// Combined configuration file accepted by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    pub recovery: RecoveryConfig,
    pub validator: ValidatorConfig,
}

impl ModuleConfig {
    /// Validate both sections, prefixing each message with its section.
    pub fn validate(&self) -> Vec<String> {
        let recovery = self
            .recovery
            .validate()
            .into_iter()
            .map(|e| format!("recovery: {e}"));
        let validator = self
            .validator
            .validate()
            .into_iter()
            .map(|e| format!("validator: {e}"));
        recovery.chain(validator).collect()
    }

    /// Validate both sections, failing with every message at once.
    pub fn check(&self) -> Result<(), ZkrError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ZkrError::Config(errors.join("\n  ")))
        }
    }
}

fn check_non_empty(errors: &mut Vec<String>, field: &str, value: &Option<String>) {
    if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
        errors.push(format!("{field} must not be empty when set"));
    }
}

fn scope_matches(expected: &Option<String>, proof: &Proof) -> bool {
    expected.as_deref().map_or(true, |scope| proof.scope == scope)
}

fn domain_matches(expected: &Option<String>, proof: &Proof) -> bool {
    expected.as_deref().map_or(true, |domain| proof.domain == domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_hardened() {
        let config = RecoveryConfig::default();
        assert!(config.require_swap_binding);
        assert!(config.recovery_replay_protection);
        assert!(ValidatorConfig::default().replay_protection);
        assert!(ModuleConfig::default().validate().is_empty());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: ModuleConfig =
            serde_yaml::from_str("recovery:\n  recovery_scope: recover\n").unwrap();
        assert!(config.recovery.require_swap_binding);
        assert_eq!(config.recovery.recovery_scope.as_deref(), Some("recover"));
        assert!(config.validator.replay_protection);
    }

    #[test]
    fn unhardened_keeps_scopes_unset() {
        let config = RecoveryConfig::unhardened();
        assert!(!config.require_swap_binding);
        assert!(!config.recovery_replay_protection);
        assert!(config.recovery_scope.is_none());
    }

    #[test]
    fn empty_and_shared_scopes_rejected() {
        let config = RecoveryConfig {
            registration_scope: Some("safe".to_string()),
            recovery_scope: Some("safe".to_string()),
            expected_domain: Some("  ".to_string()),
            ..RecoveryConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("expected_domain")));
        assert!(errors.iter().any(|e| e.contains("must differ")));
    }

    #[test]
    fn combined_errors_carry_section() {
        let config = ModuleConfig {
            validator: ValidatorConfig {
                expected_scope: Some(String::new()),
                ..ValidatorConfig::default()
            },
            ..ModuleConfig::default()
        };
        assert_eq!(
            config.validate(),
            vec!["validator: expected_scope must not be empty when set".to_string()]
        );
    }

    #[test]
    fn check_reports_config_error() {
        assert!(ModuleConfig::default().check().is_ok());
        let config = ModuleConfig {
            recovery: RecoveryConfig {
                recovery_scope: Some(String::new()),
                ..RecoveryConfig::default()
            },
            validator: ValidatorConfig {
                expected_scope: Some(String::new()),
                ..ValidatorConfig::default()
            },
        };
        match config.check() {
            Err(ZkrError::Config(msg)) => {
                assert!(msg.contains("recovery: recovery_scope"));
                assert!(msg.contains("validator: expected_scope"));
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
