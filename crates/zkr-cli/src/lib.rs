//! # zkr-cli: CLI Tool for Proof-Gated Safe Recovery
//!
//! Provides the `zkr` command-line interface.
//!
//! ## Subcommands
//!
//! - `zkr proof`: Encode, decode and fingerprint proof parameters.
//! - `zkr safe`: Owner-list helpers: the previous owner to pass to a
//!   recovery, and the swap binding a recovery proof must commit to.
//! - `zkr simulate`: Run a YAML scenario against both modules with a
//!   scripted proof oracle and print the outcome as JSON.
//!
//! ```bash
//! zkr proof encode proof.json
//! zkr safe previous-owner --safe 0x…5afe --owners 0x…a,0x…b --owner 0x…b
//! zkr --config modules.yaml simulate demos/recovery.yaml
//! ```

pub mod proof;
pub mod safe;
pub mod simulate;

use std::path::Path;

use anyhow::{Context, Result};

use zkr_state::ModuleConfig;

/// Load and validate a module configuration file (YAML or JSON).
pub fn load_module_config(path: &Path) -> Result<ModuleConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let config: ModuleConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;
    check_module_config(&config)?;
    Ok(config)
}

/// Fail with every validation message if `config` is invalid.
pub fn check_module_config(config: &ModuleConfig) -> Result<()> {
    config.check().context("module configuration rejected")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_config_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "recovery:\n  require_swap_binding: false\n").unwrap();
        let config = load_module_config(file.path()).unwrap();
        assert!(!config.recovery.require_swap_binding);
        assert!(config.recovery.recovery_replay_protection);
    }

    #[test]
    fn load_config_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "validator:\n  expected_scope: \"\"\n").unwrap();
        let err = load_module_config(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("expected_scope"));
    }

    #[test]
    fn load_config_missing_file() {
        let err = load_module_config(Path::new("/nonexistent/zkr.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
