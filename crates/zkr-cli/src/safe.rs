//! # Safe Subcommand
//!
//! Owner-list helpers for preparing a recovery.
//!
//! ## Subcommands
//!
//! - `previous-owner`: The entry linking to an owner: the sentinel for
//!   the first owner, otherwise the owner before it.
//! - `binding`: The `custom_data` a recovery proof must bind for a swap.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use zkr_core::{hex, Address, SwapBinding};
use zkr_state::SafeAccount;

/// Arguments for the `zkr safe` subcommand.
#[derive(Args, Debug)]
pub struct SafeArgs {
    #[command(subcommand)]
    pub command: SafeCommand,
}

#[derive(Subcommand, Debug)]
pub enum SafeCommand {
    /// Find the previous owner to pass when replacing `owner`.
    PreviousOwner {
        /// Safe address.
        #[arg(long)]
        safe: Address,
        /// Current owners in list order, comma separated.
        #[arg(long, value_delimiter = ',', required = true)]
        owners: Vec<Address>,
        /// Owner to be replaced.
        #[arg(long)]
        owner: Address,
    },

    /// Print the swap binding a recovery proof must commit to.
    Binding {
        /// Safe address.
        #[arg(long)]
        safe: Address,
        /// Current owners in list order, comma separated.
        #[arg(long, value_delimiter = ',', required = true)]
        owners: Vec<Address>,
        /// Owner to be replaced.
        #[arg(long)]
        old_owner: Address,
        /// Replacement owner.
        #[arg(long)]
        new_owner: Address,
    },
}

/// Execute the safe subcommand.
pub fn run_safe(args: &SafeArgs) -> Result<u8> {
    match &args.command {
        SafeCommand::PreviousOwner {
            safe,
            owners,
            owner,
        } => {
            println!("{}", previous_owner(*safe, owners, *owner)?);
        }
        SafeCommand::Binding {
            safe,
            owners,
            old_owner,
            new_owner,
        } => {
            let binding = swap_binding(*safe, owners, *old_owner, *new_owner)?;
            let out = serde_json::json!({
                "binding": binding,
                "userAddress": binding.new_owner,
                "customData": hex::encode_prefixed(&binding.encode()),
                "digest": binding.digest()?.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(0)
}

/// The previous owner of `owner` in a Safe with `owners`.
pub fn previous_owner(safe: Address, owners: &[Address], owner: Address) -> Result<Address> {
    let account = SafeAccount::new(safe, owners).context("invalid owner list")?;
    account
        .previous_owner_of(owner)
        .with_context(|| format!("{owner} is not an owner of {safe}"))
}

/// The binding for replacing `old_owner` with `new_owner`.
pub fn swap_binding(
    safe: Address,
    owners: &[Address],
    old_owner: Address,
    new_owner: Address,
) -> Result<SwapBinding> {
    Ok(SwapBinding {
        previous_owner: previous_owner(safe, owners, old_owner)?,
        old_owner,
        new_owner,
        account: safe,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAFE: Address = Address::from_low_u64(0x5afe);
    const A: Address = Address::from_low_u64(0xa0);
    const B: Address = Address::from_low_u64(0xb0);

    #[test]
    fn head_owner_has_sentinel_predecessor() {
        assert_eq!(previous_owner(SAFE, &[A, B], A).unwrap(), Address::SENTINEL);
        assert_eq!(previous_owner(SAFE, &[A, B], B).unwrap(), A);
    }

    #[test]
    fn unknown_owner_is_an_error() {
        let err = previous_owner(SAFE, &[A], B).unwrap_err();
        assert!(err.to_string().contains("is not an owner"));
    }

    #[test]
    fn repeated_owner_is_an_error() {
        let err = previous_owner(SAFE, &[A, A, B], B).unwrap_err();
        assert!(format!("{err:#}").contains("already an owner"));
        assert!(swap_binding(SAFE, &[A, A, B], B, Address::from_low_u64(0xc0)).is_err());
    }

    #[test]
    fn binding_matches_encoding() {
        let binding = swap_binding(SAFE, &[A, B], B, Address::from_low_u64(0xc0)).unwrap();
        assert_eq!(binding.previous_owner, A);
        assert_eq!(SwapBinding::decode(&binding.encode()), Some(binding));
    }
}
