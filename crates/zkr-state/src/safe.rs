//! # Safe Owner List
//!
//! The account side of recovery. The recovery module only needs one
//! capability from an account, replacing an owner, expressed as the
//! [`OwnerSwap`] trait. [`SafeAccount`] is an in-memory account that keeps
//! owners the way a Safe does, and [`SafeRegistry`] routes swaps to the
//! right account by address.
//!
//! ## Owner list
//!
//! Owners form a singly-linked list that starts and ends at the sentinel
//! address `0x…01`:
//!
//! ```text
//! SENTINEL → owner_a → owner_b → SENTINEL
//! ```
//!
//! Replacing `old` requires naming the owner that links to it
//! (`previous`), which is the sentinel when `old` heads the list.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use zkr_core::Address;

/// Why an account refused an owner swap.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
    /// No account is known at this address.
    #[error("unknown account {account}")]
    UnknownAccount { account: Address },

    /// The calling module is not enabled on the account.
    #[error("module {module} is not enabled")]
    ModuleNotEnabled { module: Address },

    /// The new or old owner is the null or sentinel address.
    #[error("invalid owner address {owner}")]
    InvalidOwner { owner: Address },

    /// The new owner already owns the account.
    #[error("address {owner} is already an owner")]
    DuplicateOwner { owner: Address },

    /// `previous` does not link to `old` in the owner list.
    #[error("{previous} does not point to {old}")]
    InvalidPreviousOwner { previous: Address, old: Address },

    /// The account rejected the transaction outright.
    #[error("transaction rejected: {0}")]
    Rejected(String),
}

/// An account that lets an enabled module replace one of its owners.
pub trait OwnerSwap {
    /// Replace `old` with `new` in `account`'s owner list, on behalf of
    /// `module`. `previous` is the owner linking to `old`.
    fn swap_owner(
        &mut self,
        module: Address,
        account: Address,
        previous: Address,
        old: Address,
        new: Address,
    ) -> Result<(), SwapError>;
}

impl<T: OwnerSwap + ?Sized> OwnerSwap for &mut T {
    fn swap_owner(
        &mut self,
        module: Address,
        account: Address,
        previous: Address,
        old: Address,
        new: Address,
    ) -> Result<(), SwapError> {
        (**self).swap_owner(module, account, previous, old, new)
    }
}

// ─── Account ────────────────────────────────────────────────────────

/// In-memory multi-owner account.
#[derive(Debug, Clone)]
pub struct SafeAccount {
    address: Address,
    owners: HashMap<Address, Address>,
    modules: HashSet<Address>,
    should_fail: bool,
}

impl SafeAccount {
    /// Create an account with `owners` in list order.
    pub fn new(address: Address, owners: &[Address]) -> Result<Self, SwapError> {
        if address.is_zero() {
            return Err(SwapError::Rejected("account address is zero".to_string()));
        }
        if owners.is_empty() {
            return Err(SwapError::Rejected("account needs at least one owner".to_string()));
        }
        let mut links = HashMap::with_capacity(owners.len() + 1);
        let mut current = Address::SENTINEL;
        for &owner in owners {
            if owner.is_zero() || owner.is_sentinel() {
                return Err(SwapError::InvalidOwner { owner });
            }
            if owner == current || links.contains_key(&owner) {
                return Err(SwapError::DuplicateOwner { owner });
            }
            links.insert(current, owner);
            current = owner;
        }
        links.insert(current, Address::SENTINEL);
        Ok(Self {
            address,
            owners: links,
            modules: HashSet::new(),
            should_fail: false,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Owners in list order.
    pub fn owners(&self) -> Vec<Address> {
        let mut out = Vec::with_capacity(self.owners.len().saturating_sub(1));
        let mut current = self.next(Address::SENTINEL);
        while let Some(owner) = current.filter(|a| !a.is_sentinel()) {
            out.push(owner);
            current = self.next(owner);
        }
        out
    }

    pub fn is_owner(&self, address: Address) -> bool {
        !address.is_sentinel() && self.owners.contains_key(&address)
    }

    /// The entry linking to `owner`: the sentinel for the first owner,
    /// otherwise the owner before it. `None` if `owner` is not an owner.
    pub fn previous_owner_of(&self, owner: Address) -> Option<Address> {
        if !self.is_owner(owner) {
            return None;
        }
        self.owners
            .iter()
            .find_map(|(prev, next)| (*next == owner).then_some(*prev))
    }

    pub fn enable_module(&mut self, module: Address) {
        self.modules.insert(module);
    }

    pub fn disable_module(&mut self, module: Address) {
        self.modules.remove(&module);
    }

    pub fn is_module_enabled(&self, module: Address) -> bool {
        self.modules.contains(&module)
    }

    /// Make every subsequent swap fail, as a broken or hostile account
    /// would.
    pub fn set_should_fail(&mut self, should_fail: bool) {
        self.should_fail = should_fail;
    }

    fn next(&self, address: Address) -> Option<Address> {
        self.owners.get(&address).copied()
    }

    fn apply_swap(
        &mut self,
        module: Address,
        previous: Address,
        old: Address,
        new: Address,
    ) -> Result<(), SwapError> {
        if self.should_fail {
            return Err(SwapError::Rejected("account execution failed".to_string()));
        }
        if !self.is_module_enabled(module) {
            return Err(SwapError::ModuleNotEnabled { module });
        }
        if new.is_zero() || new.is_sentinel() {
            return Err(SwapError::InvalidOwner { owner: new });
        }
        if self.owners.contains_key(&new) {
            return Err(SwapError::DuplicateOwner { owner: new });
        }
        if old.is_zero() || old.is_sentinel() {
            return Err(SwapError::InvalidOwner { owner: old });
        }
        if self.next(previous) != Some(old) {
            return Err(SwapError::InvalidPreviousOwner { previous, old });
        }
        let after_old = self
            .owners
            .remove(&old)
            .ok_or(SwapError::InvalidPreviousOwner { previous, old })?;
        self.owners.insert(new, after_old);
        self.owners.insert(previous, new);
        Ok(())
    }
}

impl OwnerSwap for SafeAccount {
    fn swap_owner(
        &mut self,
        module: Address,
        account: Address,
        previous: Address,
        old: Address,
        new: Address,
    ) -> Result<(), SwapError> {
        if account != self.address {
            return Err(SwapError::UnknownAccount { account });
        }
        self.apply_swap(module, previous, old, new)
    }
}

// ─── Registry ───────────────────────────────────────────────────────

/// A set of accounts addressed by their own address.
#[derive(Debug, Clone, Default)]
pub struct SafeRegistry {
    accounts: HashMap<Address, SafeAccount>,
}

impl SafeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account, replacing any account at the same address.
    pub fn insert(&mut self, account: SafeAccount) {
        self.accounts.insert(account.address(), account);
    }

    pub fn get(&self, address: Address) -> Option<&SafeAccount> {
        self.accounts.get(&address)
    }

    pub fn get_mut(&mut self, address: Address) -> Option<&mut SafeAccount> {
        self.accounts.get_mut(&address)
    }

    pub fn contains(&self, address: Address) -> bool {
        self.accounts.contains_key(&address)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl OwnerSwap for SafeRegistry {
    fn swap_owner(
        &mut self,
        module: Address,
        account: Address,
        previous: Address,
        old: Address,
        new: Address,
    ) -> Result<(), SwapError> {
        self.accounts
            .get_mut(&account)
            .ok_or(SwapError::UnknownAccount { account })?
            .apply_swap(module, previous, old, new)
    }
}
