use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy_primitives::{Address, U256};

use crate::{error::Result, token::Erc20, vault::Vault};

/// The vault and its asset ledger, locked together.
#[derive(Debug)]
pub struct VaultState {
    pub vault: Vault,
    pub token: Erc20,
}

/// Cloneable handle that serializes every operation on a vault and its
/// token behind one lock.
///
/// Pricing reads and the mutation that follows them happen under the same
/// guard, so concurrent deposits and withdrawals never interleave.
#[derive(Debug, Clone)]
pub struct SharedVault {
    inner: Arc<Mutex<VaultState>>,
}

impl SharedVault {
    pub fn new(vault: Vault, token: Erc20) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VaultState { vault, token })),
        }
    }

    /// Runs `f` with exclusive access to the vault and token.
    pub fn with<R>(&self, f: impl FnOnce(&mut Vault, &mut Erc20) -> R) -> R {
        let mut state = self.lock();
        let VaultState { vault, token } = &mut *state;
        f(vault, token)
    }

    pub fn deposit(&self, caller: Address, amount: U256) -> Result<U256> {
        self.with(|vault, token| vault.deposit(token, caller, amount))
    }

    pub fn withdraw(&self, caller: Address, shares: U256) -> Result<U256> {
        self.with(|vault, token| vault.withdraw(token, caller, shares))
    }

    pub fn withdraw_all(&self, caller: Address) -> Result<U256> {
        self.with(|vault, token| vault.withdraw_all(token, caller))
    }

    pub fn emergency_withdraw(&self, caller: Address, amount: U256) -> Result<()> {
        self.with(|vault, token| vault.emergency_withdraw(token, caller, amount))
    }

    pub fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<()> {
        self.with(|vault, _| vault.transfer_ownership(caller, new_owner))
    }

    pub fn convert_to_shares(&self, assets: U256) -> Result<U256> {
        self.with(|vault, _| vault.convert_to_shares(assets))
    }

    pub fn convert_to_assets(&self, shares: U256) -> Result<U256> {
        self.with(|vault, _| vault.convert_to_assets(shares))
    }

    /// Consumes the handle, returning the state if no other clone is alive.
    pub fn into_inner(self) -> Option<VaultState> {
        Arc::into_inner(self.inner)
            .map(|state| state.into_inner().unwrap_or_else(PoisonError::into_inner))
    }

    // Every operation is all-or-nothing, so state behind a poisoned lock is
    // still consistent.
    fn lock(&self) -> MutexGuard<'_, VaultState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
