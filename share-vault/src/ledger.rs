use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use tracing::debug;

use crate::{
    error::{Quantity, Result, VaultError},
    pricing,
};

/// Share accounting for a pool of a single underlying asset.
///
/// Every mutating operation validates and prices first, then commits. When a
/// `*_with` variant is used, the settlement callback runs between those two
/// steps, so a failed asset movement leaves the ledger untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareLedger {
    total_assets: U256,
    total_shares: U256,
    shares: HashMap<Address, U256>,
}

impl ShareLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // -- GETTER FUNCTIONS ----------------------------------------------------
    pub fn total_assets(&self) -> U256 {
        self.total_assets
    }

    pub fn total_shares(&self) -> U256 {
        self.total_shares
    }

    pub fn shares_of(&self, account: Address) -> U256 {
        self.shares.get(&account).copied().unwrap_or_default()
    }

    pub fn convert_to_shares(&self, assets: U256) -> Result<U256> {
        pricing::convert_to_shares(assets, self.total_shares, self.total_assets)
            .ok_or(VaultError::ArithmeticOverflow)
    }

    pub fn convert_to_assets(&self, shares: U256) -> Result<U256> {
        pricing::convert_to_assets(shares, self.total_shares, self.total_assets)
            .ok_or(VaultError::ArithmeticOverflow)
    }

    /// Shares a deposit of `amount` would mint right now.
    pub fn preview_deposit(&self, amount: U256) -> Result<U256> {
        if amount.is_zero() {
            return Err(VaultError::InvalidAmount(Quantity::Amount));
        }

        let minted = self.convert_to_shares(amount)?;
        // Both totals must still fit after the deposit.
        self.total_assets
            .checked_add(amount)
            .ok_or(VaultError::ArithmeticOverflow)?;
        self.total_shares
            .checked_add(minted)
            .ok_or(VaultError::ArithmeticOverflow)?;

        Ok(minted)
    }

    /// Assets `account` would receive for burning `shares` right now.
    pub fn preview_withdraw(&self, account: Address, shares: U256) -> Result<U256> {
        if shares.is_zero() {
            return Err(VaultError::InvalidAmount(Quantity::Shares));
        }

        let available = self.shares_of(account);
        if available < shares {
            return Err(VaultError::InsufficientShares {
                available,
                requested: shares,
            });
        }

        let assets = self.convert_to_assets(shares)?;
        if assets > self.total_assets {
            return Err(VaultError::InsufficientAssets {
                available: self.total_assets,
                requested: assets,
            });
        }

        Ok(assets)
    }

    // -- STATE MODIFYING FUNCTIONS -------------------------------------------
    pub fn deposit(&mut self, account: Address, amount: U256) -> Result<U256> {
        self.deposit_with(account, amount, |_| Ok::<_, VaultError>(()))
    }

    /// Deposits `amount` for `account`, running `settle` with the minted share
    /// count before anything is committed.
    pub fn deposit_with<E>(
        &mut self,
        account: Address,
        amount: U256,
        settle: impl FnOnce(U256) -> core::result::Result<(), E>,
    ) -> Result<U256>
    where
        VaultError: From<E>,
    {
        let minted = self.preview_deposit(amount)?;
        settle(minted)?;

        self.total_assets += amount;
        self.total_shares += minted;
        *self.shares.entry(account).or_default() += minted;

        debug!(
            "Deposit: {} assets -> {} shares for {} (totals: {} assets, {} shares)",
            amount, minted, account, self.total_assets, self.total_shares
        );
        Ok(minted)
    }

    pub fn withdraw(&mut self, account: Address, shares: U256) -> Result<U256> {
        self.withdraw_with(account, shares, |_| Ok::<_, VaultError>(()))
    }

    /// Burns `shares` owned by `account`, running `settle` with the redeemed
    /// asset amount before anything is committed.
    pub fn withdraw_with<E>(
        &mut self,
        account: Address,
        shares: U256,
        settle: impl FnOnce(U256) -> core::result::Result<(), E>,
    ) -> Result<U256>
    where
        VaultError: From<E>,
    {
        let assets = self.preview_withdraw(account, shares)?;
        settle(assets)?;

        let balance = self.shares.entry(account).or_default();
        *balance -= shares;
        if balance.is_zero() {
            self.shares.remove(&account);
        }
        self.total_shares -= shares;
        self.total_assets -= assets;

        debug!(
            "Withdraw: {} shares -> {} assets for {} (totals: {} assets, {} shares)",
            shares, assets, account, self.total_assets, self.total_shares
        );
        Ok(assets)
    }

    pub fn withdraw_all(&mut self, account: Address) -> Result<U256> {
        self.withdraw(account, self.shares_of(account))
    }

    /// Books `amount` of assets without minting shares, raising the price of
    /// every outstanding share.
    pub fn donate(&mut self, amount: U256) -> Result<()> {
        self.donate_with(amount, |_| Ok::<_, VaultError>(()))
    }

    pub fn donate_with<E>(
        &mut self,
        amount: U256,
        settle: impl FnOnce(U256) -> core::result::Result<(), E>,
    ) -> Result<()>
    where
        VaultError: From<E>,
    {
        let total_assets = self
            .total_assets
            .checked_add(amount)
            .ok_or(VaultError::ArithmeticOverflow)?;
        settle(amount)?;

        self.total_assets = total_assets;

        debug!("Donation: {} assets (total: {})", amount, self.total_assets);
        Ok(())
    }

    /// Removes `amount` of assets without burning shares, lowering the price
    /// of every outstanding share.
    pub fn remove_assets(&mut self, amount: U256) -> Result<()> {
        self.remove_assets_with(amount, |_| Ok::<_, VaultError>(()))
    }

    pub fn remove_assets_with<E>(
        &mut self,
        amount: U256,
        settle: impl FnOnce(U256) -> core::result::Result<(), E>,
    ) -> Result<()>
    where
        VaultError: From<E>,
    {
        if amount.is_zero() {
            return Err(VaultError::InvalidAmount(Quantity::Amount));
        }
        if amount > self.total_assets {
            return Err(VaultError::InsufficientAssets {
                available: self.total_assets,
                requested: amount,
            });
        }
        settle(amount)?;

        self.total_assets -= amount;

        debug!(
            "Assets removed: {} (totals: {} assets, {} shares)",
            amount, self.total_assets, self.total_shares
        );
        Ok(())
    }
}
