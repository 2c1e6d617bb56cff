use alloy_primitives::{Address, Log, U256};
use tracing::{info, warn};

use crate::{
    error::{Result, VaultError},
    events::{Deposit, EmergencyWithdraw, OwnershipTransferred, VaultEvent, Withdraw},
    ledger::ShareLedger,
    token::Erc20,
};

/// A share vault over a single ERC-20 asset.
///
/// The vault does not own its token ledger: every call that moves assets
/// borrows it, and the token movement and the share accounting commit
/// together or not at all.
#[derive(Debug, Clone)]
pub struct Vault {
    address: Address,
    asset: Address,
    owner: Address,
    ledger: ShareLedger,
    events: Vec<VaultEvent>,
}

impl Vault {
    // -- CONSTRUCTOR ---------------------------------------------------------
    pub fn new(address: Address, asset: Address, owner: Address) -> Self {
        info!(
            "Deployed vault at {} for asset {} (owner {})",
            address, asset, owner
        );
        Self {
            address,
            asset,
            owner,
            ledger: ShareLedger::new(),
            events: Vec::new(),
        }
    }

    // -- STATE MODIFYING FUNCTIONS -------------------------------------------
    /// Pulls `amount` of the asset from `caller` and mints shares for it.
    ///
    /// The caller must have approved the vault for at least `amount`.
    pub fn deposit(&mut self, token: &mut Erc20, caller: Address, amount: U256) -> Result<U256> {
        self.check_asset(token)?;

        let vault = self.address;
        let shares = self.ledger.deposit_with(caller, amount, |_| {
            token.transfer_from(vault, caller, vault, amount)
        })?;

        self.emit(Deposit {
            depositor: caller,
            amount,
            shares,
        });
        Ok(shares)
    }

    /// Burns `shares` of `caller` and sends the redeemed assets back.
    pub fn withdraw(&mut self, token: &mut Erc20, caller: Address, shares: U256) -> Result<U256> {
        self.check_asset(token)?;

        let vault = self.address;
        let assets = self
            .ledger
            .withdraw_with(caller, shares, |assets| token.transfer(vault, caller, assets))?;

        self.emit(Withdraw {
            withdrawer: caller,
            shares,
            assets,
        });
        Ok(assets)
    }

    pub fn withdraw_all(&mut self, token: &mut Erc20, caller: Address) -> Result<U256> {
        let shares = self.ledger.shares_of(caller);
        self.withdraw(token, caller, shares)
    }

    /// Sends `amount` of the asset from `caller` to the vault and books it as
    /// assets without minting shares.
    pub fn donate(&mut self, token: &mut Erc20, caller: Address, amount: U256) -> Result<()> {
        self.check_asset(token)?;

        let vault = self.address;
        self.ledger
            .donate_with(amount, |amount| token.transfer(caller, vault, amount))?;
        Ok(())
    }

    /// Owner-only escape hatch: moves `amount` of the asset to the owner and
    /// lowers total assets without touching any share balance.
    ///
    /// Every remaining holder's shares are worth less afterwards.
    pub fn emergency_withdraw(
        &mut self,
        token: &mut Erc20,
        caller: Address,
        amount: U256,
    ) -> Result<()> {
        self.only_owner(caller)?;
        self.check_asset(token)?;

        let vault = self.address;
        let owner = self.owner;
        self.ledger
            .remove_assets_with(amount, |amount| token.transfer(vault, owner, amount))?;

        warn!(
            "Emergency withdrawal of {} by {}: {} assets now back {} shares",
            amount,
            owner,
            self.ledger.total_assets(),
            self.ledger.total_shares()
        );
        self.emit(EmergencyWithdraw { amount });
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<()> {
        self.only_owner(caller)?;
        if new_owner.is_zero() {
            return Err(VaultError::ZeroAddress);
        }

        let previous_owner = self.owner;
        self.owner = new_owner;

        info!("Vault ownership: {} -> {}", previous_owner, new_owner);
        self.emit(OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        Ok(())
    }

    // -- GETTER FUNCTIONS ----------------------------------------------------
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn asset(&self) -> Address {
        self.asset
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn total_assets(&self) -> U256 {
        self.ledger.total_assets()
    }

    pub fn total_shares(&self) -> U256 {
        self.ledger.total_shares()
    }

    pub fn shares_of(&self, account: Address) -> U256 {
        self.ledger.shares_of(account)
    }

    pub fn convert_to_shares(&self, assets: U256) -> Result<U256> {
        self.ledger.convert_to_shares(assets)
    }

    pub fn convert_to_assets(&self, shares: U256) -> Result<U256> {
        self.ledger.convert_to_assets(shares)
    }

    pub fn preview_deposit(&self, amount: U256) -> Result<U256> {
        self.ledger.preview_deposit(amount)
    }

    pub fn preview_withdraw(&self, account: Address, shares: U256) -> Result<U256> {
        self.ledger.preview_withdraw(account, shares)
    }

    pub fn ledger(&self) -> &ShareLedger {
        &self.ledger
    }

    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    pub fn last_event(&self) -> Option<&VaultEvent> {
        self.events.last()
    }

    pub fn logs(&self) -> Vec<Log> {
        self.events.iter().map(|e| e.to_log(self.address)).collect()
    }

    // -- INTERNAL FUNCTIONS --------------------------------------------------
    fn only_owner(&self, caller: Address) -> Result<()> {
        if caller != self.owner {
            return Err(VaultError::Unauthorized { caller });
        }
        Ok(())
    }

    fn check_asset(&self, token: &Erc20) -> Result<()> {
        if token.address() != self.asset {
            return Err(VaultError::AssetMismatch {
                expected: self.asset,
                found: token.address(),
            });
        }
        Ok(())
    }

    fn emit(&mut self, event: impl Into<VaultEvent>) {
        self.events.push(event.into());
    }
}
