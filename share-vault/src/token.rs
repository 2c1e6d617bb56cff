use std::collections::HashMap;

use alloy_primitives::{Address, Log, U256};
use tracing::{debug, info};

use crate::{
    error::TokenError,
    events::{Approval, TokenEvent, Transfer},
};

type Result<T> = core::result::Result<T, TokenError>;

/// In-memory ERC-20 token ledger.
///
/// Every state-modifying call takes the account that signs it as `caller`.
/// Checks run before any balance moves, so a failed call changes nothing.
#[derive(Debug, Clone)]
pub struct Erc20 {
    address: Address,
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<Address, HashMap<Address, U256>>,
    events: Vec<TokenEvent>,
}

impl Erc20 {
    // -- CONSTRUCTOR ---------------------------------------------------------
    /// Deploys the token at `address`, crediting the whole initial supply to
    /// `deployer`.
    pub fn new(
        address: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        initial_supply: U256,
        deployer: Address,
    ) -> Self {
        let mut token = Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            total_supply: initial_supply,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            events: Vec::new(),
        };

        token.balances.insert(deployer, initial_supply);
        token.emit(Transfer {
            sender: Address::ZERO,
            receiver: deployer,
            value: initial_supply,
        });

        info!(
            "Deployed token {} ({}) at {} with supply {}",
            token.name, token.symbol, address, initial_supply
        );
        token
    }

    // -- STATE MODIFYING FUNCTIONS -------------------------------------------
    pub fn transfer(&mut self, caller: Address, to: Address, value: U256) -> Result<()> {
        self.move_balance(caller, to, value)
    }

    pub fn approve(&mut self, caller: Address, spender: Address, value: U256) -> Result<()> {
        if spender.is_zero() {
            return Err(TokenError::ZeroAddressApproval);
        }

        self.set_allowance(caller, spender, value);
        Ok(())
    }

    /// Moves `value` from `from` to `to` on behalf of `caller`, consuming
    /// allowance.
    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<()> {
        if to.is_zero() {
            return Err(TokenError::ZeroAddressTransfer);
        }

        let allowance = self.allowance(from, caller);
        if allowance < value {
            return Err(TokenError::InsufficientAllowance {
                available: allowance,
                required: value,
            });
        }

        self.move_balance(from, to, value)?;
        self.allowances
            .entry(from)
            .or_default()
            .insert(caller, allowance - value);
        Ok(())
    }

    pub fn increase_allowance(
        &mut self,
        caller: Address,
        spender: Address,
        added: U256,
    ) -> Result<()> {
        if spender.is_zero() {
            return Err(TokenError::ZeroAddressApproval);
        }

        let current = self.allowance(caller, spender);
        let value = current.checked_add(added).ok_or(TokenError::Overflow)?;
        self.set_allowance(caller, spender, value);
        Ok(())
    }

    pub fn decrease_allowance(
        &mut self,
        caller: Address,
        spender: Address,
        subtracted: U256,
    ) -> Result<()> {
        if spender.is_zero() {
            return Err(TokenError::ZeroAddressApproval);
        }

        let current = self.allowance(caller, spender);
        let value = current
            .checked_sub(subtracted)
            .ok_or(TokenError::AllowanceBelowZero {
                current,
                subtracted,
            })?;
        self.set_allowance(caller, spender, value);
        Ok(())
    }

    // -- GETTER FUNCTIONS ----------------------------------------------------
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&owner)
            .and_then(|spenders| spenders.get(&spender))
            .copied()
            .unwrap_or_default()
    }

    /// Events emitted so far, oldest first.
    pub fn events(&self) -> &[TokenEvent] {
        &self.events
    }

    pub fn last_event(&self) -> Option<&TokenEvent> {
        self.events.last()
    }

    /// The event journal encoded as logs of this token's address.
    pub fn logs(&self) -> Vec<Log> {
        self.events.iter().map(|e| e.to_log(self.address)).collect()
    }

    // -- INTERNAL FUNCTIONS --------------------------------------------------
    fn move_balance(&mut self, from: Address, to: Address, value: U256) -> Result<()> {
        if to.is_zero() {
            return Err(TokenError::ZeroAddressTransfer);
        }

        let from_balance = self.balance_of(from);
        if from_balance < value {
            return Err(TokenError::InsufficientBalance {
                available: from_balance,
                required: value,
            });
        }

        if from != to {
            let to_balance = self
                .balance_of(to)
                .checked_add(value)
                .ok_or(TokenError::Overflow)?;
            self.balances.insert(from, from_balance - value);
            self.balances.insert(to, to_balance);
        }

        debug!("Transfer: {} -> {} ({})", from, to, value);
        self.emit(Transfer {
            sender: from,
            receiver: to,
            value,
        });
        Ok(())
    }

    fn set_allowance(&mut self, owner: Address, spender: Address, value: U256) {
        self.allowances
            .entry(owner)
            .or_default()
            .insert(spender, value);

        debug!("Approval: {} allows {} to spend {}", owner, spender, value);
        self.emit(Approval {
            owner,
            spender,
            value,
        });
    }

    fn emit(&mut self, event: impl Into<TokenEvent>) {
        self.events.push(event.into());
    }
}
