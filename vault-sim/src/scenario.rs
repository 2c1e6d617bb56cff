use alloy_primitives::{Address, U256};
use eyre::{bail, Result, WrapErr};
use share_vault::{Erc20, Vault, VaultError};
use std::{collections::BTreeSet, fmt};
use tracing::{debug, info};

use crate::config::{parse_amount, parse_shares, Action, SimConfig, Step};

/// A token and a vault deployed in memory, ready to replay a scenario.
#[derive(Debug)]
pub struct Simulation {
    deployer: Address,
    token: Erc20,
    vault: Vault,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holder {
    pub account: Address,
    pub shares: U256,
    pub redeemable: U256,
    pub token_balance: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub token: Address,
    pub vault: Address,
    pub owner: Address,
    pub steps_run: usize,
    pub reverts: usize,
    pub total_assets: U256,
    pub total_shares: U256,
    pub vault_balance: U256,
    pub holders: Vec<Holder>,
}

impl Simulation {
    /// Deploys the token as the deployer's first contract and the vault as
    /// its second.
    pub fn deploy(config: &SimConfig) -> Result<Self> {
        let deployer = config.deployer;
        let token = Erc20::new(
            deployer.create(0),
            config.token.name.clone(),
            config.token.symbol.clone(),
            config.token.decimals,
            config.token.initial_supply()?,
            deployer,
        );
        let vault = Vault::new(deployer.create(1), token.address(), deployer);

        Ok(Self {
            deployer,
            token,
            vault,
            steps: config.steps.clone(),
        })
    }

    pub fn token(&self) -> &Erc20 {
        &self.token
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    /// Replays every step, failing on the first outcome that differs from
    /// what the step expects.
    pub fn run(&mut self) -> Result<Report> {
        if self.steps.is_empty() {
            info!("No steps configured");
        }

        let steps = std::mem::take(&mut self.steps);
        let mut reverts = 0;

        for (i, step) in steps.iter().enumerate() {
            let n = i + 1;
            debug!("Step {}: {:?}", n, step.action);

            match (self.execute(&step.action)?, &step.expect_revert) {
                (Ok(()), None) => info!("Step {} ok", n),
                (Err(err), Some(reason)) if err.matches_revert_reason(reason) => {
                    reverts += 1;
                    info!("Step {} reverted as expected: {}", n, err);
                }
                (Err(err), Some(reason)) => {
                    bail!("Step {n} reverted with {err:?}, expected revert {reason:?}")
                }
                (Err(err), None) => {
                    return Err(err).wrap_err_with(|| format!("Step {n} failed: {:?}", step.action))
                }
                (Ok(()), Some(reason)) => {
                    bail!("Step {n} succeeded, expected revert {reason:?}")
                }
            }
        }

        let report = self.report(&steps, reverts);
        self.steps = steps;
        Ok(report)
    }

    /// Runs one action. The outer error is a malformed step, the inner one a
    /// revert.
    fn execute(&mut self, action: &Action) -> Result<Result<(), VaultError>> {
        let decimals = self.token.decimals();
        let token = &mut self.token;
        let vault = &mut self.vault;

        let outcome = match action {
            Action::Fund { to, amount } => {
                let amount = parse_amount(amount, decimals)?;
                token
                    .transfer(self.deployer, *to, amount)
                    .map_err(VaultError::from)
            }
            Action::Approve { from, amount } => {
                let amount = parse_amount(amount, decimals)?;
                token
                    .approve(*from, vault.address(), amount)
                    .map_err(VaultError::from)
            }
            Action::Deposit { from, amount } => {
                let amount = parse_amount(amount, decimals)?;
                vault.deposit(token, *from, amount).map(|shares| {
                    info!("{} deposited {} for {} shares", from, amount, shares);
                })
            }
            Action::Withdraw { from, shares } => {
                let shares = parse_shares(shares)?;
                vault.withdraw(token, *from, shares).map(|assets| {
                    info!("{} burned {} shares for {} assets", from, shares, assets);
                })
            }
            Action::WithdrawAll { from } => vault.withdraw_all(token, *from).map(|assets| {
                info!("{} withdrew everything: {} assets", from, assets);
            }),
            Action::Donate { from, amount, book } => {
                let amount = parse_amount(amount, decimals)?;
                if *book {
                    vault.donate(token, *from, amount)
                } else {
                    token
                        .transfer(*from, vault.address(), amount)
                        .map_err(VaultError::from)
                }
            }
            Action::EmergencyWithdraw { from, amount } => {
                let amount = parse_amount(amount, decimals)?;
                vault.emergency_withdraw(token, *from, amount)
            }
            Action::TransferOwnership { from, new_owner } => {
                vault.transfer_ownership(*from, *new_owner)
            }
        };

        Ok(outcome)
    }

    fn report(&self, steps: &[Step], reverts: usize) -> Report {
        let accounts: BTreeSet<Address> = steps
            .iter()
            .flat_map(|step| step.action.accounts())
            .filter(|account| *account != self.vault.address())
            .collect();

        let holders = accounts
            .into_iter()
            .map(|account| {
                let shares = self.vault.shares_of(account);
                Holder {
                    account,
                    shares,
                    redeemable: self.vault.convert_to_assets(shares).unwrap_or_default(),
                    token_balance: self.token.balance_of(account),
                }
            })
            .collect();

        Report {
            token: self.token.address(),
            vault: self.vault.address(),
            owner: self.vault.owner(),
            steps_run: steps.len(),
            reverts,
            total_assets: self.vault.total_assets(),
            total_shares: self.vault.total_shares(),
            vault_balance: self.token.balance_of(self.vault.address()),
            holders,
        }
    }
}

impl Action {
    /// Accounts whose balances this action touches, besides the vault.
    pub fn accounts(&self) -> Vec<Address> {
        match self {
            Self::Fund { to, .. } => vec![*to],
            Self::Approve { from, .. }
            | Self::Deposit { from, .. }
            | Self::Withdraw { from, .. }
            | Self::WithdrawAll { from }
            | Self::Donate { from, .. }
            | Self::EmergencyWithdraw { from, .. } => vec![*from],
            Self::TransferOwnership { from, new_owner } => vec![*from, *new_owner],
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation report:")?;
        writeln!(f, "> token: {}", self.token)?;
        writeln!(f, "> vault: {} (owner {})", self.vault, self.owner)?;
        writeln!(
            f,
            "> steps: {} ({} expected reverts)",
            self.steps_run, self.reverts
        )?;
        writeln!(
            f,
            "> total assets: {} (vault holds {})",
            self.total_assets, self.vault_balance
        )?;
        writeln!(f, "> total shares: {}", self.total_shares)?;
        for holder in &self.holders {
            writeln!(
                f,
                "  - {}: {} shares (~{} assets), token balance {}",
                holder.account, holder.shares, holder.redeemable, holder.token_balance
            )?;
        }
        Ok(())
    }
}
