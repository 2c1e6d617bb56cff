use alloy_primitives::{
    address,
    utils::{parse_units, ParseUnits},
    Address, U256,
};
use eyre::{bail, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "vault-sim.toml";

/// Scenario for a simulated token + vault deployment
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SimConfig {
    /// Account deploying both contracts; it receives the initial supply and
    /// owns the vault
    #[serde(default = "default_deployer")]
    pub deployer: Address,

    /// Token constructor parameters
    #[serde(default)]
    pub token: TokenConfig,

    /// Actions replayed in order after deployment
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TokenConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_symbol")]
    pub symbol: String,

    #[serde(default = "default_decimals")]
    pub decimals: u8,

    /// Whole tokens, scaled by `decimals`
    #[serde(default = "default_initial_supply")]
    pub initial_supply: String,
}

/// One action, optionally expected to revert with the given reason.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Step {
    pub action: Action,

    #[serde(default)]
    pub expect_revert: Option<String>,
}

/// Asset amounts are decimal strings in whole tokens (`"100"`, `"0.5"`) or
/// raw base units with a `wei` suffix (`"1 wei"`). Share counts are always
/// raw integers.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Deployer sends tokens to `to`
    Fund { to: Address, amount: String },
    /// `from` approves the vault
    Approve { from: Address, amount: String },
    Deposit { from: Address, amount: String },
    Withdraw { from: Address, shares: String },
    WithdrawAll { from: Address },
    /// `from` sends tokens to the vault outside of `deposit`. With `book`
    /// unset the vault's accounting does not see them.
    Donate {
        from: Address,
        amount: String,
        #[serde(default)]
        book: bool,
    },
    EmergencyWithdraw { from: Address, amount: String },
    TransferOwnership { from: Address, new_owner: Address },
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            deployer: default_deployer(),
            token: TokenConfig::default(),
            steps: vec![],
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            symbol: default_symbol(),
            decimals: default_decimals(),
            initial_supply: default_initial_supply(),
        }
    }
}

impl SimConfig {
    /// Load configuration from `vault-sim.toml`, or defaults if none exists
    pub fn load() -> Result<Self> {
        match Self::find_config_file()? {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).wrap_err_with(|| format!("Invalid scenario {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Nearest `vault-sim.toml`, starting at the working directory
    fn find_config_file() -> Result<Option<PathBuf>> {
        let cwd = std::env::current_dir()?;
        Ok(Self::find_config_in(&cwd))
    }

    fn find_config_in(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }
}

impl TokenConfig {
    pub fn initial_supply(&self) -> Result<U256> {
        parse_amount(&self.initial_supply, self.decimals)
    }
}

/// Parses an asset amount: whole tokens at `decimals`, or raw units with a
/// `wei` suffix.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256> {
    let amount = amount.trim();
    if let Some(raw) = amount.strip_suffix("wei") {
        return parse_shares(raw);
    }

    match parse_units(amount, decimals)
        .wrap_err_with(|| format!("Invalid token amount: {amount:?}"))?
    {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => bail!("Negative token amount: {amount:?}"),
    }
}

/// Parses a raw integer such as a share count.
pub fn parse_shares(shares: &str) -> Result<U256> {
    let shares = shares.trim();
    shares
        .parse::<U256>()
        .wrap_err_with(|| format!("Invalid integer: {shares:?}"))
}

// Default functions for serde
fn default_deployer() -> Address {
    address!("0000000000000000000000000000000000000001")
}

fn default_name() -> String {
    "Rootstock Starter Token".to_string()
}

fn default_symbol() -> String {
    "RST".to_string()
}

fn default_decimals() -> u8 {
    18
}

fn default_initial_supply() -> String {
    "10000000".to_string()
}
