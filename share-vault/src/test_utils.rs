use alloy_primitives::{address, Address, U256};
use std::sync::Once;

use crate::{token::Erc20, vault::Vault};

static INIT: Once = Once::new();

pub const DEPLOYER: Address = address!("0000000000000000000000000000000000000001");
pub const ALICE: Address = address!("000000000000000000000000000000000000000A");
pub const BOB: Address = address!("000000000000000000000000000000000000000B");
pub const CAROL: Address = address!("000000000000000000000000000000000000000C");
pub const DAVE: Address = address!("000000000000000000000000000000000000000D");

pub const TOKEN_NAME: &str = "Rootstock Starter Token";
pub const TOKEN_SYMBOL: &str = "RST";
pub const TOKEN_DECIMALS: u8 = 18;

/// Tokens handed to (and approved by) every user of a [`VaultSetup`].
pub const USER_FUNDING: u64 = 10_000;

pub fn initialize_logger() {
    INIT.call_once(|| {
        let log_level = std::env::var("RUST_LOG").unwrap_or("INFO".to_owned());
        let tracing_sub = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_env_filter(tracing_subscriber::EnvFilter::new(log_level))
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(tracing_sub)
            .expect("Setting tracing subscriber failed");
    });
}

/// `n` whole tokens at 18 decimals.
pub fn tokens(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64.pow(TOKEN_DECIMALS as u32))
}

pub fn initial_supply() -> U256 {
    tokens(10_000_000)
}

/// Deploys the default token as the first contract of [`DEPLOYER`].
pub fn deploy_token() -> Erc20 {
    Erc20::new(
        DEPLOYER.create(0),
        TOKEN_NAME,
        TOKEN_SYMBOL,
        TOKEN_DECIMALS,
        initial_supply(),
        DEPLOYER,
    )
}

/// Deploys a vault for `token` as the second contract of [`DEPLOYER`].
pub fn deploy_vault(token: &Erc20) -> Vault {
    Vault::new(DEPLOYER.create(1), token.address(), DEPLOYER)
}

pub struct VaultSetup {
    pub token: Erc20,
    pub vault: Vault,
    pub deployer: Address,
}

/// Deploys token and vault, then funds every user in `users` with
/// [`USER_FUNDING`] tokens and approves the vault to spend all of them.
pub fn vault_setup(users: &[Address]) -> VaultSetup {
    initialize_logger();

    let mut token = deploy_token();
    let vault = deploy_vault(&token);

    for &user in users {
        fund(&mut token, user, tokens(USER_FUNDING));
        token
            .approve(user, vault.address(), tokens(USER_FUNDING))
            .expect("Approving the vault failed");
    }

    VaultSetup {
        token,
        vault,
        deployer: DEPLOYER,
    }
}

pub fn fund(token: &mut Erc20, user: Address, amount: U256) {
    token
        .transfer(DEPLOYER, user, amount)
        .expect("Funding user failed");
}
