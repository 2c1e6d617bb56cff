//! Share vault accounting over an ERC-20 asset.
//!
//! [`Vault`] mints shares for deposited assets and redeems them using
//! virtual-offset pricing ([`pricing`]), moving funds through an in-memory
//! [`Erc20`] ledger. [`SharedVault`] serializes access for concurrent callers.

mod error;
pub use error::{Quantity, Result, TokenError, VaultError};

pub mod events;
pub mod ledger;
pub mod pricing;
pub mod shared;
pub mod token;
pub mod vault;

pub use ledger::ShareLedger;
pub use shared::{SharedVault, VaultState};
pub use token::Erc20;
pub use vault::Vault;

pub mod test_utils;
