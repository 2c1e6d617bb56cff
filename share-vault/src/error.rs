//! Share vault crate errors

use core::fmt;

use alloy_primitives::{Address, U256};

pub type Result<T> = core::result::Result<T, VaultError>;

/// Error returned by the token ledger.
///
/// The `Display` text of every variant is the revert reason the token
/// contract reports, so callers can match on it the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Cannot transfer to zero address")]
    ZeroAddressTransfer,
    #[error("Cannot approve zero address")]
    ZeroAddressApproval,
    #[error("Insufficient balance")]
    InsufficientBalance { available: U256, required: U256 },
    #[error("Insufficient allowance")]
    InsufficientAllowance { available: U256, required: U256 },
    #[error("Decreased allowance below zero")]
    AllowanceBelowZero { current: U256, subtracted: U256 },
    #[error("Arithmetic overflow")]
    Overflow,
}

/// The quantity a positive-amount check was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Amount,
    Shares,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount => write!(f, "Amount"),
            Self::Shares => write!(f, "Shares"),
        }
    }
}

/// Error encountered on a vault operation.
///
/// Every variant aborts the whole operation: no balance, share or token
/// state is touched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VaultError {
    /// A zero amount or share count was passed where a positive one is required
    #[error("{0} must be greater than 0")]
    InvalidAmount(Quantity),
    /// The caller tried to burn more shares than it holds
    #[error("Insufficient shares")]
    InsufficientShares { available: U256, requested: U256 },
    /// Emergency withdrawal of more assets than the vault accounts for
    #[error("Insufficient assets")]
    InsufficientAssets { available: U256, requested: U256 },
    /// A privileged operation was invoked by someone other than the owner
    #[error("Only owner")]
    Unauthorized { caller: Address },
    #[error("New owner cannot be zero address")]
    ZeroAddress,
    /// The token ledger handed in is not the vault's asset
    #[error("Wrong asset: expected {expected}, got {found}")]
    AssetMismatch { expected: Address, found: Address },
    /// A price or total does not fit in 256 bits
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl TokenError {
    /// Returns true if this error reverts with exactly `reason`.
    pub fn matches_revert_reason(&self, reason: &str) -> bool {
        self.to_string() == reason
    }
}

impl VaultError {
    /// Returns true if this error reverts with exactly `reason`.
    ///
    /// Token failures raised while moving assets match on the token's
    /// own revert reason.
    pub fn matches_revert_reason(&self, reason: &str) -> bool {
        self.to_string() == reason
    }
}
