//! Events recorded by the token and the vault.
//!
//! Each event is a Solidity ABI event so the journal can be turned into
//! regular EVM logs for the emitting address.

use alloy_primitives::{Address, Log};
use alloy_sol_types::{sol, SolEvent};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    event Transfer(address indexed sender, address indexed receiver, uint256 value);

    #[derive(Debug, PartialEq, Eq)]
    event Approval(address indexed owner, address indexed spender, uint256 value);

    #[derive(Debug, PartialEq, Eq)]
    event Deposit(address indexed depositor, uint256 amount, uint256 shares);

    #[derive(Debug, PartialEq, Eq)]
    event Withdraw(address indexed withdrawer, uint256 shares, uint256 assets);

    #[derive(Debug, PartialEq, Eq)]
    event OwnershipTransferred(address indexed previous_owner, address indexed new_owner);

    #[derive(Debug, PartialEq, Eq)]
    event EmergencyWithdraw(uint256 amount);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenEvent {
    Transfer(Transfer),
    Approval(Approval),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    Deposit(Deposit),
    Withdraw(Withdraw),
    OwnershipTransferred(OwnershipTransferred),
    EmergencyWithdraw(EmergencyWithdraw),
}

impl TokenEvent {
    pub fn to_log(&self, emitter: Address) -> Log {
        let data = match self {
            Self::Transfer(event) => event.encode_log_data(),
            Self::Approval(event) => event.encode_log_data(),
        };
        Log {
            address: emitter,
            data,
        }
    }
}

impl VaultEvent {
    pub fn to_log(&self, emitter: Address) -> Log {
        let data = match self {
            Self::Deposit(event) => event.encode_log_data(),
            Self::Withdraw(event) => event.encode_log_data(),
            Self::OwnershipTransferred(event) => event.encode_log_data(),
            Self::EmergencyWithdraw(event) => event.encode_log_data(),
        };
        Log {
            address: emitter,
            data,
        }
    }
}

impl From<Transfer> for TokenEvent {
    fn from(event: Transfer) -> Self {
        Self::Transfer(event)
    }
}

impl From<Approval> for TokenEvent {
    fn from(event: Approval) -> Self {
        Self::Approval(event)
    }
}

impl From<Deposit> for VaultEvent {
    fn from(event: Deposit) -> Self {
        Self::Deposit(event)
    }
}

impl From<Withdraw> for VaultEvent {
    fn from(event: Withdraw) -> Self {
        Self::Withdraw(event)
    }
}

impl From<OwnershipTransferred> for VaultEvent {
    fn from(event: OwnershipTransferred) -> Self {
        Self::OwnershipTransferred(event)
    }
}

impl From<EmergencyWithdraw> for VaultEvent {
    fn from(event: EmergencyWithdraw) -> Self {
        Self::EmergencyWithdraw(event)
    }
}
