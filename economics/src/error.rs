//! Economics error types

use thiserror::Error;

use crate::Address;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomicsError {
    #[error("Insufficient balance for {account}: requested {requested}, available {available}")]
    InsufficientBalance {
        account: Address,
        requested: u64,
        available: u64,
    },

    #[error("Supply overflow: cannot add {amount} to {current}")]
    SupplyOverflow { current: u64, amount: u64 },

    #[error("Burn of {amount} exceeds outstanding supply {supply}")]
    BurnExceedsSupply { amount: u64, supply: u64 },

    #[error("{0} capability already issued")]
    CapabilityAlreadyIssued(&'static str),

    #[error("{0} capability was issued by another supply")]
    ForeignCapability(&'static str),
}

pub type Result<T> = std::result::Result<T, EconomicsError>;
