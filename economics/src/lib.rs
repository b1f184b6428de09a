//! TIME Coin Economics Module
//!
//! Ledger-level services the fee pipeline is built on:
//! - Native asset supply (mint, burn, account balances)
//! - Burn and mint capabilities
//! - Validator fee ledger (fees credited to validators, claimable later)

pub mod address;
pub mod error;
pub mod stake;
pub mod supply;

pub use address::Address;
pub use error::{EconomicsError, Result};
pub use stake::{StakeLedger, ValidatorFeeLedger};
pub use supply::{BurnCapability, MintCapability, Supply, SupplyId, SupplyManager, SupplyStats};

/// Economic constants
pub mod constants {
    /// Address reserved for blocks produced by the VM itself
    pub const VM_RESERVED_ADDRESS: &str = "0x0";
}
