//! Validator fee ledger
//!
//! Fees credited to validators are held here until the validator claims
//! them. The credited coins stay in flight on the supply side until a claim
//! deposits them into an account.

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::Address;

pub trait StakeLedger: Send + Sync {
    /// Enable per-validator fee tracking. Idempotent.
    fn initialize_fee_tracking(&self);

    /// Credit `validator` with `amount` of collected fees.
    ///
    /// Infallible: the fee pipeline credits only after the matching coins
    /// have left the fee pool, so a credit cannot be refused.
    fn add_transaction_fee(&self, validator: &Address, amount: u64);

    fn validator_exists(&self, validator: &Address) -> bool;
}

#[derive(Debug, Default)]
pub struct ValidatorFeeLedger {
    validators: DashMap<Address, u64>,
    pending: DashMap<Address, u64>,
    tracking: AtomicBool,
}

impl ValidatorFeeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator with its stake
    pub fn register_validator(&self, validator: Address, stake: u64) {
        self.validators.insert(validator, stake);
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking.load(Ordering::Acquire)
    }

    /// Fees credited to `validator` and not yet claimed
    pub fn pending_fees(&self, validator: &Address) -> u64 {
        self.pending.get(validator).map(|fees| *fees).unwrap_or(0)
    }

    pub fn total_pending(&self) -> u64 {
        self.pending.iter().map(|entry| *entry.value()).sum()
    }

    /// Remove and return everything credited to `validator`
    pub fn claim_fees(&self, validator: &Address) -> u64 {
        self.pending
            .remove(validator)
            .map(|(_, fees)| fees)
            .unwrap_or(0)
    }
}

impl StakeLedger for ValidatorFeeLedger {
    fn initialize_fee_tracking(&self) {
        if !self.tracking.swap(true, Ordering::AcqRel) {
            log::info!("Validator fee tracking enabled");
        }
    }

    fn add_transaction_fee(&self, validator: &Address, amount: u64) {
        if !self.is_tracking() {
            log::warn!("Fee credited to {} before fee tracking was initialized", validator);
            self.initialize_fee_tracking();
        }
        // Pending fees are backed by in-flight supply and cannot exceed u64
        let mut fees = self.pending.entry(validator.clone()).or_insert(0);
        *fees = fees.saturating_add(amount);
    }

    fn validator_exists(&self, validator: &Address) -> bool {
        self.validators.contains_key(validator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credits_accumulate() {
        let ledger = ValidatorFeeLedger::new();
        ledger.initialize_fee_tracking();
        let v = Address::from("time1validator");
        ledger.add_transaction_fee(&v, 10);
        ledger.add_transaction_fee(&v, 5);
        assert_eq!(ledger.pending_fees(&v), 15);
    }

    #[test]
    fn test_untracked_credit_enables_tracking() {
        let ledger = ValidatorFeeLedger::new();
        let v = Address::from("time1validator");
        assert!(!ledger.is_tracking());

        ledger.add_transaction_fee(&v, 7);
        assert!(ledger.is_tracking());
        assert_eq!(ledger.pending_fees(&v), 7);
    }

    #[test]
    fn test_claim_drains() {
        let ledger = ValidatorFeeLedger::new();
        ledger.initialize_fee_tracking();
        let v = Address::from("time1validator");
        ledger.add_transaction_fee(&v, 42);

        assert_eq!(ledger.claim_fees(&v), 42);
        assert_eq!(ledger.claim_fees(&v), 0);
        assert_eq!(ledger.total_pending(), 0);
    }

    #[test]
    fn test_validator_exists() {
        let ledger = ValidatorFeeLedger::new();
        let v = Address::from("time1validator");
        assert!(!ledger.validator_exists(&v));
        ledger.register_validator(v.clone(), 1_000);
        assert!(ledger.validator_exists(&v));
    }
}
