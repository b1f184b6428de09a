//! Per-block proposer registration
//!
//! Slots are positional. Fees already merged into slot `i` stay with slot
//! `i` when a different validator takes that position in the next block.

use economics::{Address, StakeLedger};

use crate::config::FeeCollectionConfig;
use crate::error::{FeeError, Result};

impl FeeCollectionConfig {
    pub(crate) fn register_proposers<L: StakeLedger + ?Sized>(
        &mut self,
        block_proposer: Address,
        batch_proposers: Vec<Address>,
        ledger: &L,
    ) -> Result<()> {
        if batch_proposers.len() > self.max_batch_slots as usize {
            return Err(FeeError::TooManyBatchProposers {
                count: batch_proposers.len(),
                max: self.max_batch_slots,
            });
        }

        if let Some(stale) = self.block_proposer.replace(block_proposer) {
            log::warn!("Overwriting undistributed block proposer {}", stale);
        }

        for proposer in &batch_proposers {
            if !proposer.is_vm_reserved() && !ledger.validator_exists(proposer) {
                log::debug!("Batch proposer {} is not a known validator", proposer);
            }
        }
        self.batch_proposers = batch_proposers;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use economics::ValidatorFeeLedger;

    fn addrs(names: &[&str]) -> Vec<Address> {
        names.iter().map(|n| Address::from(*n)).collect()
    }

    #[test]
    fn test_register_replaces_proposers() {
        let ledger = ValidatorFeeLedger::new();
        let mut config = FeeCollectionConfig::new(3, 20, 70).unwrap();

        config
            .register_proposers("P".into(), addrs(&["Q", "R", "S"]), &ledger)
            .unwrap();
        assert_eq!(config.block_proposer, Some(Address::from("P")));
        assert_eq!(config.batch_proposers, addrs(&["Q", "R", "S"]));

        config
            .register_proposers("P2".into(), addrs(&["R"]), &ledger)
            .unwrap();
        assert_eq!(config.block_proposer, Some(Address::from("P2")));
        assert_eq!(config.batch_proposers, addrs(&["R"]));
    }

    #[test]
    fn test_register_too_many() {
        let ledger = ValidatorFeeLedger::new();
        let mut config = FeeCollectionConfig::new(1, 20, 70).unwrap();
        let err = config
            .register_proposers("P".into(), addrs(&["Q", "R"]), &ledger)
            .unwrap_err();
        assert!(matches!(
            err,
            FeeError::TooManyBatchProposers { count: 2, max: 1 }
        ));
        // Nothing changed
        assert!(config.block_proposer.is_none());
        assert!(config.batch_proposers.is_empty());
    }

    #[test]
    fn test_register_keeps_slot_contents() {
        let ledger = ValidatorFeeLedger::new();
        let mut config = FeeCollectionConfig::new(2, 20, 70).unwrap();
        config.slot_accumulators[1].merge(99).unwrap();

        config
            .register_proposers("P".into(), addrs(&["Q", "R"]), &ledger)
            .unwrap();
        assert_eq!(config.slot_accumulators[1].value(), 99);
    }
}
