//! Block-boundary fee distribution
//!
//! Every pass drains all slot accumulators and routes each amount three
//! ways: the batch share to the slot's proposer, the block share of what is
//! left to the block proposer, and the rest to burn. All arithmetic is
//! integer floor division, so rounding dust is always burned and credits
//! never exceed what was drained.
//!
//! A block proposed by nobody, or by the VM itself, has no beneficiary and
//! burns everything.
//!
//! A non-zero slot beyond the registered proposer list still drains: its
//! batch share has no beneficiary and is burned, and the remainder is
//! carried like any other slot.

use economics::{Address, BurnCapability, StakeLedger, Supply};
use serde::{Deserialize, Serialize};

use crate::accumulator::FeeAccumulator;
use crate::config::FeeCollectionConfig;
use crate::error::Result;

/// `floor(amount * pct / 100)` without intermediate overflow.
pub fn share_of(amount: u64, pct: u8) -> u64 {
    (amount as u128 * pct as u128 / 100) as u64
}

/// How one slot's drained fees were routed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSettlement {
    pub slot: u16,
    pub proposer: Option<Address>,
    pub drained: u64,
    pub credited: u64,
    pub burned: u64,
    pub carried: u64,
}

/// Outcome of one distribution pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionReport {
    pub block_proposer: Option<Address>,
    pub burn_all: bool,
    pub slots: Vec<SlotSettlement>,
    pub undistributed: u64,
    pub block_proposer_credit: u64,
    pub remainder_burned: u64,
}

impl DistributionReport {
    pub fn total_drained(&self) -> u64 {
        self.slots.iter().map(|s| s.drained).sum()
    }

    pub fn total_credited(&self) -> u64 {
        self.slots.iter().map(|s| s.credited).sum::<u64>() + self.block_proposer_credit
    }

    pub fn total_burned(&self) -> u64 {
        self.slots.iter().map(|s| s.burned).sum::<u64>() + self.remainder_burned
    }

    /// Drained == burned + credited
    pub fn is_conserved(&self) -> bool {
        self.total_drained() == self.total_burned() + self.total_credited()
    }
}

/// Cumulative totals across the collector's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStats {
    pub distribution_passes: u64,
    pub total_drained: u64,
    pub total_credited: u64,
    pub total_burned: u64,
    /// Burned directly by the epilogue while collection was disabled
    pub direct_burned: u64,
    pub total_refunded: u64,
}

impl FeeStats {
    pub(crate) fn record(&mut self, report: &DistributionReport) {
        self.distribution_passes = self.distribution_passes.saturating_add(1);
        self.total_drained = self.total_drained.saturating_add(report.total_drained());
        self.total_credited = self.total_credited.saturating_add(report.total_credited());
        self.total_burned = self.total_burned.saturating_add(report.total_burned());
    }
}

/// Routing decided for one pass before any coins move.
struct Plan {
    report: DistributionReport,
    credits: Vec<(Address, u64)>,
}

impl FeeCollectionConfig {
    /// Run one distribution pass and clear `block_proposer`.
    ///
    /// If the burn fails, every drained amount is merged back into its slot
    /// and the block proposer is restored, leaving the pass undone.
    pub(crate) fn distribute<S, L>(
        &mut self,
        supply: &S,
        burn_cap: &BurnCapability,
        ledger: &L,
    ) -> Result<DistributionReport>
    where
        S: Supply + ?Sized,
        L: StakeLedger + ?Sized,
    {
        let block_proposer = self.block_proposer.take();
        let drained: Vec<(usize, u64)> = self
            .slot_accumulators
            .iter()
            .enumerate()
            .filter(|(_, accumulator)| !accumulator.is_zero())
            .map(|(index, accumulator)| (index, accumulator.drain()))
            .collect();

        let planned = self.plan(block_proposer.clone(), &drained).and_then(|plan| {
            supply.burn(burn_cap, plan.report.total_burned())?;
            Ok(plan)
        });
        let plan = match planned {
            Ok(plan) => plan,
            Err(e) => {
                self.restore(block_proposer, &drained);
                return Err(e);
            }
        };

        for (validator, amount) in &plan.credits {
            ledger.add_transaction_fee(validator, *amount);
        }

        let report = plan.report;
        log::debug!(
            "Distributed {} in fees: {} credited, {} burned",
            report.total_drained(),
            report.total_credited(),
            report.total_burned()
        );
        Ok(report)
    }

    fn plan(&self, block_proposer: Option<Address>, drained: &[(usize, u64)]) -> Result<Plan> {
        let burn_all = block_proposer
            .as_ref()
            .map_or(true, |proposer| proposer.is_vm_reserved());

        let undistributed = FeeAccumulator::new();
        let mut credits = Vec::new();
        let mut slots = Vec::with_capacity(drained.len());

        for &(index, amount) in drained {
            let slot = index as u16;
            let proposer = self.batch_proposers.get(index).cloned();

            if burn_all {
                slots.push(SlotSettlement {
                    slot,
                    proposer,
                    drained: amount,
                    credited: 0,
                    burned: amount,
                    carried: 0,
                });
                continue;
            }

            let share = share_of(amount, self.batch_distribution_pct);
            let (credited, burned) = match &proposer {
                Some(p) => {
                    if share > 0 {
                        credits.push((p.clone(), share));
                    }
                    (share, 0)
                }
                None => {
                    log::warn!("Slot {} holds {} with no registered proposer", slot, amount);
                    (0, share)
                }
            };
            let carried = amount - share;
            undistributed.merge(carried)?;

            slots.push(SlotSettlement {
                slot,
                proposer,
                drained: amount,
                credited,
                burned,
                carried,
            });
        }

        let undistributed = undistributed.drain();
        let mut report = DistributionReport {
            block_proposer: block_proposer.clone(),
            burn_all,
            slots,
            undistributed,
            block_proposer_credit: 0,
            remainder_burned: 0,
        };

        if let Some(proposer) = block_proposer.filter(|_| !burn_all && undistributed > 0) {
            let block_share = share_of(undistributed, self.block_distribution_pct);
            if block_share > 0 {
                credits.push((proposer, block_share));
            }
            report.block_proposer_credit = block_share;
            report.remainder_burned = undistributed - block_share;
        }

        Ok(Plan { report, credits })
    }

    fn restore(&mut self, block_proposer: Option<Address>, drained: &[(usize, u64)]) {
        self.block_proposer = block_proposer;
        for &(index, amount) in drained {
            if let Err(e) = self.slot_accumulators[index].merge(amount) {
                log::error!("Failed to restore {} to slot {}: {}", amount, index, e);
            }
        }
    }
}
