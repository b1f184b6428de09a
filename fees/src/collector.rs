//! Fee collector: the privileged entry points
//!
//! One collector per ledger. Every mutating entry point takes the role token
//! for its caller and rejects tokens issued by any other collector.
//!
//! Fee collection starts disabled. Until governance initializes it, fees
//! are burned directly by the epilogue. Once initialized it stays enabled;
//! only the percentages can change.
//!
//! Per block:
//! 1. prologue: `process_collected_fees` for the previous block, then
//!    `register_proposers` for this one
//! 2. epilogue of every transaction: `collect_for_batch`
//!
//! Collections only take the configuration read lock and merge into an
//! atomic accumulator, so transactions sharing a slot never serialize on
//! each other. Registration and distribution take the write lock.

use economics::{Address, BurnCapability, EconomicsError, MintCapability, StakeLedger, Supply};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use crate::capability::{
    CapabilityStore, EpilogueCap, GenesisCap, GovernanceCap, IssuerId, PrologueCap, SystemCap,
    SystemCapabilities,
};
use crate::config::{validate_percentages, FeeCollectionConfig, FeeCollectionSnapshot};
use crate::distribution::{DistributionReport, FeeStats};
use crate::error::{FeeError, Result};
use crate::events::{EventLog, FeeEvent, FeeStatement};

pub struct FeeCollector<S: Supply, L: StakeLedger> {
    issuer: IssuerId,
    supply: Arc<S>,
    ledger: Arc<L>,
    config: RwLock<Option<FeeCollectionConfig>>,
    capabilities: CapabilityStore,
    stats: Mutex<FeeStats>,
    events: EventLog,
}

impl<S: Supply, L: StakeLedger> FeeCollector<S, L> {
    /// Create a collector and the only set of role tokens it will accept.
    pub fn new(supply: Arc<S>, ledger: Arc<L>) -> (Self, SystemCapabilities) {
        let issuer = IssuerId::fresh();
        let collector = Self {
            issuer,
            supply,
            ledger,
            config: RwLock::new(None),
            capabilities: CapabilityStore::default(),
            stats: Mutex::new(FeeStats::default()),
            events: EventLog::new(),
        };
        (collector, SystemCapabilities::issue(issuer))
    }

    fn authorize<C: SystemCap>(&self, cap: &C) -> Result<()> {
        if cap.issuer() != self.issuer {
            return Err(FeeError::Unauthorized);
        }
        Ok(())
    }

    pub fn supply(&self) -> &S {
        &self.supply
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn stats(&self) -> FeeStats {
        self.stats.lock().clone()
    }

    pub fn is_fees_collection_enabled(&self) -> bool {
        self.config.read().is_some()
    }

    pub fn snapshot(&self) -> Option<FeeCollectionSnapshot> {
        self.config.read().as_ref().map(FeeCollectionConfig::snapshot)
    }

    /// Genesis only. The capability authorizes every burn made by this collector.
    pub fn store_burn_capability(&self, cap: &GenesisCap, burn: BurnCapability) -> Result<()> {
        self.authorize(cap)?;
        if burn.supply_id() != self.supply.supply_id() {
            return Err(EconomicsError::ForeignCapability("Burn").into());
        }
        self.capabilities.store_burn(burn)
    }

    /// Genesis only. The capability authorizes storage refunds.
    pub fn store_mint_capability(&self, cap: &GenesisCap, mint: MintCapability) -> Result<()> {
        self.authorize(cap)?;
        if mint.supply_id() != self.supply.supply_id() {
            return Err(EconomicsError::ForeignCapability("Mint").into());
        }
        self.capabilities.store_mint(mint)
    }

    /// Enable fee collection with `max_batch_slots` pre-allocated slots.
    pub fn initialize(
        &self,
        cap: &GovernanceCap,
        max_batch_slots: u16,
        block_pct: u8,
        batch_pct: u8,
    ) -> Result<()> {
        self.authorize(cap)?;
        let mut config = self.config.write();
        if config.is_some() {
            return Err(FeeError::AlreadyInitialized);
        }
        let initialized = FeeCollectionConfig::new(max_batch_slots, block_pct, batch_pct)?;

        self.ledger.initialize_fee_tracking();
        *config = Some(initialized);

        log::info!(
            "Fee collection enabled: {} batch slots, block {}%, batch {}%",
            max_batch_slots,
            block_pct,
            batch_pct
        );
        Ok(())
    }

    /// Change the split. Fees already collected are distributed under the
    /// old split first. Returns that flush, or `None` if collection is disabled.
    pub fn upgrade_percentages(
        &self,
        cap: &GovernanceCap,
        new_block_pct: u8,
        new_batch_pct: u8,
    ) -> Result<Option<DistributionReport>> {
        self.authorize(cap)?;
        validate_percentages(new_block_pct, new_batch_pct)?;

        let mut guard = self.config.write();
        let Some(config) = guard.as_mut() else {
            return Ok(None);
        };

        let report = self.distribute(config)?;

        let (old_block_pct, old_batch_pct) =
            (config.block_distribution_pct, config.batch_distribution_pct);
        config.block_distribution_pct = new_block_pct;
        config.batch_distribution_pct = new_batch_pct;

        log::info!(
            "Fee split upgraded: block {}% -> {}%, batch {}% -> {}%",
            old_block_pct,
            new_block_pct,
            old_batch_pct,
            new_batch_pct
        );
        self.events.emit(FeeEvent::PercentagesUpgraded {
            old_block_pct,
            old_batch_pct,
            new_block_pct,
            new_batch_pct,
        });
        Ok(Some(report))
    }

    /// Record this block's proposers. No-op while collection is disabled.
    pub fn register_proposers(
        &self,
        cap: &PrologueCap,
        block_proposer: Address,
        batch_proposers: Vec<Address>,
    ) -> Result<()> {
        self.authorize(cap)?;
        match self.config.write().as_mut() {
            Some(config) => config.register_proposers(block_proposer, batch_proposers, &*self.ledger),
            None => Ok(()),
        }
    }

    /// Move `fee` from `payer` into the accumulator of `slot_index`.
    ///
    /// The slot does not need a registered proposer; attribution is settled
    /// at distribution time.
    pub fn collect_for_batch(
        &self,
        cap: &EpilogueCap,
        payer: &Address,
        fee: u64,
        slot_index: u16,
    ) -> Result<()> {
        self.authorize(cap)?;
        let guard = self.config.read();
        let config = guard.as_ref().ok_or(FeeError::CollectionDisabled)?;
        let accumulator = config.slot(slot_index)?;

        self.supply.withdraw(payer, fee)?;
        if let Err(e) = accumulator.merge(fee) {
            self.supply.deposit(payer, fee)?;
            return Err(e);
        }
        Ok(())
    }

    /// Burn `fee` straight out of `payer`'s account.
    pub fn burn_fee(&self, cap: &EpilogueCap, payer: &Address, fee: u64) -> Result<()> {
        self.authorize(cap)?;
        let burn = self.capabilities.burn()?;
        self.supply.burn_from(burn, payer, fee)?;
        let mut stats = self.stats.lock();
        stats.direct_burned = stats.direct_burned.saturating_add(fee);
        Ok(())
    }

    /// Collect into `slot` when collection is enabled and the transaction
    /// names a batch, otherwise burn.
    pub fn settle_transaction_fee(
        &self,
        cap: &EpilogueCap,
        payer: &Address,
        fee: u64,
        slot: Option<u16>,
    ) -> Result<()> {
        match slot {
            Some(slot) if self.is_fees_collection_enabled() => {
                self.collect_for_batch(cap, payer, fee, slot)
            }
            _ => self.burn_fee(cap, payer, fee),
        }
    }

    /// Mint a storage fee refund into `account`.
    pub fn mint_and_refund(&self, cap: &EpilogueCap, account: &Address, refund: u64) -> Result<()> {
        self.authorize(cap)?;
        if refund == 0 {
            return Ok(());
        }
        let mint = self.capabilities.mint()?;
        self.supply.mint(mint, account, refund)?;
        let mut stats = self.stats.lock();
        stats.total_refunded = stats.total_refunded.saturating_add(refund);
        Ok(())
    }

    pub fn emit_fee_statement(&self, cap: &EpilogueCap, statement: FeeStatement) -> Result<()> {
        self.authorize(cap)?;
        self.events.emit(FeeEvent::Statement(statement));
        Ok(())
    }

    /// Distribute everything collected since the last pass.
    /// Returns `None` while collection is disabled.
    pub fn process_collected_fees(&self, cap: &PrologueCap) -> Result<Option<DistributionReport>> {
        self.authorize(cap)?;
        match self.config.write().as_mut() {
            Some(config) => self.distribute(config).map(Some),
            None => Ok(None),
        }
    }

    fn distribute(&self, config: &mut FeeCollectionConfig) -> Result<DistributionReport> {
        let burn = self.capabilities.burn()?;
        let report = config.distribute(&*self.supply, burn, &*self.ledger)?;

        self.stats.lock().record(&report);
        if !report.slots.is_empty() {
            self.events.emit(FeeEvent::Distributed(report.clone()));
        }
        Ok(report)
    }
}
