//! Fee collection configuration
//!
//! `FeeCollectionParams` is what operators write in the node config file;
//! `FeeCollectionConfig` is the live singleton state built from it.
//!
//! Example:
//! ```toml
//! [fee_collection]
//! enabled = true
//! max_batch_slots = 4
//! block_distribution_pct = 20
//! batch_distribution_pct = 70
//! ```

use economics::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::accumulator::FeeAccumulator;
use crate::error::{FeeError, Result};

pub const DEFAULT_MAX_BATCH_SLOTS: u16 = 4;
pub const DEFAULT_BLOCK_DISTRIBUTION_PCT: u8 = 20;
pub const DEFAULT_BATCH_DISTRIBUTION_PCT: u8 = 70;

/// Block and batch shares together may claim at most the whole fee.
pub fn validate_percentages(block_pct: u8, batch_pct: u8) -> Result<()> {
    if block_pct as u16 + batch_pct as u16 > 100 {
        return Err(FeeError::InvalidPercentage {
            block_pct,
            batch_pct,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeCollectionParams {
    pub enabled: bool,
    pub max_batch_slots: u16,
    pub block_distribution_pct: u8,
    pub batch_distribution_pct: u8,
}

impl Default for FeeCollectionParams {
    fn default() -> Self {
        Self {
            enabled: false,
            max_batch_slots: DEFAULT_MAX_BATCH_SLOTS,
            block_distribution_pct: DEFAULT_BLOCK_DISTRIBUTION_PCT,
            batch_distribution_pct: DEFAULT_BATCH_DISTRIBUTION_PCT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    fee_collection: FeeCollectionParams,
}

impl FeeCollectionParams {
    /// Parse the `[fee_collection]` table; a missing table yields defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| FeeError::InvalidConfig(e.to_string()))?;
        file.fee_collection.validate()?;
        Ok(file.fee_collection)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let params = Self::from_toml_str(&contents)?;
        log::info!(
            "Loaded fee collection config from {}: enabled={}, slots={}, block={}%, batch={}%",
            path.as_ref().display(),
            params.enabled,
            params.max_batch_slots,
            params.block_distribution_pct,
            params.batch_distribution_pct
        );
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        validate_percentages(self.block_distribution_pct, self.batch_distribution_pct)
    }
}

/// Live fee collection state. Exists only once collection is initialized.
#[derive(Debug)]
pub(crate) struct FeeCollectionConfig {
    pub(crate) block_proposer: Option<Address>,
    pub(crate) max_batch_slots: u16,
    pub(crate) batch_proposers: Vec<Address>,
    /// Fixed length `max_batch_slots`, never resized.
    pub(crate) slot_accumulators: Vec<FeeAccumulator>,
    pub(crate) block_distribution_pct: u8,
    pub(crate) batch_distribution_pct: u8,
}

impl FeeCollectionConfig {
    pub(crate) fn new(max_batch_slots: u16, block_pct: u8, batch_pct: u8) -> Result<Self> {
        validate_percentages(block_pct, batch_pct)?;
        Ok(Self {
            block_proposer: None,
            max_batch_slots,
            batch_proposers: Vec::with_capacity(max_batch_slots as usize),
            slot_accumulators: (0..max_batch_slots).map(|_| FeeAccumulator::new()).collect(),
            block_distribution_pct: block_pct,
            batch_distribution_pct: batch_pct,
        })
    }

    pub(crate) fn slot(&self, slot_index: u16) -> Result<&FeeAccumulator> {
        self.slot_accumulators
            .get(slot_index as usize)
            .ok_or(FeeError::SlotOutOfRange {
                slot: slot_index,
                max: self.max_batch_slots,
            })
    }

    pub(crate) fn snapshot(&self) -> FeeCollectionSnapshot {
        FeeCollectionSnapshot {
            block_proposer: self.block_proposer.clone(),
            max_batch_slots: self.max_batch_slots,
            batch_proposers: self.batch_proposers.clone(),
            pending_by_slot: self.slot_accumulators.iter().map(|a| a.value()).collect(),
            block_distribution_pct: self.block_distribution_pct,
            batch_distribution_pct: self.batch_distribution_pct,
        }
    }
}

/// Point-in-time view of the configuration, for APIs and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeCollectionSnapshot {
    pub block_proposer: Option<Address>,
    pub max_batch_slots: u16,
    pub batch_proposers: Vec<Address>,
    pub pending_by_slot: Vec<u64>,
    pub block_distribution_pct: u8,
    pub batch_distribution_pct: u8,
}

impl FeeCollectionSnapshot {
    pub fn total_pending(&self) -> u64 {
        self.pending_by_slot.iter().sum()
    }
}
