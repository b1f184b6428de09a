//! Fee events emitted by the collector

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::distribution::DistributionReport;
use crate::error::{FeeError, Result};

/// Breakdown of what a single transaction was charged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStatement {
    /// Total units charged, execution + io + storage
    pub total_charge_units: u64,
    pub execution_units: u64,
    pub io_units: u64,
    pub storage_units: u64,
    /// Storage fee in base asset units
    pub storage_fee: u64,
    pub storage_fee_refund: u64,
}

impl FeeStatement {
    pub fn new(execution_units: u64, io_units: u64, storage_units: u64) -> Self {
        Self {
            total_charge_units: execution_units + io_units + storage_units,
            execution_units,
            io_units,
            storage_units,
            ..Default::default()
        }
    }

    pub fn with_storage_fee(mut self, storage_fee: u64, storage_fee_refund: u64) -> Self {
        self.storage_fee = storage_fee;
        self.storage_fee_refund = storage_fee_refund;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeeEvent {
    Statement(FeeStatement),
    Distributed(DistributionReport),
    PercentagesUpgraded {
        old_block_pct: u8,
        old_batch_pct: u8,
        new_block_pct: u8,
        new_batch_pct: u8,
    },
}

#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<FeeEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: FeeEvent) {
        self.events.lock().push(event);
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn events(&self) -> Vec<FeeEvent> {
        self.events.lock().clone()
    }

    /// Take every recorded event, leaving the log empty
    pub fn drain(&self) -> Vec<FeeEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&*self.events.lock())
            .map_err(|e| FeeError::SerializationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_totals() {
        let statement = FeeStatement::new(100, 20, 5).with_storage_fee(4_000, 1_000);
        assert_eq!(statement.total_charge_units, 125);
        assert_eq!(statement.storage_fee, 4_000);
        assert_eq!(statement.storage_fee_refund, 1_000);
    }

    #[test]
    fn test_log_drain_and_json() {
        let log = EventLog::new();
        assert!(log.is_empty());

        log.emit(FeeEvent::Statement(FeeStatement::new(1, 2, 3)));
        log.emit(FeeEvent::PercentagesUpgraded {
            old_block_pct: 20,
            old_batch_pct: 70,
            new_block_pct: 10,
            new_batch_pct: 80,
        });

        let json = log.to_json().unwrap();
        assert!(json.contains("\"type\":\"statement\""));
        assert!(json.contains("\"type\":\"percentages_upgraded\""));

        assert_eq!(log.drain().len(), 2);
        assert!(log.is_empty());
    }
}
