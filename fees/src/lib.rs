//! TIME Coin Fee Collection Module
//!
//! Collects transaction fees per batch slot during a block and splits them
//! at the next block boundary:
//! - batch share to each slot's batch proposer
//! - block share of the rest to the block proposer
//! - everything else burned
//!
//! While collection is disabled, fees are burned directly.

pub mod accumulator;
pub mod capability;
pub mod collector;
pub mod config;
pub mod distribution;
pub mod error;
pub mod events;
pub mod genesis;
mod registry;

pub use accumulator::FeeAccumulator;
pub use capability::{EpilogueCap, GenesisCap, GovernanceCap, PrologueCap, SystemCapabilities};
pub use collector::FeeCollector;
pub use config::{FeeCollectionParams, FeeCollectionSnapshot};
pub use distribution::{share_of, DistributionReport, FeeStats, SlotSettlement};
pub use error::{FeeError, Result};
pub use events::{EventLog, FeeEvent, FeeStatement};
