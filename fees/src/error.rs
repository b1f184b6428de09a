//! Fee collection error types

use economics::EconomicsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeeError {
    #[error("Fee collection already initialized")]
    AlreadyInitialized,

    #[error("Invalid percentage: block {block_pct}% + batch {batch_pct}% exceeds 100%")]
    InvalidPercentage { block_pct: u8, batch_pct: u8 },

    #[error("Too many batch proposers: {count} registered, {max} slots available")]
    TooManyBatchProposers { count: usize, max: u16 },

    #[error("Batch slot {slot} out of range ({max} slots)")]
    SlotOutOfRange { slot: u16, max: u16 },

    #[error("Fee collection is disabled")]
    CollectionDisabled,

    #[error("Accumulator overflow: cannot merge {amount} into {current}")]
    AccumulatorOverflow { current: u64, amount: u64 },

    #[error("Capability was not issued by this collector")]
    Unauthorized,

    #[error("Burn capability already stored")]
    BurnCapabilityAlreadyStored,

    #[error("Burn capability not stored")]
    BurnCapabilityMissing,

    #[error("Mint capability already stored")]
    MintCapabilityAlreadyStored,

    #[error("Mint capability not stored")]
    MintCapabilityMissing,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error(transparent)]
    Economics(#[from] EconomicsError),
}

pub type Result<T> = std::result::Result<T, FeeError>;
