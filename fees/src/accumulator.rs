//! Mergeable fee accumulator
//!
//! Deposits only ever add, so concurrent merges commute and never need to
//! observe each other. Drain swaps the total for zero in one atomic step.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{FeeError, Result};

#[derive(Debug, Default)]
pub struct FeeAccumulator {
    total: AtomicU64,
}

impl FeeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the running total.
    pub fn merge(&self, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        self.total
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_add(amount)
            })
            .map(|_| ())
            .map_err(|current| FeeError::AccumulatorOverflow { current, amount })
    }

    pub fn is_zero(&self) -> bool {
        self.total.load(Ordering::Acquire) == 0
    }

    pub fn value(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    /// Reset to zero and return what was there.
    pub fn drain(&self) -> u64 {
        self.total.swap(0, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_additive_accumulation() {
        let acc = FeeAccumulator::new();
        acc.merge(10).unwrap();
        acc.merge(20).unwrap();
        acc.merge(5).unwrap();

        assert!(!acc.is_zero());
        assert_eq!(acc.drain(), 35);
        assert!(acc.is_zero());
        assert_eq!(acc.drain(), 0);
    }

    #[test]
    fn test_overflow_rejected() {
        let acc = FeeAccumulator::new();
        acc.merge(u64::MAX - 1).unwrap();
        let err = acc.merge(2).unwrap_err();
        assert!(matches!(
            err,
            FeeError::AccumulatorOverflow {
                current,
                amount: 2
            } if current == u64::MAX - 1
        ));
        assert_eq!(acc.value(), u64::MAX - 1);
    }

    #[test]
    fn test_concurrent_merges() {
        let acc = FeeAccumulator::new();
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        acc.merge(3).unwrap();
                    }
                });
            }
        });
        assert_eq!(acc.drain(), 8 * 1000 * 3);
    }
}
