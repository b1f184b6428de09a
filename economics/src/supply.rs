//! Supply management and tracking
//!
//! Account balances live in a concurrent map so that independent accounts
//! never contend. Coins withdrawn from an account are "in flight" until they
//! are burned or deposited again; the totals below always satisfy
//! `total_supply == sum(balances) + in_flight`.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::error::{EconomicsError, Result};
use crate::Address;

static NEXT_SUPPLY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one supply instance. Capabilities are bound to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SupplyId(u64);

impl SupplyId {
    fn fresh() -> Self {
        Self(NEXT_SUPPLY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Authorizes destruction of supply. Only one is ever issued per supply,
/// and only that supply honors it.
#[derive(Debug)]
pub struct BurnCapability {
    supply: SupplyId,
}

impl BurnCapability {
    pub fn supply_id(&self) -> SupplyId {
        self.supply
    }
}

/// Authorizes creation of supply. Only one is ever issued per supply,
/// and only that supply honors it.
#[derive(Debug)]
pub struct MintCapability {
    supply: SupplyId,
}

impl MintCapability {
    pub fn supply_id(&self) -> SupplyId {
        self.supply
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyStats {
    pub total_minted: u64,
    pub total_burned: u64,
    pub total_supply: u64,
    pub in_flight: u64,
}

/// The native asset primitive consumed by the fee pipeline.
pub trait Supply: Send + Sync {
    /// Identity that this supply's capabilities carry.
    fn supply_id(&self) -> SupplyId;

    /// Move `amount` out of `account`; the caller now holds it in flight.
    fn withdraw(&self, account: &Address, amount: u64) -> Result<()>;

    /// Return in-flight coins to `account`.
    fn deposit(&self, account: &Address, amount: u64) -> Result<()>;

    /// Destroy in-flight coins.
    fn burn(&self, cap: &BurnCapability, amount: u64) -> Result<()>;

    /// Destroy coins held by `account`.
    fn burn_from(&self, cap: &BurnCapability, account: &Address, amount: u64) -> Result<()>;

    fn mint(&self, cap: &MintCapability, account: &Address, amount: u64) -> Result<()>;

    fn balance(&self, account: &Address) -> u64;
}

#[derive(Debug)]
pub struct SupplyManager {
    id: SupplyId,
    balances: DashMap<Address, u64>,
    total_minted: AtomicU64,
    total_burned: AtomicU64,
    in_flight: AtomicU64,
    burn_issued: AtomicBool,
    mint_issued: AtomicBool,
}

impl Default for SupplyManager {
    fn default() -> Self {
        Self {
            id: SupplyId::fresh(),
            balances: DashMap::new(),
            total_minted: AtomicU64::new(0),
            total_burned: AtomicU64::new(0),
            in_flight: AtomicU64::new(0),
            burn_issued: AtomicBool::new(false),
            mint_issued: AtomicBool::new(false),
        }
    }
}

impl SupplyManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue_burn_capability(&self) -> Result<BurnCapability> {
        if self.burn_issued.swap(true, Ordering::SeqCst) {
            return Err(EconomicsError::CapabilityAlreadyIssued("Burn"));
        }
        Ok(BurnCapability { supply: self.id })
    }

    pub fn issue_mint_capability(&self) -> Result<MintCapability> {
        if self.mint_issued.swap(true, Ordering::SeqCst) {
            return Err(EconomicsError::CapabilityAlreadyIssued("Mint"));
        }
        Ok(MintCapability { supply: self.id })
    }

    pub fn stats(&self) -> SupplyStats {
        let total_minted = self.total_minted.load(Ordering::Acquire);
        let total_burned = self.total_burned.load(Ordering::Acquire);
        SupplyStats {
            total_minted,
            total_burned,
            total_supply: total_minted.saturating_sub(total_burned),
            in_flight: self.in_flight.load(Ordering::Acquire),
        }
    }

    fn check_issuer(&self, supply: SupplyId, kind: &'static str) -> Result<()> {
        if supply != self.id {
            return Err(EconomicsError::ForeignCapability(kind));
        }
        Ok(())
    }

    fn outstanding(&self) -> u64 {
        let burned = self.total_burned.load(Ordering::Acquire);
        self.total_minted.load(Ordering::Acquire).saturating_sub(burned)
    }

    fn record_burn(&self, amount: u64) -> Result<()> {
        let supply = self.outstanding();
        if amount > supply {
            return Err(EconomicsError::BurnExceedsSupply { amount, supply });
        }
        self.total_burned.fetch_add(amount, Ordering::AcqRel);
        Ok(())
    }

    fn take_in_flight(&self, amount: u64) -> Result<()> {
        self.in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |held| {
                held.checked_sub(amount)
            })
            .map(|_| ())
            .map_err(|held| EconomicsError::BurnExceedsSupply {
                amount,
                supply: held,
            })
    }
}

impl Supply for SupplyManager {
    fn supply_id(&self) -> SupplyId {
        self.id
    }

    fn withdraw(&self, account: &Address, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let mut balance = self.balances.get_mut(account).ok_or_else(|| {
            EconomicsError::InsufficientBalance {
                account: account.clone(),
                requested: amount,
                available: 0,
            }
        })?;
        if *balance < amount {
            return Err(EconomicsError::InsufficientBalance {
                account: account.clone(),
                requested: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        drop(balance);

        self.in_flight.fetch_add(amount, Ordering::AcqRel);
        Ok(())
    }

    fn deposit(&self, account: &Address, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        self.take_in_flight(amount)?;
        *self.balances.entry(account.clone()).or_insert(0) += amount;
        Ok(())
    }

    fn burn(&self, cap: &BurnCapability, amount: u64) -> Result<()> {
        self.check_issuer(cap.supply, "Burn")?;
        if amount == 0 {
            return Ok(());
        }
        self.take_in_flight(amount)?;
        self.record_burn(amount)?;
        log::debug!("Burned {} in-flight units", amount);
        Ok(())
    }

    fn burn_from(&self, cap: &BurnCapability, account: &Address, amount: u64) -> Result<()> {
        self.check_issuer(cap.supply, "Burn")?;
        if amount == 0 {
            return Ok(());
        }
        let mut balance = self.balances.get_mut(account).ok_or_else(|| {
            EconomicsError::InsufficientBalance {
                account: account.clone(),
                requested: amount,
                available: 0,
            }
        })?;
        if *balance < amount {
            return Err(EconomicsError::InsufficientBalance {
                account: account.clone(),
                requested: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        drop(balance);

        self.record_burn(amount)?;
        log::debug!("Burned {} units from {}", amount, account);
        Ok(())
    }

    fn mint(&self, cap: &MintCapability, account: &Address, amount: u64) -> Result<()> {
        self.check_issuer(cap.supply, "Mint")?;
        if amount == 0 {
            return Ok(());
        }
        self.total_minted
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |minted| {
                minted.checked_add(amount)
            })
            .map_err(|current| EconomicsError::SupplyOverflow { current, amount })?;
        *self.balances.entry(account.clone()).or_insert(0) += amount;
        Ok(())
    }

    fn balance(&self, account: &Address) -> u64 {
        self.balances.get(account).map(|b| *b).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded(account: &str, amount: u64) -> (SupplyManager, BurnCapability) {
        let supply = SupplyManager::new();
        let mint = supply.issue_mint_capability().unwrap();
        supply.mint(&mint, &Address::from(account), amount).unwrap();
        let burn = supply.issue_burn_capability().unwrap();
        (supply, burn)
    }

    #[test]
    fn test_capabilities_issued_once() {
        let supply = SupplyManager::new();
        assert!(supply.issue_burn_capability().is_ok());
        assert_eq!(
            supply.issue_burn_capability().unwrap_err(),
            EconomicsError::CapabilityAlreadyIssued("Burn")
        );
        assert!(supply.issue_mint_capability().is_ok());
        assert!(supply.issue_mint_capability().is_err());
    }

    #[test]
    fn test_withdraw_then_burn() {
        let (supply, burn) = funded("alice", 1000);
        let alice = Address::from("alice");

        supply.withdraw(&alice, 300).unwrap();
        assert_eq!(supply.balance(&alice), 700);
        assert_eq!(supply.stats().in_flight, 300);

        supply.burn(&burn, 300).unwrap();
        let stats = supply.stats();
        assert_eq!(stats.in_flight, 0);
        assert_eq!(stats.total_burned, 300);
        assert_eq!(stats.total_supply, 700);
    }

    #[test]
    fn test_withdraw_insufficient() {
        let (supply, _) = funded("alice", 10);
        let err = supply.withdraw(&Address::from("alice"), 11).unwrap_err();
        assert!(matches!(
            err,
            EconomicsError::InsufficientBalance {
                requested: 11,
                available: 10,
                ..
            }
        ));
        assert_eq!(supply.balance(&Address::from("alice")), 10);
    }

    #[test]
    fn test_burn_more_than_in_flight() {
        let (supply, burn) = funded("alice", 100);
        supply.withdraw(&Address::from("alice"), 40).unwrap();
        assert!(supply.burn(&burn, 41).is_err());
        assert_eq!(supply.stats().in_flight, 40);
    }

    #[test]
    fn test_burn_from_account() {
        let (supply, burn) = funded("bob", 50);
        supply.burn_from(&burn, &Address::from("bob"), 20).unwrap();
        assert_eq!(supply.balance(&Address::from("bob")), 30);
        assert_eq!(supply.stats().total_supply, 30);
    }

    #[test]
    fn test_capability_bound_to_issuing_supply() {
        let (supply, _) = funded("alice", 100);
        let other = SupplyManager::new();
        let other_burn = other.issue_burn_capability().unwrap();
        let other_mint = other.issue_mint_capability().unwrap();
        let alice = Address::from("alice");

        assert_eq!(
            supply.burn_from(&other_burn, &alice, 100).unwrap_err(),
            EconomicsError::ForeignCapability("Burn")
        );
        supply.withdraw(&alice, 10).unwrap();
        assert!(supply.burn(&other_burn, 10).is_err());
        assert_eq!(
            supply
                .mint(&other_mint, &Address::from("mallory"), 1_000_000)
                .unwrap_err(),
            EconomicsError::ForeignCapability("Mint")
        );

        assert_eq!(supply.balance(&alice), 90);
        assert_eq!(supply.balance(&Address::from("mallory")), 0);
        let stats = supply.stats();
        assert_eq!(stats.total_burned, 0);
        assert_eq!(stats.total_supply, 100);
        assert_eq!(stats.in_flight, 10);
    }

    #[test]
    fn test_deposit_returns_in_flight() {
        let (supply, _) = funded("alice", 100);
        supply.withdraw(&Address::from("alice"), 60).unwrap();
        supply.deposit(&Address::from("carol"), 60).unwrap();
        assert_eq!(supply.balance(&Address::from("carol")), 60);
        assert_eq!(supply.stats().in_flight, 0);
        assert_eq!(supply.stats().total_supply, 100);
    }
}
