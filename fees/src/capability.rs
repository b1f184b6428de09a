//! Privileged caller tokens and capability custody
//!
//! Each collector issues one set of role tokens when it is created. A token
//! carries the identity of its issuer, so a token minted for one collector is
//! rejected by every other collector. Tokens have no public constructor.

use economics::{BurnCapability, MintCapability};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use crate::error::{FeeError, Result};

static NEXT_ISSUER: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IssuerId(u64);

impl IssuerId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_ISSUER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Held by genesis; installs the burn and mint capabilities.
#[derive(Debug)]
pub struct GenesisCap {
    issuer: IssuerId,
}

/// Held by governance; initializes and reconfigures fee collection.
#[derive(Debug)]
pub struct GovernanceCap {
    issuer: IssuerId,
}

/// Held by the block prologue and reconfiguration paths.
#[derive(Debug)]
pub struct PrologueCap {
    issuer: IssuerId,
}

/// Held by the transaction epilogue.
#[derive(Debug)]
pub struct EpilogueCap {
    issuer: IssuerId,
}

pub(crate) trait SystemCap {
    fn issuer(&self) -> IssuerId;
}

impl SystemCap for GenesisCap {
    fn issuer(&self) -> IssuerId {
        self.issuer
    }
}

impl SystemCap for GovernanceCap {
    fn issuer(&self) -> IssuerId {
        self.issuer
    }
}

impl SystemCap for PrologueCap {
    fn issuer(&self) -> IssuerId {
        self.issuer
    }
}

impl SystemCap for EpilogueCap {
    fn issuer(&self) -> IssuerId {
        self.issuer
    }
}

/// The full set of role tokens handed out by a collector at creation.
#[derive(Debug)]
pub struct SystemCapabilities {
    pub genesis: GenesisCap,
    pub governance: GovernanceCap,
    pub prologue: PrologueCap,
    pub epilogue: EpilogueCap,
}

impl SystemCapabilities {
    pub(crate) fn issue(issuer: IssuerId) -> Self {
        Self {
            genesis: GenesisCap { issuer },
            governance: GovernanceCap { issuer },
            prologue: PrologueCap { issuer },
            epilogue: EpilogueCap { issuer },
        }
    }
}

/// Single-assignment slots for the supply capabilities.
#[derive(Debug, Default)]
pub(crate) struct CapabilityStore {
    burn: OnceLock<BurnCapability>,
    mint: OnceLock<MintCapability>,
}

impl CapabilityStore {
    pub(crate) fn store_burn(&self, cap: BurnCapability) -> Result<()> {
        self.burn
            .set(cap)
            .map_err(|_| FeeError::BurnCapabilityAlreadyStored)
    }

    pub(crate) fn store_mint(&self, cap: MintCapability) -> Result<()> {
        self.mint
            .set(cap)
            .map_err(|_| FeeError::MintCapabilityAlreadyStored)
    }

    pub(crate) fn burn(&self) -> Result<&BurnCapability> {
        self.burn.get().ok_or(FeeError::BurnCapabilityMissing)
    }

    pub(crate) fn mint(&self) -> Result<&MintCapability> {
        self.mint.get().ok_or(FeeError::MintCapabilityMissing)
    }
}
