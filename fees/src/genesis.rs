//! Genesis bootstrap for fee collection

use economics::{BurnCapability, MintCapability, StakeLedger, Supply};
use std::sync::Arc;

use crate::capability::SystemCapabilities;
use crate::collector::FeeCollector;
use crate::config::FeeCollectionParams;
use crate::error::Result;

/// Build the ledger's collector, install the supply capabilities, and
/// enable collection if `params` asks for it.
pub fn bootstrap<S: Supply, L: StakeLedger>(
    supply: Arc<S>,
    ledger: Arc<L>,
    burn: BurnCapability,
    mint: Option<MintCapability>,
    params: &FeeCollectionParams,
) -> Result<(FeeCollector<S, L>, SystemCapabilities)> {
    params.validate()?;

    let (collector, caps) = FeeCollector::new(supply, ledger);
    collector.store_burn_capability(&caps.genesis, burn)?;
    if let Some(mint) = mint {
        collector.store_mint_capability(&caps.genesis, mint)?;
    }

    if params.enabled {
        collector.initialize(
            &caps.governance,
            params.max_batch_slots,
            params.block_distribution_pct,
            params.batch_distribution_pct,
        )?;
    } else {
        log::info!("Fee collection disabled at genesis; fees will be burned");
    }
    Ok((collector, caps))
}
