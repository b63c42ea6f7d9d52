//! In-Memory Asset Transfer Adapter
//!
//! Implements `AssetTransfer` against an in-memory payout reserve.

use crate::domain::{Address, Amount, AssetId, BridgeError};
use crate::ports::outbound::AssetTransfer;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, warn};

/// In-memory payout reserve for testing and local deployments.
///
/// In production, this would submit a transfer on the destination domain.
#[derive(Default)]
pub struct InMemoryAssetTransfer {
    /// Funds available for payout per asset.
    reserves: RwLock<HashMap<AssetId, Amount>>,
    /// Paid-out balances per (recipient, asset).
    credited: RwLock<HashMap<(Address, AssetId), Amount>>,
}

impl InMemoryAssetTransfer {
    /// Create with empty reserves.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add payout liquidity for an asset.
    pub fn fund(&self, asset: AssetId, amount: Amount) {
        let mut reserves = self.reserves.write();
        let reserve = reserves.entry(asset).or_default();
        *reserve = reserve.saturating_add(amount);
    }

    /// Remaining reserve for an asset.
    pub fn reserve(&self, asset: &AssetId) -> Amount {
        self.reserves.read().get(asset).copied().unwrap_or_default()
    }

    /// Total paid to (recipient, asset).
    pub fn credited(&self, recipient: &Address, asset: &AssetId) -> Amount {
        self.credited
            .read()
            .get(&(*recipient, *asset))
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl AssetTransfer for InMemoryAssetTransfer {
    async fn transfer(
        &self,
        to: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<(), BridgeError> {
        let mut reserves = self.reserves.write();
        let reserve = reserves.entry(asset).or_default();
        let Some(remaining) = reserve.checked_sub(amount) else {
            warn!(
                "[qc-18] Payout of {} exceeds reserve {} for asset {}",
                amount,
                reserve,
                hex::encode(&asset[..4])
            );
            return Err(BridgeError::PayoutFailed(format!(
                "reserve {} below payout {}",
                reserve, amount
            )));
        };
        *reserve = remaining;
        drop(reserves);

        let mut credited = self.credited.write();
        let balance = credited.entry((to, asset)).or_default();
        *balance = balance.checked_add(amount).ok_or(BridgeError::Overflow)?;

        debug!(
            "[qc-18] Paid {} of asset {} to {}",
            amount,
            hex::encode(&asset[..4]),
            hex::encode(&to[..4])
        );
        Ok(())
    }
}
