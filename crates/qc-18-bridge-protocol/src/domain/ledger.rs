//! # Escrow Ledger
//!
//! Locked-balance accounting per (owner, asset).
//!
//! All mutations go through a `LedgerTransaction`: an overlay over the
//! committed ledger that is either turned into `LedgerChanges` and applied
//! as a whole, or dropped. Arithmetic is always checked.

use super::entities::{AssetTotals, EscrowBalance, EscrowEntry};
use super::errors::{Address, Amount, AssetId, BridgeError};
use super::invariants::{invariant_conservation, invariant_positive_amount};
use super::value_objects::EscrowPhase;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Escrow record key.
pub type EscrowKey = (Address, AssetId);

/// Committed escrow state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowLedger {
    balances: BTreeMap<EscrowKey, EscrowBalance>,
    /// Lifetime counters per asset.
    totals: BTreeMap<AssetId, AssetTotals>,
    /// Current sums across owners per asset.
    pools: BTreeMap<AssetId, EscrowBalance>,
    /// Wrapped supply minted by accepted proofs.
    wrapped_supply: BTreeMap<AssetId, Amount>,
}

impl EscrowLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a staged mutation.
    pub fn transaction(&self) -> LedgerTransaction<'_> {
        LedgerTransaction {
            base: self,
            balances: BTreeMap::new(),
            totals: BTreeMap::new(),
            pools: BTreeMap::new(),
            wrapped_supply: BTreeMap::new(),
        }
    }

    /// Apply staged changes. Infallible: validation happened in `into_changes`.
    pub fn apply(&mut self, changes: LedgerChanges) {
        self.balances.extend(changes.balances);
        self.totals.extend(changes.totals);
        self.pools.extend(changes.pools);
        self.wrapped_supply.extend(changes.wrapped_supply);
    }

    /// Lock `amount` for (owner, asset). Returns the new locked balance.
    pub fn lock(
        &mut self,
        owner: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<Amount, BridgeError> {
        self.run(|tx| tx.lock(owner, asset, amount))
    }

    /// Move `amount` from Locked to Released.
    pub fn release(
        &mut self,
        owner: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<EscrowBalance, BridgeError> {
        self.run(|tx| tx.release(owner, asset, amount))
    }

    /// Move all Released to Claimed. Returns the payable amount.
    pub fn claim(&mut self, owner: Address, asset: AssetId) -> Result<Amount, BridgeError> {
        self.run(|tx| tx.claim(owner, asset))
    }

    /// Return a claimed amount to Released after a failed payout.
    pub fn restore_claim(
        &mut self,
        owner: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<EscrowBalance, BridgeError> {
        self.run(|tx| tx.restore_claim(owner, asset, amount))
    }

    fn run<T>(
        &mut self,
        op: impl FnOnce(&mut LedgerTransaction<'_>) -> Result<T, BridgeError>,
    ) -> Result<T, BridgeError> {
        let mut tx = self.transaction();
        let out = op(&mut tx)?;
        let changes = tx.into_changes()?;
        self.apply(changes);
        Ok(out)
    }

    /// Escrow record for (owner, asset).
    pub fn balance(&self, owner: &Address, asset: &AssetId) -> EscrowBalance {
        self.balances
            .get(&(*owner, *asset))
            .copied()
            .unwrap_or_default()
    }

    /// Lifetime totals for an asset.
    pub fn totals(&self, asset: &AssetId) -> AssetTotals {
        self.totals.get(asset).copied().unwrap_or_default()
    }

    /// Current sums across owners for an asset.
    pub fn pool(&self, asset: &AssetId) -> EscrowBalance {
        self.pools.get(asset).copied().unwrap_or_default()
    }

    /// Wrapped supply minted for an asset.
    pub fn wrapped_supply(&self, asset: &AssetId) -> Amount {
        self.wrapped_supply.get(asset).copied().unwrap_or_default()
    }

    /// All non-zero entries, one per (owner, asset, phase).
    pub fn entries(&self) -> Vec<EscrowEntry> {
        let phases = [
            EscrowPhase::Locked,
            EscrowPhase::Released,
            EscrowPhase::Claimed,
        ];
        self.balances
            .iter()
            .flat_map(|((owner, asset), balance)| {
                phases.iter().filter_map(move |phase| {
                    let amount = balance.amount_in(*phase);
                    (amount > 0).then_some(EscrowEntry {
                        owner: *owner,
                        asset: *asset,
                        amount,
                        phase: *phase,
                    })
                })
            })
            .collect()
    }

    /// Full scan: recompute per-asset sums from every record and check them
    /// against the lifetime counters.
    pub fn audit(&self) -> Result<(), BridgeError> {
        let mut sums: BTreeMap<AssetId, EscrowBalance> = BTreeMap::new();
        for ((_, asset), balance) in &self.balances {
            let sum = sums.entry(*asset).or_default();
            sum.locked = sum.locked.checked_add(balance.locked).ok_or(BridgeError::Overflow)?;
            sum.released = sum
                .released
                .checked_add(balance.released)
                .ok_or(BridgeError::Overflow)?;
            sum.claimed = sum
                .claimed
                .checked_add(balance.claimed)
                .ok_or(BridgeError::Overflow)?;
        }
        for (asset, totals) in &self.totals {
            let sum = sums.get(asset).copied().unwrap_or_default();
            invariant_conservation(totals, sum.locked, sum.released, sum.claimed)?;
            if self.pool(asset) != sum {
                return Err(BridgeError::InvariantViolation(format!(
                    "pool for asset {} out of sync",
                    hex::encode(asset)
                )));
            }
        }
        Ok(())
    }
}

/// Staged ledger mutation reading through to the committed ledger.
#[derive(Debug)]
pub struct LedgerTransaction<'a> {
    base: &'a EscrowLedger,
    balances: BTreeMap<EscrowKey, EscrowBalance>,
    totals: BTreeMap<AssetId, AssetTotals>,
    pools: BTreeMap<AssetId, EscrowBalance>,
    wrapped_supply: BTreeMap<AssetId, Amount>,
}

impl<'a> LedgerTransaction<'a> {
    /// Balance as seen by this transaction.
    pub fn balance(&self, owner: &Address, asset: &AssetId) -> EscrowBalance {
        self.balances
            .get(&(*owner, *asset))
            .copied()
            .unwrap_or_else(|| self.base.balance(owner, asset))
    }

    fn totals(&self, asset: &AssetId) -> AssetTotals {
        self.totals
            .get(asset)
            .copied()
            .unwrap_or_else(|| self.base.totals(asset))
    }

    fn pool(&self, asset: &AssetId) -> EscrowBalance {
        self.pools
            .get(asset)
            .copied()
            .unwrap_or_else(|| self.base.pool(asset))
    }

    fn wrapped(&self, asset: &AssetId) -> Amount {
        self.wrapped_supply
            .get(asset)
            .copied()
            .unwrap_or_else(|| self.base.wrapped_supply(asset))
    }

    fn stage(
        &mut self,
        owner: Address,
        asset: AssetId,
        balance: EscrowBalance,
        totals: AssetTotals,
        pool: EscrowBalance,
    ) {
        self.balances.insert((owner, asset), balance);
        self.totals.insert(asset, totals);
        self.pools.insert(asset, pool);
    }

    /// Lock `amount`. Returns the new locked balance.
    pub fn lock(
        &mut self,
        owner: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<Amount, BridgeError> {
        invariant_positive_amount(amount)?;
        let mut balance = self.balance(&owner, &asset);
        let mut totals = self.totals(&asset);
        let mut pool = self.pool(&asset);

        balance.locked = balance.locked.checked_add(amount).ok_or(BridgeError::Overflow)?;
        totals.deposited = totals
            .deposited
            .checked_add(amount)
            .ok_or(BridgeError::Overflow)?;
        pool.locked = pool.locked.checked_add(amount).ok_or(BridgeError::Overflow)?;

        self.stage(owner, asset, balance, totals, pool);
        Ok(balance.locked)
    }

    /// Move `amount` from Locked to Released.
    pub fn release(
        &mut self,
        owner: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<EscrowBalance, BridgeError> {
        invariant_positive_amount(amount)?;
        let mut balance = self.balance(&owner, &asset);
        let mut totals = self.totals(&asset);
        let mut pool = self.pool(&asset);

        balance.locked =
            balance
                .locked
                .checked_sub(amount)
                .ok_or(BridgeError::InsufficientLocked {
                    requested: amount,
                    available: balance.locked,
                })?;
        balance.released = balance
            .released
            .checked_add(amount)
            .ok_or(BridgeError::Overflow)?;
        totals.released = totals
            .released
            .checked_add(amount)
            .ok_or(BridgeError::Overflow)?;
        pool.locked = pool
            .locked
            .checked_sub(amount)
            .ok_or_else(|| BridgeError::InvariantViolation("pool locked underflow".into()))?;
        pool.released = pool.released.checked_add(amount).ok_or(BridgeError::Overflow)?;

        self.stage(owner, asset, balance, totals, pool);
        Ok(balance)
    }

    /// Move all Released to Claimed. Returns the payable amount.
    pub fn claim(&mut self, owner: Address, asset: AssetId) -> Result<Amount, BridgeError> {
        let mut balance = self.balance(&owner, &asset);
        let mut totals = self.totals(&asset);
        let mut pool = self.pool(&asset);

        let amount = balance.released;
        if amount == 0 {
            return Err(BridgeError::InsufficientReleased);
        }
        balance.released = 0;
        balance.claimed = balance
            .claimed
            .checked_add(amount)
            .ok_or(BridgeError::Overflow)?;
        totals.claimed = totals
            .claimed
            .checked_add(amount)
            .ok_or(BridgeError::Overflow)?;
        pool.released = pool
            .released
            .checked_sub(amount)
            .ok_or_else(|| BridgeError::InvariantViolation("pool released underflow".into()))?;
        pool.claimed = pool.claimed.checked_add(amount).ok_or(BridgeError::Overflow)?;

        self.stage(owner, asset, balance, totals, pool);
        Ok(amount)
    }

    /// Return `amount` from Claimed to Released.
    pub fn restore_claim(
        &mut self,
        owner: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<EscrowBalance, BridgeError> {
        invariant_positive_amount(amount)?;
        let mut balance = self.balance(&owner, &asset);
        let mut totals = self.totals(&asset);
        let mut pool = self.pool(&asset);

        let underflow = || BridgeError::InvariantViolation("restoring more than claimed".into());
        balance.claimed = balance.claimed.checked_sub(amount).ok_or_else(underflow)?;
        balance.released = balance
            .released
            .checked_add(amount)
            .ok_or(BridgeError::Overflow)?;
        totals.claimed = totals.claimed.checked_sub(amount).ok_or_else(underflow)?;
        pool.claimed = pool.claimed.checked_sub(amount).ok_or_else(underflow)?;
        pool.released = pool.released.checked_add(amount).ok_or(BridgeError::Overflow)?;

        self.stage(owner, asset, balance, totals, pool);
        Ok(balance)
    }

    /// Increase wrapped supply. Returns the new supply.
    pub fn mint(&mut self, asset: AssetId, amount: Amount) -> Result<Amount, BridgeError> {
        invariant_positive_amount(amount)?;
        let supply = self
            .wrapped(&asset)
            .checked_add(amount)
            .ok_or(BridgeError::Overflow)?;
        self.wrapped_supply.insert(asset, supply);
        Ok(supply)
    }

    /// Check conservation on every touched asset and freeze the overlay.
    pub fn into_changes(self) -> Result<LedgerChanges, BridgeError> {
        let touched: BTreeSet<AssetId> = self.totals.keys().copied().collect();
        for asset in &touched {
            let pool = self.pool(asset);
            invariant_conservation(&self.totals(asset), pool.locked, pool.released, pool.claimed)?;
        }
        Ok(LedgerChanges {
            balances: self.balances,
            totals: self.totals,
            pools: self.pools,
            wrapped_supply: self.wrapped_supply,
        })
    }
}

/// Validated, not yet applied ledger changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerChanges {
    balances: BTreeMap<EscrowKey, EscrowBalance>,
    totals: BTreeMap<AssetId, AssetTotals>,
    pools: BTreeMap<AssetId, EscrowBalance>,
    wrapped_supply: BTreeMap<AssetId, Amount>,
}

impl LedgerChanges {
    /// True if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty() && self.wrapped_supply.is_empty()
    }
}
