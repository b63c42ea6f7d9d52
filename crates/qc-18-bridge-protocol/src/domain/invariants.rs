//! # Domain Invariants
//!
//! Business rules for the Bridge Protocol Engine.

use super::entities::{AssetTotals, UpgradeProposal};
use super::errors::{Amount, BridgeError};
use super::value_objects::{Capability, Commitment, REQUIRED_CAPABILITIES};
use std::collections::BTreeSet;

/// Invariant: amounts are strictly positive.
pub fn invariant_positive_amount(amount: Amount) -> Result<(), BridgeError> {
    if amount == 0 {
        return Err(BridgeError::ZeroAmount);
    }
    Ok(())
}

/// Invariant: the commitment only advances.
pub fn invariant_commitment_advances(
    current: &Commitment,
    proposed: &Commitment,
) -> Result<(), BridgeError> {
    if !proposed.advances_from(current) {
        return Err(BridgeError::NonMonotonicCommitment {
            current: *current,
            proposed: *proposed,
        });
    }
    Ok(())
}

/// Invariant: escrow conservation for one asset.
///
/// Σ locked = deposited − released and Σ released = released − claimed.
pub fn invariant_conservation(
    totals: &AssetTotals,
    sum_locked: Amount,
    sum_released: Amount,
    sum_claimed: Amount,
) -> Result<(), BridgeError> {
    let expected_locked = totals
        .deposited
        .checked_sub(totals.released)
        .ok_or_else(|| BridgeError::InvariantViolation("released exceeds deposited".into()))?;
    let expected_released = totals
        .released
        .checked_sub(totals.claimed)
        .ok_or_else(|| BridgeError::InvariantViolation("claimed exceeds released".into()))?;

    if sum_locked != expected_locked {
        return Err(BridgeError::InvariantViolation(format!(
            "locked {sum_locked} != deposited-released {expected_locked}"
        )));
    }
    if sum_released != expected_released {
        return Err(BridgeError::InvariantViolation(format!(
            "released {sum_released} != released-claimed {expected_released}"
        )));
    }
    if sum_claimed != totals.claimed {
        return Err(BridgeError::InvariantViolation(format!(
            "claimed {sum_claimed} != total claimed {}",
            totals.claimed
        )));
    }
    Ok(())
}

/// Invariant: upgrade timelock has elapsed.
pub fn invariant_activation_window(
    proposal: &UpgradeProposal,
    now: u64,
) -> Result<(), BridgeError> {
    if !proposal.is_mature(now) {
        return Err(BridgeError::TimingNotElapsed {
            now,
            earliest: proposal.earliest_activation,
        });
    }
    Ok(())
}

/// Invariant: implementation exposes the required capability surface.
pub fn invariant_required_capabilities(
    capabilities: &BTreeSet<Capability>,
) -> Result<(), BridgeError> {
    let missing: Vec<_> = REQUIRED_CAPABILITIES
        .iter()
        .filter(|c| !capabilities.contains(c))
        .collect();
    if !missing.is_empty() {
        return Err(BridgeError::InvalidImplementation(format!(
            "missing capabilities {missing:?}"
        )));
    }
    Ok(())
}
