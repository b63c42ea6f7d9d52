//! # Outbound Ports
//!
//! Traits for external dependencies (proof oracle, clock, payout).

use crate::domain::{
    Address, Amount, AssetId, BridgeError, Commitment, ProofStatement, ValidityProof,
};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Validity proof oracle - outbound port.
///
/// Must be deterministic and side-effect free. A malformed proof yields
/// `InvalidProofFormat`; a well-formed proof that does not attest to the
/// statement yields `Ok(false)`.
pub trait ProofVerifier: Send + Sync {
    /// Verify `proof` for `statement` against the trusted commitment.
    fn verify(
        &self,
        statement: &ProofStatement,
        proof: &ValidityProof,
        trusted: &Commitment,
    ) -> Result<bool, BridgeError>;
}

/// Time source in unix seconds - outbound port.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> u64;
}

/// Asset payout collaborator - outbound port.
///
/// Called only after the ledger has been debited. Implementations may call
/// back into the engine.
#[async_trait]
pub trait AssetTransfer: Send + Sync {
    /// Pay `amount` of `asset` to `to`.
    async fn transfer(&self, to: Address, asset: AssetId, amount: Amount)
        -> Result<(), BridgeError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock proof verifier for testing.
#[derive(Default)]
pub struct MockProofVerifier {
    /// Reject every proof.
    pub should_reject: bool,
    /// Treat every proof as malformed.
    pub malformed: bool,
    calls: AtomicUsize,
}

impl MockProofVerifier {
    /// Verifier accepting every proof.
    pub fn accepting() -> Self {
        Self::default()
    }

    /// Verifier rejecting every proof.
    pub fn rejecting() -> Self {
        Self {
            should_reject: true,
            ..Self::default()
        }
    }

    /// Number of `verify` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProofVerifier for MockProofVerifier {
    fn verify(
        &self,
        statement: &ProofStatement,
        proof: &ValidityProof,
        _trusted: &Commitment,
    ) -> Result<bool, BridgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.malformed {
            return Err(BridgeError::InvalidProofFormat("mock malformed".into()));
        }
        Ok(!self.should_reject && proof.new_commitment == statement.claimed)
    }
}

/// Manually driven clock for testing.
pub struct ManualClock {
    now: RwLock<u64>,
}

impl ManualClock {
    /// Create at `start`.
    pub fn new(start: u64) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Set current time for testing.
    pub fn set_time(&self, time: u64) {
        *self.now.write() = time;
    }

    /// Advance time for testing.
    pub fn advance_time(&self, secs: u64) {
        let mut now = self.now.write();
        *now = now.saturating_add(secs);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(1_700_000_000)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        *self.now.read()
    }
}

/// Mock asset transfer recording payouts.
#[derive(Default)]
pub struct MockAssetTransfer {
    /// Fail every transfer.
    pub should_fail: bool,
    transfers: Mutex<Vec<(Address, AssetId, Amount)>>,
}

impl MockAssetTransfer {
    /// Transfer that always fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Successful transfers so far.
    pub fn transfers(&self) -> Vec<(Address, AssetId, Amount)> {
        self.transfers.lock().clone()
    }
}

#[async_trait]
impl AssetTransfer for MockAssetTransfer {
    async fn transfer(
        &self,
        to: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<(), BridgeError> {
        if self.should_fail {
            return Err(BridgeError::PayoutFailed("mock failure".into()));
        }
        self.transfers.lock().push((to, asset, amount));
        Ok(())
    }
}
