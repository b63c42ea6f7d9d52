//! # Persistence Snapshots
//!
//! Persisted state layout: message-id set, escrow records, bridge state
//! and upgrade proposals. Survives process and activation boundaries
//! unchanged in content.

use crate::domain::{
    BridgeError, BridgeState, EscrowLedger, ImplementationId, MessageRegistry, RoleRegistry,
    UpgradeProposal,
};
use serde::{Deserialize, Serialize};

/// Engine-owned persisted state.
///
/// Provisional reservations are never included and in-flight phases are
/// recorded as `Idle`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Consumed ids, outbound nonces and outbound log.
    pub registry: MessageRegistry,
    /// Escrow balances, totals and wrapped supply.
    pub ledger: EscrowLedger,
    /// Phase, commitment and collection registry.
    pub state: BridgeState,
    /// Sequence the next effect record will carry.
    pub next_effect_sequence: u64,
}

/// Governor-owned persisted state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorSnapshot {
    /// Role assignments.
    pub roles: RoleRegistry,
    /// Proposals in id order.
    pub proposals: Vec<UpgradeProposal>,
    /// Active implementation id.
    pub active: ImplementationId,
    /// Id the next proposal will receive.
    pub next_proposal_id: u64,
}

/// Full persisted bridge state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BridgeSnapshot {
    /// Engine state.
    pub engine: EngineSnapshot,
    /// Governor state.
    pub governor: GovernorSnapshot,
}

impl BridgeSnapshot {
    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, BridgeError> {
        bincode::serialize(self).map_err(|e| BridgeError::Storage(e.to_string()))
    }

    /// Decode with bincode.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BridgeError> {
        bincode::deserialize(bytes).map_err(|e| BridgeError::Storage(e.to_string()))
    }
}
