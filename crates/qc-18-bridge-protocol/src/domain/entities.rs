//! # Domain Entities
//!
//! Core entities for the Bridge Protocol Engine.

use super::errors::{Address, Amount, AssetId, CollectionId, Hash, MessageId};
use super::value_objects::{
    BridgePhase, CollectionMetadata, Commitment, Direction, EscrowPhase, ImplementationId,
    ProposalStatus,
};
use crate::algorithms::{compute_message_id, payload_digest, statement_digest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cross-domain message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier (derived from the other fields).
    pub id: MessageId,
    /// Outbound or inbound.
    pub direction: Direction,
    /// Originating account.
    pub sender: Address,
    /// Destination account.
    pub recipient: Address,
    /// Opaque payload interpreted by the active bridge logic.
    pub payload: Vec<u8>,
    /// Monotonic per sender.
    pub nonce: u64,
}

impl Message {
    /// Create a message and derive its id.
    pub fn new(
        direction: Direction,
        sender: Address,
        recipient: Address,
        payload: Vec<u8>,
        nonce: u64,
    ) -> Self {
        let id = compute_message_id(direction, &sender, &recipient, nonce, &payload);
        Self {
            id,
            direction,
            sender,
            recipient,
            payload,
            nonce,
        }
    }

    /// Recompute the id from the message fields.
    pub fn compute_id(&self) -> MessageId {
        compute_message_id(
            self.direction,
            &self.sender,
            &self.recipient,
            self.nonce,
            &self.payload,
        )
    }

    /// True if the stored id matches the fields.
    pub fn has_valid_id(&self) -> bool {
        self.id == self.compute_id()
    }

    /// Short hex prefix of the id for logs.
    pub fn short_id(&self) -> String {
        hex::encode(&self.id[..4])
    }
}

/// Per (owner, asset) escrow record.
///
/// Amounts move Locked → Released → Claimed and never backwards, except
/// that a failed payout returns a claimed amount to Released.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowBalance {
    /// Held in escrow.
    pub locked: Amount,
    /// Released, awaiting claim.
    pub released: Amount,
    /// Claimed and handed to payout.
    pub claimed: Amount,
}

impl EscrowBalance {
    /// Amount in the given phase.
    pub fn amount_in(&self, phase: EscrowPhase) -> Amount {
        match phase {
            EscrowPhase::Locked => self.locked,
            EscrowPhase::Released => self.released,
            EscrowPhase::Claimed => self.claimed,
        }
    }

    /// True if every field is zero.
    pub fn is_empty(&self) -> bool {
        self.locked == 0 && self.released == 0 && self.claimed == 0
    }
}

/// View of one non-zero phase of an escrow record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowEntry {
    /// Owner account.
    pub owner: Address,
    /// Asset.
    pub asset: AssetId,
    /// Amount in `phase`.
    pub amount: Amount,
    /// Lifecycle phase.
    pub phase: EscrowPhase,
}

/// Lifetime totals for an asset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTotals {
    /// Total ever deposited.
    pub deposited: Amount,
    /// Total ever released.
    pub released: Amount,
    /// Total currently counted as claimed.
    pub claimed: Amount,
}

/// Authoritative bridge state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeState {
    /// Current phase.
    pub phase: BridgePhase,
    /// Latest accepted commitment.
    pub commitment: Commitment,
    /// Registered collections.
    pub collection_registry: BTreeMap<CollectionId, CollectionMetadata>,
}

impl BridgeState {
    /// Initial state anchored at the genesis commitment.
    pub fn genesis(commitment: Commitment) -> Self {
        Self {
            phase: BridgePhase::Idle,
            commitment,
            collection_registry: BTreeMap::new(),
        }
    }
}

/// Validity proof from the counterpart domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityProof {
    /// Commitment the proof attests to.
    pub new_commitment: Commitment,
    /// Opaque proof bytes.
    pub data: Vec<u8>,
}

/// Statement a validity proof must attest to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStatement {
    /// Message being authorised.
    pub message_id: MessageId,
    /// Digest of the message payload.
    pub payload_digest: Hash,
    /// Commitment trusted when verification began.
    pub trusted: Commitment,
    /// Commitment claimed by the proof.
    pub claimed: Commitment,
}

impl ProofStatement {
    /// Build the statement for a message against a trusted commitment.
    pub fn for_message(message: &Message, trusted: Commitment, claimed: Commitment) -> Self {
        Self {
            message_id: message.id,
            payload_digest: payload_digest(&message.payload),
            trusted,
            claimed,
        }
    }

    /// Digest attested to by the proof.
    pub fn digest(&self) -> Hash {
        statement_digest(
            &self.message_id,
            &self.payload_digest,
            &self.trusted,
            &self.claimed,
        )
    }
}

/// Upgrade proposal record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeProposal {
    /// Proposal id.
    pub id: u64,
    /// Implementation to activate.
    pub proposed_implementation: ImplementationId,
    /// Principal that proposed it.
    pub proposer: Address,
    /// Creation time (unix seconds).
    pub created_at: u64,
    /// Not activatable before this time (unix seconds).
    pub earliest_activation: u64,
    /// Current status.
    pub status: ProposalStatus,
}

impl UpgradeProposal {
    /// True once the timelock has passed.
    pub fn is_mature(&self, now: u64) -> bool {
        now >= self.earliest_activation
    }
}
