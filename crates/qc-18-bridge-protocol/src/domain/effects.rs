//! # Effect Records
//!
//! Outcomes published to collaborators (event log, downstream notification).

use super::entities::Message;
use super::errors::{Address, Amount, AssetId, BridgeError, CollectionId, MessageId};
use super::value_objects::Commitment;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Funds locked in escrow.
    Deposited {
        /// Owner
        owner: Address,
        /// Asset
        asset: AssetId,
        /// Amount deposited
        amount: Amount,
    },
    /// Outbound message queued for the counterpart domain.
    OutboundQueued {
        /// Outbound message
        message: Message,
    },
    /// Escrow released by an accepted proof.
    Released {
        /// Owner
        owner: Address,
        /// Asset
        asset: AssetId,
        /// Amount
        amount: Amount,
    },
    /// Wrapped value minted by an accepted proof.
    Minted {
        /// Recipient
        recipient: Address,
        /// Asset
        asset: AssetId,
        /// Amount
        amount: Amount,
    },
    /// Collection added to the registry.
    CollectionRegistered {
        /// Collection id
        collection_id: CollectionId,
    },
    /// Trusted commitment advanced.
    CommitmentAdvanced {
        /// Previous commitment
        from: Commitment,
        /// New commitment
        to: Commitment,
    },
    /// Released escrow claimed for payout.
    Claimed {
        /// Owner
        owner: Address,
        /// Asset
        asset: AssetId,
        /// Amount payable
        amount: Amount,
    },
    /// Payout failed; amount returned to Released.
    ClaimReverted {
        /// Owner
        owner: Address,
        /// Asset
        asset: AssetId,
        /// Amount restored
        amount: Amount,
    },
    /// Bridge halted.
    Halted {
        /// Operator-facing reason
        reason: String,
    },
    /// Bridge recovered from halt.
    Recovered {
        /// Guardian that performed recovery
        guardian: Address,
    },
}

/// Entry in the effect log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRecord {
    /// Position in the log.
    pub sequence: u64,
    /// Correlation id shared by all effects of one operation.
    pub correlation_id: Uuid,
    /// Message that caused the effect, if any.
    pub message_id: Option<MessageId>,
    /// What happened.
    pub kind: EffectKind,
    /// Commitment after the effect.
    pub commitment: Commitment,
    /// Unix seconds.
    pub timestamp: u64,
}

/// Result of a successful inbound message cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageReceipt {
    /// Consumed message id.
    pub message_id: MessageId,
    /// Commitment after the cycle.
    pub commitment: Commitment,
    /// Effects appended by the cycle.
    pub effects: Vec<EffectRecord>,
}

/// Result of a deposit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepositReceipt {
    /// Locked balance of (owner, asset) after the deposit.
    pub locked: Amount,
    /// Outbound message for the counterpart domain.
    pub message: Message,
}

/// Outcome of inbound message submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Proof accepted and state committed.
    Accepted(MessageReceipt),
    /// Rejected; state unchanged.
    Rejected(BridgeError),
    /// Another cycle in flight; retry later.
    Busy,
}

impl From<Result<MessageReceipt, BridgeError>> for SubmissionOutcome {
    fn from(result: Result<MessageReceipt, BridgeError>) -> Self {
        match result {
            Ok(receipt) => Self::Accepted(receipt),
            Err(BridgeError::Busy) => Self::Busy,
            Err(e) => Self::Rejected(e),
        }
    }
}

impl SubmissionOutcome {
    /// True if accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}
