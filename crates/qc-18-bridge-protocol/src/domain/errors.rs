//! # Domain Errors
//!
//! Error types for the Bridge Protocol Engine.

use super::value_objects::{BridgePhase, Commitment, ProposalStatus, Role};
use thiserror::Error;

/// Hash type (32-byte SHA-256).
pub type Hash = [u8; 32];

/// Address type (20-byte).
pub type Address = [u8; 20];

/// Asset identifier (token contract address on the home domain).
pub type AssetId = [u8; 20];

/// Token amount. Arithmetic on it is always checked.
pub type Amount = u128;

/// Globally unique message identifier.
pub type MessageId = Hash;

/// Collection identifier in the collection registry.
pub type CollectionId = Hash;

/// Bridge protocol error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// Message id was already consumed.
    #[error("Duplicate message: {}", hex::encode(.0))]
    DuplicateMessage(MessageId),

    /// Verifier rejected the proof.
    #[error("Proof rejected")]
    ProofRejected,

    /// Proof bytes could not be interpreted by the verifier.
    #[error("Invalid proof format: {0}")]
    InvalidProofFormat(String),

    /// Another verification cycle is in flight. Retry later.
    #[error("Bridge busy: verification cycle in flight")]
    Busy,

    /// Addition would exceed the representable range.
    #[error("Arithmetic overflow")]
    Overflow,

    /// Release requested more than is locked.
    #[error("Insufficient locked balance: requested {requested}, available {available}")]
    InsufficientLocked {
        /// Requested amount
        requested: Amount,
        /// Currently locked
        available: Amount,
    },

    /// Nothing released to claim.
    #[error("Insufficient released balance")]
    InsufficientReleased,

    /// Amount must be strictly positive.
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    /// Caller does not hold the required role.
    #[error("Unauthorized: {} lacks role {role:?}", hex::encode(.principal))]
    Unauthorized {
        /// Calling principal
        principal: Address,
        /// Required role
        role: Role,
    },

    /// Upgrade activation attempted before the delay elapsed.
    #[error("Timelock not elapsed: now={now}, earliest={earliest}")]
    TimingNotElapsed {
        /// Current time
        now: u64,
        /// Earliest activation time
        earliest: u64,
    },

    /// Upgrade target is unknown or lacks the required capabilities.
    #[error("Invalid implementation: {0}")]
    InvalidImplementation(String),

    /// Bridge is halted awaiting manual recovery.
    #[error("Bridge halted awaiting manual recovery")]
    Halted,

    /// Invalid bridge phase transition.
    #[error("Invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Current phase
        from: BridgePhase,
        /// Attempted phase
        to: BridgePhase,
    },

    /// Proposed commitment does not advance the trusted one.
    #[error("Non-monotonic commitment: current {current}, proposed {proposed}")]
    NonMonotonicCommitment {
        /// Trusted commitment
        current: Commitment,
        /// Commitment claimed by the proof
        proposed: Commitment,
    },

    /// Message failed shape validation.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Active logic does not support the requested action.
    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    /// Collection id already present in the registry.
    #[error("Collection already registered: {}", hex::encode(.0))]
    CollectionAlreadyRegistered(CollectionId),

    /// Upgrade proposal not found.
    #[error("Upgrade proposal not found: {0}")]
    ProposalNotFound(u64),

    /// Upgrade proposal is not in a state that allows the operation.
    #[error("Proposal {id} is {status:?}")]
    InvalidProposalStatus {
        /// Proposal id
        id: u64,
        /// Current status
        status: ProposalStatus,
    },

    /// External asset transfer failed; the claim was reverted.
    #[error("Payout failed: {0}")]
    PayoutFailed(String),

    /// Snapshot encoding or decoding failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal accounting invariant broken. The bridge halts.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Configuration rejected at construction.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BridgeError {
    /// Whether the caller may retry without engine-side cleanup.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy | Self::ProofRejected)
    }

    /// Stable label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::DuplicateMessage(_) => "duplicate_message",
            Self::ProofRejected => "proof_rejected",
            Self::InvalidProofFormat(_) => "invalid_proof_format",
            Self::Busy => "busy",
            Self::Overflow => "overflow",
            Self::InsufficientLocked { .. } => "insufficient_locked",
            Self::InsufficientReleased => "insufficient_released",
            Self::ZeroAmount => "zero_amount",
            Self::Unauthorized { .. } => "unauthorized",
            Self::TimingNotElapsed { .. } => "timing_not_elapsed",
            Self::InvalidImplementation(_) => "invalid_implementation",
            Self::Halted => "halted",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::NonMonotonicCommitment { .. } => "non_monotonic_commitment",
            Self::InvalidMessage(_) => "invalid_message",
            Self::UnsupportedAction(_) => "unsupported_action",
            Self::CollectionAlreadyRegistered(_) => "collection_already_registered",
            Self::ProposalNotFound(_) => "proposal_not_found",
            Self::InvalidProposalStatus { .. } => "invalid_proposal_status",
            Self::PayoutFailed(_) => "payout_failed",
            Self::Storage(_) => "storage",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
