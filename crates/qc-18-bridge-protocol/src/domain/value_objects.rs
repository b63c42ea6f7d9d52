//! # Domain Value Objects
//!
//! Immutable value types for the Bridge Protocol Engine.

use super::errors::Hash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a cross-domain message relative to this domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Leaves this domain (created by `deposit`).
    Outbound,
    /// Arrives from the counterpart domain with a validity proof.
    Inbound,
}

impl Direction {
    /// Byte tag used in message id derivation.
    pub fn tag(&self) -> u8 {
        match self {
            Direction::Outbound => 0x01,
            Direction::Inbound => 0x02,
        }
    }
}

/// Succinct representation of authoritative counterpart state.
///
/// Commitments only move forward: a successor must carry a strictly
/// greater height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment {
    /// Monotonic checkpoint height.
    pub height: u64,
    /// State root at that height.
    pub root: Hash,
}

impl Commitment {
    /// Create a commitment.
    pub fn new(height: u64, root: Hash) -> Self {
        Self { height, root }
    }

    /// Genesis commitment (height 0).
    pub fn genesis(root: Hash) -> Self {
        Self { height: 0, root }
    }

    /// True if `self` is a valid successor of `previous`.
    pub fn advances_from(&self, previous: &Commitment) -> bool {
        self.height > previous.height
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.height, hex::encode(&self.root[..4]))
    }
}

/// Bridge phase state machine.
///
/// ```text
/// [Idle] ──begin──→ [Verifying] ──accept──→ [Settling] ──commit──→ [Idle]
///   ↑                    │                      │
///   └──────reject────────┘                      └──abort──→ [Idle]
///
/// any ──halt──→ [Halted] ──manual recovery──→ [Idle]
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgePhase {
    /// No cycle in flight.
    #[default]
    Idle,
    /// A proof is being verified against the trusted commitment.
    Verifying,
    /// Proof accepted, mutations being applied.
    Settling,
    /// Fault detected. Only manual recovery leaves this phase.
    Halted,
}

impl BridgePhase {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: BridgePhase) -> bool {
        match (self, next) {
            (Self::Idle, Self::Verifying) => true,
            (Self::Verifying, Self::Settling) => true,
            (Self::Verifying, Self::Idle) => true, // Proof rejected
            (Self::Settling, Self::Idle) => true,  // Commit or abort
            (Self::Halted, Self::Halted) => false,
            (_, Self::Halted) => true,
            _ => false,
        }
    }

    /// Gauge encoding (0=Idle, 1=Verifying, 2=Settling, 3=Halted).
    pub fn as_gauge(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Verifying => 1,
            Self::Settling => 2,
            Self::Halted => 3,
        }
    }
}

/// Escrow lifecycle phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EscrowPhase {
    /// Held in escrow.
    Locked,
    /// Released by an accepted proof, awaiting claim.
    Released,
    /// Claimed; payout handed to the transfer collaborator.
    Claimed,
}

impl EscrowPhase {
    /// Phases never skip nor reverse.
    pub fn can_transition_to(&self, next: EscrowPhase) -> bool {
        matches!(
            (self, next),
            (Self::Locked, Self::Released) | (Self::Released, Self::Claimed)
        )
    }
}

/// Upgrade proposal lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Waiting for the timelock.
    #[default]
    Proposed,
    /// Swapped in as the active implementation.
    Activated,
    /// Withdrawn before activation.
    Cancelled,
}

impl ProposalStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: ProposalStatus) -> bool {
        matches!(
            (self, next),
            (Self::Proposed, Self::Activated) | (Self::Proposed, Self::Cancelled)
        )
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Activated | Self::Cancelled)
    }
}

/// Roles recognised by the access registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Grants and revokes roles, registers implementations.
    Admin,
    /// Proposes, activates and cancels upgrades.
    Upgrader,
    /// Halts the bridge and performs manual recovery.
    Guardian,
}

/// Capabilities a bridge logic implementation can expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    /// Move locked escrow to released.
    ReleaseEscrow,
    /// Account for wrapped (minted) supply.
    MintWrapped,
    /// Add entries to the collection registry.
    RegisterCollection,
    /// Apply several actions from one message.
    BatchActions,
}

/// Capabilities every activatable implementation must expose.
pub const REQUIRED_CAPABILITIES: [Capability; 3] = [
    Capability::ReleaseEscrow,
    Capability::MintWrapped,
    Capability::RegisterCollection,
];

/// Name of a bridge logic implementation in the governor's catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImplementationId(pub String);

impl ImplementationId {
    /// Create an implementation id.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImplementationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata stored in the collection registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    /// Human readable name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Counterpart domain identifier the collection originates from.
    pub origin_domain: u32,
}
