//! # QC-18 Bridge Protocol
//!
//! Proof-gated cross-domain message bridge with escrow and timelocked
//! upgrades.
//!
//! **Subsystem ID:** 18  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)  
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Move value and messages between two domains that cannot see each other:
//! - Outbound deposits lock value in escrow and queue a message
//! - Inbound messages settle only after their validity proof verifies
//! - Bridge logic is swapped through a delayed, role-gated upgrade
//!
//! ## Security Properties
//!
//! | Defense | Description |
//! |---------|-------------|
//! | Replay protection | Message ids are consumed exactly once, after commit |
//! | Single cycle | One verification in flight; re-entry sees `Busy` |
//! | Conservation | locked + released + claimed equals deposited, per asset |
//! | Timelock | Upgrades activate no earlier than the configured delay |
//! | Halt | Internal invariant failures stop all settlement |
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-bridge-protocol/
//! ├── domain/          # Messages, escrow ledger, registry, state machine
//! ├── algorithms/      # Message id and statement hashing
//! ├── logic/           # Swappable bridge logic (standard, batching)
//! ├── ports/           # BridgeApi, GovernanceApi, ProofVerifier, Clock
//! ├── adapters/        # HMAC verifier, system clock, in-memory payouts
//! ├── application/     # Engine, upgrade governor, snapshots
//! ├── config.rs        # BridgeConfig
//! ├── metrics.rs       # Prometheus metrics (feature "metrics")
//! └── telemetry.rs     # Logging setup
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod logic;
pub mod metrics;
pub mod ports;
pub mod telemetry;

// Re-exports
pub use adapters::{HmacProofVerifier, InMemoryAssetTransfer, SystemClock};
pub use algorithms::{compute_message_id, payload_digest, statement_digest};
pub use application::{
    BridgeProtocolEngine, BridgeSnapshot, EngineSnapshot, GovernorSnapshot, UpgradeGovernor,
};
pub use config::{BridgeConfig, UPGRADE_DELAY_SECS};
pub use domain::{
    Address, Amount, AssetId, BridgeAction, BridgeError, BridgePhase, BridgeState, Capability,
    CollectionId, CollectionMetadata, Commitment, DepositReceipt, Direction, EffectKind,
    EffectRecord, EscrowBalance, EscrowPhase, Hash, ImplementationId, Message, MessageId,
    MessageReceipt, ProofStatement, ProposalStatus, Role, SubmissionOutcome, UpgradeProposal,
    ValidityProof,
};
pub use logic::{BatchingLogic, BridgeLogic, StandardLogic};
pub use ports::{
    AssetTransfer, BridgeApi, Clock, GovernanceApi, ManualClock, MockAssetTransfer,
    MockProofVerifier, ProofVerifier,
};
pub use telemetry::{init_logging, TelemetryConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
