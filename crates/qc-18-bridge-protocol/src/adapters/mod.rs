//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits for the bridge protocol.

mod asset_transfer;
mod clock;
mod proof_verifier;

pub use asset_transfer::InMemoryAssetTransfer;
pub use clock::SystemClock;
pub use proof_verifier::HmacProofVerifier;
