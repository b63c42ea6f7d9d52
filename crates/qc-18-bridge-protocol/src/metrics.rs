//! # Bridge Metrics
//!
//! Prometheus metrics for monitoring the bridge protocol engine.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-18-bridge-protocol = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `bridge_messages_accepted_total` - Counter of committed inbound messages
//! - `bridge_messages_rejected_total` - Counter of rejected submissions (by reason)
//! - `bridge_proof_verifications_total` - Counter of verifier calls (by outcome)
//! - `bridge_commitment_height` - Gauge of the trusted commitment height
//! - `bridge_phase` - Gauge of the bridge phase (0=Idle, 1=Verifying, 2=Settling, 3=Halted)
//! - `bridge_upgrades_activated_total` - Counter of activated upgrades

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_gauge, register_int_counter, register_int_counter_vec, Gauge, IntCounter,
    IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total inbound messages committed
    pub static ref MESSAGES_ACCEPTED: IntCounter = register_int_counter!(
        "bridge_messages_accepted_total",
        "Total number of inbound messages committed"
    )
    .expect("Failed to create MESSAGES_ACCEPTED metric");

    /// Total submissions rejected, labeled by reason
    pub static ref MESSAGES_REJECTED: IntCounterVec = register_int_counter_vec!(
        "bridge_messages_rejected_total",
        "Total number of rejected submissions",
        &["reason"]
    )
    .expect("Failed to create MESSAGES_REJECTED metric");

    /// Total proof verifications, labeled by outcome
    pub static ref PROOF_VERIFICATIONS: IntCounterVec = register_int_counter_vec!(
        "bridge_proof_verifications_total",
        "Total number of proof verifications",
        &["outcome"]
    )
    .expect("Failed to create PROOF_VERIFICATIONS metric");

    /// Trusted commitment height
    pub static ref COMMITMENT_HEIGHT: Gauge = register_gauge!(
        "bridge_commitment_height",
        "Height of the latest accepted commitment"
    )
    .expect("Failed to create COMMITMENT_HEIGHT metric");

    /// Bridge phase (0=Idle, 1=Verifying, 2=Settling, 3=Halted)
    pub static ref BRIDGE_PHASE: Gauge = register_gauge!(
        "bridge_phase",
        "Current bridge phase (0=Idle, 1=Verifying, 2=Settling, 3=Halted)"
    )
    .expect("Failed to create BRIDGE_PHASE metric");

    /// Total upgrades activated
    pub static ref UPGRADES_ACTIVATED: IntCounter = register_int_counter!(
        "bridge_upgrades_activated_total",
        "Total number of upgrade proposals activated"
    )
    .expect("Failed to create UPGRADES_ACTIVATED metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a committed inbound message
#[cfg(feature = "metrics")]
pub fn record_message_accepted() {
    MESSAGES_ACCEPTED.inc();
}

/// Record a rejected submission with reason
#[cfg(feature = "metrics")]
pub fn record_message_rejected(reason: &str) {
    MESSAGES_REJECTED.with_label_values(&[reason]).inc();
}

/// Record a proof verification outcome
#[cfg(feature = "metrics")]
pub fn record_proof_verification(outcome: &str) {
    PROOF_VERIFICATIONS.with_label_values(&[outcome]).inc();
}

/// Update commitment height gauge
#[cfg(feature = "metrics")]
pub fn set_commitment_height(height: u64) {
    COMMITMENT_HEIGHT.set(height as f64);
}

/// Update bridge phase gauge
#[cfg(feature = "metrics")]
pub fn set_bridge_phase(phase: u8) {
    BRIDGE_PHASE.set(phase as f64);
}

/// Record an activated upgrade
#[cfg(feature = "metrics")]
pub fn record_upgrade_activated() {
    UPGRADES_ACTIVATED.inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

/// Record a committed inbound message (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_message_accepted() {}

/// Record a rejected submission (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_message_rejected(_reason: &str) {}

/// Record a proof verification outcome (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_proof_verification(_outcome: &str) {}

/// Update commitment height gauge (no-op)
#[cfg(not(feature = "metrics"))]
pub fn set_commitment_height(_height: u64) {}

/// Update bridge phase gauge (no-op)
#[cfg(not(feature = "metrics"))]
pub fn set_bridge_phase(_phase: u8) {}

/// Record an activated upgrade (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_upgrade_activated() {}
