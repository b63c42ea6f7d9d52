//! # Bridge Configuration
//!
//! Configuration for the Bridge Protocol Engine and Upgrade Governor.

use crate::domain::BridgeError;
use serde::{Deserialize, Serialize};

/// Mandatory delay between proposing and activating an upgrade (48 hours).
pub const UPGRADE_DELAY_SECS: u64 = 48 * 60 * 60;

/// Default upper bound on inbound payload size.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// Default upper bound on actions per batch message.
pub const DEFAULT_MAX_BATCH_ACTIONS: usize = 64;

/// Default number of effect records retained in memory.
pub const DEFAULT_EFFECT_LOG_CAPACITY: usize = 10_000;

/// Bridge configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Seconds between `propose` and the earliest `activate`.
    pub upgrade_delay_secs: u64,

    /// Inbound messages with larger payloads are rejected before any
    /// state is touched.
    pub max_payload_bytes: usize,

    /// Maximum actions in one `Batch`.
    pub max_batch_actions: usize,

    /// Effect records kept for `effects_since`; oldest are evicted first.
    pub effect_log_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            upgrade_delay_secs: UPGRADE_DELAY_SECS,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            max_batch_actions: DEFAULT_MAX_BATCH_ACTIONS,
            effect_log_capacity: DEFAULT_EFFECT_LOG_CAPACITY,
        }
    }
}

impl BridgeConfig {
    /// Create a config for testing (short delay, small limits).
    pub fn for_testing() -> Self {
        Self {
            upgrade_delay_secs: 60,
            max_payload_bytes: 4 * 1024,
            max_batch_actions: 8,
            effect_log_capacity: 256,
        }
    }

    /// Reject zero limits and a zero upgrade delay.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.upgrade_delay_secs == 0 {
            return Err(BridgeError::InvalidConfig(
                "upgrade_delay_secs must be > 0".into(),
            ));
        }
        if self.max_payload_bytes == 0 {
            return Err(BridgeError::InvalidConfig(
                "max_payload_bytes must be > 0".into(),
            ));
        }
        if self.max_batch_actions == 0 {
            return Err(BridgeError::InvalidConfig(
                "max_batch_actions must be > 0".into(),
            ));
        }
        if self.effect_log_capacity == 0 {
            return Err(BridgeError::InvalidConfig(
                "effect_log_capacity must be > 0".into(),
            ));
        }
        Ok(())
    }
}
