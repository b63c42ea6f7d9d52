//! # Application Layer
//!
//! Engine orchestration, upgrade governance and persistence.

mod effect_log;
pub mod engine;
pub mod governor;
pub mod snapshot;

pub use engine::BridgeProtocolEngine;
pub use governor::UpgradeGovernor;
pub use snapshot::{BridgeSnapshot, EngineSnapshot, GovernorSnapshot};
