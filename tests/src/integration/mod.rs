//! # Integration Tests
//!
//! End-to-end bridge flows across engine, governor, adapters and snapshots.

pub mod flows;
pub mod properties;
