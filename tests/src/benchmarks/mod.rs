//! # Quantum-Chain Bridge Benchmarks
//!
//! Performance benchmarks for qc-18.
//! All benchmarks are "brutal" stress tests on a single engine.

pub mod qc_18_bridge;
