//! # Quantum-Chain Bridge Benchmarks
//!
//! | Operation | Target |
//! |-----------|--------|
//! | Inbound release cycle | < 50μs |
//! | Replay rejection | < 5μs, flat in registry size |
//! | 256-action batch | < 5ms |
//! | Deposit | < 10μs |

use criterion::{criterion_group, criterion_main};
use qc_tests::benchmarks::qc_18_bridge::{
    brutal_batch_settlement, brutal_deposit_and_audit, brutal_process_message,
    brutal_replay_rejection,
};

criterion_group!(
    benches,
    brutal_process_message,
    brutal_replay_rejection,
    brutal_batch_settlement,
    brutal_deposit_and_audit,
);

criterion_main!(benches);
