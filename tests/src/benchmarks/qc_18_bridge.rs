//! # QC-18 Bridge Protocol Brutal Benchmarks
//!
//! Performance Claims to Validate:
//! - Full inbound cycle (verify + settle + commit): < 50μs
//! - Replay rejection: O(1), no verifier call
//! - Deposit: O(1) per message
//!
//! Brutal Conditions:
//! - 100,000+ consumed message ids in the registry
//! - Batches at the configured action limit
//! - Thousands of escrow records under audit

use crate::harness::{BridgeHarness, ADMIN, ALICE, ETH};
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use qc_18_bridge_protocol::{
    Amount, BridgeAction, BridgeApi, BridgeConfig, GovernanceApi, ImplementationId,
};
use qc_18_bridge_protocol::config::DEFAULT_MAX_PAYLOAD_BYTES;
use std::time::Duration;

/// Harness whose ALICE escrow can cover `releases` unit releases.
fn funded(releases: u64) -> BridgeHarness {
    let config = BridgeConfig {
        max_batch_actions: 256,
        max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        ..BridgeConfig::for_testing()
    };
    let h = BridgeHarness::with_config(config);
    h.engine
        .deposit(ALICE, ETH, releases as Amount, ALICE)
        .expect("deposit");
    h
}

/// One full inbound cycle per iteration.
pub fn brutal_process_message(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-process-message");
    group.measurement_time(Duration::from_secs(10));

    let h = funded(u64::MAX >> 1);
    let mut nonce = 0u64;
    group.bench_function("release_cycle", |b| {
        b.iter(|| {
            let message =
                BridgeHarness::inbound(&BridgeHarness::release_to_alice(1), nonce);
            let proof = h.prove(&message);
            nonce += 1;
            black_box(h.engine.submit(&message, &proof))
        })
    });

    group.finish();
}

/// Replay rejection with a large consumed-id set.
pub fn brutal_replay_rejection(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-replay");

    for settled in [1_000u64, 100_000] {
        let h = funded(settled);
        let mut last = None;
        for nonce in 0..settled {
            let message =
                BridgeHarness::inbound(&BridgeHarness::release_to_alice(1), nonce);
            let proof = h.prove(&message);
            h.engine.submit(&message, &proof);
            last = Some((message, proof));
        }
        let Some((message, proof)) = last else {
            continue;
        };

        group.bench_with_input(
            BenchmarkId::new("duplicate", settled),
            &(message, proof),
            |b, (message, proof)| b.iter(|| black_box(h.engine.submit(message, proof))),
        );
    }

    group.finish();
}

/// Batched settlement at increasing batch sizes.
pub fn brutal_batch_settlement(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-batch");

    for size in [8usize, 64, 256] {
        let h = funded(u64::MAX >> 1);
        let governor = h.engine.governor();
        let proposal = governor
            .propose(ADMIN, ImplementationId::new("batching-v2"))
            .expect("propose");
        h.clock.advance_time(h.engine.config().upgrade_delay_secs);
        governor.activate(ADMIN, proposal.id).expect("activate");

        let batch = BridgeAction::Batch(vec![BridgeHarness::release_to_alice(1); size]);
        let mut nonce = 0u64;
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("release_batch", size), &batch, |b, batch| {
            b.iter(|| {
                nonce += 1;
                black_box(h.relay(batch, nonce))
            })
        });
    }

    group.finish();
}

/// Outbound deposits across many owners, then a full audit.
pub fn brutal_deposit_and_audit(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-deposit");

    let h = BridgeHarness::new();
    let mut owner = 0u32;
    group.bench_function("deposit", |b| {
        b.iter(|| {
            owner = owner.wrapping_add(1);
            let mut address = [0u8; 20];
            address[..4].copy_from_slice(&owner.to_be_bytes());
            black_box(h.engine.deposit(address, ETH, 1, address))
        })
    });

    group.bench_function("audit", |b| b.iter(|| black_box(h.engine.audit())));

    group.finish();
}
