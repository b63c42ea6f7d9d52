//! # Bridge Integration Flows
//!
//! ## Flows Tested:
//!
//! 1. **Round trip**: deposit on home → mint on counterpart → release home → payout
//! 2. **Upgrade**: propose → timelock → activate → batched settlement
//! 3. **Restart**: snapshot after upgrade → restore → state and replay set intact
//! 4. **Contention**: many relayers racing one engine; every message settles once

#[cfg(test)]
mod tests {
    use crate::harness::{BridgeHarness, ADMIN, ALICE, BOB, ETH};
    use qc_18_bridge_protocol::{
        Amount, BatchingLogic, BridgeAction, BridgeApi, BridgeConfig, BridgeError, BridgeLogic,
        BridgePhase, BridgeProtocolEngine, BridgeSnapshot, Direction, EffectKind,
        GovernanceApi, ImplementationId, InMemoryAssetTransfer, Message, ProposalStatus,
        StandardLogic, SubmissionOutcome,
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn test_round_trip_between_domains() {
        let home = BridgeHarness::new();
        let counterpart = BridgeHarness::new();

        // Home: lock 100 ETH, outbound mint queued for BOB.
        let receipt = home.engine.deposit(ALICE, ETH, 100, BOB).unwrap();
        assert_eq!(receipt.locked, 100);
        let outbound = receipt.message;
        assert_eq!(outbound.direction, Direction::Outbound);

        // Counterpart: the relayed message arrives inbound and mints.
        let relayed = Message::new(
            Direction::Inbound,
            outbound.sender,
            outbound.recipient,
            outbound.payload.clone(),
            outbound.nonce,
        );
        let proof = counterpart.prove(&relayed);
        assert!(counterpart.engine.submit(&relayed, &proof).is_accepted());
        assert_eq!(counterpart.engine.wrapped_supply(&ETH), 100);

        // Home: counterpart proves the return leg; ALICE's escrow is released.
        let outcome = home.relay(&BridgeHarness::release_to_alice(100), 0);
        assert!(outcome.is_accepted());

        let payout = InMemoryAssetTransfer::new();
        payout.fund(ETH, 1_000);
        assert_eq!(home.engine.claim_and_pay(ALICE, ETH, &payout).await, Ok(100));
        assert_eq!(payout.credited(&ALICE, &ETH), 100);
        assert_eq!(payout.reserve(&ETH), 900);

        let totals = home.engine.asset_totals(&ETH);
        assert_eq!(
            (totals.deposited, totals.released, totals.claimed),
            (100, 100, 100)
        );
        assert!(home.engine.audit().is_ok());
    }

    #[tokio::test]
    async fn test_payout_without_liquidity_keeps_claim_available() {
        let h = BridgeHarness::new();
        h.engine.deposit(ALICE, ETH, 70, ALICE).unwrap();
        assert!(h.relay(&BridgeHarness::release_to_alice(70), 0).is_accepted());

        let payout = InMemoryAssetTransfer::new();
        payout.fund(ETH, 10);
        assert!(matches!(
            h.engine.claim_and_pay(ALICE, ETH, &payout).await,
            Err(BridgeError::PayoutFailed(_))
        ));
        assert_eq!(h.engine.escrow_balance(&ALICE, &ETH).released, 70);

        payout.fund(ETH, 60);
        assert_eq!(h.engine.claim_and_pay(ALICE, ETH, &payout).await, Ok(70));
        assert_eq!(payout.credited(&ALICE, &ETH), 70);
    }

    #[test]
    fn test_upgrade_enables_batches() {
        let h = BridgeHarness::new();
        h.engine.deposit(ALICE, ETH, 90, ALICE).unwrap();
        let governor = h.engine.governor();

        let batch = BridgeAction::Batch(vec![
            BridgeHarness::release_to_alice(30),
            BridgeHarness::release_to_alice(30),
        ]);
        assert!(matches!(
            h.relay(&batch, 0),
            SubmissionOutcome::Rejected(BridgeError::UnsupportedAction(_))
        ));

        let proposal = governor
            .propose(ADMIN, ImplementationId::new("batching-v2"))
            .unwrap();
        assert!(matches!(
            governor.activate(ADMIN, proposal.id),
            Err(BridgeError::TimingNotElapsed { .. })
        ));

        h.clock.advance_time(h.engine.config().upgrade_delay_secs);
        assert_eq!(
            governor.activate(ADMIN, proposal.id),
            Ok(ImplementationId::new("batching-v2"))
        );
        assert_eq!(
            governor.proposal(proposal.id).map(|p| p.status),
            Some(ProposalStatus::Activated)
        );

        // Same storage, new logic: the batch now settles atomically.
        assert!(h.relay(&batch, 0).is_accepted());
        let balance = h.engine.escrow_balance(&ALICE, &ETH);
        assert_eq!((balance.locked, balance.released), (30, 60));

        // An over-draining batch changes nothing.
        let overdraw = BridgeAction::Batch(vec![
            BridgeHarness::release_to_alice(20),
            BridgeHarness::release_to_alice(20),
        ]);
        assert!(matches!(
            h.relay(&overdraw, 1),
            SubmissionOutcome::Rejected(BridgeError::InsufficientLocked { .. })
        ));
        assert_eq!(h.engine.escrow_balance(&ALICE, &ETH).locked, 30);
    }

    #[test]
    fn test_restart_after_upgrade_preserves_state() {
        let h = BridgeHarness::new();
        h.engine.deposit(ALICE, ETH, 50, ALICE).unwrap();
        let settled = BridgeHarness::inbound(&BridgeHarness::release_to_alice(20), 0);
        let proof = h.prove(&settled);
        assert!(h.engine.submit(&settled, &proof).is_accepted());

        let governor = h.engine.governor();
        let proposal = governor
            .propose(ADMIN, ImplementationId::new("batching-v2"))
            .unwrap();
        h.clock.advance_time(h.engine.config().upgrade_delay_secs);
        governor.activate(ADMIN, proposal.id).unwrap();

        let bytes = h.engine.snapshot().to_bytes().unwrap();
        let config = BridgeConfig::for_testing();
        let catalog: Vec<Arc<dyn BridgeLogic>> = vec![
            Arc::new(StandardLogic),
            Arc::new(BatchingLogic::new(config.max_batch_actions)),
        ];
        let restored = BridgeProtocolEngine::restore(
            config,
            BridgeSnapshot::from_bytes(&bytes).unwrap(),
            h.verifier.clone(),
            catalog,
            h.clock.clone(),
        )
        .unwrap();

        assert_eq!(restored.commitment(), h.engine.commitment());
        assert_eq!(restored.phase(), BridgePhase::Idle);
        assert_eq!(
            restored.governor().active_implementation(),
            ImplementationId::new("batching-v2")
        );
        assert_eq!(restored.escrow_balance(&ALICE, &ETH), h.engine.escrow_balance(&ALICE, &ETH));
        assert_eq!(restored.next_outbound_nonce(&ALICE), 1);
        assert_eq!(
            restored.submit(&settled, &proof),
            SubmissionOutcome::Rejected(BridgeError::DuplicateMessage(settled.id))
        );
    }

    #[test]
    fn test_restore_without_active_logic_fails() {
        let h = BridgeHarness::new();
        let snapshot = h.engine.snapshot();
        let result = BridgeProtocolEngine::restore(
            BridgeConfig::for_testing(),
            snapshot,
            h.verifier.clone(),
            vec![Arc::new(BatchingLogic::new(8)) as Arc<dyn BridgeLogic>],
            h.clock.clone(),
        );
        assert!(matches!(result, Err(BridgeError::Storage(_))));
    }

    #[test]
    fn test_concurrent_relayers_settle_each_message_once() {
        const RELAYERS: u64 = 4;
        const PER_RELAYER: u64 = 5;

        let h = BridgeHarness::new();
        h.engine
            .deposit(ALICE, ETH, (RELAYERS * PER_RELAYER) as Amount, ALICE)
            .unwrap();

        std::thread::scope(|s| {
            for relayer in 0..RELAYERS {
                let h = &h;
                s.spawn(move || {
                    for i in 0..PER_RELAYER {
                        let nonce = relayer * PER_RELAYER + i;
                        let message =
                            BridgeHarness::inbound(&BridgeHarness::release_to_alice(1), nonce);
                        loop {
                            // A proof built against a commitment another relayer
                            // has since advanced is stale; rebuild and retry.
                            let proof = h.prove(&message);
                            match h.engine.submit(&message, &proof) {
                                SubmissionOutcome::Accepted(_) => break,
                                SubmissionOutcome::Busy
                                | SubmissionOutcome::Rejected(BridgeError::ProofRejected)
                                | SubmissionOutcome::Rejected(
                                    BridgeError::NonMonotonicCommitment { .. },
                                ) => std::thread::yield_now(),
                                other => panic!("unexpected outcome {other:?}"),
                            }
                        }
                    }
                });
            }
        });

        let total = RELAYERS * PER_RELAYER;
        assert_eq!(h.engine.commitment().height, total);
        let balance = h.engine.escrow_balance(&ALICE, &ETH);
        assert_eq!((balance.locked, balance.released), (0, total as Amount));
        assert!(h.engine.audit().is_ok());

        let advanced = h
            .engine
            .effects_since(0)
            .into_iter()
            .filter(|r| matches!(r.kind, EffectKind::CommitmentAdvanced { .. }))
            .count();
        assert_eq!(advanced as u64, total);
    }
}
