//! # Replay and Forgery Attacks
//!
//! Attempts to settle the same message twice, or to reuse a valid proof for
//! a message it was not produced for.

#[cfg(test)]
mod tests {
    use crate::harness::{BridgeHarness, ALICE, BOB, ETH, RELAYER};
    use qc_18_bridge_protocol::{
        BridgeApi, BridgeError, BridgeLogic, BridgeProtocolEngine, Commitment, Direction,
        HmacProofVerifier, Message, StandardLogic, SubmissionOutcome,
    };
    use std::sync::Arc;

    fn funded() -> BridgeHarness {
        let h = BridgeHarness::new();
        h.engine.deposit(ALICE, ETH, 100, ALICE).unwrap();
        h
    }

    #[test]
    fn test_replay_with_fresh_proof_rejected() {
        let h = funded();
        let message = BridgeHarness::inbound(&BridgeHarness::release_to_alice(40), 0);
        let first = h.prove(&message);
        assert!(h.engine.submit(&message, &first).is_accepted());

        // The attacker even produces a valid proof for the next commitment.
        let second = h.prove(&message);
        assert_eq!(
            h.engine.submit(&message, &second),
            SubmissionOutcome::Rejected(BridgeError::DuplicateMessage(message.id))
        );
        assert_eq!(h.engine.escrow_balance(&ALICE, &ETH).released, 40);
    }

    #[test]
    fn test_proof_reused_for_other_message_rejected() {
        let h = funded();
        let honest = BridgeHarness::inbound(&BridgeHarness::release_to_alice(1), 0);
        let proof = h.prove(&honest);

        let greedy = BridgeHarness::inbound(&BridgeHarness::release_to_alice(100), 1);
        assert_eq!(
            h.engine.submit(&greedy, &proof),
            SubmissionOutcome::Rejected(BridgeError::ProofRejected)
        );
        assert!(!h.engine.is_processed(&greedy.id));
        assert_eq!(h.engine.escrow_balance(&ALICE, &ETH).locked, 100);

        // The honest message is unaffected.
        assert!(h.engine.submit(&honest, &proof).is_accepted());
    }

    #[test]
    fn test_tampered_payload_under_original_id_rejected() {
        let h = funded();
        let honest = BridgeHarness::inbound(&BridgeHarness::release_to_alice(1), 0);
        let proof = h.prove(&honest);

        let mut tampered = honest.clone();
        tampered.payload = BridgeHarness::release_to_alice(100).encode().unwrap();
        assert!(matches!(
            h.engine.submit(&tampered, &proof),
            SubmissionOutcome::Rejected(BridgeError::InvalidMessage(_))
        ));
        assert_eq!(h.engine.commitment(), Commitment::genesis([0u8; 32]));
    }

    #[test]
    fn test_outbound_message_reflected_inbound_rejected() {
        let h = funded();
        let outbound = h.engine.deposit(ALICE, ETH, 5, BOB).unwrap().message;
        let proof = h.prove(&outbound);
        assert!(matches!(
            h.engine.submit(&outbound, &proof),
            SubmissionOutcome::Rejected(BridgeError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_proof_from_unknown_prover_rejected() {
        let h = funded();
        let message = BridgeHarness::inbound(&BridgeHarness::release_to_alice(10), 0);
        let trusted = h.engine.commitment();
        let claimed = Commitment::new(trusted.height + 1, [0x66; 32]);
        let forged = HmacProofVerifier::new(b"attacker".to_vec())
            .prove(&message, trusted, claimed)
            .unwrap();
        assert_eq!(
            h.engine.submit(&message, &forged),
            SubmissionOutcome::Rejected(BridgeError::ProofRejected)
        );
        assert_eq!(h.engine.commitment(), trusted);
    }

    #[test]
    fn test_replay_after_restart_rejected() {
        let h = funded();
        let message = BridgeHarness::inbound(&BridgeHarness::release_to_alice(10), 0);
        let proof = h.prove(&message);
        assert!(h.engine.submit(&message, &proof).is_accepted());

        let restored = BridgeProtocolEngine::restore(
            h.engine.config().clone(),
            h.engine.snapshot(),
            h.verifier.clone(),
            vec![Arc::new(StandardLogic) as Arc<dyn BridgeLogic>],
            h.clock.clone(),
        )
        .unwrap();
        assert!(restored.is_processed(&message.id));
        assert_eq!(
            restored.submit(&message, &proof),
            SubmissionOutcome::Rejected(BridgeError::DuplicateMessage(message.id))
        );
    }

    #[test]
    fn test_same_action_with_new_nonce_is_distinct() {
        let h = funded();
        assert!(h.relay(&BridgeHarness::release_to_alice(10), 0).is_accepted());
        assert!(h.relay(&BridgeHarness::release_to_alice(10), 1).is_accepted());
        assert_eq!(h.engine.escrow_balance(&ALICE, &ETH).released, 20);

        let other_relayer = Message::new(
            Direction::Inbound,
            BOB,
            ALICE,
            BridgeHarness::release_to_alice(10).encode().unwrap(),
            0,
        );
        assert_ne!(other_relayer.sender, RELAYER);
        let proof = h.prove(&other_relayer);
        assert!(h.engine.submit(&other_relayer, &proof).is_accepted());
    }
}
