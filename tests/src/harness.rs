//! # Bridge Test Harness
//!
//! One bridge engine wired to the real HMAC verifier, a manual clock and a
//! relayer that proves inbound messages against the current commitment.

use qc_18_bridge_protocol::{
    payload_digest, Address, AssetId, BridgeAction, BridgeApi, BridgeConfig, BridgeProtocolEngine,
    Commitment, Direction, HmacProofVerifier, ManualClock, Message, SubmissionOutcome,
    UpgradeGovernor, ValidityProof,
};
use std::sync::Arc;

/// Admin, upgrader and guardian of every harness bridge.
pub const ADMIN: Address = [0xAD; 20];
/// Relayer submitting inbound messages.
pub const RELAYER: Address = [0xEE; 20];
/// Depositor.
pub const ALICE: Address = [0xA1; 20];
/// Second user.
pub const BOB: Address = [0xB0; 20];
/// Native asset on the home domain.
pub const ETH: AssetId = [0xE7; 20];

/// Shared HMAC key between the counterpart prover and the verifier.
pub const PROVER_KEY: &[u8] = b"qc-18-counterpart-prover";

/// Engine plus the pieces tests need to drive it.
pub struct BridgeHarness {
    /// Engine under test.
    pub engine: Arc<BridgeProtocolEngine<HmacProofVerifier>>,
    /// Verifier, also used as the counterpart prover.
    pub verifier: Arc<HmacProofVerifier>,
    /// Time source shared by engine and governor.
    pub clock: Arc<ManualClock>,
}

impl Default for BridgeHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeHarness {
    /// Harness with test configuration.
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::for_testing())
    }

    /// Harness with the given configuration.
    pub fn with_config(config: BridgeConfig) -> Self {
        let clock = Arc::new(ManualClock::default());
        let verifier = Arc::new(HmacProofVerifier::new(PROVER_KEY.to_vec()));
        let governor = Arc::new(
            UpgradeGovernor::with_default_catalog(ADMIN, &config, clock.clone())
                .expect("default catalog is valid"),
        );
        let engine = BridgeProtocolEngine::new(
            config,
            Commitment::genesis([0u8; 32]),
            verifier.clone(),
            governor,
            clock.clone(),
        )
        .expect("test config is valid");

        Self {
            engine: Arc::new(engine),
            verifier,
            clock,
        }
    }

    /// Inbound message carrying `action`.
    pub fn inbound(action: &BridgeAction, nonce: u64) -> Message {
        Message::new(
            Direction::Inbound,
            RELAYER,
            ALICE,
            action.encode().expect("actions encode"),
            nonce,
        )
    }

    /// Proof advancing the current commitment by one height.
    pub fn prove(&self, message: &Message) -> ValidityProof {
        let trusted = self.engine.commitment();
        let claimed = Commitment::new(trusted.height + 1, payload_digest(&message.id));
        self.verifier
            .prove(message, trusted, claimed)
            .expect("hmac accepts any key length")
    }

    /// Prove and submit `action` in one step.
    pub fn relay(&self, action: &BridgeAction, nonce: u64) -> SubmissionOutcome {
        let message = Self::inbound(action, nonce);
        let proof = self.prove(&message);
        self.engine.submit(&message, &proof)
    }

    /// Release `amount` of ETH escrowed by ALICE.
    pub fn release_to_alice(amount: u128) -> BridgeAction {
        BridgeAction::Release {
            owner: ALICE,
            asset: ETH,
            amount,
        }
    }
}
