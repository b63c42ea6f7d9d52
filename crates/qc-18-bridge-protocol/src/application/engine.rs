//! # Bridge Protocol Engine
//!
//! Orchestrates registry, verifier, ledger and state machine.
//!
//! ## Cycle
//!
//! ```text
//! lock   : halted? replayed? (before the payload is decoded)
//! lock   : halted? → reserve id → Idle→Verifying → capture trusted commitment
//! unlock : verify proof (may call back into the engine; sees Busy)
//! lock   : Verifying→Settling → stage actions → commit + apply + consume id
//! ```
//!
//! Every failure short of commit drops the reservation and leaves committed
//! state untouched, so the same message can be retried.

use crate::application::effect_log::EffectLog;
use crate::application::governor::UpgradeGovernor;
use crate::application::snapshot::{BridgeSnapshot, EngineSnapshot};
use crate::config::BridgeConfig;
use crate::domain::{
    invariant_commitment_advances, invariant_positive_amount, Address, Amount, AssetId,
    AssetTotals, BridgeAction, BridgeError, BridgePhase, BridgeState, Commitment, CycleTicket,
    DepositReceipt, Direction, EffectKind, EffectRecord, EscrowBalance, EscrowLedger, Message,
    MessageId, MessageReceipt, MessageRegistry, ProofStatement, Registration, Role,
    StateMachine, SubmissionOutcome, ValidityProof,
};
use crate::logic::{ensure_supported, BridgeLogic, Settlement, SettlementContext};
use crate::metrics;
use crate::ports::inbound::BridgeApi;
use crate::ports::outbound::{AssetTransfer, Clock, ProofVerifier};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// State mutated only under the engine lock.
struct EngineState {
    registry: MessageRegistry,
    ledger: EscrowLedger,
    machine: StateMachine,
    effects: EffectLog,
}

/// Bridge Protocol Engine.
///
/// Exclusively owns the message registry, escrow ledger and state machine.
pub struct BridgeProtocolEngine<V: ProofVerifier> {
    config: BridgeConfig,
    verifier: Arc<V>,
    governor: Arc<UpgradeGovernor>,
    clock: Arc<dyn Clock>,
    state: Mutex<EngineState>,
}

impl<V: ProofVerifier> BridgeProtocolEngine<V> {
    /// Create at the genesis commitment.
    pub fn new(
        config: BridgeConfig,
        genesis: Commitment,
        verifier: Arc<V>,
        governor: Arc<UpgradeGovernor>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BridgeError> {
        config.validate()?;
        let effects = EffectLog::new(config.effect_log_capacity, 0);

        info!(
            "[qc-18] Bridge engine initialized at {} with {}",
            genesis,
            governor.active_logic().implementation_id()
        );
        metrics::set_commitment_height(genesis.height);
        metrics::set_bridge_phase(BridgePhase::Idle.as_gauge());

        Ok(Self {
            config,
            verifier,
            governor,
            clock,
            state: Mutex::new(EngineState {
                registry: MessageRegistry::new(),
                ledger: EscrowLedger::new(),
                machine: StateMachine::new(genesis),
                effects,
            }),
        })
    }

    /// Rebuild engine and governor from a snapshot.
    ///
    /// `catalog` must contain the implementation the snapshot records as
    /// active. The restored ledger is audited before use.
    pub fn restore(
        config: BridgeConfig,
        snapshot: BridgeSnapshot,
        verifier: Arc<V>,
        catalog: Vec<Arc<dyn BridgeLogic>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BridgeError> {
        config.validate()?;
        let governor = Arc::new(UpgradeGovernor::restore(
            snapshot.governor,
            catalog,
            config.upgrade_delay_secs,
            Arc::clone(&clock),
        )?);

        let EngineSnapshot {
            mut registry,
            ledger,
            state,
            next_effect_sequence,
        } = snapshot.engine;
        ledger
            .audit()
            .map_err(|e| BridgeError::Storage(format!("restored ledger failed audit: {e}")))?;
        registry.clear_reservation();
        let machine = StateMachine::from_state(state);

        info!(
            "[qc-18] Bridge engine restored at {} ({} messages processed, phase {:?})",
            machine.commitment(),
            registry.processed_count(),
            machine.phase()
        );
        metrics::set_commitment_height(machine.commitment().height);
        metrics::set_bridge_phase(machine.phase().as_gauge());

        let effects = EffectLog::new(config.effect_log_capacity, next_effect_sequence);
        Ok(Self {
            config,
            verifier,
            governor,
            clock,
            state: Mutex::new(EngineState {
                registry,
                ledger,
                machine,
                effects,
            }),
        })
    }

    /// Persistable engine and governor state.
    pub fn snapshot(&self) -> BridgeSnapshot {
        let engine = {
            let st = self.state.lock();
            let mut registry = st.registry.clone();
            registry.clear_reservation();
            EngineSnapshot {
                registry,
                ledger: st.ledger.clone(),
                state: st.machine.persistable_state(),
                next_effect_sequence: st.effects.next_sequence(),
            }
        };
        BridgeSnapshot {
            engine,
            governor: self.governor.snapshot(),
        }
    }

    /// The upgrade governor routing this engine's logic.
    pub fn governor(&self) -> &Arc<UpgradeGovernor> {
        &self.governor
    }

    /// Active configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    // =========================================================================
    // Inbound messages
    // =========================================================================

    /// Process an inbound message with its validity proof.
    pub fn process_message(
        &self,
        message: &Message,
        proof: &ValidityProof,
    ) -> Result<MessageReceipt, BridgeError> {
        let result = self.run_cycle(message, proof);
        match &result {
            Ok(receipt) => {
                metrics::record_message_accepted();
                info!(
                    "[qc-18] Message {} committed at {} ({} effects)",
                    message.short_id(),
                    receipt.commitment,
                    receipt.effects.len()
                );
            }
            Err(e) => {
                metrics::record_message_rejected(e.reason());
                match e {
                    BridgeError::Busy => debug!("[qc-18] Message {} busy", message.short_id()),
                    BridgeError::DuplicateMessage(_) => {
                        warn!("[qc-18] Replay of message {} rejected", message.short_id())
                    }
                    _ => warn!(
                        "[qc-18] Message {} rejected: {}",
                        message.short_id(),
                        e
                    ),
                }
            }
        }
        result
    }

    /// Halted and replayed submissions fail before any decoding, so their
    /// answer does not depend on the payload or the active logic.
    fn screen(&self, message: &Message) -> Result<(), BridgeError> {
        let st = self.state.lock();
        if st.machine.is_halted() {
            return Err(BridgeError::Halted);
        }
        if st.registry.is_processed(&message.id) {
            return Err(BridgeError::DuplicateMessage(message.id));
        }
        Ok(())
    }

    fn validate_inbound(&self, message: &Message) -> Result<(), BridgeError> {
        if message.direction != Direction::Inbound {
            return Err(BridgeError::InvalidMessage(
                "expected inbound direction".into(),
            ));
        }
        if message.payload.len() > self.config.max_payload_bytes {
            return Err(BridgeError::InvalidMessage(format!(
                "payload of {} bytes exceeds {}",
                message.payload.len(),
                self.config.max_payload_bytes
            )));
        }
        if !message.has_valid_id() {
            return Err(BridgeError::InvalidMessage("id does not match fields".into()));
        }
        Ok(())
    }

    fn run_cycle(
        &self,
        message: &Message,
        proof: &ValidityProof,
    ) -> Result<MessageReceipt, BridgeError> {
        self.screen(message)?;
        self.validate_inbound(message)?;

        // Logic is captured once so an activation mid-cycle cannot split it.
        let logic = self.governor.active_logic();
        let action = logic.decode(message)?;
        ensure_supported(logic.as_ref(), &action)?;

        let (ticket, statement) = self.begin_cycle(message, proof)?;

        let verdict = self
            .verifier
            .verify(&statement, proof, &ticket.trusted());
        metrics::record_proof_verification(match &verdict {
            Ok(true) => "accepted",
            Ok(false) => "rejected",
            Err(_) => "malformed",
        });

        self.settle_cycle(message, proof, ticket, verdict, logic.as_ref(), &action)
    }

    /// Reserve the id and enter Verifying. The lock is released on return.
    fn begin_cycle(
        &self,
        message: &Message,
        proof: &ValidityProof,
    ) -> Result<(CycleTicket, ProofStatement), BridgeError> {
        let mut guard = self.state.lock();
        let st = &mut *guard;

        if st.machine.is_halted() {
            return Err(BridgeError::Halted);
        }
        match st.registry.register_if_new(message.id) {
            Registration::Accepted => {}
            Registration::Duplicate => return Err(BridgeError::DuplicateMessage(message.id)),
            Registration::InFlight => return Err(BridgeError::Busy),
        }

        let ticket = match st.machine.begin_verification() {
            Ok(ticket) => ticket,
            Err(e) => {
                st.registry.release(&message.id);
                return Err(e);
            }
        };
        // A proof that cannot advance the commitment is never worth verifying.
        if let Err(e) = invariant_commitment_advances(&ticket.trusted(), &proof.new_commitment) {
            st.machine.abort(&ticket);
            st.registry.release(&message.id);
            return Err(e);
        }

        metrics::set_bridge_phase(st.machine.phase().as_gauge());
        debug!(
            "[qc-18] Cycle {} verifying message {} against {}",
            ticket.cycle_id(),
            message.short_id(),
            ticket.trusted()
        );

        let statement =
            ProofStatement::for_message(message, ticket.trusted(), proof.new_commitment);
        Ok((ticket, statement))
    }

    fn settle_cycle(
        &self,
        message: &Message,
        proof: &ValidityProof,
        ticket: CycleTicket,
        verdict: Result<bool, BridgeError>,
        logic: &dyn BridgeLogic,
        action: &BridgeAction,
    ) -> Result<MessageReceipt, BridgeError> {
        let mut guard = self.state.lock();
        let st = &mut *guard;

        let rejection = match verdict {
            Ok(true) => None,
            Ok(false) => Some(BridgeError::ProofRejected),
            Err(e) => Some(e),
        };
        if let Some(e) = rejection {
            st.machine.reject_proof(&ticket);
            st.registry.release(&message.id);
            metrics::set_bridge_phase(st.machine.phase().as_gauge());
            return Err(e);
        }

        if let Err(e) = st.machine.accept_proof(&ticket, proof.new_commitment) {
            st.registry.release(&message.id);
            if let BridgeError::InvariantViolation(reason) = &e {
                self.record_halt(st, reason.clone());
            }
            metrics::set_bridge_phase(st.machine.phase().as_gauge());
            return Err(e);
        }

        let staged = {
            let mut ctx = SettlementContext::new(&st.ledger, &st.machine);
            match logic.execute(action, &mut ctx) {
                Ok(()) => ctx.finish(),
                Err(e) => Err(e),
            }
        };
        let Settlement {
            ledger: changes,
            collections,
            effects,
        } = match staged {
            Ok(settlement) => settlement,
            Err(e) => {
                st.registry.release(&message.id);
                match &e {
                    BridgeError::InvariantViolation(reason) => {
                        self.halt_locked(st, format!("settlement: {reason}"))
                    }
                    _ => st.machine.abort(&ticket),
                }
                metrics::set_bridge_phase(st.machine.phase().as_gauge());
                return Err(e);
            }
        };

        // Commit validates everything before writing; the ledger apply and
        // id consumption that follow cannot fail.
        let (previous, current) = match st.machine.commit(&ticket, collections) {
            Ok(pair) => pair,
            Err(e) => {
                st.machine.abort(&ticket);
                st.registry.release(&message.id);
                metrics::set_bridge_phase(st.machine.phase().as_gauge());
                return Err(e);
            }
        };
        st.ledger.apply(changes);
        let consumed = st.registry.finalize(message.id);
        debug_assert!(consumed, "message id consumed twice");

        let mut kinds = effects;
        kinds.push(EffectKind::CommitmentAdvanced {
            from: previous,
            to: current,
        });
        let records = st
            .effects
            .append(Some(message.id), kinds, current, self.clock.now());

        metrics::set_commitment_height(current.height);
        metrics::set_bridge_phase(st.machine.phase().as_gauge());

        Ok(MessageReceipt {
            message_id: message.id,
            commitment: current,
            effects: records,
        })
    }

    // =========================================================================
    // Operator controls
    // =========================================================================

    /// Halt the bridge (Guardian). Returns false if already halted.
    pub fn halt(&self, caller: Address, reason: &str) -> Result<bool, BridgeError> {
        self.governor.require_role(&caller, Role::Guardian)?;
        let mut guard = self.state.lock();
        if guard.machine.is_halted() {
            return Ok(false);
        }
        self.halt_locked(&mut guard, format!("guardian: {reason}"));
        Ok(true)
    }

    /// Manual recovery from Halted (Guardian).
    ///
    /// The ledger is audited first; an inconsistent ledger keeps the bridge
    /// halted. The commitment is not touched.
    pub fn recover(&self, caller: Address) -> Result<(), BridgeError> {
        self.governor.require_role(&caller, Role::Guardian)?;
        let mut guard = self.state.lock();
        let st = &mut *guard;

        if !st.machine.is_halted() {
            return Err(BridgeError::InvalidTransition {
                from: st.machine.phase(),
                to: BridgePhase::Idle,
            });
        }
        st.ledger.audit()?;
        st.machine.recover()?;
        st.registry.clear_reservation();

        let commitment = st.machine.commitment();
        st.effects.append(
            None,
            vec![EffectKind::Recovered { guardian: caller }],
            commitment,
            self.clock.now(),
        );
        metrics::set_bridge_phase(st.machine.phase().as_gauge());
        Ok(())
    }

    fn halt_locked(&self, st: &mut EngineState, reason: String) {
        if st.machine.halt(reason.clone()) {
            self.record_halt(st, reason);
        }
    }

    /// Publish a halt the state machine already entered.
    fn record_halt(&self, st: &mut EngineState, reason: String) {
        error!("[qc-18] Bridge HALTED: {}", reason);
        st.registry.clear_reservation();
        let commitment = st.machine.commitment();
        st.effects.append(
            None,
            vec![EffectKind::Halted { reason }],
            commitment,
            self.clock.now(),
        );
        metrics::set_bridge_phase(BridgePhase::Halted.as_gauge());
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Latest accepted commitment.
    pub fn commitment(&self) -> Commitment {
        self.state.lock().machine.commitment()
    }

    /// Current phase.
    pub fn phase(&self) -> BridgePhase {
        self.state.lock().machine.phase()
    }

    /// Why the bridge is halted, if it is.
    pub fn halt_reason(&self) -> Option<String> {
        self.state.lock().machine.halt_reason().map(str::to_owned)
    }

    /// True if `id` was consumed.
    pub fn is_processed(&self, id: &MessageId) -> bool {
        self.state.lock().registry.is_processed(id)
    }

    /// Lifetime totals for an asset.
    pub fn asset_totals(&self, asset: &AssetId) -> AssetTotals {
        self.state.lock().ledger.totals(asset)
    }

    /// Wrapped supply minted for an asset.
    pub fn wrapped_supply(&self, asset: &AssetId) -> Amount {
        self.state.lock().ledger.wrapped_supply(asset)
    }

    /// Nonce the next outbound message of `sender` will carry.
    pub fn next_outbound_nonce(&self, sender: &Address) -> u64 {
        self.state.lock().registry.next_outbound_nonce(sender)
    }

    /// Retained effect records with `sequence >= from`.
    pub fn effects_since(&self, from: u64) -> Vec<EffectRecord> {
        self.state.lock().effects.since(from)
    }

    /// Full ledger audit.
    pub fn audit(&self) -> Result<(), BridgeError> {
        self.state.lock().ledger.audit()
    }
}

#[async_trait]
impl<V: ProofVerifier> BridgeApi for BridgeProtocolEngine<V> {
    fn submit(&self, message: &Message, proof: &ValidityProof) -> SubmissionOutcome {
        self.process_message(message, proof).into()
    }

    fn deposit(
        &self,
        owner: Address,
        asset: AssetId,
        amount: Amount,
        recipient: Address,
    ) -> Result<DepositReceipt, BridgeError> {
        invariant_positive_amount(amount)?;
        let payload = BridgeAction::Mint {
            recipient,
            asset,
            amount,
        }
        .encode()?;

        let mut guard = self.state.lock();
        let st = &mut *guard;
        if st.machine.is_halted() {
            return Err(BridgeError::Halted);
        }

        let nonce = st.registry.next_outbound_nonce(&owner);
        let message = Message::new(Direction::Outbound, owner, recipient, payload, nonce);
        let locked = st.ledger.lock(owner, asset, amount)?;
        st.registry.record_outbound(&message);

        let commitment = st.machine.commitment();
        st.effects.append(
            Some(message.id),
            vec![
                EffectKind::Deposited {
                    owner,
                    asset,
                    amount,
                },
                EffectKind::OutboundQueued {
                    message: message.clone(),
                },
            ],
            commitment,
            self.clock.now(),
        );

        info!(
            "[qc-18] Deposit of {} locked for {} (outbound {} nonce {})",
            amount,
            hex::encode(&owner[..4]),
            message.short_id(),
            nonce
        );
        Ok(DepositReceipt { locked, message })
    }

    fn claim(&self, owner: Address, asset: AssetId) -> Result<Amount, BridgeError> {
        let mut guard = self.state.lock();
        let st = &mut *guard;
        if st.machine.is_halted() {
            return Err(BridgeError::Halted);
        }

        let amount = st.ledger.claim(owner, asset)?;
        let commitment = st.machine.commitment();
        st.effects.append(
            None,
            vec![EffectKind::Claimed {
                owner,
                asset,
                amount,
            }],
            commitment,
            self.clock.now(),
        );

        info!(
            "[qc-18] Claimed {} for {}",
            amount,
            hex::encode(&owner[..4])
        );
        Ok(amount)
    }

    async fn claim_and_pay(
        &self,
        owner: Address,
        asset: AssetId,
        transfer: &dyn AssetTransfer,
    ) -> Result<Amount, BridgeError> {
        // Debit first; the lock is released before the transfer runs.
        let amount = self.claim(owner, asset)?;

        let Err(transfer_err) = transfer.transfer(owner, asset, amount).await else {
            return Ok(amount);
        };

        let mut guard = self.state.lock();
        let st = &mut *guard;
        if let Err(e) = st.ledger.restore_claim(owner, asset, amount) {
            self.halt_locked(st, format!("claim revert failed: {e}"));
            return Err(e);
        }
        let commitment = st.machine.commitment();
        st.effects.append(
            None,
            vec![EffectKind::ClaimReverted {
                owner,
                asset,
                amount,
            }],
            commitment,
            self.clock.now(),
        );

        warn!(
            "[qc-18] Payout of {} to {} failed, claim reverted: {}",
            amount,
            hex::encode(&owner[..4]),
            transfer_err
        );
        Err(BridgeError::PayoutFailed(transfer_err.to_string()))
    }

    fn bridge_state(&self) -> BridgeState {
        self.state.lock().machine.state().clone()
    }

    fn escrow_balance(&self, owner: &Address, asset: &AssetId) -> EscrowBalance {
        self.state.lock().ledger.balance(owner, asset)
    }
}
