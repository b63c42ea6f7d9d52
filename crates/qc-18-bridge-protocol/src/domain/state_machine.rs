//! # Bridge State Machine
//!
//! Holds the authoritative phase, commitment and collection registry.
//!
//! Each verification cycle is identified by a `CycleTicket`. Only the holder
//! of the current ticket can move the cycle forward, so a stale caller can
//! never commit against a commitment it did not verify.

use super::entities::BridgeState;
use super::errors::{BridgeError, CollectionId};
use super::invariants::invariant_commitment_advances;
use super::value_objects::{BridgePhase, CollectionMetadata, Commitment};
use tracing::{error, warn};

/// Handle of an in-flight verification cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleTicket {
    cycle_id: u64,
    trusted: Commitment,
}

impl CycleTicket {
    /// Cycle number.
    pub fn cycle_id(&self) -> u64 {
        self.cycle_id
    }

    /// Commitment trusted when the cycle began.
    pub fn trusted(&self) -> Commitment {
        self.trusted
    }
}

/// Bridge phase state machine.
#[derive(Debug)]
pub struct StateMachine {
    state: BridgeState,
    current_cycle: Option<u64>,
    next_cycle: u64,
    pending_commitment: Option<Commitment>,
    halt_reason: Option<String>,
}

impl StateMachine {
    /// Create at the genesis commitment.
    pub fn new(genesis: Commitment) -> Self {
        Self::from_state(BridgeState::genesis(genesis))
    }

    /// Rebuild from persisted state. In-flight phases are not persisted
    /// and come back as `Idle`.
    pub fn from_state(mut state: BridgeState) -> Self {
        if matches!(state.phase, BridgePhase::Verifying | BridgePhase::Settling) {
            state.phase = BridgePhase::Idle;
        }
        let halt_reason = (state.phase == BridgePhase::Halted).then(|| "restored halted".into());
        Self {
            state,
            current_cycle: None,
            next_cycle: 0,
            pending_commitment: None,
            halt_reason,
        }
    }

    /// Current state.
    pub fn state(&self) -> &BridgeState {
        &self.state
    }

    /// Current phase.
    pub fn phase(&self) -> BridgePhase {
        self.state.phase
    }

    /// Latest accepted commitment.
    pub fn commitment(&self) -> Commitment {
        self.state.commitment
    }

    /// True if halted.
    pub fn is_halted(&self) -> bool {
        self.state.phase == BridgePhase::Halted
    }

    /// Why the bridge halted.
    pub fn halt_reason(&self) -> Option<&str> {
        self.halt_reason.as_deref()
    }

    /// True if `collection_id` is registered.
    pub fn has_collection(&self, collection_id: &CollectionId) -> bool {
        self.state.collection_registry.contains_key(collection_id)
    }

    fn transition(&mut self, next: BridgePhase) -> Result<(), BridgeError> {
        if !self.state.phase.can_transition_to(next) {
            return Err(BridgeError::InvalidTransition {
                from: self.state.phase,
                to: next,
            });
        }
        self.state.phase = next;
        Ok(())
    }

    fn is_current(&self, ticket: &CycleTicket) -> bool {
        self.current_cycle == Some(ticket.cycle_id)
    }

    fn end_cycle(&mut self) {
        self.current_cycle = None;
        self.pending_commitment = None;
    }

    /// Idle → Verifying.
    pub fn begin_verification(&mut self) -> Result<CycleTicket, BridgeError> {
        match self.state.phase {
            BridgePhase::Idle => {}
            BridgePhase::Verifying | BridgePhase::Settling => return Err(BridgeError::Busy),
            BridgePhase::Halted => return Err(BridgeError::Halted),
        }
        self.transition(BridgePhase::Verifying)?;

        let ticket = CycleTicket {
            cycle_id: self.next_cycle,
            trusted: self.state.commitment,
        };
        self.next_cycle = self.next_cycle.wrapping_add(1);
        self.current_cycle = Some(ticket.cycle_id);
        Ok(ticket)
    }

    /// Verifying → Idle. No-op for a ticket that is no longer current.
    pub fn reject_proof(&mut self, ticket: &CycleTicket) {
        if self.is_current(ticket) && self.state.phase == BridgePhase::Verifying {
            self.state.phase = BridgePhase::Idle;
            self.end_cycle();
        }
    }

    /// Verifying → Settling with the proven commitment staged.
    pub fn accept_proof(
        &mut self,
        ticket: &CycleTicket,
        new_commitment: Commitment,
    ) -> Result<(), BridgeError> {
        if self.is_halted() {
            return Err(BridgeError::Halted);
        }
        if !self.is_current(ticket) || self.state.phase != BridgePhase::Verifying {
            return Err(BridgeError::InvalidTransition {
                from: self.state.phase,
                to: BridgePhase::Settling,
            });
        }
        if self.state.commitment != ticket.trusted {
            let reason = format!(
                "commitment moved from {} to {} under cycle {}",
                ticket.trusted, self.state.commitment, ticket.cycle_id
            );
            self.halt(reason.clone());
            return Err(BridgeError::InvariantViolation(reason));
        }
        if let Err(e) = invariant_commitment_advances(&ticket.trusted, &new_commitment) {
            self.reject_proof(ticket);
            return Err(e);
        }

        self.transition(BridgePhase::Settling)?;
        self.pending_commitment = Some(new_commitment);
        Ok(())
    }

    /// Settling/Verifying → Idle without advancing.
    pub fn abort(&mut self, ticket: &CycleTicket) {
        if self.is_current(ticket)
            && matches!(
                self.state.phase,
                BridgePhase::Verifying | BridgePhase::Settling
            )
        {
            self.state.phase = BridgePhase::Idle;
            self.end_cycle();
        }
    }

    /// Settling → Idle, advancing the commitment and inserting the
    /// collections staged by the cycle. Everything is validated before
    /// anything is written. Returns (previous, new) commitments.
    pub fn commit(
        &mut self,
        ticket: &CycleTicket,
        collections: Vec<(CollectionId, CollectionMetadata)>,
    ) -> Result<(Commitment, Commitment), BridgeError> {
        if !self.is_current(ticket) || self.state.phase != BridgePhase::Settling {
            return Err(BridgeError::InvalidTransition {
                from: self.state.phase,
                to: BridgePhase::Idle,
            });
        }
        let new_commitment = self.pending_commitment.ok_or_else(|| {
            BridgeError::InvariantViolation("settling without a staged commitment".into())
        })?;
        invariant_commitment_advances(&self.state.commitment, &new_commitment)?;
        if let Some((id, _)) = collections.iter().find(|(id, _)| self.has_collection(id)) {
            return Err(BridgeError::CollectionAlreadyRegistered(*id));
        }

        let previous = self.state.commitment;
        self.transition(BridgePhase::Idle)?;
        self.state.commitment = new_commitment;
        self.state.collection_registry.extend(collections);
        self.end_cycle();
        Ok((previous, new_commitment))
    }

    /// Any phase → Halted. Returns false if already halted.
    pub fn halt(&mut self, reason: impl Into<String>) -> bool {
        if self.is_halted() {
            return false;
        }
        let reason = reason.into();
        error!(
            "[qc-18] Bridge halted in {:?} at {}: {}",
            self.state.phase, self.state.commitment, reason
        );
        self.state.phase = BridgePhase::Halted;
        self.halt_reason = Some(reason);
        self.end_cycle();
        true
    }

    /// Manual recovery: Halted → Idle. Commitment is untouched.
    pub fn recover(&mut self) -> Result<(), BridgeError> {
        if !self.is_halted() {
            return Err(BridgeError::InvalidTransition {
                from: self.state.phase,
                to: BridgePhase::Idle,
            });
        }
        warn!(
            "[qc-18] Manual recovery from halt ({}) at {}",
            self.halt_reason.as_deref().unwrap_or("unknown"),
            self.state.commitment
        );
        self.state.phase = BridgePhase::Idle;
        self.halt_reason = None;
        Ok(())
    }

    /// State as it should be persisted (in-flight phases recorded as Idle).
    pub fn persistable_state(&self) -> BridgeState {
        let mut state = self.state.clone();
        if matches!(state.phase, BridgePhase::Verifying | BridgePhase::Settling) {
            state.phase = BridgePhase::Idle;
        }
        state
    }
}
