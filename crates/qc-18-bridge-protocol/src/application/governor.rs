//! # Upgrade Governor
//!
//! Role-gated, time-locked controller of the active bridge logic.
//!
//! The governor owns the role registry, the upgrade proposals and the
//! catalog of registered `BridgeLogic` implementations. Activation swaps
//! behavior only; engine storage is never touched.

use crate::application::snapshot::GovernorSnapshot;
use crate::config::BridgeConfig;
use crate::domain::{
    invariant_activation_window, invariant_required_capabilities, Address, BridgeError,
    ImplementationId, ProposalStatus, Role, RoleRegistry, UpgradeProposal,
};
use crate::logic::{BatchingLogic, BridgeLogic, StandardLogic};
use crate::metrics;
use crate::ports::inbound::GovernanceApi;
use crate::ports::outbound::Clock;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, warn};

struct GovernorState {
    roles: RoleRegistry,
    proposals: BTreeMap<u64, UpgradeProposal>,
    catalog: HashMap<ImplementationId, Arc<dyn BridgeLogic>>,
    active: Arc<dyn BridgeLogic>,
    next_proposal_id: u64,
}

/// Upgrade Governor.
pub struct UpgradeGovernor {
    upgrade_delay_secs: u64,
    clock: Arc<dyn Clock>,
    state: RwLock<GovernorState>,
}

impl UpgradeGovernor {
    /// Create with `admin` holding every role and `initial` active.
    ///
    /// `initial` must expose the required capability surface.
    pub fn new(
        admin: Address,
        initial: Arc<dyn BridgeLogic>,
        upgrade_delay_secs: u64,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BridgeError> {
        Self::require_delay(upgrade_delay_secs)?;
        invariant_required_capabilities(&initial.capabilities())?;

        let mut catalog = HashMap::new();
        catalog.insert(initial.implementation_id(), Arc::clone(&initial));

        Ok(Self {
            upgrade_delay_secs,
            clock,
            state: RwLock::new(GovernorState {
                roles: RoleRegistry::with_admin(admin),
                proposals: BTreeMap::new(),
                catalog,
                active: initial,
                next_proposal_id: 1,
            }),
        })
    }

    /// Governor with `StandardLogic` active and `BatchingLogic` registered.
    pub fn with_default_catalog(
        admin: Address,
        config: &BridgeConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BridgeError> {
        config.validate()?;
        let governor = Self::new(
            admin,
            Arc::new(StandardLogic),
            config.upgrade_delay_secs,
            clock,
        )?;
        governor.register_implementation(
            admin,
            Arc::new(BatchingLogic::new(config.max_batch_actions)),
        )?;
        Ok(governor)
    }

    /// Rebuild from a snapshot. Every implementation the snapshot refers to
    /// as active must be present in `catalog`.
    pub fn restore(
        snapshot: GovernorSnapshot,
        catalog: Vec<Arc<dyn BridgeLogic>>,
        upgrade_delay_secs: u64,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BridgeError> {
        Self::require_delay(upgrade_delay_secs)?;
        let catalog: HashMap<_, _> = catalog
            .into_iter()
            .map(|logic| (logic.implementation_id(), logic))
            .collect();
        let active = catalog.get(&snapshot.active).cloned().ok_or_else(|| {
            BridgeError::Storage(format!(
                "active implementation {} missing from catalog",
                snapshot.active
            ))
        })?;

        let proposals = snapshot
            .proposals
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(Self {
            upgrade_delay_secs,
            clock,
            state: RwLock::new(GovernorState {
                roles: snapshot.roles,
                proposals,
                catalog,
                active,
                next_proposal_id: snapshot.next_proposal_id,
            }),
        })
    }

    /// The timelock must be non-zero.
    fn require_delay(upgrade_delay_secs: u64) -> Result<(), BridgeError> {
        if upgrade_delay_secs == 0 {
            return Err(BridgeError::InvalidConfig(
                "upgrade delay must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Persistable governor state.
    pub fn snapshot(&self) -> GovernorSnapshot {
        let state = self.state.read();
        GovernorSnapshot {
            roles: state.roles.clone(),
            proposals: state.proposals.values().cloned().collect(),
            active: state.active.implementation_id(),
            next_proposal_id: state.next_proposal_id,
        }
    }

    /// Add an implementation to the catalog (Admin).
    ///
    /// Ids are never overwritten: replacing a registered implementation
    /// would change behavior without going through the timelock.
    pub fn register_implementation(
        &self,
        caller: Address,
        logic: Arc<dyn BridgeLogic>,
    ) -> Result<ImplementationId, BridgeError> {
        let mut state = self.state.write();
        state.roles.require(&caller, Role::Admin)?;

        let id = logic.implementation_id();
        if state.catalog.contains_key(&id) {
            return Err(BridgeError::InvalidImplementation(format!(
                "{id} already registered"
            )));
        }
        state.catalog.insert(id.clone(), logic);
        info!("[qc-18] Registered implementation {}", id);
        Ok(id)
    }

    /// Implementations in the catalog.
    pub fn registered_implementations(&self) -> Vec<ImplementationId> {
        let mut ids: Vec<_> = self.state.read().catalog.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Active implementation, captured for one operation.
    pub fn active_logic(&self) -> Arc<dyn BridgeLogic> {
        Arc::clone(&self.state.read().active)
    }

    /// All proposals in id order.
    pub fn proposals(&self) -> Vec<UpgradeProposal> {
        self.state.read().proposals.values().cloned().collect()
    }

    /// Grant `role` to `principal` (Admin). Returns false if already held.
    pub fn grant_role(
        &self,
        caller: Address,
        principal: Address,
        role: Role,
    ) -> Result<bool, BridgeError> {
        let mut state = self.state.write();
        state.roles.require(&caller, Role::Admin)?;
        let granted = state.roles.grant(principal, role);
        if granted {
            info!(
                "[qc-18] Granted {:?} to {}",
                role,
                hex::encode(&principal[..4])
            );
        }
        Ok(granted)
    }

    /// Revoke `role` from `principal` (Admin). Returns false if not held.
    pub fn revoke_role(
        &self,
        caller: Address,
        principal: Address,
        role: Role,
    ) -> Result<bool, BridgeError> {
        let mut state = self.state.write();
        state.roles.require(&caller, Role::Admin)?;
        let revoked = state.roles.revoke(&principal, role);
        if revoked {
            warn!(
                "[qc-18] Revoked {:?} from {}",
                role,
                hex::encode(&principal[..4])
            );
        }
        Ok(revoked)
    }

    /// True if `principal` holds `role`.
    pub fn has_role(&self, principal: &Address, role: Role) -> bool {
        self.state.read().roles.has_role(principal, role)
    }

    /// Fail with `Unauthorized` unless `principal` holds `role`.
    pub fn require_role(&self, principal: &Address, role: Role) -> Result<(), BridgeError> {
        self.state.read().roles.require(principal, role)
    }

    fn pending_proposal(
        state: &GovernorState,
        proposal_id: u64,
        next: ProposalStatus,
    ) -> Result<UpgradeProposal, BridgeError> {
        let proposal = state
            .proposals
            .get(&proposal_id)
            .ok_or(BridgeError::ProposalNotFound(proposal_id))?;
        if !proposal.status.can_transition_to(next) {
            return Err(BridgeError::InvalidProposalStatus {
                id: proposal_id,
                status: proposal.status,
            });
        }
        Ok(proposal.clone())
    }
}

impl GovernanceApi for UpgradeGovernor {
    fn propose(
        &self,
        caller: Address,
        implementation: ImplementationId,
    ) -> Result<UpgradeProposal, BridgeError> {
        let mut state = self.state.write();
        state.roles.require(&caller, Role::Upgrader)?;

        let now = self.clock.now();
        let earliest_activation = now
            .checked_add(self.upgrade_delay_secs)
            .ok_or(BridgeError::Overflow)?;
        let id = state.next_proposal_id;
        state.next_proposal_id = id.checked_add(1).ok_or(BridgeError::Overflow)?;

        let proposal = UpgradeProposal {
            id,
            proposed_implementation: implementation,
            proposer: caller,
            created_at: now,
            earliest_activation,
            status: ProposalStatus::Proposed,
        };
        state.proposals.insert(id, proposal.clone());

        info!(
            "[qc-18] Upgrade #{} proposed: {} (activatable at {})",
            id, proposal.proposed_implementation, earliest_activation
        );
        Ok(proposal)
    }

    fn activate(&self, caller: Address, proposal_id: u64) -> Result<ImplementationId, BridgeError> {
        let mut state = self.state.write();
        state.roles.require(&caller, Role::Upgrader)?;

        let proposal = Self::pending_proposal(&state, proposal_id, ProposalStatus::Activated)?;
        invariant_activation_window(&proposal, self.clock.now())?;

        let target = state
            .catalog
            .get(&proposal.proposed_implementation)
            .cloned()
            .ok_or_else(|| {
                BridgeError::InvalidImplementation(format!(
                    "{} not registered",
                    proposal.proposed_implementation
                ))
            })?;
        invariant_required_capabilities(&target.capabilities())?;

        let previous = std::mem::replace(&mut state.active, target);
        if let Some(p) = state.proposals.get_mut(&proposal_id) {
            p.status = ProposalStatus::Activated;
        }
        metrics::record_upgrade_activated();

        info!(
            "[qc-18] Upgrade #{} activated: {} -> {}",
            proposal_id,
            previous.implementation_id(),
            proposal.proposed_implementation
        );
        Ok(proposal.proposed_implementation)
    }

    fn cancel(&self, caller: Address, proposal_id: u64) -> Result<(), BridgeError> {
        let mut state = self.state.write();
        state.roles.require(&caller, Role::Upgrader)?;

        Self::pending_proposal(&state, proposal_id, ProposalStatus::Cancelled)?;
        if let Some(p) = state.proposals.get_mut(&proposal_id) {
            p.status = ProposalStatus::Cancelled;
        }

        info!("[qc-18] Upgrade #{} cancelled", proposal_id);
        Ok(())
    }

    fn active_implementation(&self) -> ImplementationId {
        self.state.read().active.implementation_id()
    }

    fn proposal(&self, proposal_id: u64) -> Option<UpgradeProposal> {
        self.state.read().proposals.get(&proposal_id).cloned()
    }
}
