//! # Upgrade Governance Attacks
//!
//! Attempts to swap bridge logic without the timelock or the right roles.

#[cfg(test)]
mod tests {
    use crate::harness::{BridgeHarness, ADMIN, ALICE, BOB, ETH};
    use qc_18_bridge_protocol::{
        BridgeAction, BridgeApi, BridgeError, BridgeLogic, Capability, GovernanceApi,
        ImplementationId, ProposalStatus, Role, StandardLogic,
    };
    use std::collections::BTreeSet;
    use std::sync::Arc;

    /// Logic that silently drops releases.
    struct Hollow;

    impl BridgeLogic for Hollow {
        fn implementation_id(&self) -> ImplementationId {
            ImplementationId::new("hollow")
        }

        fn capabilities(&self) -> BTreeSet<Capability> {
            [Capability::ReleaseEscrow].into_iter().collect()
        }

        fn execute(
            &self,
            _action: &BridgeAction,
            _ctx: &mut qc_18_bridge_protocol::logic::SettlementContext<'_>,
        ) -> Result<(), BridgeError> {
            Ok(())
        }
    }

    #[test]
    fn test_outsider_cannot_propose_or_activate() {
        let h = BridgeHarness::new();
        let governor = h.engine.governor();

        assert!(matches!(
            governor.propose(ALICE, ImplementationId::new("batching-v2")),
            Err(BridgeError::Unauthorized { .. })
        ));

        let proposal = governor
            .propose(ADMIN, ImplementationId::new("batching-v2"))
            .unwrap();
        h.clock.advance_time(h.engine.config().upgrade_delay_secs);
        assert!(matches!(
            governor.activate(ALICE, proposal.id),
            Err(BridgeError::Unauthorized { .. })
        ));
        assert_eq!(
            governor.active_implementation(),
            ImplementationId::new("standard-v1")
        );
    }

    #[test]
    fn test_activation_one_second_early_rejected() {
        let h = BridgeHarness::new();
        let governor = h.engine.governor();
        let proposal = governor
            .propose(ADMIN, ImplementationId::new("batching-v2"))
            .unwrap();

        h.clock
            .advance_time(h.engine.config().upgrade_delay_secs - 1);
        assert!(matches!(
            governor.activate(ADMIN, proposal.id),
            Err(BridgeError::TimingNotElapsed { .. })
        ));
        h.clock.advance_time(1);
        assert!(governor.activate(ADMIN, proposal.id).is_ok());
        assert!(matches!(
            governor.activate(ADMIN, proposal.id),
            Err(BridgeError::InvalidProposalStatus {
                status: ProposalStatus::Activated,
                ..
            })
        ));
    }

    #[test]
    fn test_cancelled_proposal_cannot_activate() {
        let h = BridgeHarness::new();
        let governor = h.engine.governor();
        let proposal = governor
            .propose(ADMIN, ImplementationId::new("batching-v2"))
            .unwrap();
        governor.cancel(ADMIN, proposal.id).unwrap();

        h.clock.advance_time(h.engine.config().upgrade_delay_secs);
        assert!(matches!(
            governor.activate(ADMIN, proposal.id),
            Err(BridgeError::InvalidProposalStatus {
                status: ProposalStatus::Cancelled,
                ..
            })
        ));
    }

    #[test]
    fn test_hollow_logic_cannot_be_activated() {
        let h = BridgeHarness::new();
        let governor = h.engine.governor();
        governor
            .register_implementation(ADMIN, Arc::new(Hollow))
            .unwrap();

        let proposal = governor
            .propose(ADMIN, ImplementationId::new("hollow"))
            .unwrap();
        h.clock.advance_time(h.engine.config().upgrade_delay_secs);
        assert!(matches!(
            governor.activate(ADMIN, proposal.id),
            Err(BridgeError::InvalidImplementation(_))
        ));
        assert_eq!(
            governor.active_implementation(),
            ImplementationId::new("standard-v1")
        );
    }

    #[test]
    fn test_registered_implementation_cannot_be_replaced() {
        let h = BridgeHarness::new();
        let governor = h.engine.governor();
        assert!(matches!(
            governor.register_implementation(ADMIN, Arc::new(StandardLogic)),
            Err(BridgeError::InvalidImplementation(_))
        ));
        assert!(matches!(
            governor.register_implementation(BOB, Arc::new(Hollow)),
            Err(BridgeError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_revoked_guardian_cannot_halt() {
        let h = BridgeHarness::new();
        let governor = h.engine.governor();
        governor.grant_role(ADMIN, BOB, Role::Guardian).unwrap();
        assert_eq!(h.engine.halt(BOB, "drill"), Ok(true));
        h.engine.recover(BOB).unwrap();

        governor.revoke_role(ADMIN, BOB, Role::Guardian).unwrap();
        assert!(matches!(
            h.engine.halt(BOB, "rogue"),
            Err(BridgeError::Unauthorized { .. })
        ));
        assert!(h.engine.deposit(ALICE, ETH, 1, ALICE).is_ok());
    }
}
