//! Standard bridge logic: one action per message.

use super::{ensure_supported, execute_single, BridgeLogic, SettlementContext};
use crate::domain::{BridgeAction, BridgeError, Capability, ImplementationId};
use std::collections::BTreeSet;

/// Catalog name of `StandardLogic`.
pub const STANDARD_LOGIC_ID: &str = "standard-v1";

/// Release, mint and collection registration; no batching.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardLogic;

impl BridgeLogic for StandardLogic {
    fn implementation_id(&self) -> ImplementationId {
        ImplementationId::new(STANDARD_LOGIC_ID)
    }

    fn capabilities(&self) -> BTreeSet<Capability> {
        [
            Capability::ReleaseEscrow,
            Capability::MintWrapped,
            Capability::RegisterCollection,
        ]
        .into_iter()
        .collect()
    }

    fn execute(
        &self,
        action: &BridgeAction,
        ctx: &mut SettlementContext<'_>,
    ) -> Result<(), BridgeError> {
        ensure_supported(self, action)?;
        execute_single(action, ctx)
    }
}
