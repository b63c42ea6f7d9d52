//! Batching bridge logic: several actions per message.

use super::{ensure_supported, execute_single, BridgeLogic, SettlementContext};
use crate::domain::{BridgeAction, BridgeError, Capability, ImplementationId};
use std::collections::BTreeSet;

/// Catalog name of `BatchingLogic`.
pub const BATCHING_LOGIC_ID: &str = "batching-v2";

/// Everything `StandardLogic` does plus `BridgeAction::Batch`.
#[derive(Clone, Copy, Debug)]
pub struct BatchingLogic {
    max_batch_actions: usize,
}

impl BatchingLogic {
    /// Create with a batch size bound.
    pub fn new(max_batch_actions: usize) -> Self {
        Self { max_batch_actions }
    }
}

impl BridgeLogic for BatchingLogic {
    fn implementation_id(&self) -> ImplementationId {
        ImplementationId::new(BATCHING_LOGIC_ID)
    }

    fn capabilities(&self) -> BTreeSet<Capability> {
        [
            Capability::ReleaseEscrow,
            Capability::MintWrapped,
            Capability::RegisterCollection,
            Capability::BatchActions,
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
        let BridgeAction::Batch(actions) = action else {
            return execute_single(action, ctx);
        };

        if actions.is_empty() {
            return Err(BridgeError::InvalidMessage("empty batch".to_string()));
        }
        if actions.len() > self.max_batch_actions {
            return Err(BridgeError::InvalidMessage(format!(
                "batch of {} exceeds limit {}",
                actions.len(),
                self.max_batch_actions
            )));
        }
        for inner in actions {
            ensure_supported(self, inner)?;
            execute_single(inner, ctx)?;
        }
        Ok(())
    }
}
