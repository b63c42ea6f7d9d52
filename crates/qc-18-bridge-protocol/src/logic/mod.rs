//! # Bridge Logic
//!
//! Swappable interpretation of message payloads.
//!
//! The active implementation is selected by the `UpgradeGovernor`. Storage
//! (ledger, registry, bridge state) is defined independently of it: an
//! implementation only reads and stages changes through a
//! `SettlementContext`.

mod batching;
mod context;
mod standard;

pub use batching::BatchingLogic;
pub use context::{Settlement, SettlementContext};
pub use standard::StandardLogic;

use crate::domain::{BridgeAction, BridgeError, Capability, ImplementationId, Message};
use std::collections::BTreeSet;

/// Capability-set interface of a bridge logic implementation.
pub trait BridgeLogic: Send + Sync {
    /// Catalog name.
    fn implementation_id(&self) -> ImplementationId;

    /// Capabilities this implementation exposes.
    fn capabilities(&self) -> BTreeSet<Capability>;

    /// Decode the action carried by a message.
    fn decode(&self, message: &Message) -> Result<BridgeAction, BridgeError> {
        BridgeAction::decode(&message.payload)
    }

    /// True if the action's capability is exposed.
    fn supports(&self, action: &BridgeAction) -> bool {
        self.capabilities().contains(&action.required_capability())
    }

    /// Stage the action's effects.
    fn execute(
        &self,
        action: &BridgeAction,
        ctx: &mut SettlementContext<'_>,
    ) -> Result<(), BridgeError>;
}

/// Execute a single non-batch action.
pub(crate) fn execute_single(
    action: &BridgeAction,
    ctx: &mut SettlementContext<'_>,
) -> Result<(), BridgeError> {
    match action {
        BridgeAction::Release {
            owner,
            asset,
            amount,
        } => ctx.release(*owner, *asset, *amount),
        BridgeAction::Mint {
            recipient,
            asset,
            amount,
        } => ctx.mint(*recipient, *asset, *amount),
        BridgeAction::RegisterCollection {
            collection_id,
            metadata,
        } => ctx.register_collection(*collection_id, metadata.clone()),
        BridgeAction::Batch(_) => Err(BridgeError::UnsupportedAction(
            "nested batch".to_string(),
        )),
    }
}

/// Fail with `UnsupportedAction` unless `logic` supports `action`.
pub(crate) fn ensure_supported(
    logic: &dyn BridgeLogic,
    action: &BridgeAction,
) -> Result<(), BridgeError> {
    if !logic.supports(action) {
        return Err(BridgeError::UnsupportedAction(format!(
            "{} not supported by {}",
            action.name(),
            logic.implementation_id()
        )));
    }
    Ok(())
}
