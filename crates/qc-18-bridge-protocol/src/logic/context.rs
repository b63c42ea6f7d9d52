//! Settlement context handed to the active bridge logic.

use crate::domain::{
    Address, Amount, AssetId, BridgeError, CollectionId, CollectionMetadata, EffectKind,
    EscrowLedger, LedgerChanges, LedgerTransaction, StateMachine,
};

/// Staging area for one cycle's mutations.
///
/// Nothing here touches committed state; the engine applies the resulting
/// `Settlement` as a whole or drops it.
pub struct SettlementContext<'a> {
    ledger: LedgerTransaction<'a>,
    machine: &'a StateMachine,
    collections: Vec<(CollectionId, CollectionMetadata)>,
    effects: Vec<EffectKind>,
}

/// Validated output of a settlement.
#[derive(Debug)]
pub struct Settlement {
    /// Ledger changes.
    pub ledger: LedgerChanges,
    /// Collections to insert.
    pub collections: Vec<(CollectionId, CollectionMetadata)>,
    /// Effects to publish once committed.
    pub effects: Vec<EffectKind>,
}

impl<'a> SettlementContext<'a> {
    /// Stage against the committed ledger and state.
    pub fn new(ledger: &'a EscrowLedger, machine: &'a StateMachine) -> Self {
        Self {
            ledger: ledger.transaction(),
            machine,
            collections: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// Stage a release.
    pub fn release(
        &mut self,
        owner: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<(), BridgeError> {
        self.ledger.release(owner, asset, amount)?;
        self.effects.push(EffectKind::Released {
            owner,
            asset,
            amount,
        });
        Ok(())
    }

    /// Stage a mint-equivalent.
    pub fn mint(
        &mut self,
        recipient: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<(), BridgeError> {
        self.ledger.mint(asset, amount)?;
        self.effects.push(EffectKind::Minted {
            recipient,
            asset,
            amount,
        });
        Ok(())
    }

    /// Stage a collection registration.
    pub fn register_collection(
        &mut self,
        collection_id: CollectionId,
        metadata: CollectionMetadata,
    ) -> Result<(), BridgeError> {
        let staged = self.collections.iter().any(|(id, _)| *id == collection_id);
        if staged || self.machine.has_collection(&collection_id) {
            return Err(BridgeError::CollectionAlreadyRegistered(collection_id));
        }
        self.collections.push((collection_id, metadata));
        self.effects
            .push(EffectKind::CollectionRegistered { collection_id });
        Ok(())
    }

    /// Number of effects staged so far.
    pub fn staged_effects(&self) -> usize {
        self.effects.len()
    }

    /// Validate and freeze.
    pub fn finish(self) -> Result<Settlement, BridgeError> {
        Ok(Settlement {
            ledger: self.ledger.into_changes()?,
            collections: self.collections,
            effects: self.effects,
        })
    }
}
