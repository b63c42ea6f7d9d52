//! # Bridge Actions
//!
//! State changes a message payload can request. The payload of every
//! message is a bincode-encoded `BridgeAction`.

use super::errors::{Address, Amount, AssetId, BridgeError, CollectionId};
use super::value_objects::{Capability, CollectionMetadata};
use serde::{Deserialize, Serialize};

/// Action carried by a message payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeAction {
    /// Release locked escrow for `owner`.
    Release {
        /// Escrow owner
        owner: Address,
        /// Asset
        asset: AssetId,
        /// Amount to release
        amount: Amount,
    },
    /// Mint-equivalent: wrapped representation of value locked remotely.
    Mint {
        /// Beneficiary
        recipient: Address,
        /// Asset
        asset: AssetId,
        /// Amount
        amount: Amount,
    },
    /// Add a collection to the registry.
    RegisterCollection {
        /// Collection id
        collection_id: CollectionId,
        /// Metadata
        metadata: CollectionMetadata,
    },
    /// Several actions applied as one atomic unit.
    Batch(Vec<BridgeAction>),
}

impl BridgeAction {
    /// Encode as a message payload.
    pub fn encode(&self) -> Result<Vec<u8>, BridgeError> {
        bincode::serialize(self).map_err(|e| BridgeError::InvalidMessage(e.to_string()))
    }

    /// Decode a message payload.
    pub fn decode(payload: &[u8]) -> Result<Self, BridgeError> {
        bincode::deserialize(payload)
            .map_err(|e| BridgeError::InvalidMessage(format!("undecodable payload: {e}")))
    }

    /// Capability needed to execute this action.
    pub fn required_capability(&self) -> Capability {
        match self {
            Self::Release { .. } => Capability::ReleaseEscrow,
            Self::Mint { .. } => Capability::MintWrapped,
            Self::RegisterCollection { .. } => Capability::RegisterCollection,
            Self::Batch(_) => Capability::BatchActions,
        }
    }

    /// Short name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Release { .. } => "release",
            Self::Mint { .. } => "mint",
            Self::RegisterCollection { .. } => "register_collection",
            Self::Batch(_) => "batch",
        }
    }
}
