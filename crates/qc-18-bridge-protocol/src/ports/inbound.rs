//! # Inbound Ports
//!
//! API traits defining what the Bridge Protocol subsystem can do.

use super::outbound::AssetTransfer;
use crate::domain::{
    Address, Amount, AssetId, BridgeError, BridgeState, DepositReceipt, EscrowBalance,
    ImplementationId, Message, SubmissionOutcome, UpgradeProposal, ValidityProof,
};
use async_trait::async_trait;

/// Bridge API - inbound port.
#[async_trait]
pub trait BridgeApi: Send + Sync {
    /// Submit an inbound message with its validity proof.
    fn submit(&self, message: &Message, proof: &ValidityProof) -> SubmissionOutcome;

    /// Lock funds and queue an outbound message.
    fn deposit(
        &self,
        owner: Address,
        asset: AssetId,
        amount: Amount,
        recipient: Address,
    ) -> Result<DepositReceipt, BridgeError>;

    /// Debit all Released funds and return the payable amount. The caller
    /// performs the value transfer after this returns.
    fn claim(&self, owner: Address, asset: AssetId) -> Result<Amount, BridgeError>;

    /// Claim, then pay through `transfer` with no lock held.
    async fn claim_and_pay(
        &self,
        owner: Address,
        asset: AssetId,
        transfer: &dyn AssetTransfer,
    ) -> Result<Amount, BridgeError>;

    /// Current bridge state.
    fn bridge_state(&self) -> BridgeState;

    /// Escrow record for (owner, asset).
    fn escrow_balance(&self, owner: &Address, asset: &AssetId) -> EscrowBalance;
}

/// Upgrade governance API - inbound port.
pub trait GovernanceApi: Send + Sync {
    /// Propose `implementation`; activatable after the mandatory delay.
    fn propose(
        &self,
        caller: Address,
        implementation: ImplementationId,
    ) -> Result<UpgradeProposal, BridgeError>;

    /// Activate a matured proposal.
    fn activate(&self, caller: Address, proposal_id: u64) -> Result<ImplementationId, BridgeError>;

    /// Cancel a pending proposal.
    fn cancel(&self, caller: Address, proposal_id: u64) -> Result<(), BridgeError>;

    /// Currently active implementation.
    fn active_implementation(&self) -> ImplementationId;

    /// Look up a proposal.
    fn proposal(&self, proposal_id: u64) -> Option<UpgradeProposal>;
}
