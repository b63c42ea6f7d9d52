//! HMAC Proof Verifier Adapter
//!
//! Implements `ProofVerifier` with an attestation scheme: the counterpart
//! domain's prover shares a key with this domain and attests to a
//! statement digest with HMAC-SHA256.

use crate::domain::{
    BridgeError, Commitment, Message, ProofStatement, ValidityProof,
};
use crate::ports::outbound::ProofVerifier;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Length of an attestation tag.
pub const ATTESTATION_LEN: usize = 32;

/// Shared-key attestation verifier.
pub struct HmacProofVerifier {
    key: Vec<u8>,
}

impl HmacProofVerifier {
    /// Create with the shared attestation key.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    fn mac(&self) -> Result<HmacSha256, BridgeError> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|e| BridgeError::InvalidProofFormat(format!("attestation key: {e}")))
    }

    /// Attest to a statement (prover side).
    pub fn attest(&self, statement: &ProofStatement) -> Result<Vec<u8>, BridgeError> {
        let mut mac = self.mac()?;
        mac.update(&statement.digest());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Build a proof that `message` moves the commitment from `trusted` to
    /// `claimed`.
    pub fn prove(
        &self,
        message: &Message,
        trusted: Commitment,
        claimed: Commitment,
    ) -> Result<ValidityProof, BridgeError> {
        let statement = ProofStatement::for_message(message, trusted, claimed);
        Ok(ValidityProof {
            new_commitment: claimed,
            data: self.attest(&statement)?,
        })
    }
}

impl ProofVerifier for HmacProofVerifier {
    fn verify(
        &self,
        statement: &ProofStatement,
        proof: &ValidityProof,
        trusted: &Commitment,
    ) -> Result<bool, BridgeError> {
        if proof.data.len() != ATTESTATION_LEN {
            return Err(BridgeError::InvalidProofFormat(format!(
                "expected {ATTESTATION_LEN} bytes, got {}",
                proof.data.len()
            )));
        }
        if statement.trusted != *trusted || statement.claimed != proof.new_commitment {
            debug!(
                "[qc-18] Statement mismatch: trusted {} claimed {}",
                statement.trusted, statement.claimed
            );
            return Ok(false);
        }

        let mut mac = self.mac()?;
        mac.update(&statement.digest());
        Ok(mac.verify_slice(&proof.data).is_ok())
    }
}
