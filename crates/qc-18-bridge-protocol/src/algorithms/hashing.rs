//! # Hashing
//!
//! SHA-256 derivations for message ids and proof statements.
//! Every preimage starts with a domain tag so digests of different
//! kinds can never collide.

use crate::domain::{Address, Commitment, Direction, Hash, MessageId};
use sha2::{Digest, Sha256};

const MESSAGE_ID_TAG: &[u8] = b"QC18/MSG/v1";
const PAYLOAD_TAG: &[u8] = b"QC18/PAYLOAD/v1";
const STATEMENT_TAG: &[u8] = b"QC18/STMT/v1";

/// Derive the globally unique id of a message.
pub fn compute_message_id(
    direction: Direction,
    sender: &Address,
    recipient: &Address,
    nonce: u64,
    payload: &[u8],
) -> MessageId {
    let mut hasher = Sha256::new();
    hasher.update(MESSAGE_ID_TAG);
    hasher.update([direction.tag()]);
    hasher.update(sender);
    hasher.update(recipient);
    hasher.update(nonce.to_le_bytes());
    hasher.update((payload.len() as u64).to_le_bytes());
    hasher.update(payload);
    hasher.finalize().into()
}

/// Digest of an opaque payload.
pub fn payload_digest(payload: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(PAYLOAD_TAG);
    hasher.update(payload);
    hasher.finalize().into()
}

/// Digest binding a message to a commitment transition.
pub fn statement_digest(
    message_id: &MessageId,
    payload_digest: &Hash,
    trusted: &Commitment,
    claimed: &Commitment,
) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(STATEMENT_TAG);
    hasher.update(message_id);
    hasher.update(payload_digest);
    hasher.update(trusted.height.to_le_bytes());
    hasher.update(trusted.root);
    hasher.update(claimed.height.to_le_bytes());
    hasher.update(claimed.root);
    hasher.finalize().into()
}
