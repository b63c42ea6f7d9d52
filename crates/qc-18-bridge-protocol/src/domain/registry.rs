//! # Message Registry
//!
//! Deduplicates inbound messages and orders outbound ones.
//!
//! A message id is first *reserved* for the cycle that processes it and
//! only *consumed* when that cycle commits. A failed cycle drops the
//! reservation so the message can be retried.

use super::entities::Message;
use super::errors::{Address, MessageId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Result of `register_if_new`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// New id, now provisionally reserved.
    Accepted,
    /// Id already consumed.
    Duplicate,
    /// A cycle holding a reservation is still in flight.
    InFlight,
}

/// Registry of message ids.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MessageRegistry {
    /// Consumed inbound ids (append-only).
    processed: BTreeSet<MessageId>,
    /// Consumption order.
    order: Vec<MessageId>,
    /// Next outbound nonce per sender.
    outbound_nonces: BTreeMap<Address, u64>,
    /// Outbound message ids in creation order.
    outbound_log: Vec<MessageId>,
    /// Provisional reservation of the in-flight cycle.
    #[serde(skip)]
    reserved: Option<MessageId>,
}

impl MessageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `id` unless it was consumed or another cycle holds the
    /// reservation slot.
    pub fn register_if_new(&mut self, id: MessageId) -> Registration {
        if self.processed.contains(&id) {
            return Registration::Duplicate;
        }
        if self.reserved.is_some() {
            return Registration::InFlight;
        }
        self.reserved = Some(id);
        Registration::Accepted
    }

    /// Drop the reservation for `id` (cycle failed short of commit).
    pub fn release(&mut self, id: &MessageId) {
        if self.reserved.as_ref() == Some(id) {
            self.reserved = None;
        }
    }

    /// Permanently consume `id`. Returns false if it was already consumed.
    pub fn finalize(&mut self, id: MessageId) -> bool {
        self.release(&id);
        if !self.processed.insert(id) {
            return false;
        }
        self.order.push(id);
        true
    }

    /// Drop any reservation (manual recovery).
    pub fn clear_reservation(&mut self) {
        self.reserved = None;
    }

    /// True if `id` was consumed.
    pub fn is_processed(&self, id: &MessageId) -> bool {
        self.processed.contains(id)
    }

    /// Currently reserved id, if any.
    pub fn reserved(&self) -> Option<MessageId> {
        self.reserved
    }

    /// Number of consumed ids.
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Consumed ids in consumption order.
    pub fn processed_order(&self) -> &[MessageId] {
        &self.order
    }

    /// Nonce the next outbound message of `sender` will carry.
    pub fn next_outbound_nonce(&self, sender: &Address) -> u64 {
        self.outbound_nonces.get(sender).copied().unwrap_or(0)
    }

    /// Record an outbound message and bump its sender's nonce.
    pub fn record_outbound(&mut self, message: &Message) {
        self.outbound_nonces
            .insert(message.sender, message.nonce.saturating_add(1));
        self.outbound_log.push(message.id);
    }

    /// Outbound ids in creation order.
    pub fn outbound_log(&self) -> &[MessageId] {
        &self.outbound_log
    }
}
