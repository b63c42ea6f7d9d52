//! Bounded in-memory log of committed effects.

use crate::domain::{Commitment, EffectKind, EffectRecord, MessageId};
use std::collections::VecDeque;
use uuid::Uuid;

/// Append-only effect log; the oldest records are evicted at capacity.
#[derive(Debug)]
pub(crate) struct EffectLog {
    records: VecDeque<EffectRecord>,
    capacity: usize,
    next_sequence: u64,
}

impl EffectLog {
    pub(crate) fn new(capacity: usize, next_sequence: u64) -> Self {
        Self {
            records: VecDeque::new(),
            capacity,
            next_sequence,
        }
    }

    /// Append the effects of one operation under a shared correlation id.
    pub(crate) fn append(
        &mut self,
        message_id: Option<MessageId>,
        kinds: Vec<EffectKind>,
        commitment: Commitment,
        timestamp: u64,
    ) -> Vec<EffectRecord> {
        let correlation_id = Uuid::new_v4();
        let mut appended = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let record = EffectRecord {
                sequence: self.next_sequence,
                correlation_id,
                message_id,
                kind,
                commitment,
                timestamp,
            };
            self.next_sequence = self.next_sequence.saturating_add(1);
            if self.records.len() == self.capacity {
                self.records.pop_front();
            }
            self.records.push_back(record.clone());
            appended.push(record);
        }
        appended
    }

    /// Retained records with `sequence >= from`.
    pub(crate) fn since(&self, from: u64) -> Vec<EffectRecord> {
        self.records
            .iter()
            .filter(|r| r.sequence >= from)
            .cloned()
            .collect()
    }

    pub(crate) fn next_sequence(&self) -> u64 {
        self.next_sequence
    }
}
