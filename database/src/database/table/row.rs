use serde::{Deserialize, Serialize};

use crate::model::participant::Participant;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ParticipantRow {
    pub participant: Participant,
    /// Position in insertion order, only used to break `created_at` ties
    pub sequence: u64,
}

impl ParticipantRow {
    pub fn new(participant: Participant, sequence: u64) -> Self {
        Self {
            participant,
            sequence,
        }
    }
}

/// Everything needed to undo a statement that was applied inside a transaction that
/// later rolled back
#[derive(Debug)]
pub enum RollbackEntry {
    /// Queries do not change the table
    Nothing,
    RemoveAdded(ParticipantRow),
    RestoreDeleted(Vec<ParticipantRow>),
}
