use std::collections::HashMap;
use thiserror::Error;

use crate::{
    consts::consts::{EntityId, TransactionId},
    model::{
        participant::{normalize_email, Participant},
        statement::{Statement, StatementResult},
    },
};

use super::{
    index::{CreatedAtIndex, UniqueEmailIndex},
    query,
    row::{ParticipantRow, RollbackEntry},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyErrors {
    // CRUD - CREATE
    #[error("Cannot create, record already exists: {0}")]
    CannotCreateWhenAlreadyExists(EntityId),

    // Constraints
    #[error("Cannot add row as a participant already exists with this email: {0}")]
    UniqueConstraintViolation(String),
}

pub struct ParticipantTable {
    pub participant_rows: HashMap<EntityId, ParticipantRow>,
    pub unique_email_index: UniqueEmailIndex,
    pub created_at_index: CreatedAtIndex,
    next_sequence: u64,
}

impl Default for ParticipantTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticipantTable {
    pub fn new() -> Self {
        Self {
            participant_rows: HashMap::new(),
            unique_email_index: UniqueEmailIndex::new(),
            created_at_index: CreatedAtIndex::new(),
            next_sequence: 0,
        }
    }

    /// Applies a single statement. Each mutation is broken up into
    ///  - Verifying validity / constraints (uniqueness)
    ///  - Applying the change to the rows and indexes
    ///
    /// The returned `RollbackEntry` undoes the change if the surrounding transaction
    /// is rolled back
    pub fn apply(
        &mut self,
        statement: Statement,
        transaction_id: TransactionId,
    ) -> Result<(StatementResult, RollbackEntry), ApplyErrors> {
        log::trace!("Applying statement at [TX: {}]", transaction_id);

        let applied = match statement {
            Statement::Add(participant) => {
                let row = self.add(participant)?;
                let result = StatementResult::Single(row.participant.clone());

                (result, RollbackEntry::RemoveAdded(row))
            }
            Statement::FindByEmail(email) => (
                StatementResult::GetSingle(query::find_by_email(self, &email)),
                RollbackEntry::Nothing,
            ),
            Statement::List => (
                StatementResult::List(query::most_recent_first(self)),
                RollbackEntry::Nothing,
            ),
            Statement::Count => (
                StatementResult::Count(self.participant_rows.len()),
                RollbackEntry::Nothing,
            ),
            Statement::DeleteAll => {
                let removed = self.delete_all();

                (
                    StatementResult::Deleted(removed.len()),
                    RollbackEntry::RestoreDeleted(removed),
                )
            }
        };

        Ok(applied)
    }

    pub fn apply_rollback(&mut self, entry: RollbackEntry) {
        match entry {
            RollbackEntry::Nothing => {}
            RollbackEntry::RemoveAdded(row) => {
                self.unique_email_index
                    .remove_from_index(&row.participant.email);
                self.created_at_index
                    .remove_from_index(row.participant.created_at, row.sequence);
                self.participant_rows.remove(&row.participant.id);
            }
            RollbackEntry::RestoreDeleted(rows) => {
                for row in rows {
                    self.insert_row(row);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.participant_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participant_rows.is_empty()
    }

    fn add(&mut self, mut participant: Participant) -> Result<ParticipantRow, ApplyErrors> {
        participant.email = normalize_email(&participant.email);

        // The uniqueness constraint, checked and written without yielding so concurrent
        //  adds for the same email cannot both pass
        if self.unique_email_index.contains(&participant.email) {
            return Err(ApplyErrors::UniqueConstraintViolation(participant.email));
        }

        if self.participant_rows.contains_key(&participant.id) {
            return Err(ApplyErrors::CannotCreateWhenAlreadyExists(participant.id));
        }

        let row = ParticipantRow::new(participant, self.next_sequence);
        self.next_sequence += 1;

        self.insert_row(row.clone());

        Ok(row)
    }

    fn insert_row(&mut self, row: ParticipantRow) {
        let participant = &row.participant;

        self.unique_email_index
            .save_to_index(&participant.email, participant.id.clone());
        self.created_at_index.save_to_index(
            participant.created_at,
            row.sequence,
            participant.id.clone(),
        );
        self.participant_rows.insert(participant.id.clone(), row);
    }

    fn delete_all(&mut self) -> Vec<ParticipantRow> {
        self.unique_email_index.clear();
        self.created_at_index.clear();

        self.participant_rows.drain().map(|(_, row)| row).collect()
    }
}
