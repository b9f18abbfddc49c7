use thiserror::Error;

use crate::{
    database::{
        commands::RollbackReason,
        request_manager::{RequestManager, RequestManagerError},
        table::table::ApplyErrors,
    },
    model::participant::{NewParticipant, Participant},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The unique email constraint rejected the write
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("Write was rolled back: {0}")]
    Rollback(String),
    #[error("Store did not respond in time")]
    Timeout,
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<RequestManagerError> for StoreError {
    fn from(err: RequestManagerError) -> Self {
        match err {
            RequestManagerError::TransactionRollback(RollbackReason::Apply(
                ApplyErrors::UniqueConstraintViolation(email),
            )) => StoreError::DuplicateKey(email),
            RequestManagerError::TransactionRollback(reason) => {
                StoreError::Rollback(reason.to_string())
            }
            RequestManagerError::DatabaseTimeout => StoreError::Timeout,
            RequestManagerError::DatabaseUnavailable => StoreError::Unavailable(
                RequestManagerError::DatabaseUnavailable.to_string(),
            ),
            RequestManagerError::UnexpectedResponse(message) => StoreError::Unavailable(message),
        }
    }
}

/// Durable participant storage with a unique constraint on the normalized email.
/// Implementations are shared across request handlers
pub trait ParticipantStore: Send + Sync {
    /// Fails with `StoreError::DuplicateKey` when the normalized email is taken, no matter
    ///  how many callers race on it
    fn insert(&self, participant: NewParticipant) -> Result<Participant, StoreError>;

    /// Inserts every participant or none of them
    fn insert_many(&self, participants: Vec<NewParticipant>)
        -> Result<Vec<Participant>, StoreError>;

    fn find_by_email(&self, email: &str) -> Result<Option<Participant>, StoreError>;

    /// Most recently created first
    fn list_all(&self) -> Result<Vec<Participant>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;

    fn delete_all(&self) -> Result<usize, StoreError>;
}

impl ParticipantStore for RequestManager {
    fn insert(&self, participant: NewParticipant) -> Result<Participant, StoreError> {
        Ok(self.send_add(participant)?)
    }

    fn insert_many(
        &self,
        participants: Vec<NewParticipant>,
    ) -> Result<Vec<Participant>, StoreError> {
        Ok(self.send_add_many(participants)?)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Participant>, StoreError> {
        Ok(self.send_find_by_email(email)?)
    }

    fn list_all(&self) -> Result<Vec<Participant>, StoreError> {
        Ok(self.send_list()?)
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.send_count()?)
    }

    fn delete_all(&self) -> Result<usize, StoreError> {
        Ok(self.send_delete_all()?)
    }
}
