use std::time::Duration;
use thiserror::Error;

use crate::model::{
    participant::{NewParticipant, Participant},
    statement::{Statement, StatementResult, UnexpectedResult},
};

use super::commands::{
    Control, DatabaseCommand, DatabaseCommandControlResponse, DatabaseCommandRequest,
    DatabaseCommandResponse, DatabaseCommandTransactionResponse, RollbackReason,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestManagerError {
    #[error("Database took too long to respond to request")]
    DatabaseTimeout,
    #[error("Database is not running")]
    DatabaseUnavailable,
    #[error("Rolled back transaction: {0}")]
    TransactionRollback(RollbackReason),
    #[error("Unexpected database response: {0}")]
    UnexpectedResponse(String),
}

impl From<UnexpectedResult> for RequestManagerError {
    fn from(err: UnexpectedResult) -> Self {
        RequestManagerError::UnexpectedResponse(err.to_string())
    }
}

/// Simple interface for interacting with the database thread. Cloning is cheap, every clone
///  talks to the same database
///
/// The request manager provides the following APIs, sorted by the easiest to use to the most complex
/// 1. Typed operations on participants (add, find, list, count, delete)
/// 2. Transaction based API, a set of statements that commit or roll back together
/// 3. Control API (stats, shutdown)
#[derive(Clone)]
pub struct RequestManager {
    database_sender: flume::Sender<DatabaseCommandRequest>,
    timeout: Duration,
}

impl RequestManager {
    pub fn new(database_sender: flume::Sender<DatabaseCommandRequest>, timeout: Duration) -> Self {
        Self {
            database_sender,
            timeout,
        }
    }

    /// Assigns the id and timestamps, then adds the participant
    pub fn send_add(&self, participant: NewParticipant) -> Result<Participant, RequestManagerError> {
        let result = self.send_single_statement(Statement::Add(participant.into_participant()))?;

        Ok(result.single()?)
    }

    /// Adds every participant in a single transaction, nothing is added if one of them fails
    pub fn send_add_many(
        &self,
        participants: Vec<NewParticipant>,
    ) -> Result<Vec<Participant>, RequestManagerError> {
        let statements = participants
            .into_iter()
            .map(|p| Statement::Add(p.into_participant()))
            .collect();

        self.send_transaction(statements)?
            .into_iter()
            .map(|result| result.single().map_err(RequestManagerError::from))
            .collect()
    }

    pub fn send_find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Participant>, RequestManagerError> {
        let result = self.send_single_statement(Statement::FindByEmail(email.to_string()))?;

        Ok(result.get_single()?)
    }

    pub fn send_list(&self) -> Result<Vec<Participant>, RequestManagerError> {
        let result = self.send_single_statement(Statement::List)?;

        Ok(result.list()?)
    }

    pub fn send_count(&self) -> Result<usize, RequestManagerError> {
        let result = self.send_single_statement(Statement::Count)?;

        Ok(result.count()?)
    }

    pub fn send_delete_all(&self) -> Result<usize, RequestManagerError> {
        let result = self.send_single_statement(Statement::DeleteAll)?;

        Ok(result.deleted()?)
    }

    /// Sends a single statement to the database and returns a single statement result
    pub fn send_single_statement(
        &self,
        statement: Statement,
    ) -> Result<StatementResult, RequestManagerError> {
        self.send_transaction(vec![statement])?.pop().ok_or_else(|| {
            RequestManagerError::UnexpectedResponse(
                "a single statement should generate a single result".to_string(),
            )
        })
    }

    /// Used to create a transaction
    pub fn send_transaction(
        &self,
        statements: Vec<Statement>,
    ) -> Result<Vec<StatementResult>, RequestManagerError> {
        match self.send_request(DatabaseCommand::Transaction(statements))? {
            DatabaseCommandResponse::DatabaseCommandTransactionResponse(
                DatabaseCommandTransactionResponse::Commit(results),
            ) => Ok(results),
            DatabaseCommandResponse::DatabaseCommandTransactionResponse(
                DatabaseCommandTransactionResponse::Rollback(reason),
            ) => Err(RequestManagerError::TransactionRollback(reason)),
            other => Err(RequestManagerError::UnexpectedResponse(format!(
                "{:?}",
                other
            ))),
        }
    }

    pub fn send_stats(&self) -> Result<Vec<(String, String)>, RequestManagerError> {
        match self.send_request(DatabaseCommand::Control(Control::DatabaseStats))? {
            DatabaseCommandResponse::DatabaseCommandControlResponse(
                DatabaseCommandControlResponse::Info(info),
            ) => Ok(info),
            other => Err(RequestManagerError::UnexpectedResponse(format!(
                "{:?}",
                other
            ))),
        }
    }

    /// Sends a shutdown request to the database and returns the database's response. Requests
    ///  queued before the shutdown are still processed
    pub fn send_shutdown_request(&self) -> Result<String, RequestManagerError> {
        match self.send_request(DatabaseCommand::Control(Control::Shutdown))? {
            DatabaseCommandResponse::DatabaseCommandControlResponse(
                DatabaseCommandControlResponse::Success(message),
            ) => Ok(message),
            other => Err(RequestManagerError::UnexpectedResponse(format!(
                "{:?}",
                other
            ))),
        }
    }

    fn send_request(
        &self,
        command: DatabaseCommand,
    ) -> Result<DatabaseCommandResponse, RequestManagerError> {
        let (resolver, response_receiver) = oneshot::channel::<DatabaseCommandResponse>();

        self.database_sender
            .send(DatabaseCommandRequest { resolver, command })
            .map_err(|_| RequestManagerError::DatabaseUnavailable)?;

        response_receiver
            .recv_timeout(self.timeout)
            .map_err(|err| match err {
                oneshot::RecvTimeoutError::Timeout => RequestManagerError::DatabaseTimeout,
                oneshot::RecvTimeoutError::Disconnected => RequestManagerError::DatabaseUnavailable,
            })
    }
}
