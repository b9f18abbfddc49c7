use crate::model::statement::{Statement, StatementResult};

/// Database commands are how we interact with the database, they are how we ask the database to run a transaction, shutdown, etc
///
/// The majority of interactions happen via statements (e.g. add, list, count, etc), but there are also commands that are used
/// to control the database (e.g. shutdown, stats).
#[derive(Debug)]
pub enum DatabaseCommand {
    /// Sends a set of statements to the database and returns the results
    Transaction(Vec<Statement>),

    /// Commands that control the database
    Control(Control),
}

impl DatabaseCommand {
    /// Prints complex logs in a more readable format
    pub fn log_format(&self) -> String {
        match self {
            DatabaseCommand::Transaction(statements) if statements.len() > 1 => {
                format!("Transaction [{} statements]", statements.len())
            }
            _ => format!("{:?}", self),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DatabaseCommandTransactionResponse {
    /// Transaction has successfully committed, returns a list of statement results
    Commit(Vec<StatementResult>),
    /// Transaction has been rolled back, returns why it was rolled back
    Rollback(RollbackReason),
}

/// Why a transaction did not commit
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RollbackReason {
    /// A statement violated a table constraint, the table is unchanged
    #[error(transparent)]
    Apply(#[from] crate::database::table::table::ApplyErrors),
    /// The transaction applied but could not be written to the log, the in-memory change was undone
    #[error(transparent)]
    Storage(#[from] crate::persistence::storage::StorageError),
}

#[derive(Clone, Debug, PartialEq)]
pub enum DatabaseCommandControlResponse {
    /// Successfully performed the control
    Success(String),
    /// Key / value information about the database
    Info(Vec<(String, String)>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum DatabaseCommandResponse {
    DatabaseCommandTransactionResponse(DatabaseCommandTransactionResponse),
    DatabaseCommandControlResponse(DatabaseCommandControlResponse),
}

impl DatabaseCommandResponse {
    pub fn control_success(message: &str) -> Self {
        DatabaseCommandResponse::DatabaseCommandControlResponse(
            DatabaseCommandControlResponse::Success(message.to_string()),
        )
    }

    pub fn control_info(info: Vec<(String, String)>) -> Self {
        DatabaseCommandResponse::DatabaseCommandControlResponse(
            DatabaseCommandControlResponse::Info(info),
        )
    }
}

#[derive(Debug, PartialEq)]
pub enum Control {
    /// Performs a safe shutdown of the database, requests before the shutdown will be run / committed, requests after the shutdown will be ignored
    Shutdown,
    /// Reports row count, current transaction id, log size and data directory
    DatabaseStats,
}

pub struct DatabaseCommandRequest {
    pub resolver: oneshot::Sender<DatabaseCommandResponse>,
    pub command: DatabaseCommand,
}
