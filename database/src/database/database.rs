use std::{thread, time::Instant};

use num_format::{Locale, ToFormattedString};
use thiserror::Error;

use crate::{
    consts::consts::TransactionId,
    model::statement::{Statement, StatementResult},
    persistence::{
        storage::{file::FileStorage, Storage, StorageError},
        transaction::TransactionWAL,
    },
};

use super::{
    commands::{
        Control, DatabaseCommand, DatabaseCommandRequest, DatabaseCommandResponse,
        DatabaseCommandTransactionResponse, RollbackReason,
    },
    options::DatabaseOptions,
    request_manager::RequestManager,
    table::{row::RollbackEntry, table::ParticipantTable},
};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Unable to open storage: {0}")]
    Storage(#[from] StorageError),

    #[error("Transaction {id} in the transaction log cannot be replayed: {reason}")]
    RestoreRollback {
        id: TransactionId,
        reason: RollbackReason,
    },

    #[error("Unable to start database thread: {0}")]
    Spawn(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyMode {
    /// A live request, committed transactions are written to the transaction log
    Request,
    /// Replaying the transaction log on startup at the logged transaction id
    Restore(TransactionId),
}

pub struct Database {
    pub participant_table: ParticipantTable,
    pub transaction_wal: TransactionWAL,
    pub database_options: DatabaseOptions,
}

impl Database {
    /// Opens the storage and, when `restore` is set, replays the transaction log
    pub fn new(options: DatabaseOptions) -> Result<Self, DatabaseError> {
        let storage = FileStorage::new(options.data_directory.clone())?;

        Self::new_with_storage(options, Box::new(storage))
    }

    /// Same as `new` over any transaction log backend
    pub fn new_with_storage(
        options: DatabaseOptions,
        storage: Box<dyn Storage + Send>,
    ) -> Result<Self, DatabaseError> {
        let transaction_wal = TransactionWAL::new(options.write_mode.clone(), storage);

        transaction_wal.init()?;

        let mut database = Self {
            participant_table: ParticipantTable::new(),
            transaction_wal,
            database_options: options,
        };

        if database.database_options.restore {
            database.restore()?;
        }

        Ok(database)
    }

    fn restore(&mut self) -> Result<(), DatabaseError> {
        log::info!(
            "Transaction Log Location: [{}]",
            self.database_options.data_directory.display()
        );

        let now = Instant::now();

        let restored_transactions = self.transaction_wal.restore()?;
        let restored_transaction_count = restored_transactions.len();

        for transaction in restored_transactions {
            let id = transaction.id.clone();

            if let DatabaseCommandTransactionResponse::Rollback(reason) =
                self.apply_transaction(transaction.statements, ApplyMode::Restore(id.clone()))
            {
                return Err(DatabaseError::RestoreRollback { id, reason });
            }
        }

        log::info!(
            "✅ Successful Restore [Duration: {}ms]",
            now.elapsed().as_millis(),
        );

        log::info!(
            "📀 Data               [Rows: {}, TransactionsReplayed: {}, CurrentTxId: {}]",
            self.participant_table.len().to_formatted_string(&Locale::en),
            restored_transaction_count.to_formatted_string(&Locale::en),
            self.transaction_wal
                .get_current_transaction_id()
                .to_number()
                .to_formatted_string(&Locale::en)
        );

        Ok(())
    }

    /// Moves the database onto its own thread. Every statement is applied by that one thread,
    ///  which is what makes the uniqueness check and the write it guards atomic
    pub fn run(self) -> Result<RequestManager, DatabaseError> {
        let (database_sender, database_receiver) = flume::unbounded::<DatabaseCommandRequest>();

        let request_timeout = self.database_options.request_timeout;

        thread::Builder::new()
            .name("Database".to_string())
            .spawn(move || self.process_commands(database_receiver))
            .map_err(|e| DatabaseError::Spawn(e.to_string()))?;

        Ok(RequestManager::new(database_sender, request_timeout))
    }

    fn process_commands(mut self, database_receiver: flume::Receiver<DatabaseCommandRequest>) {
        // Exits once every request manager has been dropped or a shutdown is requested
        while let Ok(DatabaseCommandRequest { resolver, command }) = database_receiver.recv() {
            log::debug!("Received request: {}", command.log_format());

            let response = match command {
                DatabaseCommand::Transaction(statements) => {
                    DatabaseCommandResponse::DatabaseCommandTransactionResponse(
                        self.apply_transaction(statements, ApplyMode::Request),
                    )
                }
                DatabaseCommand::Control(Control::DatabaseStats) => {
                    DatabaseCommandResponse::control_info(self.database_stats())
                }
                DatabaseCommand::Control(Control::Shutdown) => {
                    let _ = resolver.send(DatabaseCommandResponse::control_success(
                        "Successfully shutdown database",
                    ));

                    log::info!("Database shut down");

                    return;
                }
            };

            // The requester may have timed out and dropped its receiver
            if resolver.send(response).is_err() {
                log::warn!("Requester went away before the database responded");
            }
        }
    }

    pub fn database_stats(&self) -> Vec<(String, String)> {
        vec![
            (
                "RowCount".to_string(),
                self.participant_table.len().to_string(),
            ),
            (
                "CurrentTransactionID".to_string(),
                self.transaction_wal.get_current_transaction_id().to_string(),
            ),
            (
                "WALSize".to_string(),
                self.transaction_wal.get_wal_size().to_string(),
            ),
            (
                "DataDirectory".to_string(),
                self.database_options.data_directory.display().to_string(),
            ),
        ]
    }

    /// Applies every statement or none of them
    pub fn apply_transaction(
        &mut self,
        statements: Vec<Statement>,
        mode: ApplyMode,
    ) -> DatabaseCommandTransactionResponse {
        let applying_transaction_id = match &mode {
            ApplyMode::Request => self.transaction_wal.get_current_transaction_id().increment(),
            ApplyMode::Restore(id) => id.clone(),
        };

        let mut rollback_stack: Vec<RollbackEntry> = Vec::with_capacity(statements.len());
        let mut results: Vec<StatementResult> = Vec::with_capacity(statements.len());

        for statement in statements.iter().cloned() {
            match self
                .participant_table
                .apply(statement, applying_transaction_id.clone())
            {
                Ok((result, rollback_entry)) => {
                    results.push(result);
                    rollback_stack.push(rollback_entry);
                }
                Err(err) => {
                    self.rollback(rollback_stack);

                    if mode == ApplyMode::Request {
                        log::info!("⚠️  Rolled back: [TX: {}] {}", applying_transaction_id, err);
                    }

                    return DatabaseCommandTransactionResponse::Rollback(err.into());
                }
            }
        }

        // Read only transactions do not consume a transaction id
        if statements.iter().all(Statement::is_query) {
            return DatabaseCommandTransactionResponse::Commit(results);
        }

        match mode {
            ApplyMode::Request => {
                if let Err(err) = self
                    .transaction_wal
                    .commit(applying_transaction_id.clone(), &statements)
                {
                    self.rollback(rollback_stack);

                    log::error!(
                        "Rolled back [TX: {}], unable to write transaction log: {}",
                        applying_transaction_id,
                        err
                    );

                    return DatabaseCommandTransactionResponse::Rollback(err.into());
                }

                log::info!("✅ Committed: [TX: {}]", &applying_transaction_id);
            }
            ApplyMode::Restore(id) => self.transaction_wal.set_current_transaction_id(id),
        }

        DatabaseCommandTransactionResponse::Commit(results)
    }

    fn rollback(&mut self, rollback_stack: Vec<RollbackEntry>) {
        for entry in rollback_stack.into_iter().rev() {
            self.participant_table.apply_rollback(entry);
        }
    }
}

#[cfg(test)]
impl Database {
    pub fn new_test() -> Self {
        Database::new(DatabaseOptions::new_test()).expect("test database should open")
    }
}


pub mod test_utils {
    use super::{Database, DatabaseOptions};
    use crate::database::request_manager::RequestManager;

    /// Starts a throwaway database on its own thread, used by tests and benchmarks
    pub fn start_test_database() -> RequestManager {
        Database::new(DatabaseOptions::new_test())
            .and_then(Database::run)
            .expect("test database should start")
    }
}
