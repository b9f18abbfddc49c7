use serde::{Deserialize, Serialize};

use crate::consts::consts::TransactionId;
use crate::model::statement::Statement;

use super::storage::{Storage, StorageError, StorageResult};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum TransactionStatus {
    Committed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionFileWriteMode {
    /// Writes the file to disk and performs an fsync per commit
    Sync,
    /// Writes the file to disk, lets the OS buffer the writes
    OSBuffered,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionWriteMode {
    /// Writes the WAL to disk
    File(TransactionFileWriteMode),
    /// Used for testing purposes. Skips writing the file to disk
    Off,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub statements: Vec<Statement>,
    pub status: TransactionStatus,
}

pub struct TransactionWAL {
    write_mode: TransactionWriteMode,
    current_transaction_id: TransactionId,
    /// Transactions written since the log was last replaced
    size: usize,
    storage: Box<dyn Storage + Send>,
}

impl TransactionWAL {
    pub fn new(write_mode: TransactionWriteMode, storage: Box<dyn Storage + Send>) -> Self {
        Self {
            write_mode,
            current_transaction_id: TransactionId::new_first_transaction(),
            size: 0,
            storage,
        }
    }

    pub fn init(&self) -> StorageResult<()> {
        self.storage.init()
    }

    pub fn get_current_transaction_id(&self) -> &TransactionId {
        &self.current_transaction_id
    }

    pub fn set_current_transaction_id(&mut self, transaction_id: TransactionId) {
        self.current_transaction_id = transaction_id;
    }

    pub fn get_wal_size(&self) -> usize {
        self.size
    }

    /// Persists the mutating statements of a committed transaction. Queries are never
    /// written, and a `DeleteAll` makes everything before it obsolete so the log is
    /// replaced by the statements after it. A failed commit leaves the log as it was
    pub fn commit(
        &mut self,
        applied_transaction_id: TransactionId,
        statements: &[Statement],
    ) -> StorageResult<()> {
        let last_delete_all = statements
            .iter()
            .rposition(|s| matches!(s, Statement::DeleteAll));

        let to_persist: Vec<Statement> = statements
            .iter()
            .skip(last_delete_all.map_or(0, |i| i + 1))
            .filter(|s| s.is_mutation())
            .cloned()
            .collect();

        if let TransactionWriteMode::File(file_mode) = &self.write_mode {
            let transaction_line = if to_persist.is_empty() {
                None
            } else {
                let transaction_json_line = serde_json::to_string(&Transaction {
                    id: applied_transaction_id.clone(),
                    statements: to_persist,
                    status: TransactionStatus::Committed,
                })
                .map_err(|e| StorageError::UnableToWriteTransaction(e.to_string()))?;

                Some(format!("{}\n", transaction_json_line))
            };

            match (last_delete_all, transaction_line) {
                (Some(_), line) => {
                    let size = usize::from(line.is_some());
                    let contents = line.unwrap_or_default();

                    self.storage.transaction_replace(contents.as_bytes())?;
                    self.size = size;
                }
                (None, Some(line)) => {
                    let file_mode = file_mode.clone();
                    self.append(line.as_bytes(), &file_mode)?;
                    self.size += 1;
                }
                (None, None) => {}
            }
        }

        self.current_transaction_id = applied_transaction_id;

        Ok(())
    }

    /// Appends a transaction line, cutting the log back to where it was if the write
    /// or the fsync fails
    fn append(&mut self, line: &[u8], file_mode: &TransactionFileWriteMode) -> StorageResult<()> {
        let checkpoint = self.storage.transaction_len()?;

        let result = self.storage.transaction_write(line).and_then(|_| {
            // Performs an fsync on the transaction log, ensuring that the transaction is durable
            // https://www.postgresql.org/docs/current/wal-reliability.html
            if file_mode == &TransactionFileWriteMode::Sync {
                self.storage.transaction_sync()
            } else {
                Ok(())
            }
        });

        if let Err(err) = result {
            if let Err(truncate_err) = self.storage.transaction_truncate(checkpoint) {
                log::error!(
                    "Unable to undo a failed log write ({}), the log may hold an uncommitted transaction: {}",
                    err,
                    truncate_err
                );
            }

            return Err(err);
        }

        Ok(())
    }

    pub fn restore(&mut self) -> StorageResult<Vec<Transaction>> {
        let transactions_data = self.storage.transaction_load()?;

        let mut transactions: Vec<Transaction> = vec![];

        for (line, transaction_string) in transactions_data.split('\n').enumerate() {
            if transaction_string.trim().is_empty() {
                continue;
            }

            let transaction = serde_json::from_str(transaction_string).map_err(|e| {
                StorageError::CorruptTransactionLog {
                    line: line + 1,
                    reason: e.to_string(),
                }
            })?;

            transactions.push(transaction);
        }

        self.size = transactions.len();

        Ok(transactions)
    }
}
