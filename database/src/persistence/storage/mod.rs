use thiserror::Error;

pub mod file;

#[cfg(test)]
pub mod faulty;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Unable to initialize persistence: {0}")]
    UnableToInitializePersistence(String),

    #[error("Unable to write transaction: {0}")]
    UnableToWriteTransaction(String),

    #[error("Unable to sync transaction buffer to persistent storage: {0}")]
    UnableToSyncTransactionBufferToPersistentStorage(String),

    #[error("Unable to read transaction log length: {0}")]
    UnableToReadTransactionLogLength(String),

    #[error("Unable to truncate transaction log: {0}")]
    UnableToTruncateTransactionLog(String),

    #[error("Unable to replace transaction log: {0}")]
    UnableToReplaceTransactionLog(String),

    #[error("Unable to load previous transactions: {0}")]
    UnableToLoadPreviousTransactions(String),

    #[error("Transaction log is corrupt at line {line}: {reason}")]
    CorruptTransactionLog { line: usize, reason: String },
}

pub fn io_to_generic_error(e: std::io::Error) -> String {
    format!("{:?}: {}", e.kind(), e)
}

/// Where the write-ahead log lives. Every method is called from the database thread
pub trait Storage {
    /// Called on database start-up, should be idempotent
    fn init(&self) -> StorageResult<()>;

    /// Appends bytes to the transaction log, may be buffered by the OS
    fn transaction_write(&mut self, transaction: &[u8]) -> StorageResult<()>;

    /// Makes previous `transaction_write`s durable
    fn transaction_sync(&self) -> StorageResult<()>;

    /// Current length of the log in bytes, used as a checkpoint before a write
    fn transaction_len(&self) -> StorageResult<u64>;

    /// Cuts the log back to a checkpoint taken with `transaction_len`
    fn transaction_truncate(&mut self, len: u64) -> StorageResult<()>;

    /// Atomically swaps the whole log for `contents`. On error the previous log is untouched
    fn transaction_replace(&mut self, contents: &[u8]) -> StorageResult<()>;

    /// Reads back the whole transaction log, an absent log is empty
    fn transaction_load(&mut self) -> StorageResult<String>;
}
