use std::{cell::Cell, path::PathBuf};

use super::{file::FileStorage, Storage, StorageError, StorageResult};

/// File backed storage that fails a configurable number of writes, syncs or replaces.
/// A failing write lands half of its bytes first, like a torn write on a full disk
pub struct FaultyStorage {
    inner: FileStorage,
    failing_writes: usize,
    failing_syncs: Cell<usize>,
    failing_replaces: usize,
}

impl FaultyStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            inner: FileStorage::new(base_path).expect("temp dir should be writable"),
            failing_writes: 0,
            failing_syncs: Cell::new(0),
            failing_replaces: 0,
        }
    }

    pub fn fail_writes(mut self, count: usize) -> Self {
        self.failing_writes = count;
        self
    }

    pub fn fail_syncs(self, count: usize) -> Self {
        self.failing_syncs.set(count);
        self
    }

    pub fn fail_replaces(mut self, count: usize) -> Self {
        self.failing_replaces = count;
        self
    }
}

fn take(remaining: &mut usize) -> bool {
    if *remaining == 0 {
        return false;
    }

    *remaining -= 1;
    true
}

impl Storage for FaultyStorage {
    fn init(&self) -> StorageResult<()> {
        self.inner.init()
    }

    fn transaction_write(&mut self, transaction: &[u8]) -> StorageResult<()> {
        if take(&mut self.failing_writes) {
            self.inner
                .transaction_write(&transaction[..transaction.len() / 2])?;

            return Err(StorageError::UnableToWriteTransaction(
                "StorageFull: no space left on device".to_string(),
            ));
        }

        self.inner.transaction_write(transaction)
    }

    fn transaction_sync(&self) -> StorageResult<()> {
        let mut remaining = self.failing_syncs.get();
        let fail = take(&mut remaining);
        self.failing_syncs.set(remaining);

        if fail {
            return Err(StorageError::UnableToSyncTransactionBufferToPersistentStorage(
                "Other: input/output error".to_string(),
            ));
        }

        self.inner.transaction_sync()
    }

    fn transaction_len(&self) -> StorageResult<u64> {
        self.inner.transaction_len()
    }

    fn transaction_truncate(&mut self, len: u64) -> StorageResult<()> {
        self.inner.transaction_truncate(len)
    }

    fn transaction_replace(&mut self, contents: &[u8]) -> StorageResult<()> {
        if take(&mut self.failing_replaces) {
            return Err(StorageError::UnableToReplaceTransactionLog(
                "StorageFull: no space left on device".to_string(),
            ));
        }

        self.inner.transaction_replace(contents)
    }

    fn transaction_load(&mut self) -> StorageResult<String> {
        self.inner.transaction_load()
    }
}
