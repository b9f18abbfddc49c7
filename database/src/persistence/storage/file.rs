use std::{
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Read, Seek, SeekFrom, Write},
    path::PathBuf,
};

use crate::consts::consts::{COMPACTED_TRANSACTION_LOG_FILE_NAME, TRANSACTION_LOG_FILE_NAME};

use super::{io_to_generic_error, Storage, StorageError, StorageResult};

pub struct FileStorage {
    base_path: PathBuf,
    log_file: File,
    transaction_file_path: PathBuf,
    compacted_file_path: PathBuf,
}

impl FileStorage {
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        let transaction_file_path = base_path.join(TRANSACTION_LOG_FILE_NAME);
        let compacted_file_path = base_path.join(COMPACTED_TRANSACTION_LOG_FILE_NAME);

        fs::create_dir_all(&base_path)
            .map_err(|e| StorageError::UnableToInitializePersistence(io_to_generic_error(e)))?;

        let log_file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&transaction_file_path)
            .map_err(|e| StorageError::UnableToInitializePersistence(io_to_generic_error(e)))?;

        Ok(Self {
            base_path,
            log_file,
            transaction_file_path,
            compacted_file_path,
        })
    }
}

impl Storage for FileStorage {
    fn init(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.base_path)
            .map_err(|e| StorageError::UnableToInitializePersistence(io_to_generic_error(e)))
    }

    fn transaction_write(&mut self, transaction: &[u8]) -> StorageResult<()> {
        // Buffered OS write, is not 'durable' without the fsync
        self.log_file
            .write_all(transaction)
            .map_err(|e| StorageError::UnableToWriteTransaction(io_to_generic_error(e)))
    }

    fn transaction_sync(&self) -> StorageResult<()> {
        self.log_file.sync_all().map_err(|e| {
            StorageError::UnableToSyncTransactionBufferToPersistentStorage(io_to_generic_error(e))
        })
    }

    fn transaction_len(&self) -> StorageResult<u64> {
        self.log_file
            .metadata()
            .map(|metadata| metadata.len())
            .map_err(|e| StorageError::UnableToReadTransactionLogLength(io_to_generic_error(e)))
    }

    fn transaction_truncate(&mut self, len: u64) -> StorageResult<()> {
        let truncate_error =
            |e: std::io::Error| StorageError::UnableToTruncateTransactionLog(io_to_generic_error(e));

        self.log_file.set_len(len).map_err(truncate_error)?;
        // Handles not opened in append mode keep writing at their cursor
        self.log_file
            .seek(SeekFrom::Start(len))
            .map_err(truncate_error)?;
        self.log_file.sync_all().map_err(truncate_error)
    }

    fn transaction_replace(&mut self, contents: &[u8]) -> StorageResult<()> {
        let replace_error =
            |e: std::io::Error| StorageError::UnableToReplaceTransactionLog(io_to_generic_error(e));

        let mut compacted = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.compacted_file_path)
            .map_err(replace_error)?;

        compacted.write_all(contents).map_err(replace_error)?;
        compacted.sync_all().map_err(replace_error)?;

        // The rename is the commit point, the open handle follows the file to its new name
        fs::rename(&self.compacted_file_path, &self.transaction_file_path)
            .map_err(replace_error)?;

        self.log_file = compacted;

        Ok(())
    }

    fn transaction_load(&mut self) -> StorageResult<String> {
        let mut contents = String::new();

        let mut file = match File::open(&self.transaction_file_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(contents),
            Err(e) => {
                return Err(StorageError::UnableToLoadPreviousTransactions(
                    io_to_generic_error(e),
                ))
            }
        };

        file.read_to_string(&mut contents)
            .map_err(|e| StorageError::UnableToLoadPreviousTransactions(io_to_generic_error(e)))?;

        Ok(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::options::DatabaseOptions;

    fn storage() -> FileStorage {
        let dir = DatabaseOptions::new_test().data_directory;
        FileStorage::new(dir).expect("temp dir should be writable")
    }

    #[test]
    fn written_transactions_can_be_loaded() {
        let mut storage = storage();

        storage.transaction_write(b"one\n").unwrap();
        storage.transaction_write(b"two\n").unwrap();
        storage.transaction_sync().unwrap();

        assert_eq!(storage.transaction_load().unwrap(), "one\ntwo\n");
    }

    #[test]
    fn truncate_drops_writes_after_the_checkpoint() {
        let mut storage = storage();

        storage.transaction_write(b"one\n").unwrap();
        let checkpoint = storage.transaction_len().unwrap();
        storage.transaction_write(b"two\n").unwrap();

        storage.transaction_truncate(checkpoint).unwrap();
        storage.transaction_write(b"three\n").unwrap();

        assert_eq!(storage.transaction_load().unwrap(), "one\nthree\n");
    }

    #[test]
    fn replace_swaps_the_whole_log() {
        let mut storage = storage();

        storage.transaction_write(b"one\n").unwrap();
        storage.transaction_replace(b"two\n").unwrap();
        storage.transaction_write(b"three\n").unwrap();

        assert_eq!(storage.transaction_load().unwrap(), "two\nthree\n");
    }

    #[test]
    fn truncate_after_replace_keeps_appending_at_the_end() {
        let mut storage = storage();

        storage.transaction_replace(b"").unwrap();
        storage.transaction_write(b"one\n").unwrap();
        let checkpoint = storage.transaction_len().unwrap();
        storage.transaction_write(b"two\n").unwrap();

        storage.transaction_truncate(checkpoint).unwrap();
        storage.transaction_write(b"three\n").unwrap();

        assert_eq!(storage.transaction_load().unwrap(), "one\nthree\n");
    }
}
