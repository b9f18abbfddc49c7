use std::{path::PathBuf, str::FromStr, time::Duration};

use uuid::Uuid;

use crate::{
    consts::consts::DEFAULT_REQUEST_TIMEOUT,
    persistence::transaction::{TransactionFileWriteMode, TransactionWriteMode},
};

#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub data_directory: PathBuf,
    pub restore: bool,
    pub write_mode: TransactionWriteMode,
    pub request_timeout: Duration,
}

// Implements: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
impl DatabaseOptions {
    /// Directory holding the transaction log, created if missing
    pub fn set_data_directory(mut self, data_directory: PathBuf) -> Self {
        self.data_directory = data_directory;
        self
    }

    /// Defines whether we should replay the transaction log on startup
    pub fn set_restore(mut self, restore: bool) -> Self {
        self.restore = restore;
        self
    }

    /// Defines whether we should sync the file write to disk before marking the
    /// transaction as committed. This is useful for durability but can be slow ~3ms per sync
    pub fn set_sync_file_write(mut self, write_mode: TransactionWriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    /// How long a caller waits for the database thread before giving up
    pub fn set_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        // Defaults to $CWD/data
        Self {
            data_directory: PathBuf::from("data"),
            write_mode: TransactionWriteMode::File(TransactionFileWriteMode::Sync),
            restore: true,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl FromStr for TransactionWriteMode {
    type Err = String;

    /// Parses the `--write-mode` CLI value
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sync" => Ok(TransactionWriteMode::File(TransactionFileWriteMode::Sync)),
            "buffered" | "os-buffered" => Ok(TransactionWriteMode::File(
                TransactionFileWriteMode::OSBuffered,
            )),
            "off" => Ok(TransactionWriteMode::Off),
            other => Err(format!(
                "unsupported write mode `{other}`; expected sync|buffered|off"
            )),
        }
    }
}

impl DatabaseOptions {
    /// Fresh directory under the system temp dir, no restore, no log writes
    pub fn new_test() -> Self {
        let database_dir = std::env::temp_dir()
            .join("raffle-database")
            .join(Uuid::new_v4().to_string());

        DatabaseOptions::default()
            .set_data_directory(database_dir)
            .set_restore(false)
            .set_sync_file_write(TransactionWriteMode::Off)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sync", TransactionWriteMode::File(TransactionFileWriteMode::Sync))]
    #[case("Buffered", TransactionWriteMode::File(TransactionFileWriteMode::OSBuffered))]
    #[case(" off ", TransactionWriteMode::Off)]
    fn parses_write_mode(#[case] input: &str, #[case] expected: TransactionWriteMode) {
        assert_eq!(input.parse::<TransactionWriteMode>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_write_mode() {
        let err = "fsync-always"
            .parse::<TransactionWriteMode>()
            .expect_err("unknown mode");

        assert!(err.contains("expected sync|buffered|off"));
    }
}
