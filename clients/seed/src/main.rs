use clap::{CommandFactory, Parser, Subcommand};
use database::{
    database::{database::Database, options::DatabaseOptions},
    persistence::transaction::TransactionWriteMode,
};
use std::process::ExitCode;

use crate::seeder::{clear_participants, seed_participants, SeedOutcome};

mod generator;
mod seeder;

/// 🌱 Raffle seeder, fills or clears the participant database
///
/// Do not run against a data directory a running server is using
#[derive(Parser, Debug)]
struct Cli {
    /// Location of the database. Reads / writes to this directory. Note: Does not support shell paths, e.g. ~
    #[clap(short, long, env = "DATA_DIR", default_value = "data")]
    data: std::path::PathBuf,

    /// Transaction log durability: sync (fsync per commit), buffered or off
    #[clap(long, env = "WRITE_MODE", default_value = "sync")]
    write_mode: TransactionWriteMode,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Runs every seed
    Run {
        #[clap(long, default_value_t = 300)]
        count: usize,
    },
    /// Seeds participants only
    Participants {
        #[clap(long, default_value_t = 300)]
        count: usize,
    },
    /// Deletes every participant
    Clear,
}

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Cli::parse();

    let Some(command) = args.command else {
        log::info!("Available commands:");
        // Printing help only fails when stdout is closed
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    };

    let database_options = DatabaseOptions::default()
        .set_data_directory(args.data)
        .set_sync_file_write(args.write_mode);

    let request_manager = match Database::new(database_options).and_then(Database::run) {
        Ok(request_manager) => request_manager,
        Err(err) => {
            log::error!("❌ Unable to open database: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        Command::Run { count } | Command::Participants { count } => {
            seed_participants(&request_manager, count).map(|outcome| match outcome {
                SeedOutcome::Seeded(inserted) => log::info!("Inserted {} participants", inserted),
                SeedOutcome::Skipped(_) => {}
            })
        }
        Command::Clear => clear_participants(&request_manager).map(|_| ()),
    };

    if let Err(err) = request_manager.send_shutdown_request() {
        log::warn!("Database did not shut down cleanly: {}", err);
    }

    match result {
        Ok(()) => {
            log::info!("✅ Done");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("❌ Seed failed: {}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["raffle-seed"], None)]
    #[case(&["raffle-seed", "run"], Some(Command::Run { count: 300 }))]
    #[case(&["raffle-seed", "participants", "--count", "25"], Some(Command::Participants { count: 25 }))]
    #[case(&["raffle-seed", "clear"], Some(Command::Clear))]
    fn parses_commands(#[case] args: &[&str], #[case] expected: Option<Command>) {
        assert_eq!(Cli::parse_from(args.iter().copied()).command, expected);
    }

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }
}
