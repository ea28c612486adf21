use crate::commands::{
    add_record, delete_record, export_records, list_records, login, show_arrival, show_session,
    AddArgs, DeleteArgs, ExportArgs, LoginArgs,
};
use attendance::config::AppConfig;
use attendance::error::AppError;
use attendance::telemetry;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "attendance",
    about = "Register arrival times and manage incapacity/permission records",
    version
)]
struct Cli {
    /// Override the configured local data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current arrival time
    Arrival,
    /// Register, review, delete, and export leave records
    Records {
        #[command(subcommand)]
        command: RecordsCommand,
    },
    /// Set or show the role used by this client
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RecordsCommand {
    /// Register an incapacity or permission
    Add(AddArgs),
    /// List every record (admin only)
    List,
    /// Delete a record by id (admin only)
    Delete(DeleteArgs),
    /// Export records to a spreadsheet-compatible file (admin only)
    Export(ExportArgs),
}

#[derive(Subcommand, Debug)]
enum SessionCommand {
    /// Record the role chosen at login
    Login(LoginArgs),
    /// Print the active role
    Show,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }

    telemetry::init(&config.telemetry)?;
    debug!(?config.environment, data_dir = %config.storage.data_dir.display(), "configuration loaded");

    match cli.command {
        Command::Arrival => {
            show_arrival();
            Ok(())
        }
        Command::Records { command } => match command {
            RecordsCommand::Add(args) => add_record(&config.storage, args),
            RecordsCommand::List => list_records(&config.storage),
            RecordsCommand::Delete(args) => delete_record(&config.storage, args),
            RecordsCommand::Export(args) => export_records(&config.storage, args),
        },
        Command::Session { command } => match command {
            SessionCommand::Login(args) => login(&config.storage, args),
            SessionCommand::Show => {
                show_session(&config.storage);
                Ok(())
            }
        },
    }
}
