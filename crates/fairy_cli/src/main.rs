//! `fairy` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration from flags and environment.
//! - Bootstrap logging and storage, then hand off to command dispatch.

mod commands;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{execute, Command};
use fairy_core::config::DEFAULT_DATA_DIR;
use fairy_core::db::{open_db, DbError};
use fairy_core::{default_log_level, flush_logging, init_logging, ServiceError, StoragePaths};
use log::{error, info};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// FAIRy: prepare research datasets for FAIR-compliant repository submission.
#[derive(Debug, Parser)]
#[command(name = "fairy", version, about)]
struct Cli {
    /// Directory holding the project database, logs and exports
    #[arg(long, env = "FAIRY_DATA_DIR", default_value = DEFAULT_DATA_DIR, global = true)]
    data_dir: PathBuf,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, env = "FAIRY_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let name = cli.command.as_ref().map_or("home", command_name);
    let exit = match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", failure_event(name, &err));
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    };
    flush_logging();
    exit
}

/// Log line for a failed command. Error messages carry titles and paths, so
/// only the command and a stable code are recorded.
fn failure_event(command: &str, err: &anyhow::Error) -> String {
    format!(
        "event=command module=cli status=error command={command} error_code={}",
        error_code(err)
    )
}

fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(service) = cause.downcast_ref::<ServiceError>() {
            return service.code();
        }
        if cause.downcast_ref::<DbError>().is_some() {
            return "db";
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return "io";
        }
    }
    "command_failed"
}

fn run(cli: Cli) -> Result<()> {
    let paths = StoragePaths::resolve(&cli.data_dir)
        .with_context(|| format!("invalid data directory `{}`", cli.data_dir.display()))?;
    paths
        .ensure_dirs()
        .with_context(|| format!("failed to create `{}`", paths.root.display()))?;

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(message) = init_logging(level, &paths.log_dir) {
        eprintln!("warning: logging disabled: {message}");
    }

    let conn = open_db(&paths.db_path)
        .with_context(|| format!("failed to open `{}`", paths.db_path.display()))?;

    let command = cli.command.unwrap_or(Command::Home { all: false });
    let name = command_name(&command);
    info!("event=command module=cli status=start command={name}");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(command, &conn, &paths, &mut out)?;
    out.flush()?;

    info!("event=command module=cli status=ok command={name}");
    Ok(())
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Home { .. } => "home",
        Command::Create { .. } => "create",
        Command::Show { .. } => "show",
        Command::Overview { .. } => "overview",
        Command::Archive { .. } => "archive",
        Command::Inventory(_) => "inventory",
        Command::Permissions(_) => "permissions",
        Command::Deid(_) => "deid",
        Command::Samples(_) => "samples",
        Command::Repository(_) => "repository",
        Command::Validate { .. } => "validate",
        Command::Export { .. } => "export",
        Command::Exports { .. } => "exports",
    }
}
