//! Command definitions and dispatch for the `fairy` binary.
//!
//! # Responsibility
//! - Map each dashboard action and wizard tab to one subcommand.
//! - Render results to the provided writer so dispatch stays testable.

use crate::render::{samples_table, timestamp, Table};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use fairy_core::{
    Answer, CheckStatus, Deidentification, Permissions, ProjectId, ProjectService,
    RepositorySelection, SqliteProjectRepository, SqliteSectionRepository, StoragePaths,
    TargetRepository, WizardService,
};
use rusqlite::Connection;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

const DEFAULT_SAMPLE_PREVIEW_ROWS: usize = 20;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the project dashboard
    Home {
        /// Include archived projects
        #[arg(long)]
        all: bool,
    },

    /// Create a new project
    Create {
        /// Project title, e.g. "RNA-seq study on XYZ"
        #[arg(long)]
        title: String,

        /// One or two lines about the dataset and study
        #[arg(long)]
        description: String,
    },

    /// Show every wizard tab of one project
    Show {
        project: ProjectId,
    },

    /// Edit a project's title and description
    Overview {
        project: ProjectId,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Archive a project and hide it from the dashboard
    Archive {
        project: ProjectId,
    },

    /// Record where raw data lives (the data itself is never uploaded)
    #[command(subcommand)]
    Inventory(InventoryCommand),

    /// Permissions & ethics answers
    #[command(subcommand)]
    Permissions(PermissionsCommand),

    /// De-identification strategy
    #[command(subcommand)]
    Deid(DeidCommand),

    /// Sample metadata table
    #[command(subcommand)]
    Samples(SamplesCommand),

    /// Target repository choice
    #[command(subcommand)]
    Repository(RepositoryCommand),

    /// Audit submission readiness
    Validate {
        project: ProjectId,
    },

    /// Write a JSON export bundle and record it
    Export {
        project: ProjectId,
    },

    /// List previous exports
    Exports {
        project: ProjectId,
    },
}

#[derive(Debug, Subcommand)]
pub enum InventoryCommand {
    /// Add a data location
    Add {
        project: ProjectId,

        /// Item name, e.g. "FASTQ files (batch A)"
        #[arg(long)]
        name: String,

        /// Path or URL, e.g. s3://bucket/run1/*.fastq.gz
        #[arg(long)]
        path: String,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List recorded data locations
    List { project: ProjectId },
}

#[derive(Debug, Subcommand)]
pub enum PermissionsCommand {
    /// Save answers; omitted flags keep their current value
    Set {
        project: ProjectId,

        /// Does the dataset include human subjects data? (unknown|no|yes)
        #[arg(long)]
        human_data: Option<Answer>,

        /// Is IRB/ethics approval required? (unknown|no|yes)
        #[arg(long)]
        irb: Option<Answer>,

        #[arg(long)]
        notes: Option<String>,
    },

    Show { project: ProjectId },
}

#[derive(Debug, Subcommand)]
pub enum DeidCommand {
    /// Save strategy and notes; omitted flags keep their current value
    Set {
        project: ProjectId,

        #[arg(long)]
        strategy: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    Show { project: ProjectId },
}

#[derive(Debug, Subcommand)]
pub enum SamplesCommand {
    /// Import a samples CSV, replacing any previous table
    Import { project: ProjectId, file: PathBuf },

    /// Preview the imported samples
    Show {
        project: ProjectId,

        #[arg(long, default_value_t = DEFAULT_SAMPLE_PREVIEW_ROWS)]
        limit: usize,
    },
}

#[derive(Debug, Subcommand)]
pub enum RepositoryCommand {
    /// Choose a repository; omitted flags keep their current value
    Set(RepositorySetArgs),

    Show { project: ProjectId },
}

#[derive(Debug, Args)]
pub struct RepositorySetArgs {
    pub project: ProjectId,

    /// GEO|SRA|ENA|Zenodo|dbGaP, or "none" to clear
    #[arg(long, value_parser = parse_repository_choice)]
    pub choice: Option<RepositoryChoiceArg>,

    #[arg(long)]
    pub notes: Option<String>,
}

/// `--choice` value; `None` clears the selection.
#[derive(Debug, Clone, Copy)]
pub struct RepositoryChoiceArg(pub Option<TargetRepository>);

fn parse_repository_choice(value: &str) -> Result<RepositoryChoiceArg, String> {
    if value.trim().eq_ignore_ascii_case("none") {
        return Ok(RepositoryChoiceArg(None));
    }
    value
        .parse::<TargetRepository>()
        .map(|choice| RepositoryChoiceArg(Some(choice)))
        .map_err(|err| err.to_string())
}

/// Executes one command against an opened, migrated connection.
pub fn execute(
    command: Command,
    conn: &Connection,
    paths: &StoragePaths,
    out: &mut dyn Write,
) -> Result<()> {
    let projects = ProjectService::new(SqliteProjectRepository::try_new(conn)?);
    let wizard = WizardService::new(
        SqliteProjectRepository::try_new(conn)?,
        SqliteSectionRepository::try_new(conn)?,
    );

    match command {
        Command::Home { all } => {
            writeln!(out, "FAIRy: Make Your Research Data FAIR")?;
            writeln!(
                out,
                "Record where your data lives, answer the ethics questions, import sample metadata and see exactly what to fix before submission."
            )?;
            writeln!(out)?;

            let listed = projects.list_projects(all)?;
            if listed.is_empty() {
                writeln!(
                    out,
                    "No projects yet. Create your first one with `fairy create --title <TITLE> --description <TEXT>`."
                )?;
                return Ok(());
            }

            writeln!(out, "Your projects")?;
            let mut table = Table::new(["Title", "Status", "Updated", "ID"]);
            for project in &listed {
                table.push_row([
                    project.title.clone(),
                    project.status.label().to_string(),
                    timestamp(project.updated_at),
                    project.id.to_string(),
                ]);
            }
            write!(out, "{table}")?;
        }
        Command::Create { title, description } => {
            let project = projects.create_project(&title, &description)?;
            writeln!(out, "Created project {}", project.id)?;
        }
        Command::Show { project } => {
            let bundle = wizard.load_bundle(project)?;
            let p = &bundle.project;
            writeln!(out, "{}", p.title)?;
            writeln!(out, "{}", p.description)?;
            writeln!(out)?;
            writeln!(out, "Status:  {}", p.status.label())?;
            writeln!(out, "Created: {}", timestamp(p.created_at))?;
            writeln!(out, "Updated: {}", timestamp(p.updated_at))?;
            writeln!(out)?;
            writeln!(
                out,
                "Data Inventory:       {} item(s)",
                bundle.data_inventory.len()
            )?;
            writeln!(
                out,
                "Permissions & Ethics: human data={}, IRB required={}",
                bundle.permissions.contains_human_data.label(),
                bundle.permissions.irb_required.label()
            )?;
            writeln!(
                out,
                "De-identification:    {}",
                if bundle.deidentification.has_strategy() {
                    "strategy recorded"
                } else {
                    "no strategy"
                }
            )?;
            writeln!(
                out,
                "Metadata:             {} sample(s), {} column(s)",
                bundle.metadata.rows.len(),
                bundle.metadata.columns.len()
            )?;
            writeln!(
                out,
                "Repository:           {}",
                bundle
                    .repository
                    .choice
                    .map_or("not selected", TargetRepository::label)
            )?;
            writeln!(out, "Exports:              {}", bundle.exports.len())?;
        }
        Command::Overview {
            project,
            title,
            description,
        } => {
            let current = projects.get_project(project)?;
            let updated = projects.update_overview(
                project,
                title.unwrap_or(current.title),
                description.unwrap_or(current.description),
            )?;
            writeln!(out, "Saved overview for {}", updated.id)?;
        }
        Command::Archive { project } => {
            let archived = projects.archive_project(project)?;
            writeln!(out, "Archived project {}", archived.id)?;
        }
        Command::Inventory(InventoryCommand::Add {
            project,
            name,
            path,
            notes,
        }) => {
            let item = wizard.add_inventory_item(project, name, path, notes)?;
            writeln!(
                out,
                "Added `{}` ({} location)",
                item.name,
                item.location_kind().as_str()
            )?;
        }
        Command::Inventory(InventoryCommand::List { project }) => {
            let items = wizard.list_inventory(project)?;
            if items.is_empty() {
                writeln!(out, "No data locations recorded yet.")?;
                return Ok(());
            }
            let mut table = Table::new(["Name", "Path", "Location", "Notes"]);
            for item in &items {
                table.push_row([
                    item.name.clone(),
                    item.path.clone(),
                    item.location_kind().as_str().to_string(),
                    item.notes.clone(),
                ]);
            }
            write!(out, "{table}")?;
        }
        Command::Permissions(PermissionsCommand::Set {
            project,
            human_data,
            irb,
            notes,
        }) => {
            let current = wizard.get_permissions(project)?;
            let saved = wizard.save_permissions(
                project,
                &Permissions::new(
                    human_data.unwrap_or(current.contains_human_data),
                    irb.unwrap_or(current.irb_required),
                    notes.unwrap_or(current.notes),
                ),
            )?;
            write_permissions(out, &saved)?;
        }
        Command::Permissions(PermissionsCommand::Show { project }) => {
            write_permissions(out, &wizard.get_permissions(project)?)?;
        }
        Command::Deid(DeidCommand::Set {
            project,
            strategy,
            notes,
        }) => {
            let current = wizard.get_deidentification(project)?;
            let saved = wizard.save_deidentification(
                project,
                &Deidentification::new(
                    strategy.unwrap_or(current.strategy),
                    notes.unwrap_or(current.notes),
                ),
            )?;
            write_deidentification(out, &saved)?;
        }
        Command::Deid(DeidCommand::Show { project }) => {
            write_deidentification(out, &wizard.get_deidentification(project)?)?;
        }
        Command::Samples(SamplesCommand::Import { project, file }) => {
            let handle = File::open(&file)
                .with_context(|| format!("failed to open `{}`", file.display()))?;
            let source_name = file.file_name().and_then(|name| name.to_str());
            let table = wizard.import_samples_csv(project, BufReader::new(handle), source_name)?;
            writeln!(
                out,
                "Imported {} sample(s) with {} column(s)",
                table.rows.len(),
                table.columns.len()
            )?;
        }
        Command::Samples(SamplesCommand::Show { project, limit }) => {
            let samples = wizard.get_samples(project)?;
            if samples.columns.is_empty() {
                writeln!(out, "No sample metadata imported yet.")?;
                return Ok(());
            }
            if let Some(source) = samples.source_name.as_deref() {
                writeln!(out, "Source: {source}")?;
            }
            write!(out, "{}", samples_table(&samples, limit))?;
            if samples.rows.len() > limit {
                writeln!(out, "... {} more row(s)", samples.rows.len() - limit)?;
            }
        }
        Command::Repository(RepositoryCommand::Set(args)) => {
            let current = wizard.get_repository(args.project)?;
            let choice = match args.choice {
                Some(RepositoryChoiceArg(choice)) => choice,
                None => current.choice,
            };
            let saved = wizard.save_repository(
                args.project,
                &RepositorySelection::new(choice, args.notes.unwrap_or(current.notes)),
            )?;
            write_repository(out, &saved)?;
        }
        Command::Repository(RepositoryCommand::Show { project }) => {
            write_repository(out, &wizard.get_repository(project)?)?;
        }
        Command::Validate { project } => {
            let report = wizard.assess_readiness(project)?;
            let mut table = Table::new(["Check", "Status", "Details"]);
            for outcome in &report.outcomes {
                table.push_row([
                    outcome.check.label().to_string(),
                    outcome.status.label().to_string(),
                    outcome.message.clone(),
                ]);
            }
            write!(out, "{table}")?;
            writeln!(
                out,
                "{}/{} checks passed, {} warning(s): {}",
                report.passed_count(),
                report.outcomes.len(),
                report.count(CheckStatus::Warn),
                if report.is_ready() {
                    "ready for submission"
                } else {
                    "not ready yet"
                }
            )?;
        }
        Command::Export { project } => {
            let record = wizard.generate_export(project, &paths.exports_dir)?;
            writeln!(out, "Export {} written to {}", record.id, record.file_path)?;
            writeln!(out, "{}", record.summary)?;
        }
        Command::Exports { project } => {
            let records = wizard.list_exports(project)?;
            if records.is_empty() {
                writeln!(out, "No exports yet.")?;
                return Ok(());
            }
            let mut table = Table::new(["ID", "Created", "Summary"]);
            for record in &records {
                table.push_row([
                    record.id.to_string(),
                    timestamp(record.created_at),
                    record.summary.clone(),
                ]);
            }
            write!(out, "{table}")?;
        }
    }

    Ok(())
}

fn write_permissions(out: &mut dyn Write, permissions: &Permissions) -> Result<()> {
    writeln!(
        out,
        "Human subjects data:   {}",
        permissions.contains_human_data.label()
    )?;
    writeln!(
        out,
        "IRB/ethics required:   {}",
        permissions.irb_required.label()
    )?;
    writeln!(out, "Notes:                 {}", permissions.notes)?;
    Ok(())
}

fn write_deidentification(out: &mut dyn Write, deid: &Deidentification) -> Result<()> {
    writeln!(out, "Strategy: {}", deid.strategy)?;
    writeln!(out, "Notes:    {}", deid.notes)?;
    Ok(())
}

fn write_repository(out: &mut dyn Write, selection: &RepositorySelection) -> Result<()> {
    writeln!(
        out,
        "Repository: {}",
        selection
            .choice
            .map_or("not selected", TargetRepository::label)
    )?;
    writeln!(out, "Notes:      {}", selection.notes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{execute, Command, InventoryCommand, SamplesCommand};
    use fairy_core::db::open_db;
    use fairy_core::{ProjectId, StoragePaths};
    use rusqlite::Connection;

    fn run(conn: &Connection, paths: &StoragePaths, command: Command) -> String {
        let mut out = Vec::new();
        execute(command, conn, paths, &mut out).expect("command should succeed");
        String::from_utf8(out).expect("output should be utf-8")
    }

    fn created_id(output: &str) -> ProjectId {
        output
            .trim()
            .rsplit(' ')
            .next()
            .and_then(|id| id.parse().ok())
            .expect("create prints the project id")
    }

    #[test]
    fn home_shows_hint_then_created_project() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StoragePaths::resolve(dir.path()).unwrap();
        let conn = open_db(&paths.db_path).unwrap();

        let empty = run(&conn, &paths, Command::Home { all: false });
        assert!(empty.contains("No projects yet"));

        run(
            &conn,
            &paths,
            Command::Create {
                title: "RNA-seq study".to_string(),
                description: "Batch A".to_string(),
            },
        );
        let listed = run(&conn, &paths, Command::Home { all: false });
        assert!(listed.contains("Your projects"));
        assert!(listed.contains("RNA-seq study"));
        assert!(listed.contains("In Progress"));
    }

    #[test]
    fn wizard_commands_feed_export() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StoragePaths::resolve(dir.path()).unwrap();
        let conn = open_db(&paths.db_path).unwrap();

        let created = run(
            &conn,
            &paths,
            Command::Create {
                title: "Study".to_string(),
                description: "Cohort".to_string(),
            },
        );
        let project = created_id(&created);

        let added = run(
            &conn,
            &paths,
            Command::Inventory(InventoryCommand::Add {
                project,
                name: "FASTQ".to_string(),
                path: "s3://bucket/run1".to_string(),
                notes: String::new(),
            }),
        );
        assert!(added.contains("s3 location"));

        let csv_path = dir.path().join("samples.csv");
        std::fs::write(&csv_path, "sample_id,tissue\nS1,liver\nS2,kidney\n").unwrap();
        let imported = run(
            &conn,
            &paths,
            Command::Samples(SamplesCommand::Import {
                project,
                file: csv_path,
            }),
        );
        assert!(imported.contains("Imported 2 sample(s)"));

        let report = run(&conn, &paths, Command::Validate { project });
        assert!(report.contains("not ready yet"));

        let exported = run(&conn, &paths, Command::Export { project });
        assert!(exported.contains("1 inventory item(s), 2 sample row(s)"));

        let listed = run(&conn, &paths, Command::Exports { project });
        assert!(listed.contains("checks passed"));
    }

    #[test]
    fn unknown_project_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StoragePaths::resolve(dir.path()).unwrap();
        let conn = open_db(&paths.db_path).unwrap();

        let mut out = Vec::new();
        let err = execute(
            Command::Show {
                project: ProjectId::nil(),
            },
            &conn,
            &paths,
            &mut out,
        )
        .expect_err("unknown project must fail");
        assert!(err.to_string().contains("project not found"));
    }
}
