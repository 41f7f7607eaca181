//! JSON export bundles for submission handoff.
//!
//! # Responsibility
//! - Serialize a project snapshot plus its readiness report to disk.
//! - Produce the one-line summary stored with each export record.
//!
//! # Invariants
//! - Bundles land in `<exports_dir>/<project_id>/<export_id>.json`.
//! - A failed write leaves no export record behind; the caller records only
//!   after `write_export_document` returns.

use crate::model::bundle::ProjectBundle;
use crate::model::sections::{
    Deidentification, ExportId, LocationKind, Permissions, RepositorySelection, SampleTable,
};
use crate::model::timestamp::format_epoch_ms;
use crate::service::error::ServiceResult;
use crate::service::readiness::ReadinessReport;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Identifier written into every export document.
pub const EXPORT_FORMAT: &str = "fairy.export";
/// Bumped whenever the document layout changes incompatibly.
pub const EXPORT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    format: &'static str,
    format_version: u32,
    export_id: String,
    generated_at: String,
    project: ProjectView<'a>,
    data_inventory: Vec<InventoryView<'a>>,
    permissions: &'a Permissions,
    deidentification: &'a Deidentification,
    metadata: &'a SampleTable,
    repository: &'a RepositorySelection,
    readiness: ReadinessView<'a>,
}

#[derive(Debug, Serialize)]
struct ProjectView<'a> {
    id: String,
    title: &'a str,
    description: &'a str,
    status: &'static str,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, Serialize)]
struct InventoryView<'a> {
    name: &'a str,
    path: &'a str,
    notes: &'a str,
    location: LocationKind,
}

#[derive(Debug, Serialize)]
struct ReadinessView<'a> {
    ready: bool,
    #[serde(flatten)]
    report: &'a ReadinessReport,
}

/// Returns the bundle path for one export.
pub fn export_path(exports_dir: &Path, bundle: &ProjectBundle, export_id: ExportId) -> PathBuf {
    exports_dir
        .join(bundle.project.id.to_string())
        .join(format!("{export_id}.json"))
}

/// Writes the pretty-printed export document and returns its path.
pub fn write_export_document(
    exports_dir: &Path,
    bundle: &ProjectBundle,
    report: &ReadinessReport,
    export_id: ExportId,
    generated_at: i64,
) -> ServiceResult<PathBuf> {
    let path = export_path(exports_dir, bundle, export_id);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let project = &bundle.project;
    let document = ExportDocument {
        format: EXPORT_FORMAT,
        format_version: EXPORT_FORMAT_VERSION,
        export_id: export_id.to_string(),
        generated_at: format_epoch_ms(generated_at),
        project: ProjectView {
            id: project.id.to_string(),
            title: &project.title,
            description: &project.description,
            status: project.status.label(),
            created_at: format_epoch_ms(project.created_at),
            updated_at: format_epoch_ms(project.updated_at),
        },
        data_inventory: bundle
            .data_inventory
            .iter()
            .map(|item| InventoryView {
                name: &item.name,
                path: &item.path,
                notes: &item.notes,
                location: item.location_kind(),
            })
            .collect(),
        permissions: &bundle.permissions,
        deidentification: &bundle.deidentification,
        metadata: &bundle.metadata,
        repository: &bundle.repository,
        readiness: ReadinessView {
            ready: report.is_ready(),
            report,
        },
    };

    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(path)
}

/// One-line human summary stored with the export record.
pub fn summarize_export(bundle: &ProjectBundle, report: &ReadinessReport) -> String {
    format!(
        "{} inventory item(s), {} sample row(s); {}/{} checks passed ({})",
        bundle.data_inventory.len(),
        bundle.metadata.rows.len(),
        report.passed_count(),
        report.outcomes.len(),
        if report.is_ready() { "ready" } else { "not ready" }
    )
}
