//! Wizard use-case service: one entry point per project tab.
//!
//! # Responsibility
//! - Validate and normalize tab input before it reaches storage.
//! - Assemble `ProjectBundle` snapshots for the audit and export steps.
//!
//! # Invariants
//! - Every call first resolves the project; unknown IDs fail with
//!   `ProjectNotFound` before any section is touched.
//! - A failed CSV import leaves the previous sample table untouched.

use crate::model::bundle::ProjectBundle;
use crate::model::project::{Project, ProjectId};
use crate::model::sections::{
    Deidentification, ExportRecord, InventoryItem, Permissions, RepositorySelection, SampleTable,
};
use crate::model::timestamp::now_epoch_ms;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::section_repo::SectionRepository;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::export::{summarize_export, write_export_document};
use crate::service::readiness::{assess_readiness, ReadinessReport};
use crate::service::sample_import::parse_samples_csv;
use log::{error, info};
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

/// Wizard service over project and section repositories.
pub struct WizardService<P: ProjectRepository, S: SectionRepository> {
    projects: P,
    sections: S,
}

impl<P: ProjectRepository, S: SectionRepository> WizardService<P, S> {
    pub fn new(projects: P, sections: S) -> Self {
        Self { projects, sections }
    }

    /// Records one data location. Blank name or path is rejected.
    pub fn add_inventory_item(
        &self,
        project_id: ProjectId,
        name: impl AsRef<str>,
        path: impl AsRef<str>,
        notes: impl AsRef<str>,
    ) -> ServiceResult<InventoryItem> {
        let item = InventoryItem::new(name, path, notes);
        item.validate()?;
        self.require_project(project_id)?;
        self.sections.add_inventory_item(project_id, &item)?;
        Ok(item)
    }

    pub fn list_inventory(&self, project_id: ProjectId) -> ServiceResult<Vec<InventoryItem>> {
        self.require_project(project_id)?;
        Ok(self.sections.list_inventory(project_id)?)
    }

    pub fn save_permissions(
        &self,
        project_id: ProjectId,
        permissions: &Permissions,
    ) -> ServiceResult<Permissions> {
        self.require_project(project_id)?;
        let normalized = Permissions::new(
            permissions.contains_human_data,
            permissions.irb_required,
            &permissions.notes,
        );
        self.sections.save_permissions(project_id, &normalized)?;
        Ok(self.sections.get_permissions(project_id)?)
    }

    pub fn get_permissions(&self, project_id: ProjectId) -> ServiceResult<Permissions> {
        self.require_project(project_id)?;
        Ok(self.sections.get_permissions(project_id)?)
    }

    pub fn save_deidentification(
        &self,
        project_id: ProjectId,
        deid: &Deidentification,
    ) -> ServiceResult<Deidentification> {
        self.require_project(project_id)?;
        let normalized = Deidentification::new(&deid.strategy, &deid.notes);
        self.sections.save_deidentification(project_id, &normalized)?;
        Ok(self.sections.get_deidentification(project_id)?)
    }

    pub fn get_deidentification(&self, project_id: ProjectId) -> ServiceResult<Deidentification> {
        self.require_project(project_id)?;
        Ok(self.sections.get_deidentification(project_id)?)
    }

    /// Parses a samples CSV and replaces the project's sample table.
    ///
    /// # Errors
    /// - `Csv` / `InvalidCsv` when the stream cannot be decoded; the stored
    ///   table is unchanged in that case.
    pub fn import_samples_csv<R: Read>(
        &self,
        project_id: ProjectId,
        reader: R,
        source_name: Option<&str>,
    ) -> ServiceResult<SampleTable> {
        self.require_project(project_id)?;
        let started_at = Instant::now();

        let mut table = match parse_samples_csv(reader) {
            Ok(table) => table,
            Err(err) => {
                error!(
                    "event=samples_import module=service status=error duration_ms={} error_code=csv_invalid",
                    started_at.elapsed().as_millis()
                );
                return Err(err);
            }
        };
        table.source_name = source_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        table.imported_at = Some(now_epoch_ms());

        self.sections.replace_samples(project_id, &table)?;
        info!(
            "event=samples_import module=service status=ok duration_ms={} rows={} columns={}",
            started_at.elapsed().as_millis(),
            table.rows.len(),
            table.columns.len()
        );
        Ok(self.sections.get_samples(project_id)?)
    }

    pub fn get_samples(&self, project_id: ProjectId) -> ServiceResult<SampleTable> {
        self.require_project(project_id)?;
        Ok(self.sections.get_samples(project_id)?)
    }

    pub fn save_repository(
        &self,
        project_id: ProjectId,
        selection: &RepositorySelection,
    ) -> ServiceResult<RepositorySelection> {
        self.require_project(project_id)?;
        let normalized = RepositorySelection::new(selection.choice, &selection.notes);
        self.sections.save_repository(project_id, &normalized)?;
        Ok(self.sections.get_repository(project_id)?)
    }

    pub fn get_repository(&self, project_id: ProjectId) -> ServiceResult<RepositorySelection> {
        self.require_project(project_id)?;
        Ok(self.sections.get_repository(project_id)?)
    }

    /// Loads the project and every section into one snapshot.
    pub fn load_bundle(&self, project_id: ProjectId) -> ServiceResult<ProjectBundle> {
        let project = self.require_project(project_id)?;
        Ok(ProjectBundle {
            project,
            data_inventory: self.sections.list_inventory(project_id)?,
            permissions: self.sections.get_permissions(project_id)?,
            deidentification: self.sections.get_deidentification(project_id)?,
            metadata: self.sections.get_samples(project_id)?,
            repository: self.sections.get_repository(project_id)?,
            exports: self.sections.list_exports(project_id)?,
        })
    }

    /// Audits the current state of every wizard section.
    pub fn assess_readiness(&self, project_id: ProjectId) -> ServiceResult<ReadinessReport> {
        let bundle = self.load_bundle(project_id)?;
        Ok(assess_readiness(&bundle))
    }

    /// Writes a JSON export bundle under `exports_dir` and records it.
    pub fn generate_export(
        &self,
        project_id: ProjectId,
        exports_dir: &Path,
    ) -> ServiceResult<ExportRecord> {
        let started_at = Instant::now();
        let bundle = self.load_bundle(project_id)?;
        let report = assess_readiness(&bundle);
        let export_id = Uuid::new_v4();
        let created_at = now_epoch_ms();

        let path = match write_export_document(exports_dir, &bundle, &report, export_id, created_at)
        {
            Ok(path) => path,
            Err(err) => {
                error!(
                    "event=export_write module=service status=error duration_ms={} error_code=export_write_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        let record = ExportRecord {
            id: export_id,
            project_id,
            created_at,
            summary: summarize_export(&bundle, &report),
            file_path: path.display().to_string(),
        };
        self.sections.record_export(&record)?;
        info!(
            "event=export_write module=service status=ok duration_ms={} ready={}",
            started_at.elapsed().as_millis(),
            report.is_ready()
        );
        Ok(record)
    }

    pub fn list_exports(&self, project_id: ProjectId) -> ServiceResult<Vec<ExportRecord>> {
        self.require_project(project_id)?;
        Ok(self.sections.list_exports(project_id)?)
    }

    fn require_project(&self, project_id: ProjectId) -> ServiceResult<Project> {
        self.projects
            .get_project(project_id, true)?
            .ok_or(ServiceError::ProjectNotFound(project_id))
    }
}
