//! Core domain logic for FAIRy, a local helper that walks researchers
//! through preparing a dataset for FAIR-compliant repository submission.
//! This crate is the single source of truth for project invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::StoragePaths;
pub use logging::{default_log_level, flush_logging, init_logging, logging_status};
pub use model::bundle::ProjectBundle;
pub use model::project::{Project, ProjectId, ProjectStatus, ProjectValidationError};
pub use model::sections::{
    Answer, Deidentification, ExportId, ExportRecord, InventoryItem, LocationKind,
    ParseChoiceError, Permissions, RepositorySelection, SampleRow, SampleTable, TargetRepository,
};
pub use model::timestamp::{format_epoch_ms, now_epoch_ms};
pub use repo::project_repo::{
    ProjectListQuery, ProjectRepository, RepoError, RepoResult, SqliteProjectRepository,
};
pub use repo::section_repo::{SectionRepository, SqliteSectionRepository};
pub use service::error::{ServiceError, ServiceResult};
pub use service::project_service::ProjectService;
pub use service::readiness::{
    assess_readiness, CheckOutcome, CheckStatus, ReadinessCheck, ReadinessReport,
};
pub use service::wizard_service::WizardService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
