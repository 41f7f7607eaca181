//! Project domain model.
//!
//! # Responsibility
//! - Define the canonical project record shown on the dashboard.
//! - Provide lifecycle helpers for archive semantics.
//!
//! # Invariants
//! - `id` is stable and never reused for another project.
//! - `title` and `description` are trimmed and never empty.
//! - `updated_at` is never earlier than `created_at`.

use crate::model::timestamp::now_epoch_ms;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every project.
pub type ProjectId = Uuid;

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Default state while the wizard is being filled in.
    InProgress,
    /// Hidden from the dashboard; data is kept.
    Archived,
}

impl ProjectStatus {
    /// Human-facing label used by the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Archived => "Archived",
        }
    }
}

/// Field-level validation failures for project and section input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    EmptyTitle,
    EmptyDescription,
    EmptyInventoryName,
    EmptyInventoryPath,
    TimestampOrder { created_at: i64, updated_at: i64 },
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "project title cannot be empty"),
            Self::EmptyDescription => write!(f, "project description cannot be empty"),
            Self::EmptyInventoryName => write!(f, "inventory item name cannot be empty"),
            Self::EmptyInventoryPath => write!(f, "inventory item path cannot be empty"),
            Self::TimestampOrder {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must not be earlier than created_at ({created_at})"
            ),
        }
    }
}

impl Error for ProjectValidationError {}

/// Canonical project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Bumped by every section write.
    pub updated_at: i64,
}

impl Project {
    /// Creates a new in-progress project with a generated stable ID.
    ///
    /// Title and description are trimmed; call `validate` before persisting.
    pub fn new(title: impl AsRef<str>, description: impl AsRef<str>) -> Self {
        Self::with_id(Uuid::new_v4(), title, description)
    }

    /// Creates a project with a caller-provided stable ID.
    pub fn with_id(id: ProjectId, title: impl AsRef<str>, description: impl AsRef<str>) -> Self {
        let now = now_epoch_ms();
        Self {
            id,
            title: title.as_ref().trim().to_string(),
            description: description.as_ref().trim().to_string(),
            status: ProjectStatus::InProgress,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks field invariants before persistence.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        validate_overview(&self.title, &self.description)?;
        if self.updated_at < self.created_at {
            return Err(ProjectValidationError::TimestampOrder {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    /// Marks this project as archived.
    pub fn archive(&mut self) {
        self.status = ProjectStatus::Archived;
    }

    /// Returns whether this project is listed on the dashboard by default.
    pub fn is_active(&self) -> bool {
        self.status != ProjectStatus::Archived
    }
}

/// Validates overview fields shared by create and edit flows.
pub fn validate_overview(title: &str, description: &str) -> Result<(), ProjectValidationError> {
    if title.trim().is_empty() {
        return Err(ProjectValidationError::EmptyTitle);
    }
    if description.trim().is_empty() {
        return Err(ProjectValidationError::EmptyDescription);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Project, ProjectStatus, ProjectValidationError};

    #[test]
    fn new_project_is_trimmed_and_in_progress() {
        let project = Project::new("  RNA-seq study  ", "\tbatch A\n");
        assert_eq!(project.title, "RNA-seq study");
        assert_eq!(project.description, "batch A");
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert_eq!(project.created_at, project.updated_at);
        assert!(project.validate().is_ok());
    }

    #[test]
    fn blank_fields_fail_validation() {
        let project = Project::new("   ", "desc");
        assert_eq!(project.validate(), Err(ProjectValidationError::EmptyTitle));

        let project = Project::new("title", "");
        assert_eq!(
            project.validate(),
            Err(ProjectValidationError::EmptyDescription)
        );
    }

    #[test]
    fn archive_hides_project() {
        let mut project = Project::new("t", "d");
        project.archive();
        assert!(!project.is_active());
        assert_eq!(project.status.label(), "Archived");
    }
}
