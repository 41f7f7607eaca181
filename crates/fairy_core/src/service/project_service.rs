//! Project use-case service backing the dashboard and overview tab.
//!
//! # Responsibility
//! - Provide create/list/open/edit/archive entry points for core callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Every successful write returns the stored read-back.

use crate::model::project::{validate_overview, Project, ProjectId};
use crate::repo::project_repo::{ProjectListQuery, ProjectRepository};
use crate::service::error::{ServiceError, ServiceResult};

/// Use-case service wrapper for project CRUD operations.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a new in-progress project.
    ///
    /// # Errors
    /// - `Validation` when title or description is blank.
    pub fn create_project(
        &self,
        title: impl AsRef<str>,
        description: impl AsRef<str>,
    ) -> ServiceResult<Project> {
        validate_overview(title.as_ref(), description.as_ref())?;
        let project = Project::new(title, description);
        let id = self.repo.create_project(&project)?;
        self.read_back(id, "created project not found in read-back")
    }

    /// Lists dashboard projects, most recently updated first.
    pub fn list_projects(&self, include_archived: bool) -> ServiceResult<Vec<Project>> {
        let query = ProjectListQuery {
            include_archived,
            ..ProjectListQuery::default()
        };
        Ok(self.repo.list_projects(&query)?)
    }

    /// Opens one project; archived projects are still reachable by ID.
    pub fn get_project(&self, id: ProjectId) -> ServiceResult<Project> {
        self.repo
            .get_project(id, true)?
            .ok_or(ServiceError::ProjectNotFound(id))
    }

    /// Replaces title and description (overview tab "save").
    pub fn update_overview(
        &self,
        id: ProjectId,
        title: impl AsRef<str>,
        description: impl AsRef<str>,
    ) -> ServiceResult<Project> {
        self.repo
            .update_overview(id, title.as_ref(), description.as_ref())?;
        self.read_back(id, "updated project not found in read-back")
    }

    /// Archives a project. Archiving twice is a no-op.
    pub fn archive_project(&self, id: ProjectId) -> ServiceResult<Project> {
        let project = self.get_project(id)?;
        if !project.is_active() {
            return Ok(project);
        }
        self.repo.archive_project(id)?;
        self.read_back(id, "archived project not found in read-back")
    }

    fn read_back(&self, id: ProjectId, details: &'static str) -> ServiceResult<Project> {
        self.repo
            .get_project(id, true)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}
