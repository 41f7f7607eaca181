//! Service-level error shared by project and wizard use-cases.

use crate::model::project::{ProjectId, ProjectValidationError};
use crate::repo::project_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    /// User input failed field validation.
    Validation(ProjectValidationError),
    /// Target project does not exist (or is archived and hidden).
    ProjectNotFound(ProjectId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// CSV transport or decoding failure.
    Csv(csv::Error),
    /// CSV decoded but its shape is unusable.
    InvalidCsv(String),
    Io(std::io::Error),
    Serialization(serde_json::Error),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl ServiceError {
    /// Stable, content-free identifier for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::ProjectNotFound(_) => "project_not_found",
            Self::Repo(_) => "repo",
            Self::Csv(_) | Self::InvalidCsv(_) => "csv_invalid",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::InconsistentState(_) => "inconsistent_state",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "failed to read CSV: {err}"),
            Self::InvalidCsv(message) => write!(f, "failed to read CSV: {message}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "failed to serialize export: {err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent project state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::ProjectNotFound(_) | Self::InvalidCsv(_) | Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ProjectNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ProjectValidationError> for ServiceError {
    fn from(value: ProjectValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<csv::Error> for ServiceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
