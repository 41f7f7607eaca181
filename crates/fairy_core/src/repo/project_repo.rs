//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `projects` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Project::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `updated_at` only moves forward.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::project::{
    validate_overview, Project, ProjectId, ProjectStatus, ProjectValidationError,
};
use crate::model::timestamp::now_epoch_ms;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    description,
    status,
    created_at,
    updated_at
FROM projects";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for project and section persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(ProjectValidationError),
    Db(DbError),
    NotFound(ProjectId),
    InvalidData(String),
    /// Connection schema is not at the version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "project not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted project data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "project repository requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<ProjectValidationError> for RepoError {
    fn from(value: ProjectValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for the dashboard project list.
#[derive(Debug, Clone, Default)]
pub struct ProjectListQuery {
    pub include_archived: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for project CRUD operations.
pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn update_overview(&self, id: ProjectId, title: &str, description: &str) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId, include_archived: bool) -> RepoResult<Option<Project>>;
    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>>;
    fn archive_project(&self, id: ProjectId) -> RepoResult<()>;
    /// Bumps `updated_at` without changing any other field.
    fn touch_project(&self, id: ProjectId) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Wraps a migrated connection; rejects connections at another schema version.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;

        self.conn.execute(
            "INSERT INTO projects (
                uuid,
                title,
                description,
                status,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                project.id.to_string(),
                project.title.as_str(),
                project.description.as_str(),
                status_to_db(project.status),
                project.created_at,
                project.updated_at,
            ],
        )?;

        Ok(project.id)
    }

    fn update_overview(&self, id: ProjectId, title: &str, description: &str) -> RepoResult<()> {
        validate_overview(title, description)?;

        let changed = self.conn.execute(
            "UPDATE projects
             SET
                title = ?2,
                description = ?3,
                updated_at = MAX(updated_at, ?4)
             WHERE uuid = ?1;",
            params![id.to_string(), title.trim(), description.trim(), now_epoch_ms()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_project(&self, id: ProjectId, include_archived: bool) -> RepoResult<Option<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL}
             WHERE uuid = ?1
               AND (?2 = 1 OR status <> 'archived');"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_archived)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }

        Ok(None)
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        let mut sql = format!("{PROJECT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_archived {
            sql.push_str(" AND status <> 'archived'");
        }

        // rowid breaks same-millisecond ties in favour of the newest insert.
        sql.push_str(" ORDER BY updated_at DESC, rowid DESC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projects = Vec::new();

        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }

        Ok(projects)
    }

    fn archive_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET
                status = 'archived',
                updated_at = MAX(updated_at, ?2)
             WHERE uuid = ?1;",
            params![id.to_string(), now_epoch_ms()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn touch_project(&self, id: ProjectId) -> RepoResult<()> {
        touch_project_row(self.conn, id)
    }
}

/// Bumps `updated_at` for one project; shared by section writes.
pub(crate) fn touch_project_row(conn: &Connection, id: ProjectId) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE projects SET updated_at = MAX(updated_at, ?2) WHERE uuid = ?1;",
        params![id.to_string(), now_epoch_ms()],
    )?;

    if changed == 0 {
        return Err(RepoError::NotFound(id));
    }

    Ok(())
}

/// Returns whether a project row exists, archived or not.
pub(crate) fn project_exists(conn: &Connection, id: ProjectId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM projects WHERE uuid = ?1);",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version = current_user_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "projects.uuid")?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in projects.status"))
    })?;

    let project = Project {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    project.validate()?;
    Ok(project)
}

fn status_to_db(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::InProgress => "in_progress",
        ProjectStatus::Archived => "archived",
    }
}

fn parse_status(value: &str) -> Option<ProjectStatus> {
    match value {
        "in_progress" => Some(ProjectStatus::InProgress),
        "archived" => Some(ProjectStatus::Archived),
        _ => None,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
