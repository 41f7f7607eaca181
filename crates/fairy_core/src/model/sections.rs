//! Wizard section models attached to a project.
//!
//! # Responsibility
//! - Define one record per wizard tab (inventory, permissions,
//!   de-identification, sample metadata, repository, exports).
//! - Normalize free-text input at construction time.
//!
//! # Invariants
//! - Inventory items always carry a non-empty name and path.
//! - Sample rows only use keys listed in `SampleTable::columns`.

use crate::model::project::{ProjectId, ProjectValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

static URL_SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*)://").expect("valid url scheme regex"));

/// Stable identifier for export records.
pub type ExportId = Uuid;

/// Where an inventory item lives, derived from its path or URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    S3,
    Gcs,
    /// Plain web link (Box, Drive and similar share URLs).
    Http,
    /// Any other `scheme://` location.
    #[serde(rename = "remote")]
    OtherRemote,
    Local,
}

impl LocationKind {
    /// Classifies a path or URL by its scheme prefix.
    pub fn classify(path: &str) -> Self {
        let Some(caps) = URL_SCHEME_RE.captures(path.trim()) else {
            return Self::Local;
        };
        match caps[1].to_ascii_lowercase().as_str() {
            "s3" => Self::S3,
            "gs" | "gcs" => Self::Gcs,
            "http" | "https" => Self::Http,
            _ => Self::OtherRemote,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::S3 => "s3",
            Self::Gcs => "gcs",
            Self::Http => "http",
            Self::OtherRemote => "remote",
            Self::Local => "local",
        }
    }
}

/// One recorded data location. The tool never reads or uploads the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub path: String,
    pub notes: String,
}

impl InventoryItem {
    pub fn new(name: impl AsRef<str>, path: impl AsRef<str>, notes: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            path: path.as_ref().trim().to_string(),
            notes: notes.as_ref().trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.name.trim().is_empty() {
            return Err(ProjectValidationError::EmptyInventoryName);
        }
        if self.path.trim().is_empty() {
            return Err(ProjectValidationError::EmptyInventoryPath);
        }
        Ok(())
    }

    pub fn location_kind(&self) -> LocationKind {
        LocationKind::classify(&self.path)
    }
}

/// Tri-state answer for yes/no questions that may not be answered yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    #[default]
    Unknown,
    No,
    Yes,
}

impl Answer {
    pub fn from_option(value: Option<bool>) -> Self {
        match value {
            None => Self::Unknown,
            Some(false) => Self::No,
            Some(true) => Self::Yes,
        }
    }

    pub fn as_option(self) -> Option<bool> {
        match self {
            Self::Unknown => None,
            Self::No => Some(false),
            Self::Yes => Some(true),
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::No => "No",
            Self::Yes => "Yes",
        }
    }
}

/// Error for textual enum input that matches no known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseChoiceError {
    pub field: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl Display for ParseChoiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported {} `{}`; expected {}",
            self.field, self.value, self.expected
        )
    }
}

impl std::error::Error for ParseChoiceError {}

impl FromStr for Answer {
    type Err = ParseChoiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unknown" | "" => Ok(Self::Unknown),
            "no" | "false" => Ok(Self::No),
            "yes" | "true" => Ok(Self::Yes),
            _ => Err(ParseChoiceError {
                field: "answer",
                value: value.to_string(),
                expected: "unknown|no|yes",
            }),
        }
    }
}

/// Permissions & ethics tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub contains_human_data: Answer,
    pub irb_required: Answer,
    pub notes: String,
}

impl Permissions {
    pub fn new(contains_human_data: Answer, irb_required: Answer, notes: impl AsRef<str>) -> Self {
        Self {
            contains_human_data,
            irb_required,
            notes: notes.as_ref().trim().to_string(),
        }
    }
}

/// De-identification tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deidentification {
    pub strategy: String,
    pub notes: String,
}

impl Deidentification {
    pub fn new(strategy: impl AsRef<str>, notes: impl AsRef<str>) -> Self {
        Self {
            strategy: strategy.as_ref().trim().to_string(),
            notes: notes.as_ref().trim().to_string(),
        }
    }

    pub fn has_strategy(&self) -> bool {
        !self.strategy.trim().is_empty()
    }
}

/// One sample record keyed by column name.
pub type SampleRow = Map<String, Value>;

/// Sample metadata table imported from CSV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleTable {
    /// Header order as found in the source file.
    pub columns: Vec<String>,
    pub rows: Vec<SampleRow>,
    /// File name the table was imported from, when known.
    pub source_name: Option<String>,
    /// Unix epoch milliseconds of the last import.
    pub imported_at: Option<i64>,
}

impl SampleTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Public data repositories offered as submission targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRepository {
    #[serde(rename = "GEO")]
    Geo,
    #[serde(rename = "SRA")]
    Sra,
    #[serde(rename = "ENA")]
    Ena,
    #[serde(rename = "Zenodo")]
    Zenodo,
    #[serde(rename = "dbGaP")]
    DbGap,
}

impl TargetRepository {
    pub const ALL: [TargetRepository; 5] =
        [Self::Geo, Self::Sra, Self::Ena, Self::Zenodo, Self::DbGap];

    pub fn label(self) -> &'static str {
        match self {
            Self::Geo => "GEO",
            Self::Sra => "SRA",
            Self::Ena => "ENA",
            Self::Zenodo => "Zenodo",
            Self::DbGap => "dbGaP",
        }
    }

    /// Controlled-access repositories gate downloads behind an access request.
    pub fn is_controlled_access(self) -> bool {
        matches!(self, Self::DbGap)
    }
}

impl FromStr for TargetRepository {
    type Err = ParseChoiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.label().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| ParseChoiceError {
                field: "repository",
                value: value.to_string(),
                expected: "GEO|SRA|ENA|Zenodo|dbGaP",
            })
    }
}

/// Repository tab. `choice = None` means nothing selected yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySelection {
    pub choice: Option<TargetRepository>,
    pub notes: String,
}

impl RepositorySelection {
    pub fn new(choice: Option<TargetRepository>, notes: impl AsRef<str>) -> Self {
        Self {
            choice,
            notes: notes.as_ref().trim().to_string(),
        }
    }
}

/// Record of one generated export bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub id: ExportId,
    pub project_id: ProjectId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub summary: String,
    pub file_path: String,
}
