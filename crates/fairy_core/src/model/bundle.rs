//! Aggregate read model: one project with every wizard section loaded.

use crate::model::project::Project;
use crate::model::sections::{
    Deidentification, ExportRecord, InventoryItem, Permissions, RepositorySelection, SampleTable,
};
use serde::Serialize;

/// Snapshot of a project and all its sections, used by audits and exports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectBundle {
    pub project: Project,
    pub data_inventory: Vec<InventoryItem>,
    pub permissions: Permissions,
    pub deidentification: Deidentification,
    pub metadata: SampleTable,
    pub repository: RepositorySelection,
    pub exports: Vec<ExportRecord>,
}

impl ProjectBundle {
    /// Bundle for a project whose sections were never filled in.
    pub fn empty(project: Project) -> Self {
        Self {
            project,
            data_inventory: Vec::new(),
            permissions: Permissions::default(),
            deidentification: Deidentification::default(),
            metadata: SampleTable::default(),
            repository: RepositorySelection::default(),
            exports: Vec::new(),
        }
    }
}
