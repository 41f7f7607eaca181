//! Wizard section repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the per-tab records of one project (inventory, permissions,
//!   de-identification, samples, repository choice, exports).
//! - Own sample-table replacement with atomic semantics.
//!
//! # Invariants
//! - Every write targets an existing project and bumps its `updated_at` in
//!   the same transaction.
//! - Single-record sections read back as their default when never saved.
//! - `replace_samples` swaps the whole table or leaves it untouched.

use crate::model::project::ProjectId;
use crate::model::sections::{
    Answer, Deidentification, ExportRecord, InventoryItem, Permissions, RepositorySelection,
    SampleRow, SampleTable, TargetRepository,
};
use crate::repo::project_repo::{
    ensure_schema_ready, parse_uuid, project_exists, touch_project_row, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::str::FromStr;

/// Repository interface for wizard section records.
pub trait SectionRepository {
    fn add_inventory_item(&self, project_id: ProjectId, item: &InventoryItem) -> RepoResult<()>;
    /// Lists inventory items in insertion order.
    fn list_inventory(&self, project_id: ProjectId) -> RepoResult<Vec<InventoryItem>>;

    fn save_permissions(&self, project_id: ProjectId, permissions: &Permissions) -> RepoResult<()>;
    fn get_permissions(&self, project_id: ProjectId) -> RepoResult<Permissions>;

    fn save_deidentification(
        &self,
        project_id: ProjectId,
        deid: &Deidentification,
    ) -> RepoResult<()>;
    fn get_deidentification(&self, project_id: ProjectId) -> RepoResult<Deidentification>;

    /// Replaces the full sample table in one transaction.
    fn replace_samples(&self, project_id: ProjectId, table: &SampleTable) -> RepoResult<()>;
    fn get_samples(&self, project_id: ProjectId) -> RepoResult<SampleTable>;

    fn save_repository(
        &self,
        project_id: ProjectId,
        selection: &RepositorySelection,
    ) -> RepoResult<()>;
    fn get_repository(&self, project_id: ProjectId) -> RepoResult<RepositorySelection>;

    fn record_export(&self, record: &ExportRecord) -> RepoResult<()>;
    /// Lists export records oldest first.
    fn list_exports(&self, project_id: ProjectId) -> RepoResult<Vec<ExportRecord>>;
}

/// SQLite-backed section repository.
pub struct SqliteSectionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSectionRepository<'conn> {
    /// Wraps a migrated connection; rejects connections at another schema version.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    /// Runs one section write inside a transaction that also touches the project.
    fn write_section(
        &self,
        project_id: ProjectId,
        write: impl FnOnce(&Transaction<'_>, &str) -> RepoResult<()>,
    ) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        if !project_exists(&tx, project_id)? {
            return Err(RepoError::NotFound(project_id));
        }

        let project_uuid = project_id.to_string();
        write(&tx, project_uuid.as_str())?;
        touch_project_row(&tx, project_id)?;
        tx.commit()?;
        Ok(())
    }
}

impl SectionRepository for SqliteSectionRepository<'_> {
    fn add_inventory_item(&self, project_id: ProjectId, item: &InventoryItem) -> RepoResult<()> {
        item.validate()?;

        self.write_section(project_id, |tx, project_uuid| {
            tx.execute(
                "INSERT INTO inventory_items (project_uuid, name, path, notes)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    project_uuid,
                    item.name.as_str(),
                    item.path.as_str(),
                    item.notes.as_str()
                ],
            )?;
            Ok(())
        })
    }

    fn list_inventory(&self, project_id: ProjectId) -> RepoResult<Vec<InventoryItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, path, notes
             FROM inventory_items
             WHERE project_uuid = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(InventoryItem {
                name: row.get("name")?,
                path: row.get("path")?,
                notes: row.get("notes")?,
            });
        }
        Ok(items)
    }

    fn save_permissions(&self, project_id: ProjectId, permissions: &Permissions) -> RepoResult<()> {
        self.write_section(project_id, |tx, project_uuid| {
            tx.execute(
                "INSERT INTO project_permissions (
                    project_uuid,
                    contains_human_data,
                    irb_required,
                    notes
                ) VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT (project_uuid) DO UPDATE SET
                    contains_human_data = excluded.contains_human_data,
                    irb_required = excluded.irb_required,
                    notes = excluded.notes;",
                params![
                    project_uuid,
                    permissions.contains_human_data.as_option(),
                    permissions.irb_required.as_option(),
                    permissions.notes.as_str(),
                ],
            )?;
            Ok(())
        })
    }

    fn get_permissions(&self, project_id: ProjectId) -> RepoResult<Permissions> {
        let permissions = self
            .conn
            .query_row(
                "SELECT contains_human_data, irb_required, notes
                 FROM project_permissions
                 WHERE project_uuid = ?1;",
                [project_id.to_string()],
                |row| {
                    Ok(Permissions {
                        contains_human_data: Answer::from_option(row.get(0)?),
                        irb_required: Answer::from_option(row.get(1)?),
                        notes: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(permissions.unwrap_or_default())
    }

    fn save_deidentification(
        &self,
        project_id: ProjectId,
        deid: &Deidentification,
    ) -> RepoResult<()> {
        self.write_section(project_id, |tx, project_uuid| {
            tx.execute(
                "INSERT INTO project_deidentification (project_uuid, strategy, notes)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (project_uuid) DO UPDATE SET
                    strategy = excluded.strategy,
                    notes = excluded.notes;",
                params![project_uuid, deid.strategy.as_str(), deid.notes.as_str()],
            )?;
            Ok(())
        })
    }

    fn get_deidentification(&self, project_id: ProjectId) -> RepoResult<Deidentification> {
        let deid = self
            .conn
            .query_row(
                "SELECT strategy, notes
                 FROM project_deidentification
                 WHERE project_uuid = ?1;",
                [project_id.to_string()],
                |row| {
                    Ok(Deidentification {
                        strategy: row.get(0)?,
                        notes: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(deid.unwrap_or_default())
    }

    fn replace_samples(&self, project_id: ProjectId, table: &SampleTable) -> RepoResult<()> {
        let columns_json = serde_json::to_string(&table.columns)
            .map_err(|err| RepoError::InvalidData(format!("unserializable sample columns: {err}")))?;
        let mut encoded_rows = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let encoded = serde_json::to_string(row)
                .map_err(|err| RepoError::InvalidData(format!("unserializable sample row: {err}")))?;
            encoded_rows.push(encoded);
        }
        let imported_at = table
            .imported_at
            .unwrap_or_else(crate::model::timestamp::now_epoch_ms);

        self.write_section(project_id, |tx, project_uuid| {
            tx.execute(
                "DELETE FROM sample_rows WHERE project_uuid = ?1;",
                [project_uuid],
            )?;
            tx.execute(
                "INSERT INTO sample_tables (project_uuid, columns_json, source_name, imported_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (project_uuid) DO UPDATE SET
                    columns_json = excluded.columns_json,
                    source_name = excluded.source_name,
                    imported_at = excluded.imported_at;",
                params![
                    project_uuid,
                    columns_json.as_str(),
                    table.source_name.as_deref(),
                    imported_at
                ],
            )?;

            let mut insert = tx.prepare(
                "INSERT INTO sample_rows (project_uuid, row_index, record_json)
                 VALUES (?1, ?2, ?3);",
            )?;
            for (index, encoded) in encoded_rows.iter().enumerate() {
                let row_index = i64::try_from(index).map_err(|_| {
                    RepoError::InvalidData(format!("sample row index {index} out of range"))
                })?;
                insert.execute(params![project_uuid, row_index, encoded.as_str()])?;
            }
            Ok(())
        })
    }

    fn get_samples(&self, project_id: ProjectId) -> RepoResult<SampleTable> {
        let project_uuid = project_id.to_string();
        let header = self
            .conn
            .query_row(
                "SELECT columns_json, source_name, imported_at
                 FROM sample_tables
                 WHERE project_uuid = ?1;",
                [project_uuid.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((columns_json, source_name, imported_at)) = header else {
            return Ok(SampleTable::default());
        };

        let columns: Vec<String> = serde_json::from_str(&columns_json).map_err(|err| {
            RepoError::InvalidData(format!("invalid sample_tables.columns_json: {err}"))
        })?;

        let mut stmt = self.conn.prepare(
            "SELECT record_json
             FROM sample_rows
             WHERE project_uuid = ?1
             ORDER BY row_index ASC;",
        )?;
        let mut rows = stmt.query([project_uuid.as_str()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let record_json: String = row.get(0)?;
            let record: SampleRow = serde_json::from_str(&record_json).map_err(|err| {
                RepoError::InvalidData(format!("invalid sample_rows.record_json: {err}"))
            })?;
            records.push(record);
        }

        Ok(SampleTable {
            columns,
            rows: records,
            source_name,
            imported_at: Some(imported_at),
        })
    }

    fn save_repository(
        &self,
        project_id: ProjectId,
        selection: &RepositorySelection,
    ) -> RepoResult<()> {
        self.write_section(project_id, |tx, project_uuid| {
            tx.execute(
                "INSERT INTO project_repository (project_uuid, choice, notes)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (project_uuid) DO UPDATE SET
                    choice = excluded.choice,
                    notes = excluded.notes;",
                params![
                    project_uuid,
                    selection.choice.map(TargetRepository::label),
                    selection.notes.as_str()
                ],
            )?;
            Ok(())
        })
    }

    fn get_repository(&self, project_id: ProjectId) -> RepoResult<RepositorySelection> {
        let stored = self
            .conn
            .query_row(
                "SELECT choice, notes
                 FROM project_repository
                 WHERE project_uuid = ?1;",
                [project_id.to_string()],
                |row| Ok((row.get::<_, Option<String>>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        let Some((choice_text, notes)) = stored else {
            return Ok(RepositorySelection::default());
        };

        let choice = match choice_text {
            Some(value) => Some(TargetRepository::from_str(&value).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid repository `{value}` in project_repository.choice"
                ))
            })?),
            None => None,
        };

        Ok(RepositorySelection { choice, notes })
    }

    fn record_export(&self, record: &ExportRecord) -> RepoResult<()> {
        self.write_section(record.project_id, |tx, project_uuid| {
            tx.execute(
                "INSERT INTO exports (uuid, project_uuid, created_at, summary, file_path)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    record.id.to_string(),
                    project_uuid,
                    record.created_at,
                    record.summary.as_str(),
                    record.file_path.as_str()
                ],
            )?;
            Ok(())
        })
    }

    fn list_exports(&self, project_id: ProjectId) -> RepoResult<Vec<ExportRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, created_at, summary, file_path
             FROM exports
             WHERE project_uuid = ?1
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            records.push(ExportRecord {
                id: parse_uuid(&uuid_text, "exports.uuid")?,
                project_id,
                created_at: row.get("created_at")?,
                summary: row.get("summary")?,
                file_path: row.get("file_path")?,
            });
        }
        Ok(records)
    }
}
