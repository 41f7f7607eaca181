use fairy_core::db::open_db_in_memory;
use fairy_core::{
    Answer, Deidentification, LocationKind, Permissions, ProjectId, ProjectRepository,
    ProjectService, ProjectValidationError, RepositorySelection, SectionRepository, ServiceError,
    SqliteProjectRepository, SqliteSectionRepository, TargetRepository, WizardService,
};
use rusqlite::{params, Connection};
use serde_json::json;
use uuid::Uuid;

type SqliteWizard<'conn> =
    WizardService<SqliteProjectRepository<'conn>, SqliteSectionRepository<'conn>>;

fn wizard(conn: &Connection) -> SqliteWizard<'_> {
    WizardService::new(
        SqliteProjectRepository::try_new(conn).unwrap(),
        SqliteSectionRepository::try_new(conn).unwrap(),
    )
}

fn create_project(conn: &Connection) -> ProjectId {
    let service = ProjectService::new(SqliteProjectRepository::try_new(conn).unwrap());
    service.create_project("Study", "Cohort A").unwrap().id
}

fn set_updated_at(conn: &Connection, id: ProjectId, value: i64) {
    conn.execute(
        "UPDATE projects SET updated_at = ?2, created_at = ?2 WHERE uuid = ?1;",
        params![id.to_string(), value],
    )
    .unwrap();
}

fn updated_at(conn: &Connection, id: ProjectId) -> i64 {
    let repo = SqliteProjectRepository::try_new(conn).unwrap();
    repo.get_project(id, true).unwrap().unwrap().updated_at
}

#[test]
fn inventory_keeps_insertion_order_and_classifies_locations() {
    let conn = open_db_in_memory().unwrap();
    let project = create_project(&conn);
    let wizard = wizard(&conn);

    wizard
        .add_inventory_item(project, "FASTQ files (batch A)", "s3://bucket/run1/*.fastq.gz", "")
        .unwrap();
    wizard
        .add_inventory_item(project, " Clinical sheet ", " /mnt/lab/clinical.xlsx ", " v2 ")
        .unwrap();

    let items = wizard.list_inventory(project).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "FASTQ files (batch A)");
    assert_eq!(items[0].location_kind(), LocationKind::S3);
    assert_eq!(items[1].name, "Clinical sheet");
    assert_eq!(items[1].path, "/mnt/lab/clinical.xlsx");
    assert_eq!(items[1].notes, "v2");
    assert_eq!(items[1].location_kind(), LocationKind::Local);
}

#[test]
fn inventory_rejects_blank_name_or_path() {
    let conn = open_db_in_memory().unwrap();
    let project = create_project(&conn);
    let wizard = wizard(&conn);

    let err = wizard
        .add_inventory_item(project, "", "/data", "")
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ProjectValidationError::EmptyInventoryName)
    ));
    let err = wizard
        .add_inventory_item(project, "reads", "  ", "")
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ProjectValidationError::EmptyInventoryPath)
    ));
    assert!(wizard.list_inventory(project).unwrap().is_empty());
}

#[test]
fn section_writes_bump_project_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let project = create_project(&conn);
    let wizard = wizard(&conn);

    set_updated_at(&conn, project, 1_000);
    wizard
        .save_deidentification(project, &Deidentification::new("strategy", ""))
        .unwrap();
    assert!(updated_at(&conn, project) > 1_000);

    set_updated_at(&conn, project, 1_000);
    wizard
        .add_inventory_item(project, "reads", "/data", "")
        .unwrap();
    assert!(updated_at(&conn, project) > 1_000);
}

#[test]
fn permissions_default_to_unknown_and_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let project = create_project(&conn);
    let wizard = wizard(&conn);

    assert_eq!(wizard.get_permissions(project).unwrap(), Permissions::default());

    let saved = wizard
        .save_permissions(
            project,
            &Permissions::new(Answer::Yes, Answer::No, "  consent on file  "),
        )
        .unwrap();
    assert_eq!(saved.contains_human_data, Answer::Yes);
    assert_eq!(saved.irb_required, Answer::No);
    assert_eq!(saved.notes, "consent on file");

    let overwritten = wizard
        .save_permissions(project, &Permissions::new(Answer::Unknown, Answer::Yes, ""))
        .unwrap();
    assert_eq!(overwritten.contains_human_data, Answer::Unknown);
    assert_eq!(overwritten.irb_required, Answer::Yes);

    let stored: Option<bool> = conn
        .query_row(
            "SELECT contains_human_data FROM project_permissions WHERE project_uuid = ?1;",
            [project.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, None);
}

#[test]
fn deidentification_and_repository_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let project = create_project(&conn);
    let wizard = wizard(&conn);

    assert_eq!(
        wizard.get_deidentification(project).unwrap(),
        Deidentification::default()
    );
    let deid = wizard
        .save_deidentification(project, &Deidentification::new(" Safe Harbor ", " dates shifted "))
        .unwrap();
    assert_eq!(deid.strategy, "Safe Harbor");
    assert_eq!(deid.notes, "dates shifted");

    assert_eq!(wizard.get_repository(project).unwrap().choice, None);
    let selection = wizard
        .save_repository(
            project,
            &RepositorySelection::new(Some(TargetRepository::Zenodo), "community: lab"),
        )
        .unwrap();
    assert_eq!(selection.choice, Some(TargetRepository::Zenodo));

    let cleared = wizard
        .save_repository(project, &RepositorySelection::new(None, ""))
        .unwrap();
    assert_eq!(cleared.choice, None);
    assert_eq!(cleared.notes, "");
}

#[test]
fn samples_import_replaces_previous_table() {
    let conn = open_db_in_memory().unwrap();
    let project = create_project(&conn);
    let wizard = wizard(&conn);

    let first = wizard
        .import_samples_csv(
            project,
            "sample_id,tissue,age\nS1,liver,34\nS2,kidney,41\nS3,lung,\n".as_bytes(),
            Some("samples_v1.csv"),
        )
        .unwrap();
    assert_eq!(first.rows.len(), 3);
    assert_eq!(first.source_name.as_deref(), Some("samples_v1.csv"));
    assert!(first.imported_at.is_some());
    assert_eq!(first.rows[1]["age"], json!(41));

    let second = wizard
        .import_samples_csv(project, "id,group\nA,ctrl\n".as_bytes(), None)
        .unwrap();
    assert_eq!(second.columns, vec!["id", "group"]);
    assert_eq!(second.rows.len(), 1);
    assert_eq!(second.source_name, None);

    let stored_rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sample_rows WHERE project_uuid = ?1;",
            [project.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored_rows, 1);
}

#[test]
fn failed_samples_import_keeps_previous_table() {
    let conn = open_db_in_memory().unwrap();
    let project = create_project(&conn);
    let wizard = wizard(&conn);

    wizard
        .import_samples_csv(project, "a,b\n1,2\n".as_bytes(), Some("good.csv"))
        .unwrap();
    let err = wizard
        .import_samples_csv(project, "a,b\n1,2,3\n".as_bytes(), Some("bad.csv"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidCsv(_)));

    let samples = wizard.get_samples(project).unwrap();
    assert_eq!(samples.source_name.as_deref(), Some("good.csv"));
    assert_eq!(samples.rows.len(), 1);
    assert_eq!(samples.rows[0]["b"], json!(2));
}

#[test]
fn unknown_project_fails_before_touching_sections() {
    let conn = open_db_in_memory().unwrap();
    let wizard = wizard(&conn);
    let missing = Uuid::new_v4();

    assert!(matches!(
        wizard.list_inventory(missing).unwrap_err(),
        ServiceError::ProjectNotFound(id) if id == missing
    ));
    assert!(matches!(
        wizard
            .save_permissions(missing, &Permissions::default())
            .unwrap_err(),
        ServiceError::ProjectNotFound(_)
    ));
    assert!(matches!(
        wizard
            .import_samples_csv(missing, "a\n1\n".as_bytes(), None)
            .unwrap_err(),
        ServiceError::ProjectNotFound(_)
    ));

    let sections = SqliteSectionRepository::try_new(&conn).unwrap();
    assert!(sections
        .add_inventory_item(missing, &fairy_core::InventoryItem::new("a", "/b", ""))
        .is_err());
}
