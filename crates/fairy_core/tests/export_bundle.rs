use fairy_core::db::open_db_in_memory;
use fairy_core::{
    Answer, CheckStatus, Deidentification, Permissions, ProjectService, ReadinessCheck,
    RepositorySelection, SqliteProjectRepository, SqliteSectionRepository, TargetRepository,
    WizardService,
};
use serde_json::Value;
use std::path::Path;

#[test]
fn readiness_tracks_wizard_progress() {
    let conn = open_db_in_memory().unwrap();
    let projects = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    let wizard = WizardService::new(
        SqliteProjectRepository::try_new(&conn).unwrap(),
        SqliteSectionRepository::try_new(&conn).unwrap(),
    );
    let project = projects.create_project("Study", "Cohort").unwrap().id;

    let initial = wizard.assess_readiness(project).unwrap();
    assert!(!initial.is_ready());
    assert_eq!(
        initial
            .outcome(ReadinessCheck::DataInventory)
            .map(|o| o.status),
        Some(CheckStatus::Fail)
    );

    wizard
        .add_inventory_item(project, "reads", "gs://bucket/reads", "")
        .unwrap();
    wizard
        .save_permissions(project, &Permissions::new(Answer::Yes, Answer::Yes, ""))
        .unwrap();
    wizard
        .import_samples_csv(project, "sample_id\nS1\n".as_bytes(), None)
        .unwrap();
    wizard
        .save_repository(
            project,
            &RepositorySelection::new(Some(TargetRepository::DbGap), ""),
        )
        .unwrap();

    let pending = wizard.assess_readiness(project).unwrap();
    assert_eq!(
        pending
            .outcome(ReadinessCheck::Deidentification)
            .map(|o| o.status),
        Some(CheckStatus::Fail)
    );

    wizard
        .save_deidentification(project, &Deidentification::new("HIPAA Safe Harbor", ""))
        .unwrap();
    let ready = wizard.assess_readiness(project).unwrap();
    assert!(ready.is_ready());
    assert_eq!(ready.passed_count(), ready.outcomes.len());
}

#[test]
fn export_writes_bundle_and_records_it() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let projects = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    let wizard = WizardService::new(
        SqliteProjectRepository::try_new(&conn).unwrap(),
        SqliteSectionRepository::try_new(&conn).unwrap(),
    );
    let project = projects.create_project("Study", "Cohort").unwrap();
    wizard
        .add_inventory_item(project.id, "reads", "https://box.com/s/abc", "")
        .unwrap();
    wizard
        .import_samples_csv(project.id, "sample_id,age\nS1,3\nS2,\n".as_bytes(), None)
        .unwrap();

    let first = wizard.generate_export(project.id, dir.path()).unwrap();
    let second = wizard.generate_export(project.id, dir.path()).unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(
        first.summary,
        "1 inventory item(s), 2 sample row(s); 4/6 checks passed (not ready)"
    );

    let path = Path::new(&first.file_path);
    assert!(path.starts_with(dir.path().join(project.id.to_string())));
    let document: Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(document["format"], "fairy.export");
    assert_eq!(document["export_id"], first.id.to_string());
    assert_eq!(document["project"]["title"], "Study");
    assert_eq!(document["project"]["status"], "In Progress");
    assert!(document["generated_at"].as_str().unwrap().ends_with('Z'));
    assert_eq!(document["data_inventory"][0]["location"], "http");
    assert_eq!(document["metadata"]["rows"][1]["age"], Value::Null);
    assert_eq!(document["permissions"]["contains_human_data"], "unknown");
    assert_eq!(document["repository"]["choice"], Value::Null);
    assert_eq!(document["readiness"]["ready"], false);
    assert_eq!(
        document["readiness"]["outcomes"].as_array().map(Vec::len),
        Some(6)
    );

    let exports = wizard.list_exports(project.id).unwrap();
    assert_eq!(exports.len(), 2);
    assert_eq!(exports[0].id, first.id);
    assert_eq!(exports[1].id, second.id);

    let refreshed = projects.get_project(project.id).unwrap();
    assert!(refreshed.updated_at >= project.updated_at);
}
