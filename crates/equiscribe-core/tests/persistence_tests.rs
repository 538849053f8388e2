//! Persistence round trips against a file-backed database.

use equiscribe_core::config::{CoreConfig, ReportDefaults};
use equiscribe_core::editor::ReportEditor;
use equiscribe_core::export::{ReportDocument, ReportExporter};
use equiscribe_core::ledger::RegionPatch;
use equiscribe_core::models::{Client, Grade, ReportStatus};
use equiscribe_core::Database;
use tempfile::TempDir;

fn open_temp() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("equiscribe.db")).unwrap();
    (dir, db)
}

#[test]
fn test_report_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("equiscribe.db");

    let (id, expected) = {
        let db = Database::open(&path).unwrap();
        let mut editor = ReportEditor::new(&ReportDefaults::default());
        editor.set_horse_name("Quaprice");
        editor
            .update_region("Grasset G", RegionPatch::comment("Kyste sous-chondral").with_grade(Grade::G2))
            .unwrap();
        editor.set_included("Dos / Rachis", false).unwrap();
        editor.validate(&db).unwrap();
        (editor.id().to_string(), editor.report().clone())
    };

    let db = Database::open(&path).unwrap();
    let stored = db.get_report(&id).unwrap().unwrap();
    assert_eq!(stored, expected);
    assert_eq!(stored.status, ReportStatus::Validated);
    assert!(stored.regions.get("Grasset G").unwrap().is_locked);
    assert!(!stored.regions.get("Dos / Rachis").unwrap().is_included);
    assert_eq!(stored.total_score(), 2);
}

#[test]
fn test_resave_keeps_single_record() {
    let (_dir, db) = open_temp();
    let mut editor = ReportEditor::new(&ReportDefaults::default());
    editor.save_draft(&db).unwrap();
    editor.set_horse_name("Ulysse");
    editor.save_draft(&db).unwrap();
    editor.validate(&db).unwrap();

    let reports = db.list_reports().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].horse_name, "Ulysse");
    assert_eq!(reports[0].created_at, editor.report().created_at);
}

#[test]
fn test_client_delete_unlinks_reports() {
    let (_dir, db) = open_temp();
    let client = Client::new("Haras du Pin".into());
    db.save_client(&client).unwrap();

    let mut editor = ReportEditor::new(&ReportDefaults::default());
    editor.set_horse_name("Quaprice");
    editor.set_client(Some(client.id.clone()));
    editor.save_draft(&db).unwrap();

    assert_eq!(db.client_horses(&client.id).unwrap(), vec!["Quaprice".to_string()]);
    assert!(db.delete_client(&client.id).unwrap());

    let stored = db.get_report(editor.id()).unwrap().unwrap();
    assert_eq!(stored.client_id, None);
    assert!(db.list_reports_for_client(&client.id).unwrap().is_empty());
}

#[test]
fn test_open_editor_saves_after_client_deleted() {
    let (_dir, db) = open_temp();
    let client = Client::new("Haras du Pin".into());
    db.save_client(&client).unwrap();

    let mut editor = ReportEditor::new(&ReportDefaults::default());
    editor.set_client(Some(client.id.clone()));
    editor.save_draft(&db).unwrap();

    db.delete_client(&client.id).unwrap();

    // The editor still carries the stale link
    editor.update_region("Pieds", RegionPatch::grade(Grade::G2)).unwrap();
    editor.save_draft(&db).unwrap();
    editor.validate(&db).unwrap();

    let stored = db.get_report(editor.id()).unwrap().unwrap();
    assert_eq!(stored.total_score(), 2);
    assert_eq!(stored.status, ReportStatus::Validated);

    let mut unknown = ReportEditor::new(&ReportDefaults::default());
    unknown.set_client(Some("never-existed".into()));
    unknown.save_draft(&db).unwrap();
    assert_eq!(
        db.get_report(unknown.id()).unwrap().unwrap().client_id.as_deref(),
        Some("never-existed")
    );
}

#[test]
fn test_stats_and_search() {
    let (_dir, db) = open_temp();
    for (horse, status) in [
        ("Quaprice", None),
        ("Ulysse", Some(ReportStatus::Validated)),
        ("Tornado", Some(ReportStatus::Sent)),
    ] {
        let mut editor = ReportEditor::new(&ReportDefaults::default());
        editor.set_horse_name(horse);
        editor.save(&db, status).unwrap();
    }

    let stats = db.report_stats().unwrap();
    assert_eq!((stats.total, stats.draft, stats.validated, stats.sent), (3, 1, 1, 1));

    let found = db.search_reports("ulys").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].horse_name, "Ulysse");
    assert_eq!(db.search_reports("schlotterer").unwrap().len(), 3);
    assert_eq!(db.search_reports("  ").unwrap().len(), 3);
}

#[test]
fn test_export_matches_editor_document() {
    let (_dir, db) = open_temp();
    let mut editor = ReportEditor::new(&ReportDefaults::default());
    editor.set_horse_name("Quaprice");
    editor.update_region("Jarret D", RegionPatch::grade(Grade::G3)).unwrap();
    editor.set_included("Pieds", false).unwrap();
    editor.save_draft(&db).unwrap();

    let exported = ReportExporter::new(&db).export_by_id(editor.id()).unwrap();
    let local = ReportDocument::render(editor.report());
    assert_eq!(exported, local);
    assert_eq!(exported.rows.len(), 11);
    assert_eq!(exported.total_score, 4);
    assert_eq!(exported.fingerprint().unwrap(), local.fingerprint().unwrap());
}

#[test]
fn test_config_points_at_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("reports.db");
    let config_path = dir.path().join("equiscribe.toml");
    std::fs::write(
        &config_path,
        format!(
            "database_path = {:?}\n\n[report]\nveterinary = \"Dr Martin\"\n",
            db_path.to_string_lossy()
        ),
    )
    .unwrap();

    let config = CoreConfig::load(&config_path).unwrap();
    let db = Database::open(&config.database_path).unwrap();
    let mut editor = ReportEditor::new(&config.report);
    editor.save_draft(&db).unwrap();

    assert!(db_path.exists());
    assert_eq!(db.get_report(editor.id()).unwrap().unwrap().veterinary, "Dr Martin");
}
