//! End-to-end report scenarios: scoring, reconciliation, locks and lifecycle.

use equiscribe_core::config::ReportDefaults;
use equiscribe_core::editor::{EditorError, ReportEditor};
use equiscribe_core::export::JsonRenderer;
use equiscribe_core::ledger::{resolve_suggestion, RegionLedger, RegionPatch};
use equiscribe_core::models::{
    AnalysisResult, AnalysisScope, Grade, RegionSuggestion, ReportStatus, ANATOMICAL_REGIONS,
    DEFAULT_COMMENT,
};
use equiscribe_core::Database;

/// Suggestion case with its expected resolution.
struct SuggestionCase {
    id: &'static str,
    comment: Option<&'static str>,
    grade: Option<i64>,
    expected_comment: &'static str,
    expected_grade: Grade,
}

fn suggestion_cases() -> Vec<SuggestionCase> {
    vec![
        SuggestionCase {
            id: "lesion-kept",
            comment: Some("Pincement de l'interligne"),
            grade: Some(3),
            expected_comment: "Pincement de l'interligne",
            expected_grade: Grade::G3,
        },
        SuggestionCase {
            id: "empty-comment-forces-zero",
            comment: Some(""),
            grade: Some(2),
            expected_comment: DEFAULT_COMMENT,
            expected_grade: Grade::G0,
        },
        SuggestionCase {
            id: "missing-comment",
            comment: None,
            grade: Some(4),
            expected_comment: DEFAULT_COMMENT,
            expected_grade: Grade::G0,
        },
        SuggestionCase {
            id: "ras-marker",
            comment: Some("ras"),
            grade: Some(3),
            expected_comment: "ras",
            expected_grade: Grade::G0,
        },
        SuggestionCase {
            id: "default-comment",
            comment: Some(DEFAULT_COMMENT),
            grade: Some(1),
            expected_comment: DEFAULT_COMMENT,
            expected_grade: Grade::G0,
        },
        SuggestionCase {
            id: "grade-out-of-range",
            comment: Some("Ostéophyte"),
            grade: Some(9),
            expected_comment: "Ostéophyte",
            expected_grade: Grade::G0,
        },
        SuggestionCase {
            id: "grade-missing",
            comment: Some("Ostéophyte"),
            grade: None,
            expected_comment: "Ostéophyte",
            expected_grade: Grade::G0,
        },
    ]
}

#[test]
fn test_suggestion_resolution_cases() {
    for case in suggestion_cases() {
        let suggestion = RegionSuggestion {
            label: "Jarret D".into(),
            comment: case.comment.map(String::from),
            grade: case.grade,
        };
        let (comment, grade) = resolve_suggestion(&suggestion);
        assert_eq!(comment, case.expected_comment, "case {}", case.id);
        assert_eq!(grade, case.expected_grade, "case {}", case.id);
    }
}

#[test]
fn test_fresh_report_scores_zero() {
    let editor = ReportEditor::new(&ReportDefaults::default());
    let regions = editor.regions();

    assert_eq!(regions.entries().len(), ANATOMICAL_REGIONS.len());
    assert!(regions.iter().all(|r| r.grade == Grade::G0 && r.is_included && !r.is_locked));
    assert!(regions.iter().all(|r| r.comment == DEFAULT_COMMENT));
    assert_eq!(editor.total_score(), 0);
}

#[test]
fn test_excluded_regions_do_not_score() {
    let mut ledger = RegionLedger::new();
    ledger
        .update_region("Jarret D", RegionPatch::grade(Grade::G3))
        .unwrap();
    ledger
        .update_region("Pieds", RegionPatch::grade(Grade::G4).with_included(false))
        .unwrap();

    assert_eq!(ledger.total_score(), 4);
}

#[test]
fn test_empty_suggested_comment_forces_default() {
    let mut ledger = RegionLedger::new();
    let outcome = ledger.apply_suggestions(
        &[RegionSuggestion::new("Jarret D", "", 2)],
        AnalysisScope::Targeted,
    );

    assert_eq!(outcome.applied, vec!["Jarret D".to_string()]);
    let entry = ledger.get("Jarret D").unwrap();
    assert_eq!(entry.comment, DEFAULT_COMMENT);
    assert_eq!(entry.grade, Grade::G0);
    assert!(!entry.is_locked);
}

#[test]
fn test_manual_edit_survives_session_analysis() {
    let mut ledger = RegionLedger::new();
    ledger
        .update_region("Jarret D", RegionPatch::comment("Légère irrégularité"))
        .unwrap();
    let before = ledger.get("Jarret D").unwrap().clone();

    let outcome = ledger.apply_suggestions(
        &[RegionSuggestion::new("Jarret D", "Pincement sévère", 4)],
        AnalysisScope::Session,
    );

    assert_eq!(outcome.skipped_locked, vec!["Jarret D".to_string()]);
    assert_eq!(ledger.get("Jarret D").unwrap(), &before);
}

#[test]
fn test_unknown_labels_are_ignored() {
    let mut ledger = RegionLedger::new();
    let outcome = ledger.apply_suggestions(
        &[
            RegionSuggestion::new("Queue", "Fracture", 4),
            RegionSuggestion::new("jarret d", "Pincement", 2),
        ],
        AnalysisScope::Targeted,
    );

    assert_eq!(outcome.unknown.len(), 2);
    assert_eq!(ledger.total_score(), 0);
    assert_eq!(ledger.revision(), 0);
}

#[test]
fn test_export_and_send_is_final() {
    let mut db = Database::open_in_memory().unwrap();
    let mut editor = ReportEditor::new(&ReportDefaults::default());
    editor.set_horse_name("Quaprice");
    editor.save_draft(&db).unwrap();

    editor.export_and_send(&db, &JsonRenderer).unwrap();
    let id = editor.id().to_string();
    assert_eq!(db.get_report(&id).unwrap().unwrap().status, ReportStatus::Sent);

    for target in [ReportStatus::Draft, ReportStatus::Validated] {
        let err = editor.save(&db, Some(target)).unwrap_err();
        assert!(matches!(err, EditorError::InvalidTransition(_)));
    }

    // Re-opening from storage does not reset the lifecycle either
    let mut reopened = ReportEditor::open(db.get_report(&id).unwrap().unwrap());
    assert!(reopened.save(&db, Some(ReportStatus::Draft)).is_err());

    // Nor does the bulk path
    assert_eq!(db.mark_reports_sent(&[id.clone()]).unwrap(), 1);
    assert_eq!(db.get_report(&id).unwrap().unwrap().status, ReportStatus::Sent);
}

#[test]
fn test_session_then_targeted_refinement() {
    let defaults = ReportDefaults::default();
    let session = AnalysisResult {
        horse_name: Some("  Quaprice ".into()),
        regions: vec![
            RegionSuggestion::new("Boulet Ant. G", "Remaniement", 2),
            RegionSuggestion::new("Pieds", "RAS", 3),
        ],
    };
    let mut editor = ReportEditor::from_session(&defaults, &session);
    assert_eq!(editor.report().horse_name, "Quaprice");
    assert_eq!(editor.total_score(), 2);

    // The vet overrides one region, then dictates again
    editor
        .update_region("Boulet Ant. G", RegionPatch::grade(Grade::G1))
        .unwrap();
    editor.transcript_mut().edit("boulet antérieur gauche grade 4, pieds seime");
    let ticket = editor.begin_analysis().unwrap();
    let outcome = editor
        .apply_analysis(
            &ticket,
            &AnalysisResult {
                horse_name: None,
                regions: vec![
                    RegionSuggestion::new("Boulet Ant. G", "Remaniement marqué", 4),
                    RegionSuggestion::new("Pieds", "Seime", 2),
                ],
            },
        )
        .unwrap();

    assert_eq!(outcome.skipped_locked, vec!["Boulet Ant. G".to_string()]);
    assert_eq!(editor.regions().get("Boulet Ant. G").unwrap().grade, Grade::G1);
    assert_eq!(editor.total_score(), 1 + 2);
}
