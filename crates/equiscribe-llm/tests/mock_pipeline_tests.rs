//! Dictation to report, through the offline analyzer.

use equiscribe_core::config::ReportDefaults;
use equiscribe_core::editor::{CaptureEvent, ReportEditor, TranscriptBuffer};
use equiscribe_core::models::{AnalysisScope, Grade, DEFAULT_COMMENT};
use equiscribe_llm::MockAnalyzer;

#[test]
fn test_session_dictation_builds_report() {
    let mut buffer = TranscriptBuffer::new(AnalysisScope::Session);
    buffer.push(CaptureEvent::final_text("Cheval Quaprice."));
    buffer.push(CaptureEvent::final_text("Jarret droit pincement grade 3."));
    buffer.push(CaptureEvent::interim("Pieds RAS"));

    let editor =
        ReportEditor::start_session(&ReportDefaults::default(), &buffer, &MockAnalyzer).unwrap();

    assert_eq!(editor.report().horse_name, "Quaprice");
    let jarret = editor.regions().get("Jarret D").unwrap();
    assert_eq!(jarret.grade, Grade::G3);
    assert_eq!(jarret.comment, "Jarret droit pincement");
    assert_eq!(editor.regions().get("Pieds").unwrap().grade, Grade::G0);
    assert_eq!(editor.total_score(), 4);
    assert_eq!(editor.regions().locked_count(), 0);
}

#[test]
fn test_targeted_dictation_respects_manual_edit() {
    let mut editor = ReportEditor::new(&ReportDefaults::default());
    editor
        .update_region(
            "Grasset G",
            equiscribe_core::RegionPatch::comment("Kyste sous-chondral").with_grade(Grade::G2),
        )
        .unwrap();

    editor
        .transcript_mut()
        .edit("Grasset gauche RAS. Boulet antérieur droit fragment grade 1");
    let outcome = editor.analyze_with(&MockAnalyzer).unwrap();

    assert_eq!(outcome.skipped_locked, vec!["Grasset G".to_string()]);
    assert_eq!(editor.regions().get("Grasset G").unwrap().comment, "Kyste sous-chondral");
    assert_eq!(editor.regions().get("Boulet Ant. D").unwrap().grade, Grade::G1);
    assert_eq!(editor.regions().get("Pieds").unwrap().comment, DEFAULT_COMMENT);
    assert_eq!(editor.total_score(), 2 + 1);
}
