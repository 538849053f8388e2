//! Prompts for radiography dictation analysis.
//!
//! The analyzer is asked for JSON only; [`response_schema`] constrains the
//! shape where the service supports structured output.

use equiscribe_core::models::{AnalysisScope, ANATOMICAL_REGIONS, DEFAULT_COMMENT};
use serde_json::{json, Value};

/// Role given to the model for every request.
pub const SYSTEM_PROMPT: &str =
    "Tu es un assistant vétérinaire expert en radiographie équine. Tu réponds exclusivement en JSON.";

fn region_list() -> String {
    ANATOMICAL_REGIONS.join(", ")
}

/// Prompt for dictation made while editing one report.
pub fn make_targeted_prompt(transcript: &str) -> String {
    format!(
        r#"Analyse la transcription suivante : "{transcript}"
Régions disponibles : {regions}
Règles impératives :
- Si l'utilisateur mentionne explicitement "RAS" ou "normal" pour une région : le commentaire DOIT être exactement "{default}" et le grade doit être 0.
- Si une région est saine ou non mentionnée comme pathologique : le commentaire DOIT être "{default}" et le grade doit être 0.
- Si une lésion est décrite : fournis une description précise et détermine le grade 1-4 selon la sévérité.
- Utilise exactement les libellés de région ci-dessus.
- Retourne exclusivement un JSON avec un tableau "regions" d'objets {{"label", "comment", "grade"}}."#,
        transcript = transcript,
        regions = region_list(),
        default = DEFAULT_COMMENT,
    )
}

/// Prompt for a whole consultation; also extracts the horse name.
pub fn make_session_prompt(transcript: &str) -> String {
    format!(
        r#"Analyse cette transcription complète de consultation :
"{transcript}"

1. Extrais le NOM DU CHEVAL si mentionné.
2. Pour chaque région anatomique mentionnée parmi : {regions}, fournis le commentaire et le grade (0 à 4).
3. RÈGLE CRUCIALE : si l'utilisateur mentionne "RAS" ou si la région est saine, le commentaire DOIT être "{default}" et le grade 0.
4. Si une région n'est PAS mentionnée du tout dans la transcription, ne l'inclus pas dans la réponse.

Retourne un JSON avec "horseName" et "regions"."#,
        transcript = transcript,
        regions = region_list(),
        default = DEFAULT_COMMENT,
    )
}

pub fn make_prompt(transcript: &str, scope: AnalysisScope) -> String {
    match scope {
        AnalysisScope::Targeted => make_targeted_prompt(transcript),
        AnalysisScope::Session => make_session_prompt(transcript),
    }
}

/// Structured-output schema for the analyzer response.
pub fn response_schema(scope: AnalysisScope) -> Value {
    let region = json!({
        "type": "OBJECT",
        "properties": {
            "label": { "type": "STRING" },
            "comment": { "type": "STRING" },
            "grade": { "type": "INTEGER" }
        },
        "required": ["label", "comment", "grade"]
    });

    let mut properties = json!({
        "regions": { "type": "ARRAY", "items": region }
    });
    if scope == AnalysisScope::Session {
        properties["horseName"] = json!({
            "type": "STRING",
            "description": "Nom du cheval extrait"
        });
    }

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": ["regions"]
    })
}
