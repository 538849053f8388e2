//! Region suggestion extraction from analyzer output.

use equiscribe_core::models::{
    AnalysisError, AnalysisResult, AnalysisScope, RegionSuggestion, TextAnalyzer,
    NOTHING_TO_REPORT,
};
use tracing::debug;

/// Parse analyzer output JSON into region suggestions.
pub fn parse_analysis_response(json: &str) -> Result<AnalysisResult, AnalysisError> {
    // Models sometimes wrap the object in prose or code fences
    let json_start = json.find('{').ok_or_else(|| {
        AnalysisError::InvalidFormat("No JSON object found in response".into())
    })?;
    let json_end = json.rfind('}').ok_or_else(|| {
        AnalysisError::InvalidFormat("No closing brace found in response".into())
    })?;
    if json_end < json_start {
        return Err(AnalysisError::InvalidFormat("Unbalanced JSON object in response".into()));
    }

    let result: AnalysisResult = serde_json::from_str(&json[json_start..=json_end])?;
    debug!(regions = result.regions.len(), "Parsed analysis response");
    Ok(result)
}

/// Mock analyzer for testing without a network service.
///
/// Each sentence naming a region becomes one suggestion. "RAS" or "normal"
/// give a grade 0 finding; "grade N" sets the grade.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockAnalyzer;

impl MockAnalyzer {
    pub fn extract(transcript: &str, scope: AnalysisScope) -> AnalysisResult {
        let mut regions: Vec<RegionSuggestion> = Vec::new();

        for sentence in transcript.split(['.', ';', '\n']) {
            let sentence = sentence.trim();
            let words = words(sentence);
            let Some(label) = detect_region(&words) else {
                continue;
            };

            let suggestion = if words.iter().any(|w| w == "ras" || w == "normal" || w == "normale") {
                RegionSuggestion::new(label, NOTHING_TO_REPORT, 0)
            } else {
                RegionSuggestion {
                    label: label.to_string(),
                    comment: Some(strip_grade(sentence)),
                    grade: extract_grade(&words),
                }
            };

            // Last mention wins
            regions.retain(|r| r.label != suggestion.label);
            regions.push(suggestion);
        }

        let horse_name = match scope {
            AnalysisScope::Session => extract_horse_name(transcript),
            AnalysisScope::Targeted => None,
        };

        AnalysisResult { horse_name, regions }
    }
}

impl TextAnalyzer for MockAnalyzer {
    fn analyze(&self, transcript: &str, scope: AnalysisScope) -> Result<AnalysisResult, AnalysisError> {
        if transcript.trim().is_empty() {
            return Err(AnalysisError::EmptyTranscript);
        }
        Ok(Self::extract(transcript, scope))
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn has(words: &[String], prefix: &str) -> bool {
    words.iter().any(|w| w.starts_with(prefix))
}

/// Map a sentence to a canonical region label.
fn detect_region(words: &[String]) -> Option<&'static str> {
    let left = has(words, "gauche");
    let right = has(words, "droit");
    let rear = has(words, "post");
    let side = |g: &'static str, d: &'static str| -> Option<&'static str> {
        if left {
            Some(g)
        } else if right {
            Some(d)
        } else {
            None
        }
    };

    if has(words, "naviculaire") {
        side("Naviculaire Ant. G", "Naviculaire Ant. D")
    } else if has(words, "boulet") {
        if rear {
            side("Boulet Post. G", "Boulet Post. D")
        } else {
            side("Boulet Ant. G", "Boulet Ant. D")
        }
    } else if has(words, "jarret") {
        side("Jarret G", "Jarret D")
    } else if has(words, "grasset") {
        side("Grasset G", "Grasset D")
    } else if words.iter().any(|w| w == "pied" || w == "pieds") {
        Some("Pieds")
    } else if words.iter().any(|w| w == "dos" || w == "rachis") {
        Some("Dos / Rachis")
    } else {
        None
    }
}

fn extract_grade(words: &[String]) -> Option<i64> {
    words
        .windows(2)
        .find(|pair| pair[0] == "grade")
        .and_then(|pair| pair[1].parse().ok())
}

fn strip_grade(sentence: &str) -> String {
    let lower = sentence.to_lowercase();
    // Lowercasing can shift byte offsets outside ASCII
    match lower.find("grade").and_then(|pos| sentence.get(..pos)) {
        Some(head) if lower.len() == sentence.len() => {
            head.trim().trim_end_matches(',').trim().to_string()
        }
        _ => sentence.to_string(),
    }
}

fn extract_horse_name(transcript: &str) -> Option<String> {
    let tokens: Vec<&str> = transcript
        .split(|c: char| c.is_whitespace() || c == ',' || c == '.' || c == ':')
        .filter(|t| !t.is_empty())
        .collect();
    tokens
        .windows(2)
        .find(|pair| pair[0].eq_ignore_ascii_case("cheval"))
        .map(|pair| pair[1].to_string())
}
