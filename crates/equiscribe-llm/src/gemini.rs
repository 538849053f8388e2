//! Gemini REST analyzer.

use std::time::Duration;

use equiscribe_core::config::AnalyzerSettings;
use equiscribe_core::models::{AnalysisError, AnalysisResult, AnalysisScope, TextAnalyzer};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::extraction::parse_analysis_response;
use crate::prompts::{make_prompt, response_schema, SYSTEM_PROMPT};

/// Analyzer backed by the Gemini `generateContent` endpoint.
pub struct GeminiAnalyzer {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiAnalyzer {
    /// Build from settings. Fails when the API key variable is unset.
    pub fn from_settings(settings: &AnalyzerSettings) -> Result<Self, AnalysisError> {
        let api_key = settings.api_key().ok_or_else(|| {
            AnalysisError::Service(format!("{} is not set", settings.api_key_env))
        })?;
        Self::new(settings, api_key)
    }

    pub fn new(settings: &AnalyzerSettings, api_key: String) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn request_body(transcript: &str, scope: AnalysisScope) -> Value {
        json!({
            "systemInstruction": { "parts": [{ "text": SYSTEM_PROMPT }] },
            "contents": [{
                "role": "user",
                "parts": [{ "text": make_prompt(transcript, scope) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(scope)
            }
        })
    }
}

/// Concatenate the text parts of the first candidate.
pub fn candidate_text(body: &Value) -> Result<String, AnalysisError> {
    let parts = body["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| AnalysisError::InvalidFormat("Response has no candidate parts".into()))?;
    let text: String = parts
        .iter()
        .filter(|part| !part["thought"].as_bool().unwrap_or(false))
        .filter_map(|part| part["text"].as_str())
        .collect();
    if text.trim().is_empty() {
        return Err(AnalysisError::InvalidFormat("Response text is empty".into()));
    }
    Ok(text)
}

impl TextAnalyzer for GeminiAnalyzer {
    fn analyze(&self, transcript: &str, scope: AnalysisScope) -> Result<AnalysisResult, AnalysisError> {
        if transcript.trim().is_empty() {
            return Err(AnalysisError::EmptyTranscript);
        }

        info!(model = self.model.as_str(), scope = ?scope, chars = transcript.len(), "Requesting analysis");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(transcript, scope))
            .send()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), "Analysis service returned an error");
            return Err(AnalysisError::Service(format!(
                "HTTP {}: {}",
                status.as_u16(),
                detail.chars().take(300).collect::<String>()
            )));
        }

        let body: Value = response
            .json()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;
        parse_analysis_response(&candidate_text(&body)?)
    }
}
