//! Dictation buffer fed by a speech-capture source.
//!
//! Only final chunks become part of the transcript. Interim text is kept for
//! display until the next chunk replaces it.

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::AnalysisScope;

/// Speech-capture errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Microphone permission denied")]
    PermissionDenied,

    #[error("Speech capture unavailable: {0}")]
    Unavailable(String),

    #[error("Speech capture device error: {0}")]
    Device(String),
}

/// One recognized chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureEvent {
    pub text: String,
    pub is_final: bool,
}

impl CaptureEvent {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Host-owned speech recognizer. Events are pushed into a [`TranscriptBuffer`].
pub trait CaptureSource {
    fn start(&mut self) -> Result<(), CaptureError>;

    fn stop(&mut self);
}

/// Accumulated dictation for one analysis scope.
#[derive(Debug, Clone)]
pub struct TranscriptBuffer {
    scope: AnalysisScope,
    final_text: String,
    interim: String,
    recording: bool,
}

impl TranscriptBuffer {
    pub fn new(scope: AnalysisScope) -> Self {
        Self {
            scope,
            final_text: String::new(),
            interim: String::new(),
            recording: false,
        }
    }

    pub fn scope(&self) -> AnalysisScope {
        self.scope
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Committed transcript.
    pub fn final_text(&self) -> &str {
        &self.final_text
    }

    /// Pending interim text, display only.
    pub fn interim(&self) -> &str {
        &self.interim
    }

    /// Text to show while dictating.
    pub fn display_text(&self) -> String {
        if self.interim.is_empty() {
            self.final_text.clone()
        } else {
            format!("{}{}", self.final_text, self.interim)
        }
    }

    /// Text to send for analysis.
    ///
    /// A session analysis also takes the trailing interim chunk, since the
    /// recording may be cut before the recognizer finalizes it.
    pub fn text_for_analysis(&self) -> String {
        match self.scope {
            AnalysisScope::Targeted => self.final_text.trim().to_string(),
            AnalysisScope::Session => format!("{} {}", self.final_text, self.interim)
                .trim()
                .to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text_for_analysis().is_empty()
    }

    /// Start recording. A targeted dictation starts from an empty buffer.
    pub fn start_recording(&mut self, source: &mut dyn CaptureSource) -> Result<(), CaptureError> {
        if self.scope == AnalysisScope::Targeted {
            self.clear();
        }
        if let Err(e) = source.start() {
            warn!(error = %e, "Speech capture failed to start");
            self.recording = false;
            return Err(e);
        }
        self.recording = true;
        debug!(scope = ?self.scope, "Recording started");
        Ok(())
    }

    pub fn stop_recording(&mut self, source: &mut dyn CaptureSource) {
        source.stop();
        self.recording = false;
        debug!(scope = ?self.scope, "Recording stopped");
    }

    /// Feed one recognized chunk.
    pub fn push(&mut self, event: CaptureEvent) {
        if event.is_final {
            self.final_text.push_str(&event.text);
            if self.scope == AnalysisScope::Session {
                self.final_text.push(' ');
            }
            self.interim.clear();
        } else {
            self.interim = event.text;
        }
    }

    /// The recognizer reported an error: recording just stops.
    pub fn on_error(&mut self, error: &CaptureError) {
        warn!(error = %error, "Speech capture error, recording stopped");
        self.recording = false;
    }

    /// Replace the transcript with manually edited text.
    ///
    /// Refused while recording.
    pub fn edit(&mut self, text: impl Into<String>) -> bool {
        if self.recording {
            return false;
        }
        self.final_text = text.into();
        self.interim.clear();
        true
    }

    pub fn clear(&mut self) {
        self.final_text.clear();
        self.interim.clear();
    }
}
