//! Text analysis for EquiScribe dictation.
//!
//! Builds the prompts, parses the structured response into
//! [`AnalysisResult`](equiscribe_core::models::AnalysisResult), and ships
//! a pattern-matching [`MockAnalyzer`] for offline use. The Gemini client
//! lives behind the `gemini` feature.

pub mod extraction;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod prompts;

pub use extraction::*;
#[cfg(feature = "gemini")]
pub use gemini::GeminiAnalyzer;
pub use prompts::*;
