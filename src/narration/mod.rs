//! Question generation, report generation, and spoken narration
//!
//! One collaborator from the orchestrator's point of view. Remote calls
//! are single-attempt with no retry; failure surfaces as an error the
//! caller absorbs into a sentinel or fallback string.

mod gpt;
mod speech;

pub use gpt::{GptConfig, GptNarrator};
pub use speech::{LocalSynthesizer, Synthesizer};

use crate::classifier::VoiceMetrics;
use anyhow::Result;

/// Shown as the sole question when generation fails or comes back empty
pub const QUESTIONS_FAILED_SENTINEL: &str = "❌ Failed to generate questions.";

/// Substituted when report generation fails
pub const REPORT_FALLBACK: &str = "No report available";

#[async_trait::async_trait]
pub trait NarrationService: Send + Sync {
    /// Generate an ordered list of interview questions for a category.
    /// Single attempt; an Err or empty list means generation failed.
    async fn generate_questions(&self, category: &str) -> Result<Vec<String>>;

    /// Generate a feedback report for one answer's metrics. Single
    /// attempt; the caller substitutes [`REPORT_FALLBACK`] on Err.
    async fn generate_report(&self, metrics: &VoiceMetrics) -> Result<String>;

    /// Speak a text, cancelling any utterance already in progress.
    /// Fire-and-forget.
    fn speak(&self, text: &str);

    /// Cancel the in-progress utterance, if any.
    fn stop_speaking(&self);
}

/// Prompt for question generation, matching the production wording.
pub(crate) fn question_prompt(category: &str) -> String {
    format!(
        "Generate 5 job interview questions related to {}. \
         Make sure they are structured and relevant. \
         Output only the questions in a numbered list.",
        category
    )
}

/// Prompt for report generation from one answer's metrics.
pub(crate) fn report_prompt(metrics: &VoiceMetrics) -> String {
    format!(
        "Analyze the following voice interview performance metrics and provide a structured feedback report:\n\n\
         - Pitch: {}\n\
         - Speed: {} ({})\n\
         - Confidence: {}\n\n\
         Provide feedback on the candidate's fluency, articulation, and confidence. \
         Offer practical suggestions for improvement and highlight strengths. \
         Keep the response structured and concise.",
        metrics.pitch, metrics.speed, metrics.speed_category, metrics.confidence
    )
}
