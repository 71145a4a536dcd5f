use crate::classifier::{ConfidenceLabel, SpeedCategory, VoiceMetrics};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder answer text; speech-to-text transcription is not wired up
pub const ANSWER_PLACEHOLDER: &str = "User's answer here";

/// An interview category ("Coding", "Business", ...)
///
/// Created lazily the first time a session for a given name saves a
/// result. Name acts as a de-facto unique key; lookups are exact and
/// case-sensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// One question/answer pair, owned by its InterviewResult
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    pub answer: String,
}

impl InterviewQuestion {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: ANSWER_PLACEHOLDER.to_string(),
        }
    }
}

/// Free-text feedback for one result, owned by its InterviewResult
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub text: String,
}

impl InterviewReport {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            text: text.into(),
        }
    }
}

/// One completed answer-analysis cycle
///
/// Owns its questions and report by value. The category linkage is a
/// plain id; membership is recomputed by query rather than maintained
/// through relation rules. Never mutated after creation except to
/// attach the report once it resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewResult {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub pitch: f64,
    pub speed: f64,
    pub speed_category: SpeedCategory,
    pub confidence: ConfidenceLabel,
    pub category_id: Option<Uuid>,
    pub questions: Vec<InterviewQuestion>,
    pub report: Option<InterviewReport>,
}

impl InterviewResult {
    pub fn new(
        metrics: &VoiceMetrics,
        category_id: Option<Uuid>,
        questions: Vec<InterviewQuestion>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            pitch: metrics.pitch,
            speed: metrics.speed,
            speed_category: metrics.speed_category,
            confidence: metrics.confidence,
            category_id,
            questions,
            report: None,
        }
    }

    pub fn metrics(&self) -> VoiceMetrics {
        VoiceMetrics {
            pitch: self.pitch,
            speed: self.speed,
            speed_category: self.speed_category,
            confidence: self.confidence,
        }
    }
}
