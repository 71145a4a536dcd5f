use std::time::Duration;

/// Configuration for one interview session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Interview category ("Coding", "Business", "UI/UX", ...)
    pub category: String,

    /// Pause between receiving questions and narrating the first one
    pub settle_delay: Duration,

    /// Pause before narrating the next question after an answer
    pub advance_delay: Duration,
}

impl SessionConfig {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            settle_delay: Duration::from_secs(1),
            advance_delay: Duration::from_secs(1),
        }
    }

    /// Zero delays, used by tests to keep scenarios instantaneous.
    pub fn immediate(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            settle_delay: Duration::ZERO,
            advance_delay: Duration::ZERO,
        }
    }
}
