//! Voice classification
//!
//! The classifier is a black box from the orchestrator's point of view:
//! it turns a flat sequence of normalized samples into three raw scores
//! (pitch, speed, confidence). The categorical labels are derived here,
//! client-side, from fixed thresholds.

mod builtin;

pub use builtin::SignalModel;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Speaking-speed bucket derived from the raw speed score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedCategory {
    Slow,
    Medium,
    Fast,
}

impl fmt::Display for SpeedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedCategory::Slow => write!(f, "Slow"),
            SpeedCategory::Medium => write!(f, "Medium"),
            SpeedCategory::Fast => write!(f, "Fast"),
        }
    }
}

/// Confidence bucket derived from the clamped raw confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLabel {
    Low,
    Medium,
    High,
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLabel::Low => write!(f, "Low"),
            ConfidenceLabel::Medium => write!(f, "Medium"),
            ConfidenceLabel::High => write!(f, "High"),
        }
    }
}

/// Raw model output before any labeling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPrediction {
    pub pitch: f64,
    pub speed: f64,
    pub confidence: f64,
}

/// The metrics tuple for one analyzed answer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceMetrics {
    pub pitch: f64,
    pub speed: f64,
    pub speed_category: SpeedCategory,
    pub confidence: ConfidenceLabel,
}

impl VoiceMetrics {
    pub fn from_prediction(raw: RawPrediction) -> Self {
        Self {
            pitch: raw.pitch,
            speed: raw.speed,
            speed_category: classify_speed(raw.speed),
            confidence: classify_confidence(raw.confidence),
        }
    }

    /// Zero-valued metrics, used when a session ends before any answer
    /// was analyzed.
    pub fn zeroed() -> Self {
        Self {
            pitch: 0.0,
            speed: 0.0,
            speed_category: classify_speed(0.0),
            confidence: classify_confidence(0.0),
        }
    }
}

/// Bucket a raw speed score by absolute value.
pub fn classify_speed(raw: f64) -> SpeedCategory {
    let abs = raw.abs();
    if abs < 0.0002 {
        SpeedCategory::Slow
    } else if abs < 0.001 {
        SpeedCategory::Medium
    } else {
        SpeedCategory::Fast
    }
}

/// Bucket a raw confidence score after clamping to [0, 1].
pub fn classify_confidence(raw: f64) -> ConfidenceLabel {
    let clamped = raw.clamp(0.0, 1.0);
    if clamped > 0.1 {
        ConfidenceLabel::High
    } else if clamped > 0.005 {
        ConfidenceLabel::Medium
    } else {
        ConfidenceLabel::Low
    }
}

/// Voice analysis model
///
/// Implementations score a captured answer. The orchestrator owns a
/// boxed instance handed in by the composition root; errors abort the
/// analysis cycle without advancing the question cursor.
pub trait VoiceClassifier: Send + Sync {
    /// Score a flat sequence of normalized amplitude samples
    fn analyze(&self, samples: &[f32]) -> Result<RawPrediction>;

    /// Model name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_thresholds() {
        assert_eq!(classify_speed(0.0), SpeedCategory::Slow);
        assert_eq!(classify_speed(0.00019), SpeedCategory::Slow);
        assert_eq!(classify_speed(-0.00019), SpeedCategory::Slow);
        assert_eq!(classify_speed(0.0002), SpeedCategory::Medium);
        assert_eq!(classify_speed(0.0005), SpeedCategory::Medium);
        assert_eq!(classify_speed(-0.0009), SpeedCategory::Medium);
        assert_eq!(classify_speed(0.001), SpeedCategory::Fast);
        assert_eq!(classify_speed(5.0), SpeedCategory::Fast);
        assert_eq!(classify_speed(-0.01), SpeedCategory::Fast);
    }

    #[test]
    fn test_confidence_thresholds() {
        assert_eq!(classify_confidence(0.0), ConfidenceLabel::Low);
        assert_eq!(classify_confidence(0.005), ConfidenceLabel::Low);
        assert_eq!(classify_confidence(0.0051), ConfidenceLabel::Medium);
        assert_eq!(classify_confidence(0.1), ConfidenceLabel::Medium);
        assert_eq!(classify_confidence(0.11), ConfidenceLabel::High);
        assert_eq!(classify_confidence(1.0), ConfidenceLabel::High);
    }

    #[test]
    fn test_confidence_clamps_out_of_range_scores() {
        // Above 1.0 clamps to 1.0 which is High
        assert_eq!(classify_confidence(42.0), ConfidenceLabel::High);
        // Negative clamps to 0.0 which is Low
        assert_eq!(classify_confidence(-3.0), ConfidenceLabel::Low);
    }

    #[test]
    fn test_metrics_from_prediction() {
        let metrics = VoiceMetrics::from_prediction(RawPrediction {
            pitch: 0.5,
            speed: 0.0005,
            confidence: 0.2,
        });
        assert_eq!(metrics.speed_category, SpeedCategory::Medium);
        assert_eq!(metrics.confidence, ConfidenceLabel::High);
    }

    #[test]
    fn test_zeroed_metrics() {
        let metrics = VoiceMetrics::zeroed();
        assert_eq!(metrics.speed_category, SpeedCategory::Slow);
        assert_eq!(metrics.confidence, ConfidenceLabel::Low);
    }
}
