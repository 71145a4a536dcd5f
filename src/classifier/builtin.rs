use super::{RawPrediction, VoiceClassifier};
use anyhow::Result;
use tracing::info;

/// Bundled voice model
///
/// Derives the three raw scores from simple signal statistics:
/// zero-crossing rate for pitch, mean inter-sample delta for speed, and
/// RMS energy for confidence. The scores live on the same scales the
/// threshold labeling expects; no accuracy is promised.
pub struct SignalModel {
    sample_rate: u32,
}

impl SignalModel {
    pub fn new(sample_rate: u32) -> Self {
        info!("Voice model initialized ({}Hz)", sample_rate);
        Self { sample_rate }
    }
}

impl VoiceClassifier for SignalModel {
    fn analyze(&self, samples: &[f32]) -> Result<RawPrediction> {
        if samples.is_empty() {
            anyhow::bail!("No samples to analyze");
        }

        // Zero-crossing rate scaled to a rough fundamental estimate
        let crossings = samples
            .windows(2)
            .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
            .count();
        let duration_secs = samples.len() as f64 / self.sample_rate as f64;
        let pitch = crossings as f64 / (2.0 * duration_secs.max(1e-6));

        // Mean absolute inter-sample delta tracks articulation rate
        let delta_sum: f64 = samples
            .windows(2)
            .map(|w| (w[1] - w[0]).abs() as f64)
            .sum();
        let speed = delta_sum / (samples.len() - 1).max(1) as f64;

        // RMS energy as the raw confidence score
        let energy: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        let confidence = (energy / samples.len() as f64).sqrt();

        Ok(RawPrediction {
            pitch,
            speed,
            confidence,
        })
    }

    fn name(&self) -> &str {
        "signal-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_input() {
        let model = SignalModel::new(44_100);
        assert!(model.analyze(&[]).is_err());
    }

    #[test]
    fn test_silence_scores_zero_confidence() {
        let model = SignalModel::new(44_100);
        let prediction = model.analyze(&[0.0; 4410]).unwrap();
        assert_eq!(prediction.confidence, 0.0);
        assert_eq!(prediction.speed, 0.0);
    }

    #[test]
    fn test_tone_produces_positive_scores() {
        let model = SignalModel::new(44_100);
        // 220Hz sine, one second
        let samples: Vec<f32> = (0..44_100)
            .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 44_100.0).sin() * 0.5)
            .collect();
        let prediction = model.analyze(&samples).unwrap();

        // Zero-crossing pitch estimate should land near the fundamental
        assert!((prediction.pitch - 220.0).abs() < 5.0);
        assert!(prediction.speed > 0.0);
        assert!(prediction.confidence > 0.1);
    }
}
