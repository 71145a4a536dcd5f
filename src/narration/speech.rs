use std::sync::Mutex;
use tracing::{debug, info};

/// Speech synthesis seam
///
/// Playback mechanics are platform territory; the contract the session
/// relies on is cancel-previous-then-speak and immediate stop.
pub trait Synthesizer: Send + Sync {
    fn speak(&self, text: &str);
    fn stop(&self);
    fn is_speaking(&self) -> bool;
}

/// Synthesizer that tracks the active utterance and logs it
///
/// Stands in for a platform voice; narration ordering and cancellation
/// behave exactly as the session expects.
#[derive(Default)]
pub struct LocalSynthesizer {
    current: Mutex<Option<String>>,
}

impl LocalSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The utterance currently "playing", if any.
    pub fn current_utterance(&self) -> Option<String> {
        self.current.lock().unwrap().clone()
    }
}

impl Synthesizer for LocalSynthesizer {
    fn speak(&self, text: &str) {
        let mut current = self.current.lock().unwrap();
        if let Some(previous) = current.take() {
            debug!("Cancelling in-progress utterance: {}", previous);
        }
        info!("🗣 {}", text);
        *current = Some(text.to_string());
    }

    fn stop(&self) {
        if self.current.lock().unwrap().take().is_some() {
            info!("Speech stopped");
        }
    }

    fn is_speaking(&self) -> bool {
        self.current.lock().unwrap().is_some()
    }
}
