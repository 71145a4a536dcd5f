pub mod audio;
pub mod classifier;
pub mod config;
pub mod narration;
pub mod session;
pub mod store;

pub use audio::{
    AnswerRecorder, AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFile, AudioFrame,
    AudioSource, RecorderConfig,
};
pub use classifier::{
    classify_confidence, classify_speed, ConfidenceLabel, RawPrediction, SignalModel,
    SpeedCategory, VoiceClassifier, VoiceMetrics,
};
pub use config::Config;
pub use narration::{
    GptConfig, GptNarrator, LocalSynthesizer, NarrationService, Synthesizer,
    QUESTIONS_FAILED_SENTINEL, REPORT_FALLBACK,
};
pub use session::{InterviewSession, SessionConfig, SessionPhase, SessionSummary};
pub use store::{
    Category, InterviewQuestion, InterviewReport, InterviewResult, ResultStore, StoreError,
};
