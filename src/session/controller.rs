use super::config::SessionConfig;
use super::phase::SessionPhase;
use crate::audio::{AnswerRecorder, AudioFile};
use crate::classifier::{VoiceClassifier, VoiceMetrics};
use crate::narration::{NarrationService, QUESTIONS_FAILED_SENTINEL, REPORT_FALLBACK};
use crate::store::{InterviewQuestion, InterviewResult, ResultStore};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

/// What the user walks away with when a session ends
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub metrics: VoiceMetrics,
    pub report: String,
}

/// Session-local mutable state, shared across completion tasks
struct SessionState {
    phase: SessionPhase,
    questions: Vec<String>,
    cursor: usize,
    /// Question generation failed; the list holds only the sentinel
    questions_failed: bool,
    /// Manual end marker; suppresses narration advancement
    manually_ended: bool,
    /// Dedup guard: a result for the current answer cycle was saved
    saved_this_cycle: bool,
    last_metrics: VoiceMetrics,
    last_report: Option<String>,
}

impl SessionState {
    fn initial() -> Self {
        Self {
            phase: SessionPhase::Idle,
            questions: Vec::new(),
            cursor: 0,
            questions_failed: false,
            manually_ended: false,
            saved_this_cycle: false,
            last_metrics: VoiceMetrics::zeroed(),
            last_report: None,
        }
    }
}

/// Interview session orchestrator
///
/// Drives the end-to-end flow: question generation, narration, answer
/// capture, feature extraction, classification, persistence, and report
/// generation. All collaborators are injected by the composition root.
///
/// Completion ordering is not guaranteed by arrival time; each delayed
/// or spawned continuation captures the session generation at issue
/// time and becomes a no-op once the generation moves on (`end`/`reset`
/// bump it). The save path is additionally guarded by a per-cycle flag
/// and a duplicate probe against the store.
#[derive(Clone)]
pub struct InterviewSession {
    config: SessionConfig,
    narrator: Arc<dyn NarrationService>,
    classifier: Arc<dyn VoiceClassifier>,
    recorder: Arc<AnswerRecorder>,
    store: Arc<ResultStore>,
    state: Arc<Mutex<SessionState>>,
    generation: Arc<AtomicU64>,
}

impl InterviewSession {
    pub fn new(
        config: SessionConfig,
        narrator: Arc<dyn NarrationService>,
        classifier: Arc<dyn VoiceClassifier>,
        recorder: Arc<AnswerRecorder>,
        store: Arc<ResultStore>,
    ) -> Self {
        info!("Interview session created for category: {}", config.category);

        Self {
            config,
            narrator,
            classifier,
            recorder,
            store,
            state: Arc::new(Mutex::new(SessionState::initial())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start the interview: request questions for the category, then
    /// narrate the first one after a settle delay. Valid from `Idle`
    /// only; a completed session must be `reset` first.
    pub async fn start(&self) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            if state.phase != SessionPhase::Idle {
                warn!("Cannot start interview from phase {:?}", state.phase);
                return Ok(());
            }
            state.phase = SessionPhase::QuestionsLoading;
        }

        let generation = self.generation.load(Ordering::SeqCst);

        let questions = match self.narrator.generate_questions(&self.config.category).await {
            Ok(questions) if !questions.is_empty() => questions,
            Ok(_) => {
                warn!("Question generation returned an empty list");
                self.mark_questions_failed().await;
                return Ok(());
            }
            Err(e) => {
                error!("Question generation failed: {:#}", e);
                self.mark_questions_failed().await;
                return Ok(());
            }
        };

        let question_count = questions.len();
        let first_question = {
            let mut state = self.state.lock().await;
            if self.generation.load(Ordering::SeqCst) != generation {
                // Session was ended or reset while questions were in flight
                return Ok(());
            }
            state.questions = questions;
            state.cursor = 0;
            state.questions_failed = false;
            state.phase = SessionPhase::AwaitingStart;
            state.questions[0].clone()
        };

        info!(
            "Interview started: {} question(s) for {}",
            question_count, self.config.category
        );

        // Delayed narration of the first question. The timer itself is
        // never cancelled; a stale generation or a completed session
        // makes the action a no-op.
        let session = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(session.config.settle_delay).await;
            if session.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            {
                let state = session.state.lock().await;
                if state.phase == SessionPhase::Completed {
                    return;
                }
            }
            session.narrator.speak(&first_question);
        });

        Ok(())
    }

    /// Toggle answer capture. Starting flips the recording state only
    /// once the backend confirms the stream is up; stopping feeds the
    /// captured file into the analysis pipeline.
    pub async fn toggle_recording(&self) -> Result<()> {
        {
            let state = self.state.lock().await;
            if state.questions.is_empty() || state.questions_failed {
                warn!("Recording disabled: no questions available");
                return Ok(());
            }
            if state.phase == SessionPhase::Completed {
                warn!("Recording disabled: session is completed");
                return Ok(());
            }
        }

        if !self.recorder.is_recording() {
            match self.recorder.start().await {
                Ok(()) => {
                    let mut state = self.state.lock().await;
                    state.phase = SessionPhase::Recording;
                }
                Err(e) => {
                    // Capture never started; session state is unchanged
                    error!("Failed to start recording: {:#}", e);
                }
            }
            return Ok(());
        }

        match self.recorder.stop().await {
            Ok(path) => {
                let generation = self.generation.load(Ordering::SeqCst);
                {
                    let mut state = self.state.lock().await;
                    state.phase = SessionPhase::Analyzing;
                }

                let session = self.clone();
                tokio::spawn(async move {
                    session.process_answer(path, generation).await;
                });
            }
            Err(e) => {
                error!("Failed to stop recording: {:#}", e);
                let mut state = self.state.lock().await;
                if state.phase != SessionPhase::Completed {
                    state.phase = SessionPhase::AwaitingStart;
                }
            }
        }

        Ok(())
    }

    /// End the interview. Marks the session completed immediately so
    /// in-flight narration continuations become no-ops, analyzes any
    /// live recording, and resolves the final report before returning.
    /// Calling this twice never persists a second result for the same
    /// answer.
    pub async fn end(&self) -> Result<SessionSummary> {
        // Supersede pending narration timers and stale completions
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut state = self.state.lock().await;
            state.manually_ended = true;
            state.phase = SessionPhase::Completed;
        }

        self.narrator.stop_speaking();
        info!("Interview ended for category: {}", self.config.category);

        // A live recording still goes through the full analysis pipeline
        if self.recorder.is_recording() {
            match self.recorder.stop().await {
                Ok(path) => self.process_answer(path, generation).await,
                Err(e) => error!("Failed to stop recording at end of interview: {:#}", e),
            }
        }

        let metrics = {
            let state = self.state.lock().await;
            state.last_metrics
        };

        let report = match self.narrator.generate_report(&metrics).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Final report generation failed: {:#}", e);
                REPORT_FALLBACK.to_string()
            }
        };

        // Ending without a saved result still persists one from the
        // last-known metrics, report attached.
        let needs_save = {
            let state = self.state.lock().await;
            !state.saved_this_cycle
        };
        if needs_save {
            if let Some(result_id) = self.save_result(&metrics).await {
                self.store.attach_report(result_id, report.clone());
                if let Err(e) = self.store.save() {
                    error!("Failed to persist final report: {}", e);
                }
            }
        }

        {
            let mut state = self.state.lock().await;
            state.last_report = Some(report.clone());
        }

        Ok(SessionSummary { metrics, report })
    }

    /// Clear all session-local state back to `Idle`, enabling a fresh
    /// `start`.
    pub async fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        *state = SessionState::initial();
        info!("Session reset");
    }

    /// Analysis pipeline for one captured answer. Every step absorbs
    /// its own failure; nothing propagates out of the pipeline.
    async fn process_answer(&self, path: PathBuf, generation: u64) {
        let samples = match AudioFile::open(&path) {
            Ok(file) => file.normalized_samples(),
            Err(e) => {
                error!("Failed to extract audio data: {:#}", e);
                self.abort_cycle().await;
                return;
            }
        };

        let prediction = match self.classifier.analyze(&samples) {
            Ok(prediction) => prediction,
            Err(e) => {
                error!("Failed to analyze voice data: {:#}", e);
                self.abort_cycle().await;
                return;
            }
        };

        let metrics = VoiceMetrics::from_prediction(prediction);
        info!(
            "Answer analyzed: pitch {:.4}, speed {:.6} ({}), confidence {}",
            metrics.pitch, metrics.speed, metrics.speed_category, metrics.confidence
        );

        {
            let mut state = self.state.lock().await;
            state.last_metrics = metrics;
        }

        let result_id = self.save_result(&metrics).await;

        {
            let mut state = self.state.lock().await;
            if state.phase != SessionPhase::Completed {
                state.phase = SessionPhase::ReportPending;
            }
        }

        let report = match self.narrator.generate_report(&metrics).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Report generation failed: {:#}", e);
                REPORT_FALLBACK.to_string()
            }
        };

        if let Some(result_id) = result_id {
            self.store.attach_report(result_id, report.clone());
            if let Err(e) = self.store.save() {
                error!("Failed to persist report: {}", e);
            }
        }

        {
            let mut state = self.state.lock().await;
            state.last_report = Some(report);
        }

        self.advance_or_complete(generation).await;
    }

    /// Persist an InterviewResult for the current cycle, unless the
    /// dedup guard says one already exists. Returns the new result id
    /// when a row was inserted.
    async fn save_result(&self, metrics: &VoiceMetrics) -> Option<Uuid> {
        let questions = {
            let mut state = self.state.lock().await;
            if state.saved_this_cycle {
                info!("Result already saved this cycle, skipping");
                return None;
            }
            if self
                .store
                .has_matching_result(metrics, &self.config.category)
            {
                info!("Matching result already stored, skipping duplicate save");
                state.saved_this_cycle = true;
                return None;
            }
            state.saved_this_cycle = true;
            state.questions.clone()
        };

        let category_id = self.store.find_or_create_category(&self.config.category);
        let result = InterviewResult::new(
            metrics,
            Some(category_id),
            questions
                .iter()
                .map(|q| InterviewQuestion::new(q.as_str()))
                .collect(),
        );
        let result_id = self.store.insert_result(result);

        if let Err(e) = self.store.save() {
            // The session still advances; a failed save is log-only
            error!("Failed to persist interview result: {}", e);
        }

        info!("Interview result saved: {}", result_id);
        Some(result_id)
    }

    /// Advance to the next question or complete the session. No-op for
    /// stale generations and manually ended sessions.
    async fn advance_or_complete(&self, generation: u64) {
        let next_question = {
            let mut state = self.state.lock().await;
            if self.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            if state.manually_ended || state.phase == SessionPhase::Completed {
                return;
            }

            if state.cursor + 1 < state.questions.len() {
                state.cursor += 1;
                state.saved_this_cycle = false; // new answer cycle
                state.phase = SessionPhase::AwaitingStart;
                Some(state.questions[state.cursor].clone())
            } else {
                info!("All questions completed");
                state.phase = SessionPhase::Completed;
                None
            }
        };

        if let Some(question) = next_question {
            tokio::time::sleep(self.config.advance_delay).await;
            if self.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            {
                let state = self.state.lock().await;
                if state.phase == SessionPhase::Completed {
                    return;
                }
            }
            self.narrator.speak(&question);
        }
    }

    /// A failed extraction or classification abandons the cycle: the
    /// cursor stays put and the user re-records.
    async fn abort_cycle(&self) {
        let mut state = self.state.lock().await;
        if state.phase != SessionPhase::Completed {
            state.phase = SessionPhase::AwaitingStart;
        }
    }

    async fn mark_questions_failed(&self) {
        let mut state = self.state.lock().await;
        state.questions = vec![QUESTIONS_FAILED_SENTINEL.to_string()];
        state.questions_failed = true;
        state.phase = SessionPhase::Idle;
    }

    // Read-only accessors

    pub async fn phase(&self) -> SessionPhase {
        self.state.lock().await.phase
    }

    pub async fn questions(&self) -> Vec<String> {
        self.state.lock().await.questions.clone()
    }

    pub async fn current_question(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.questions.get(state.cursor).cloned()
    }

    pub async fn cursor(&self) -> usize {
        self.state.lock().await.cursor
    }

    pub async fn last_metrics(&self) -> VoiceMetrics {
        self.state.lock().await.last_metrics
    }

    pub async fn last_report(&self) -> Option<String> {
        self.state.lock().await.last_report.clone()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn category(&self) -> &str {
        &self.config.category
    }
}
