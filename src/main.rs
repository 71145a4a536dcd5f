use anyhow::{Context, Result};
use clap::Parser;
use interview_trainer::audio::{AnswerRecorder, AudioSource, RecorderConfig};
use interview_trainer::classifier::SignalModel;
use interview_trainer::narration::{GptConfig, GptNarrator, LocalSynthesizer, REPORT_FALLBACK};
use interview_trainer::session::{InterviewSession, SessionConfig};
use interview_trainer::store::ResultStore;
use interview_trainer::Config;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "interview-trainer", about = "Voice interview training sessions")]
struct Cli {
    /// Interview category to practice
    #[arg(long, default_value = "Coding")]
    category: String,

    /// Config file (without extension)
    #[arg(long, default_value = "config/interview-trainer")]
    config: String,

    /// Override the result store path
    #[arg(long)]
    store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} starting", cfg.service.name);

    // Absence of the key is a startup failure, not a session error
    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY is not set; it is required at startup")?;

    let narrator = Arc::new(GptNarrator::new(
        api_key,
        GptConfig {
            endpoint: cfg.openai.endpoint.clone(),
            model: cfg.openai.model.clone(),
            question_max_tokens: cfg.openai.question_max_tokens,
            report_max_tokens: cfg.openai.report_max_tokens,
        },
        Box::new(LocalSynthesizer::new()),
    ));

    let classifier = Arc::new(SignalModel::new(cfg.audio.sample_rate));

    let mut recorder_config = RecorderConfig::new(
        PathBuf::from(&cfg.audio.recordings_path).join("answer.wav"),
        AudioSource::Microphone,
    );
    recorder_config.backend.sample_rate = cfg.audio.sample_rate;
    recorder_config.backend.channels = cfg.audio.channels;
    let recorder = Arc::new(AnswerRecorder::new(recorder_config));

    let store_path = cli.store.unwrap_or_else(|| PathBuf::from(&cfg.store.path));
    let store = Arc::new(ResultStore::open(&store_path)?);

    let session_config = SessionConfig {
        category: cli.category,
        settle_delay: Duration::from_millis(cfg.session.settle_delay_ms),
        advance_delay: Duration::from_millis(cfg.session.advance_delay_ms),
    };

    let session = InterviewSession::new(
        session_config,
        narrator,
        classifier,
        recorder,
        Arc::clone(&store),
    );

    run_command_loop(session, store).await
}

async fn run_command_loop(session: InterviewSession, store: Arc<ResultStore>) -> Result<()> {
    println!(
        "Interview trainer ({}). Commands: start | record | end | history | reset | quit",
        session.category()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "start" => {
                session.start().await?;
                if let Some(question) = session.current_question().await {
                    println!("Question: {}", question);
                }
            }
            "record" => {
                session.toggle_recording().await?;
                if session.is_recording() {
                    println!("Recording... type 'record' again to stop.");
                }
            }
            "end" => {
                let summary = session.end().await?;
                println!("--- Session report ---");
                println!(
                    "Pitch: {:.2} | Speed: {:.6} ({}) | Confidence: {}",
                    summary.metrics.pitch,
                    summary.metrics.speed,
                    summary.metrics.speed_category,
                    summary.metrics.confidence
                );
                println!("{}", summary.report);
            }
            "history" => print_history(&store),
            "reset" => session.reset().await,
            "quit" | "exit" => break,
            "" => {}
            other => println!("Unknown command: {}", other),
        }
    }

    Ok(())
}

/// Newest-first listing of saved interview attempts.
fn print_history(store: &ResultStore) {
    let results = store.results();
    if results.is_empty() {
        println!("No previous interviews found.");
        return;
    }

    for result in results {
        println!(
            "{} | Pitch: {:.2} | Speed: {:.2} ({}) | Confidence: {}",
            result.created_at.format("%Y-%m-%d %H:%M"),
            result.pitch,
            result.speed,
            result.speed_category,
            result.confidence
        );
        let report = result
            .report
            .as_ref()
            .map(|r| r.text.as_str())
            .unwrap_or(REPORT_FALLBACK);
        println!("  {}", report);
    }
}
