use super::backend::{AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioSource};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Configuration for answer recording
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Where the single answer WAV lands (overwritten each recording)
    pub output_path: PathBuf,
    /// Capture source
    pub source: AudioSource,
    /// Backend settings (sample rate, channels, frame size)
    pub backend: AudioBackendConfig,
}

impl RecorderConfig {
    pub fn new(output_path: PathBuf, source: AudioSource) -> Self {
        Self {
            output_path,
            source,
            backend: AudioBackendConfig::default(),
        }
    }
}

/// Records one spoken answer to a temporary WAV file
///
/// `start` wires a capture backend to a writer task draining frames into
/// the output file; `stop` tears the backend down and yields the file
/// path once the writer finalizes. One recording at a time.
pub struct AnswerRecorder {
    config: RecorderConfig,
    backend: Mutex<Option<Box<dyn AudioBackend>>>,
    writer_task: Mutex<Option<JoinHandle<Result<usize>>>>,
    is_recording: AtomicBool,
}

impl AnswerRecorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            backend: Mutex::new(None),
            writer_task: Mutex::new(None),
            is_recording: AtomicBool::new(false),
        }
    }

    /// Start capturing. The recording flag is only set once the backend
    /// has confirmed the stream is up; a setup failure leaves the
    /// recorder idle.
    pub async fn start(&self) -> Result<()> {
        if self.is_recording.load(Ordering::SeqCst) {
            warn!("Recording already in progress");
            return Ok(());
        }

        // Prior recording is not retained
        if self.config.output_path.exists() {
            fs::remove_file(&self.config.output_path)
                .context("Failed to remove previous recording")?;
        }
        if let Some(parent) = self.config.output_path.parent() {
            fs::create_dir_all(parent).context("Failed to create recordings directory")?;
        }

        let mut backend =
            AudioBackendFactory::create(self.config.source.clone(), self.config.backend.clone())
                .context("Failed to create audio backend")?;

        let mut audio_rx = backend
            .start()
            .await
            .context("Failed to start audio capture")?;

        info!(
            "Recording started ({} backend) -> {}",
            backend.name(),
            self.config.output_path.display()
        );

        let spec = hound::WavSpec {
            channels: self.config.backend.channels,
            sample_rate: self.config.backend.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let output_path = self.config.output_path.clone();
        let writer_task = tokio::spawn(async move {
            let mut writer = hound::WavWriter::create(&output_path, spec)
                .with_context(|| format!("Failed to create WAV file: {:?}", output_path))?;

            let mut written = 0usize;
            while let Some(frame) = audio_rx.recv().await {
                for &sample in &frame.samples {
                    writer
                        .write_sample(sample)
                        .context("Failed to write sample to WAV")?;
                }
                written += frame.samples.len();
            }

            writer.finalize().context("Failed to finalize WAV file")?;
            Ok(written)
        });

        {
            let mut slot = self.backend.lock().await;
            *slot = Some(backend);
        }
        {
            let mut slot = self.writer_task.lock().await;
            *slot = Some(writer_task);
        }

        self.is_recording.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Stop capturing and yield the finished file.
    pub async fn stop(&self) -> Result<PathBuf> {
        if !self.is_recording.load(Ordering::SeqCst) {
            anyhow::bail!("No active recording to stop");
        }

        self.is_recording.store(false, Ordering::SeqCst);

        // Dropping the backend closes the frame channel, which lets the
        // writer drain and finalize.
        let backend = {
            let mut slot = self.backend.lock().await;
            slot.take()
        };
        if let Some(mut backend) = backend {
            backend.stop().await.context("Failed to stop capture")?;
        }

        let task = {
            let mut slot = self.writer_task.lock().await;
            slot.take()
        };
        let written = match task {
            Some(task) => task.await.context("Writer task panicked")??,
            None => anyhow::bail!("No writer task for active recording"),
        };

        info!(
            "Recording stopped: {} samples -> {}",
            written,
            self.config.output_path.display()
        );

        Ok(self.config.output_path.clone())
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }
}
