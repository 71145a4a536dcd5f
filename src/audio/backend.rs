use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for audio backends
#[derive(Debug, Clone)]
pub struct AudioBackendConfig {
    /// Capture sample rate
    pub sample_rate: u32,
    /// Channel count (1 = mono)
    pub channels: u16,
    /// Frame size in milliseconds
    pub frame_duration_ms: u64,
}

impl Default for AudioBackendConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100, // Lossless answer recordings
            channels: 1,         // Mono
            frame_duration_ms: 100,
        }
    }
}

/// Audio capture backend trait
///
/// Implementations:
/// - Microphone: cpal input stream on a dedicated thread
/// - File: stream frames from a WAV file (tests/batch processing)
#[async_trait::async_trait]
pub trait AudioBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Audio source type
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// Microphone input
    Microphone,
    /// WAV file input (for testing/batch processing)
    File(PathBuf),
}

/// Audio backend factory
pub struct AudioBackendFactory;

impl AudioBackendFactory {
    pub fn create(
        source: AudioSource,
        config: AudioBackendConfig,
    ) -> Result<Box<dyn AudioBackend>> {
        match source {
            AudioSource::Microphone => Ok(Box::new(MicrophoneBackend::new(config))),
            AudioSource::File(path) => Ok(Box::new(FileBackend::new(path, config))),
        }
    }
}

/// Microphone capture via cpal
///
/// cpal streams are not Send, so the stream lives on a dedicated thread
/// that forwards converted frames into a tokio channel until the stop
/// flag drops.
pub struct MicrophoneBackend {
    config: AudioBackendConfig,
    capturing: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl MicrophoneBackend {
    pub fn new(config: AudioBackendConfig) -> Self {
        Self {
            config,
            capturing: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }
}

#[async_trait::async_trait]
impl AudioBackend for MicrophoneBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .context("No default input device available")?;

        info!(
            "Starting microphone capture: {}Hz, {} channel(s)",
            self.config.sample_rate, self.config.channels
        );

        let stream_config = cpal::StreamConfig {
            channels: self.config.channels,
            sample_rate: cpal::SampleRate(self.config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let frame_capacity = (self.config.sample_rate as u64 * self.config.frame_duration_ms
            / 1000) as usize
            * self.config.channels as usize;

        let (tx, rx) = mpsc::channel::<AudioFrame>(64);
        let capturing = Arc::clone(&self.capturing);
        capturing.store(true, Ordering::SeqCst);

        let sample_rate = self.config.sample_rate;
        let channels = self.config.channels;

        let thread = std::thread::spawn(move || {
            let started = std::time::Instant::now();
            let mut pending: Vec<i16> = Vec::with_capacity(frame_capacity);

            let flag = Arc::clone(&capturing);
            let data_callback = move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if !flag.load(Ordering::SeqCst) {
                    return;
                }

                for &sample in data {
                    let clamped = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                    pending.push(clamped);
                }

                while pending.len() >= frame_capacity {
                    let rest = pending.split_off(frame_capacity);
                    let samples = std::mem::replace(&mut pending, rest);
                    let frame = AudioFrame {
                        samples,
                        sample_rate,
                        channels,
                        timestamp_ms: started.elapsed().as_millis() as u64,
                    };
                    if tx.blocking_send(frame).is_err() {
                        return; // Receiver gone
                    }
                }
            };

            let error_callback = |err| {
                error!("Microphone stream error: {}", err);
            };

            let stream = match device.build_input_stream(
                &stream_config,
                data_callback,
                error_callback,
                None,
            ) {
                Ok(s) => s,
                Err(e) => {
                    error!("Failed to build input stream: {}", e);
                    capturing.store(false, Ordering::SeqCst);
                    return;
                }
            };

            if let Err(e) = stream.play() {
                error!("Failed to start input stream: {}", e);
                capturing.store(false, Ordering::SeqCst);
                return;
            }

            while capturing.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(50));
            }

            // Stream drops here, which also closes the frame channel
        });

        self.thread = Some(thread);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);

        if let Some(thread) = self.thread.take() {
            tokio::task::spawn_blocking(move || {
                if thread.join().is_err() {
                    warn!("Microphone capture thread panicked");
                }
            })
            .await?;
        }

        info!("Microphone capture stopped");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "microphone"
    }
}

/// File-based capture backend
///
/// Streams an existing WAV file as fixed-size frames. Used by tests and
/// batch analysis in place of live hardware.
pub struct FileBackend {
    path: PathBuf,
    config: AudioBackendConfig,
    capturing: Arc<AtomicBool>,
}

impl FileBackend {
    pub fn new(path: PathBuf, config: AudioBackendConfig) -> Self {
        Self {
            path,
            config,
            capturing: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait::async_trait]
impl AudioBackend for FileBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let reader = hound::WavReader::open(&self.path)
            .with_context(|| format!("Failed to open source WAV: {}", self.path.display()))?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read source samples")?;

        info!(
            "File backend streaming {} ({} samples)",
            self.path.display(),
            samples.len()
        );

        let frame_capacity = (spec.sample_rate as u64 * self.config.frame_duration_ms / 1000)
            as usize
            * spec.channels as usize;
        let frame_capacity = frame_capacity.max(1);

        let (tx, rx) = mpsc::channel::<AudioFrame>(64);
        let capturing = Arc::clone(&self.capturing);
        capturing.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            let mut timestamp_ms = 0u64;
            let frame_ms = (frame_capacity as u64 * 1000)
                / (spec.sample_rate as u64 * spec.channels as u64).max(1);

            for chunk in samples.chunks(frame_capacity) {
                if !capturing.load(Ordering::SeqCst) {
                    break;
                }

                let frame = AudioFrame {
                    samples: chunk.to_vec(),
                    sample_rate: spec.sample_rate,
                    channels: spec.channels,
                    timestamp_ms,
                };
                timestamp_ms += frame_ms;

                if tx.send(frame).await.is_err() {
                    break;
                }
            }

            capturing.store(false, Ordering::SeqCst);
        });

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "file"
    }
}
