// Integration tests for audio decoding and answer recording
//
// Recording runs against the file backend so no hardware is involved.

use anyhow::Result;
use interview_trainer::audio::{AnswerRecorder, AudioFile, AudioSource, RecorderConfig};
use std::path::Path;
use std::time::Duration;

fn write_test_wav(path: &Path, samples: usize) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..samples {
        let sample =
            ((2.0 * std::f32::consts::PI * 220.0 * i as f32 / 44_100.0).sin() * 8000.0) as i16;
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_audio_file_open_and_metadata() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tone.wav");
    write_test_wav(&path, 44_100);

    let audio = AudioFile::open(&path)?;

    assert_eq!(audio.sample_rate, 44_100);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.samples.len(), 44_100);
    assert!((audio.duration_seconds - 1.0).abs() < 0.01);
    assert!(audio.path.contains("tone.wav"));

    Ok(())
}

#[test]
fn test_normalized_samples_stay_in_unit_range() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tone.wav");
    write_test_wav(&path, 4410);

    let audio = AudioFile::open(&path)?;
    let normalized = audio.normalized_samples();

    assert_eq!(normalized.len(), audio.samples.len());
    assert!(normalized.iter().all(|s| (-1.0..=1.0).contains(s)));
    assert!(normalized.iter().any(|&s| s != 0.0), "tone is not silence");

    Ok(())
}

#[test]
fn test_audio_file_nonexistent() {
    let result = AudioFile::open("/nonexistent/path/to/audio.wav");
    assert!(result.is_err(), "opening nonexistent file should fail");
}

#[tokio::test]
async fn test_recorder_captures_file_backend_to_wav() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("source.wav");
    write_test_wav(&source, 8820);

    let output = dir.path().join("answer.wav");
    let recorder = AnswerRecorder::new(RecorderConfig::new(
        output.clone(),
        AudioSource::File(source),
    ));

    recorder.start().await?;
    assert!(recorder.is_recording());

    // Give the file backend time to drain
    tokio::time::sleep(Duration::from_millis(50)).await;

    let path = recorder.stop().await?;
    assert!(!recorder.is_recording());
    assert_eq!(path, output);

    let recorded = AudioFile::open(&path)?;
    assert_eq!(recorded.samples.len(), 8820);

    Ok(())
}

#[tokio::test]
async fn test_recorder_overwrites_previous_recording() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("source.wav");
    write_test_wav(&source, 4410);

    let output = dir.path().join("answer.wav");
    let recorder = AnswerRecorder::new(RecorderConfig::new(
        output.clone(),
        AudioSource::File(source),
    ));

    for _ in 0..2 {
        recorder.start().await?;
        tokio::time::sleep(Duration::from_millis(50)).await;
        recorder.stop().await?;
    }

    // Second run replaced the file rather than appending
    let recorded = AudioFile::open(&output)?;
    assert_eq!(recorded.samples.len(), 4410);

    Ok(())
}

#[tokio::test]
async fn test_stop_without_start_fails() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = AnswerRecorder::new(RecorderConfig::new(
        dir.path().join("answer.wav"),
        AudioSource::File(dir.path().join("missing.wav")),
    ));

    assert!(recorder.stop().await.is_err());
}

#[tokio::test]
async fn test_start_with_missing_source_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = AnswerRecorder::new(RecorderConfig::new(
        dir.path().join("answer.wav"),
        AudioSource::File(dir.path().join("missing.wav")),
    ));

    assert!(recorder.start().await.is_err());
    assert!(!recorder.is_recording(), "failed start leaves recorder idle");
}
