// File-backed capture backend: replays a WAV file (or in-memory samples) as
// if it were a live device. Used by tests and batch processing.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::backend::{AnalysisBuffer, AnalysisTap, AudioChunk, CaptureBackend};
use crate::config::AudioConfig;
use crate::error::AudioError;

pub struct FileBackend {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
    chunk_ms: u64,
    paused: Arc<AtomicBool>,
    tap: Arc<AnalysisBuffer>,
    replay_task: Option<JoinHandle<()>>,
}

impl FileBackend {
    /// Open a WAV file as a capture source.
    pub fn open(path: impl AsRef<Path>, config: AudioConfig) -> Result<Self, AudioError> {
        let path = path.as_ref();
        let reader = hound::WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file: {}", path.display()))
            .map_err(|e| AudioError::Decode(e.to_string()))?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AudioError::Decode(e.to_string()))?;

        info!(
            "File capture source: {} ({}Hz, {} channels, {} samples)",
            path.display(),
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self::from_samples(
            samples,
            spec.sample_rate,
            spec.channels,
            config,
        ))
    }

    /// Build a capture source from raw interleaved samples.
    pub fn from_samples(
        samples: Vec<i16>,
        sample_rate: u32,
        channels: u16,
        config: AudioConfig,
    ) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
            chunk_ms: config.chunk_duration_ms.max(10),
            paused: Arc::new(AtomicBool::new(false)),
            tap: Arc::new(AnalysisBuffer::new()),
            replay_task: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for FileBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioChunk>, AudioError> {
        if self.replay_task.is_some() {
            return Err(AudioError::DeviceUnavailable(
                "capture already running".into(),
            ));
        }

        let (tx, rx) = mpsc::channel::<AudioChunk>(64);
        let samples = self.samples.clone();
        let sample_rate = self.sample_rate;
        let channels = self.channels;
        let samples_per_chunk =
            (sample_rate as u64 * self.chunk_ms / 1000) as usize * channels as usize;
        let samples_per_chunk = samples_per_chunk.max(channels as usize);
        let paused = Arc::clone(&self.paused);
        let tap = Arc::clone(&self.tap);

        self.paused.store(false, Ordering::SeqCst);

        self.replay_task = Some(tokio::spawn(async move {
            for window in samples.chunks(samples_per_chunk) {
                while paused.load(Ordering::SeqCst) {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }

                let mono: Vec<f32> = window
                    .chunks(channels as usize)
                    .map(|frame| frame[0] as f32 / i16::MAX as f32)
                    .collect();
                tap.push_samples(&mono);

                let chunk = AudioChunk {
                    samples: window.to_vec(),
                    sample_rate,
                    channels,
                };
                if tx.send(chunk).await.is_err() {
                    break;
                }
            }
        }));

        Ok(rx)
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }

    async fn stop(&mut self) -> Result<(), AudioError> {
        if let Some(task) = self.replay_task.take() {
            task.abort();
            let _ = task.await;
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.replay_task.is_some()
    }

    fn analysis_tap(&self) -> Arc<dyn AnalysisTap> {
        Arc::clone(&self.tap) as Arc<dyn AnalysisTap>
    }

    fn format(&self) -> (u32, u16) {
        (self.sample_rate, self.channels)
    }

    fn name(&self) -> &str {
        "file"
    }
}
