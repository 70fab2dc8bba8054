use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::audio::{encode_wav_i16, AnalysisTap, AudioChunk, CaptureBackend};
use crate::error::AudioError;

/// One finished recording: the container bytes the recorder natively
/// produces, plus a mime hint for downstream decoding. Produced exactly once
/// per capture session and immutable thereafter.
#[derive(Debug, Clone)]
pub struct FinalizedAudio {
    /// Identity used to discard stale async results computed for a
    /// superseded blob
    pub id: Uuid,
    pub bytes: Vec<u8>,
    pub mime_hint: String,
}

impl FinalizedAudio {
    pub fn new(bytes: Vec<u8>, mime_hint: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            bytes,
            mime_hint: mime_hint.into(),
        }
    }
}

/// One continuous microphone-recording lifecycle from start to stop.
///
/// Owns the capture backend, its chunk stream, and the accumulated chunk
/// buffer. Exactly one session is active at a time; the controller tears an
/// old one down before starting the next.
pub struct CaptureSession {
    backend: Box<dyn CaptureBackend>,
    chunk_rx: mpsc::Receiver<AudioChunk>,
    chunks: Vec<AudioChunk>,
    paused: bool,
    started_at: DateTime<Utc>,
    sample_rate: u32,
    channels: u16,
}

impl CaptureSession {
    /// Start capturing on `backend`. On `DeviceUnavailable` no session is
    /// created and the caller's state is unchanged.
    pub async fn begin(mut backend: Box<dyn CaptureBackend>) -> Result<Self, AudioError> {
        let chunk_rx = backend.start().await?;
        let (sample_rate, channels) = backend.format();

        info!(
            "Capture session started ({}, {}Hz, {} channels)",
            backend.name(),
            sample_rate,
            channels
        );

        Ok(Self {
            backend,
            chunk_rx,
            chunks: Vec::new(),
            paused: false,
            started_at: Utc::now(),
            sample_rate,
            channels,
        })
    }

    /// Drain chunks that have become available since the last pump.
    ///
    /// Chunks accumulate only while recording; anything arriving while
    /// paused is discarded even if the backend let it slip through.
    pub fn pump(&mut self) {
        while let Ok(chunk) = self.chunk_rx.try_recv() {
            if self.paused {
                debug!("Dropping chunk received while paused");
                continue;
            }
            self.chunks.push(chunk);
        }
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.pump();
            self.paused = true;
            self.backend.set_paused(true);
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.backend.set_paused(false);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Chunks accumulated so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn analysis_tap(&self) -> Arc<dyn AnalysisTap> {
        self.backend.analysis_tap()
    }

    /// True while the underlying device is held open.
    pub fn device_active(&self) -> bool {
        self.backend.is_capturing()
    }

    /// Stop the backend, release the device, and finalize all accumulated
    /// chunks into one immutable blob in the recorder's native container.
    pub async fn finish(mut self) -> Result<FinalizedAudio, AudioError> {
        self.pump();
        self.backend.stop().await?;

        // The backend's sender side is gone; collect anything still queued.
        while let Ok(chunk) = self.chunk_rx.try_recv() {
            if !self.paused {
                self.chunks.push(chunk);
            }
        }

        let mut samples: Vec<i16> = Vec::new();
        for chunk in &self.chunks {
            samples.extend_from_slice(&chunk.samples);
        }

        info!(
            "Capture session finished: {} chunks, {} samples",
            self.chunks.len(),
            samples.len()
        );

        let bytes = encode_wav_i16(&samples, self.sample_rate, self.channels)?;
        Ok(FinalizedAudio::new(bytes, "audio/wav"))
    }
}
