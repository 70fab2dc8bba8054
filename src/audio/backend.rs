use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::config::AudioConfig;
use crate::error::AudioError;

/// Width of the live analysis window, in samples.
pub const ANALYSIS_WINDOW: usize = 2048;

/// Raw audio fragment emitted by a capture backend (16-bit PCM, interleaved).
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Interleaved i16 samples
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
}

/// Read-only live view onto the audio being captured, for visualization.
///
/// The window is a time-domain byte stream: each sample is unsigned with 128
/// at the centerline, matching what the live waveform renderer expects.
/// Separate from the recorded bytes; reading it never consumes anything.
pub trait AnalysisTap: Send + Sync {
    /// Window width in samples.
    fn window_size(&self) -> usize {
        ANALYSIS_WINDOW
    }

    /// Copy the most recent window into `out` (length `window_size()`).
    fn time_domain(&self, out: &mut [u8]);
}

/// Shared ring the capture callback writes into and the renderer reads from.
pub struct AnalysisBuffer {
    window: Mutex<Vec<u8>>,
}

impl AnalysisBuffer {
    pub fn new() -> Self {
        Self {
            window: Mutex::new(vec![128u8; ANALYSIS_WINDOW]),
        }
    }

    /// Push mono float samples in [-1, 1]; keeps only the latest window.
    pub fn push_samples(&self, samples: &[f32]) {
        let mut window = match self.window.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        };
        for &s in samples {
            let byte = ((s.clamp(-1.0, 1.0) * 127.0) + 128.0) as u8;
            window.push(byte);
        }
        let excess = window.len().saturating_sub(ANALYSIS_WINDOW);
        if excess > 0 {
            window.drain(..excess);
        }
    }
}

impl Default for AnalysisBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisTap for AnalysisBuffer {
    fn time_domain(&self, out: &mut [u8]) {
        let window = match self.window.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        };
        let n = out.len().min(window.len());
        out[..n].copy_from_slice(&window[..n]);
        for b in out[n..].iter_mut() {
            *b = 128;
        }
    }
}

/// Audio capture backend trait
///
/// Implementations:
/// - Microphone: cpal default input device (all platforms)
/// - File: replay a WAV file or in-memory samples (tests, batch processing)
#[async_trait::async_trait]
pub trait CaptureBackend: Send {
    /// Start capturing audio.
    ///
    /// Returns a channel receiver that will receive audio chunks. Failure to
    /// acquire the device surfaces as `DeviceUnavailable` and leaves no
    /// partial state behind.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioChunk>, AudioError>;

    /// While paused the backend emits no chunks; the device stays open.
    fn set_paused(&mut self, paused: bool);

    /// Stop capturing and release the device and every track it holds.
    async fn stop(&mut self) -> Result<(), AudioError>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Live analysis view for the waveform renderer.
    fn analysis_tap(&self) -> Arc<dyn AnalysisTap>;

    /// Negotiated (sample_rate, channels); valid after `start`.
    fn format(&self) -> (u32, u16);

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Audio source type
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// Default microphone input
    Microphone,
    /// WAV file replayed as if captured (tests, batch processing)
    File(std::path::PathBuf),
}

/// Capture backend factory
pub struct CaptureBackendFactory;

impl CaptureBackendFactory {
    pub fn create(
        source: CaptureSource,
        config: AudioConfig,
    ) -> Result<Box<dyn CaptureBackend>, AudioError> {
        match source {
            CaptureSource::Microphone => {
                let backend = super::microphone::MicrophoneBackend::new(config);
                Ok(Box::new(backend))
            }
            CaptureSource::File(path) => {
                let backend = super::file::FileBackend::open(&path, config)?;
                Ok(Box::new(backend))
            }
        }
    }
}
