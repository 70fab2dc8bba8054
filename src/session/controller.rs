use std::sync::Arc;

use tracing::{info, warn};

use crate::audio::{AnalysisTap, CaptureBackend};
use crate::capture::{CaptureSession, FinalizedAudio};
use crate::error::AudioError;
use crate::export::PlaybackPreview;

use super::keys::KeyContext;

/// Recording lifecycle states.
///
/// `Paused` is reachable only from `Recording` and returns only to
/// `Recording`. `Stopped` is terminal for a session; a new start creates a
/// fresh capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
    Paused,
    Stopped,
}

/// Creates a fresh capture backend for each recording session.
pub type BackendFactory =
    Box<dyn Fn() -> Result<Box<dyn CaptureBackend>, AudioError> + Send + Sync>;

/// Finite-state machine coordinating capture, timing, and the finalized
/// blob's lifetime.
///
/// Invalid transitions are silently ignored rather than errors: the UI
/// guards them, and the controller guards them again. Time advances through
/// `tick_second`, driven by a 1-second interval in production and called
/// directly in tests.
pub struct RecordingController {
    state: RecordingState,
    session: Option<CaptureSession>,
    finalized: Option<FinalizedAudio>,
    preview: Option<PlaybackPreview>,
    elapsed_secs: u64,
    processing: bool,
    make_backend: BackendFactory,
}

impl RecordingController {
    pub fn new(make_backend: BackendFactory) -> Self {
        Self {
            state: RecordingState::Idle,
            session: None,
            finalized: None,
            preview: None,
            elapsed_secs: 0,
            processing: false,
            make_backend,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn finalized(&self) -> Option<&FinalizedAudio> {
        self.finalized.as_ref()
    }

    /// Live analysis view of the active session, if any.
    pub fn analysis_tap(&self) -> Option<Arc<dyn AnalysisTap>> {
        self.session.as_ref().map(|s| s.analysis_tap())
    }

    /// True while the capture device is held open.
    pub fn device_active(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.device_active())
    }

    /// Start a new recording session.
    ///
    /// No-op while already recording or paused. Any previous finalized blob
    /// is superseded (and its cached playback preview released) only once
    /// the device is acquired: a failed start leaves everything as it was.
    pub async fn start(&mut self) -> Result<(), AudioError> {
        if matches!(self.state, RecordingState::Recording | RecordingState::Paused) {
            return Ok(());
        }

        let backend = (self.make_backend)()?;
        let session = CaptureSession::begin(backend).await?;

        self.discard_finalized();
        self.session = Some(session);
        self.state = RecordingState::Recording;
        self.elapsed_secs = 0;

        Ok(())
    }

    /// Valid only while recording; no-op otherwise.
    pub fn pause(&mut self) {
        if self.state != RecordingState::Recording {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.pause();
        }
        self.state = RecordingState::Paused;
        info!("Recording paused at {}s", self.elapsed_secs);
    }

    /// Valid only while paused; no-op otherwise.
    pub fn resume(&mut self) {
        if self.state != RecordingState::Paused {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.resume();
        }
        self.state = RecordingState::Recording;
        info!("Recording resumed at {}s", self.elapsed_secs);
    }

    /// Finalize the active session. No-op from `Idle` or `Stopped`.
    pub async fn stop(&mut self) -> Result<(), AudioError> {
        if !matches!(self.state, RecordingState::Recording | RecordingState::Paused) {
            return Ok(());
        }

        let prior = self.state;
        let session = match self.session.take() {
            Some(s) => s,
            None => {
                warn!("No session while in {:?}; resetting to idle", self.state);
                self.state = RecordingState::Idle;
                return Ok(());
            }
        };

        match session.finish().await {
            Ok(audio) => {
                info!(
                    "Recording stopped after {}s ({} bytes)",
                    self.elapsed_secs,
                    audio.bytes.len()
                );
                self.discard_finalized();
                self.finalized = Some(audio);
                self.state = RecordingState::Stopped;
                Ok(())
            }
            Err(e) => {
                self.state = prior;
                Err(e)
            }
        }
    }

    /// Advance the wall-clock second counter; counts only while recording.
    pub fn tick_second(&mut self) {
        if self.state == RecordingState::Recording {
            self.elapsed_secs += 1;
        }
    }

    /// Drain capture chunks that arrived since the last call.
    pub fn pump(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.pump();
        }
    }

    /// Install an externally supplied audio file in place of a recording.
    /// Content is not validated here; decoding will reject garbage later.
    pub fn set_uploaded(&mut self, audio: FinalizedAudio) {
        self.discard_finalized();
        info!(
            "Uploaded audio installed ({} bytes, {})",
            audio.bytes.len(),
            audio.mime_hint
        );
        self.finalized = Some(audio);
    }

    /// Discard the finalized blob and release its playback preview.
    pub fn clear(&mut self) {
        self.discard_finalized();
    }

    /// Cache a playback preview for the finalized blob; superseding or
    /// clearing the blob releases it exactly once.
    pub fn set_preview(&mut self, preview: PlaybackPreview) {
        if let Some(old) = self.preview.take() {
            old.release();
        }
        self.preview = Some(preview);
    }

    pub fn preview(&self) -> Option<&PlaybackPreview> {
        self.preview.as_ref()
    }

    pub fn set_processing(&mut self, processing: bool) {
        self.processing = processing;
    }

    /// Whether a submit (hand the blob to the transcription collaborator)
    /// is currently allowed.
    pub fn submit_ready(&self) -> bool {
        self.finalized.is_some()
            && !self.processing
            && !matches!(self.state, RecordingState::Recording | RecordingState::Paused)
    }

    /// Snapshot for keyboard-command guarding.
    pub fn key_context(&self, in_text_input: bool) -> KeyContext {
        KeyContext {
            recording: matches!(
                self.state,
                RecordingState::Recording | RecordingState::Paused
            ),
            paused: self.state == RecordingState::Paused,
            processing: self.processing,
            has_audio: self.finalized.is_some(),
            in_text_input,
        }
    }

    fn discard_finalized(&mut self) {
        if let Some(preview) = self.preview.take() {
            preview.release();
        }
        self.finalized = None;
    }
}
