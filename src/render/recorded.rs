// Recorded waveform: a 100-bar amplitude envelope with progress coloring,
// click-to-seek, and per-frame playback tracking.

use tracing::warn;
use uuid::Uuid;

use crate::audio::{decode_bytes, AmplitudeEnvelope, ENVELOPE_BUCKETS};
use crate::capture::FinalizedAudio;
use crate::error::AudioError;

use super::scene::{DrawOp, Frame, WaveformTheme};

/// Playback position, bounded to [0, duration].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackCursor {
    pub current_time: f64,
    pub duration: f64,
}

impl PlaybackCursor {
    pub fn new(duration: f64) -> Self {
        Self {
            current_time: 0.0,
            duration,
        }
    }

    pub fn set_time(&mut self, time: f64) {
        self.current_time = time.clamp(0.0, self.duration);
    }

    /// Fraction played in [0, 1]; zero until the duration is known.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            self.current_time / self.duration
        } else {
            0.0
        }
    }
}

/// The playback element the renderer polls and seeks. Abstract so tests can
/// step it deterministically.
pub trait PlaybackClock {
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn is_playing(&self) -> bool;
    fn seek(&mut self, time: f64);
}

/// A pending envelope computation, tagged with the blob it belongs to.
///
/// Decoding runs off the render path; the tag lets a result that arrives
/// after its blob was superseded be dropped instead of clobbering the
/// current envelope.
#[derive(Debug, Clone)]
pub struct DecodeRequest {
    pub audio_id: Uuid,
    pub bytes: Vec<u8>,
    pub mime_hint: String,
}

impl DecodeRequest {
    /// Decode and reduce to an envelope. Blocking; run under
    /// `tokio::task::spawn_blocking` in production.
    pub fn compute(self) -> (Uuid, Result<EnvelopeResult, AudioError>) {
        let id = self.audio_id;
        let result = decode_bytes(self.bytes, Some(&self.mime_hint)).map(|decoded| {
            let envelope = AmplitudeEnvelope::from_samples(&decoded.channels[0]);
            EnvelopeResult {
                envelope,
                duration: decoded.duration_seconds(),
            }
        });
        (id, result)
    }
}

#[derive(Debug, Clone)]
pub struct EnvelopeResult {
    pub envelope: AmplitudeEnvelope,
    pub duration: f64,
}

/// Renders a finalized recording as progress-colored bars.
pub struct RecordedWaveformRenderer {
    theme: WaveformTheme,
    width: u32,
    height: u32,
    /// Identity of the blob the display belongs to
    current_id: Option<Uuid>,
    envelope: Option<AmplitudeEnvelope>,
    cursor: PlaybackCursor,
    tracking: bool,
}

impl RecordedWaveformRenderer {
    pub fn new(theme: WaveformTheme, width: u32, height: u32) -> Self {
        Self {
            theme,
            width,
            height,
            current_id: None,
            envelope: None,
            cursor: PlaybackCursor::new(0.0),
            tracking: false,
        }
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    pub fn envelope(&self) -> Option<&AmplitudeEnvelope> {
        self.envelope.as_ref()
    }

    /// Begin loading a new finalized blob. The previous envelope stays on
    /// screen until the new one resolves.
    pub fn begin_load(&mut self, audio: &FinalizedAudio) -> DecodeRequest {
        self.current_id = Some(audio.id);
        self.cursor = PlaybackCursor::new(0.0);
        DecodeRequest {
            audio_id: audio.id,
            bytes: audio.bytes.clone(),
            mime_hint: audio.mime_hint.clone(),
        }
    }

    /// Install a decode result. Stale results (computed for a superseded
    /// blob) are dropped; failures keep the previous envelope.
    pub fn apply(&mut self, audio_id: Uuid, result: Result<EnvelopeResult, AudioError>) {
        if self.current_id != Some(audio_id) {
            warn!("Dropping stale envelope for superseded audio {}", audio_id);
            return;
        }
        match result {
            Ok(res) => {
                self.envelope = Some(res.envelope);
                self.cursor = PlaybackCursor::new(res.duration);
            }
            Err(e) => {
                warn!("Envelope decode failed, keeping previous display: {}", e);
            }
        }
    }

    /// Drop the display entirely (the blob was cleared).
    pub fn reset(&mut self) {
        self.current_id = None;
        self.envelope = None;
        self.cursor = PlaybackCursor::new(0.0);
        self.tracking = false;
    }

    /// Seek to horizontal fraction `f` of the canvas. The cursor updates
    /// immediately rather than waiting for the element's own time update.
    pub fn seek_at(&mut self, fraction: f64, playback: &mut dyn PlaybackClock) {
        let fraction = fraction.clamp(0.0, 1.0);
        let target = fraction * self.cursor.duration;
        playback.seek(target);
        self.cursor.set_time(target);
    }

    /// Start per-frame playback polling.
    pub fn start_tracking(&mut self) {
        self.tracking = true;
    }

    /// Whether another poll frame should be scheduled.
    pub fn wants_frame(&self) -> bool {
        self.tracking
    }

    /// Per-frame cursor refresh; stops scheduling when playback pauses or
    /// ends.
    pub fn poll_playback(&mut self, playback: &dyn PlaybackClock) {
        if !playback.is_playing() {
            self.tracking = false;
            return;
        }
        if self.cursor.duration == 0.0 {
            self.cursor.duration = playback.duration();
        }
        self.cursor.set_time(playback.current_time());
    }

    /// Paint the envelope as `ENVELOPE_BUCKETS` bars; bar `i` is played iff
    /// `i / buckets <= progress`.
    pub fn render(&self) -> Frame {
        let mut frame = Frame::new(self.width, self.height);
        frame.ops.push(DrawOp::Clear);

        let envelope = match &self.envelope {
            Some(env) => env,
            None => return frame,
        };

        let w = self.width as f32;
        let h = self.height as f32;
        let bar_width = w / ENVELOPE_BUCKETS as f32;
        let progress = self.cursor.progress();

        for (i, &value) in envelope.values().iter().enumerate() {
            let bar_height = value * h * 0.8;
            let x = i as f32 * bar_width;
            let y = (h - bar_height) / 2.0;
            let played = i as f64 / ENVELOPE_BUCKETS as f64 <= progress;

            frame.ops.push(DrawOp::FillRect {
                x,
                y,
                width: bar_width - 1.0,
                height: bar_height,
                color: if played {
                    self.theme.bar_played
                } else {
                    self.theme.bar_unplayed
                },
            });
        }

        frame
    }
}
