pub mod audio;
pub mod capture;
pub mod config;
pub mod error;
pub mod export;
pub mod render;
pub mod session;

pub use audio::{
    decode_bytes, encode_wav, encode_wav_i16, AmplitudeEnvelope, AnalysisTap, AudioChunk,
    CaptureBackend, CaptureBackendFactory, CaptureSource, DecodedAudio, FileBackend,
    MicrophoneBackend, ANALYSIS_WINDOW, ENVELOPE_BUCKETS,
};
pub use capture::{CaptureSession, FinalizedAudio};
pub use config::Config;
pub use error::AudioError;
pub use export::{import_file, save_recording, ExportFormat, PlaybackPreview};
pub use render::{
    LiveWaveformRenderer, PlaybackClock, PlaybackCursor, RecordedWaveformRenderer, WaveformTheme,
};
pub use session::{command_for_key, Key, KeyCommand, RecordingController, RecordingState};
