pub mod backend;
pub mod decode;
pub mod envelope;
pub mod file;
pub mod microphone;
pub mod wav;

pub use backend::{
    AnalysisBuffer, AnalysisTap, AudioChunk, CaptureBackend, CaptureBackendFactory, CaptureSource,
    ANALYSIS_WINDOW,
};
pub use decode::{decode_bytes, DecodedAudio};
pub use envelope::{AmplitudeEnvelope, ENVELOPE_BUCKETS};
pub use file::FileBackend;
pub use microphone::MicrophoneBackend;
pub use wav::{encode_wav, encode_wav_i16, quantize_sample};
