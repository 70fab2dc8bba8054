pub mod live;
pub mod recorded;
pub mod scene;

pub use live::LiveWaveformRenderer;
pub use recorded::{
    DecodeRequest, EnvelopeResult, PlaybackClock, PlaybackCursor, RecordedWaveformRenderer,
};
pub use scene::{Color, DrawOp, Frame, WaveformTheme};
