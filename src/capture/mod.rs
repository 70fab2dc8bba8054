pub mod session;

pub use session::{CaptureSession, FinalizedAudio};
