use thiserror::Error;

/// Errors produced by the capture/encode/visualize pipeline.
///
/// None of these are fatal: callers report them and fall back to the state
/// they were in before the failed operation.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No microphone present, or the environment refused access.
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Malformed or unsupported audio bytes.
    #[error("failed to decode audio: {0}")]
    Decode(String),

    /// A zero-length blob where audio content was required.
    #[error("audio buffer is empty")]
    EmptyBuffer,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AudioError::DeviceUnavailable("no default input".into());
        assert_eq!(
            err.to_string(),
            "capture device unavailable: no default input"
        );
        assert_eq!(AudioError::EmptyBuffer.to_string(), "audio buffer is empty");
    }
}
