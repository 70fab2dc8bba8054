// Fixed-resolution amplitude envelope for the recorded-waveform display.

/// Number of bars in the recorded waveform.
pub const ENVELOPE_BUCKETS: usize = 100;

/// Amplitude summary of a full recording: exactly `ENVELOPE_BUCKETS`
/// normalized values in [0, 1]. Derived from channel 0 only; immutable once
/// built.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeEnvelope {
    values: Vec<f32>,
}

impl AmplitudeEnvelope {
    /// Compute the envelope of a mono sample buffer.
    ///
    /// Samples are split into `ENVELOPE_BUCKETS` equal contiguous blocks
    /// (trailing samples beyond 100 * block_size are dropped), each bucket is
    /// the block's mean absolute amplitude, and all buckets are normalized by
    /// the maximum bucket. A silent or too-short buffer yields an all-zero
    /// envelope rather than dividing by zero.
    pub fn from_samples(samples: &[f32]) -> Self {
        let block_size = samples.len() / ENVELOPE_BUCKETS;
        if block_size == 0 {
            return Self::silent();
        }

        let mut values: Vec<f32> = (0..ENVELOPE_BUCKETS)
            .map(|i| {
                let block = &samples[i * block_size..(i + 1) * block_size];
                block.iter().map(|s| s.abs()).sum::<f32>() / block_size as f32
            })
            .collect();

        let max = values.iter().cloned().fold(0.0f32, f32::max);
        if max > 0.0 {
            for v in values.iter_mut() {
                *v /= max;
            }
        }

        Self { values }
    }

    /// All-zero envelope (silence, empty buffer, or nothing loaded yet).
    pub fn silent() -> Self {
        Self {
            values: vec![0.0; ENVELOPE_BUCKETS],
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn is_silent(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_has_fixed_bucket_count() {
        let samples: Vec<f32> = (0..44100).map(|i| (i as f32 * 0.001).sin()).collect();
        let env = AmplitudeEnvelope::from_samples(&samples);
        assert_eq!(env.values().len(), ENVELOPE_BUCKETS);
    }

    #[test]
    fn test_envelope_normalized_to_unit_max() {
        let samples: Vec<f32> = (0..10_000).map(|i| ((i % 100) as f32) / 100.0).collect();
        let env = AmplitudeEnvelope::from_samples(&samples);

        let max = env.values().iter().cloned().fold(0.0f32, f32::max);
        assert!((max - 1.0).abs() < 1e-6, "max bucket should be 1.0");
        assert!(env.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_silent_buffer_yields_zero_envelope() {
        let env = AmplitudeEnvelope::from_samples(&vec![0.0; 5000]);
        assert!(env.is_silent(), "silence must not produce NaN buckets");
        assert_eq!(env.values().len(), ENVELOPE_BUCKETS);
    }

    #[test]
    fn test_short_buffer_yields_zero_envelope() {
        // Fewer samples than buckets: block size is zero, nothing to average
        let env = AmplitudeEnvelope::from_samples(&[0.5; 99]);
        assert!(env.is_silent());
    }

    #[test]
    fn test_trailing_remainder_is_dropped() {
        // 150 samples: block size 1, buckets read samples 0..100 only
        let mut samples = vec![0.1f32; 150];
        for s in samples.iter_mut().skip(100) {
            *s = 1.0; // should not influence any bucket
        }
        let env = AmplitudeEnvelope::from_samples(&samples);
        // Uniform 0.1 blocks all normalize to 1.0
        assert!(env.values().iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }
}
