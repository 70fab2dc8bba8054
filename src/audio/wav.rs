// 16-bit PCM WAV encoding.
//
// Output is the canonical 44-byte RIFF/WAVE header (16-byte fmt sub-chunk,
// integer PCM) followed by interleaved little-endian samples. Pure and
// deterministic; no I/O.

use std::io::Cursor;

use crate::error::AudioError;

/// Clamp a float sample to [-1, 1] and quantize to i16.
///
/// Negative values scale by 0x8000 and positive by 0x7FFF, truncating toward
/// zero, so both rails map exactly to i16::MIN / i16::MAX.
pub fn quantize_sample(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 0x8000 as f32) as i16
    } else {
        (s * 0x7FFF as f32) as i16
    }
}

fn wav_spec(sample_rate: u32, channels: u16) -> hound::WavSpec {
    hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Encode per-channel float buffers (values in [-1, 1]) as a PCM WAV byte
/// sequence. All channels must have equal length; frame count is the length
/// of one channel. A zero-length buffer is valid and yields a header-only
/// container.
pub fn encode_wav(channels: &[Vec<f32>], sample_rate: u32) -> Result<Vec<u8>, AudioError> {
    let channel_count = channels.len() as u16;
    if channel_count == 0 {
        return Err(AudioError::EmptyBuffer);
    }
    let frame_count = channels[0].len();
    if channels.iter().any(|c| c.len() != frame_count) {
        return Err(AudioError::Decode("channel length mismatch".into()));
    }

    let mut bytes = Vec::with_capacity(44 + frame_count * channel_count as usize * 2);
    {
        let cursor = Cursor::new(&mut bytes);
        let mut writer = hound::WavWriter::new(cursor, wav_spec(sample_rate, channel_count))
            .map_err(|e| AudioError::Decode(e.to_string()))?;

        for frame in 0..frame_count {
            for channel in channels {
                writer
                    .write_sample(quantize_sample(channel[frame]))
                    .map_err(|e| AudioError::Decode(e.to_string()))?;
            }
        }

        writer
            .finalize()
            .map_err(|e| AudioError::Decode(e.to_string()))?;
    }

    Ok(bytes)
}

/// Wrap already-quantized interleaved i16 samples in a PCM WAV container.
/// This is the finalize path for captured chunks.
pub fn encode_wav_i16(
    samples: &[i16],
    sample_rate: u32,
    channels: u16,
) -> Result<Vec<u8>, AudioError> {
    if channels == 0 {
        return Err(AudioError::EmptyBuffer);
    }

    let mut bytes = Vec::with_capacity(44 + samples.len() * 2);
    {
        let cursor = Cursor::new(&mut bytes);
        let mut writer = hound::WavWriter::new(cursor, wav_spec(sample_rate, channels))
            .map_err(|e| AudioError::Decode(e.to_string()))?;

        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| AudioError::Decode(e.to_string()))?;
        }

        writer
            .finalize()
            .map_err(|e| AudioError::Decode(e.to_string()))?;
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_rails() {
        assert_eq!(quantize_sample(-1.0), i16::MIN);
        assert_eq!(quantize_sample(1.0), i16::MAX);
        assert_eq!(quantize_sample(0.0), 0);
        // Out-of-range input clamps instead of wrapping
        assert_eq!(quantize_sample(-3.5), i16::MIN);
        assert_eq!(quantize_sample(2.0), i16::MAX);
    }

    #[test]
    fn test_quantize_truncates_toward_zero() {
        assert_eq!(quantize_sample(0.5), (0.5 * 0x7FFF as f32) as i16);
        assert_eq!(quantize_sample(-0.5), (-0.5 * 0x8000 as f32) as i16);
    }

    #[test]
    fn test_encode_empty_buffer_is_header_only() {
        let bytes = encode_wav(&[vec![]], 44100).unwrap();
        assert_eq!(bytes.len(), 44, "empty recording should be header only");
    }

    #[test]
    fn test_encode_rejects_zero_channels() {
        assert!(matches!(
            encode_wav(&[], 44100),
            Err(AudioError::EmptyBuffer)
        ));
    }
}
