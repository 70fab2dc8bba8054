// Integration tests for the PCM WAV encoder.
//
// These verify the container byte layout field by field and the quantization
// round-trip bound, without touching the filesystem.

use anyhow::Result;
use std::io::Cursor;
use voicecap::audio::{encode_wav, encode_wav_i16};

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[test]
fn test_header_fields_are_internally_consistent() -> Result<()> {
    let channels = vec![vec![0.25f32; 1000], vec![-0.25f32; 1000]];
    let bytes = encode_wav(&channels, 22050)?;

    let frame_count = 1000;
    let data_len = frame_count * 2 * 2; // frames * channels * 2 bytes
    assert_eq!(bytes.len(), 44 + data_len, "total length");

    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(u32_at(&bytes, 4) as usize, bytes.len() - 8, "RIFF size");
    assert_eq!(&bytes[8..12], b"WAVE");

    assert_eq!(&bytes[12..16], b"fmt ");
    assert_eq!(u32_at(&bytes, 16), 16, "fmt sub-chunk size");
    assert_eq!(u16_at(&bytes, 20), 1, "format tag must be integer PCM");
    assert_eq!(u16_at(&bytes, 22), 2, "channel count");
    assert_eq!(u32_at(&bytes, 24), 22050, "sample rate");
    assert_eq!(u32_at(&bytes, 28), 22050 * 2 * 2, "byte rate");
    assert_eq!(u16_at(&bytes, 32), 2 * 2, "block align");
    assert_eq!(u16_at(&bytes, 34), 16, "bits per sample");

    assert_eq!(&bytes[36..40], b"data");
    assert_eq!(u32_at(&bytes, 40) as usize, data_len, "data sub-chunk size");

    Ok(())
}

#[test]
fn test_one_second_stereo_silence_byte_count() -> Result<()> {
    // 2 channels, 44100Hz, 1 second of silence
    let channels = vec![vec![0.0f32; 44100], vec![0.0f32; 44100]];
    let bytes = encode_wav(&channels, 44100)?;

    assert_eq!(bytes.len(), 176_444, "44 + 44100 * 2 * 2");
    assert_eq!(u32_at(&bytes, 40), 176_400, "data sub-chunk length");
    assert!(
        bytes[44..].iter().all(|&b| b == 0),
        "silence must encode to all-zero data bytes"
    );

    Ok(())
}

#[test]
fn test_round_trip_within_quantization_bound() -> Result<()> {
    let samples: Vec<f32> = (0..4410)
        .map(|i| (i as f32 * 0.0123).sin() * 0.9)
        .collect();
    let bytes = encode_wav(&[samples.clone()], 44100)?;

    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let decoded: Vec<i16> = reader.into_samples::<i16>().collect::<Result<_, _>>()?;
    assert_eq!(decoded.len(), samples.len());

    for (i, (&orig, &q)) in samples.iter().zip(&decoded).enumerate() {
        let recovered = if q < 0 {
            q as f32 / 0x8000 as f32
        } else {
            q as f32 / 0x7FFF as f32
        };
        assert!(
            (orig - recovered).abs() <= 1.0 / 32768.0,
            "sample {} out of bound: {} vs {}",
            i,
            orig,
            recovered
        );
    }

    Ok(())
}

#[test]
fn test_interleaving_order_is_frame_major() -> Result<()> {
    // Left channel always positive, right always negative
    let channels = vec![vec![0.5f32; 10], vec![-0.5f32; 10]];
    let bytes = encode_wav(&channels, 8000)?;

    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let decoded: Vec<i16> = reader.into_samples::<i16>().collect::<Result<_, _>>()?;

    for frame in decoded.chunks(2) {
        assert!(frame[0] > 0, "left sample first in each frame");
        assert!(frame[1] < 0, "right sample second in each frame");
    }

    Ok(())
}

#[test]
fn test_i16_wrapper_matches_float_path() -> Result<()> {
    let floats = vec![vec![1.0f32, -1.0, 0.0, 0.5]];
    let from_floats = encode_wav(&floats, 16000)?;

    let quantized: Vec<i16> = floats[0]
        .iter()
        .map(|&s| voicecap::audio::quantize_sample(s))
        .collect();
    let from_i16 = encode_wav_i16(&quantized, 16000, 1)?;

    assert_eq!(from_floats, from_i16);
    Ok(())
}
