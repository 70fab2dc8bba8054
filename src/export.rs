// Handing recordings to the environment: saving to disk, importing uploaded
// files, and scratch files for an external playback element.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{info, warn};

use crate::audio::{decode_bytes, encode_wav};
use crate::capture::FinalizedAudio;
use crate::error::AudioError;

/// Download format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Re-encode as canonical 16-bit PCM WAV
    Wav,
    /// The blob exactly as the recorder produced it
    Native,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "wav" => Some(Self::Wav),
            "native" => Some(Self::Native),
            _ => None,
        }
    }
}

/// `recording-<timestamp>.<ext>`, matching the original download naming.
pub fn export_filename(format: ExportFormat, mime_hint: &str) -> String {
    let stamp = Local::now().format("%Y-%m-%dT%H-%M-%S");
    let ext = match format {
        ExportFormat::Wav => "wav",
        ExportFormat::Native => extension_for_mime(mime_hint),
    };
    format!("recording-{stamp}.{ext}")
}

fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/webm" => "webm",
        "audio/ogg" => "ogg",
        "audio/mpeg" => "mp3",
        "audio/mp4" | "audio/x-m4a" => "m4a",
        _ => "bin",
    }
}

fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        "ogg" | "opus" => "audio/ogg",
        "mp3" => "audio/mpeg",
        "m4a" | "mp4" | "aac" => "audio/mp4",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Save a finalized recording into `dir`, returning the written path.
///
/// `Wav` decodes the blob and re-encodes it through the PCM encoder; `Native`
/// writes the bytes untouched.
pub fn save_recording(
    audio: &FinalizedAudio,
    format: ExportFormat,
    dir: impl AsRef<Path>,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).context("Failed to create output directory")?;

    let bytes = match format {
        ExportFormat::Native => audio.bytes.clone(),
        ExportFormat::Wav => {
            let decoded = decode_bytes(audio.bytes.clone(), Some(&audio.mime_hint))
                .context("Failed to decode recording for WAV export")?;
            encode_wav(&decoded.channels, decoded.sample_rate)
                .context("Failed to encode WAV")?
        }
    };

    let path = dir.join(export_filename(format, &audio.mime_hint));
    fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Saved recording: {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

/// The upload path: wrap an externally supplied audio file as a finalized
/// blob. Only the extension informs the mime hint; content is not validated
/// here (decoding rejects garbage later).
pub fn import_file(path: impl AsRef<Path>) -> Result<FinalizedAudio, AudioError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;

    let mime = path
        .extension()
        .and_then(|e| e.to_str())
        .map(mime_for_extension)
        .unwrap_or("application/octet-stream");

    info!(
        "Imported audio file: {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        mime
    );

    Ok(FinalizedAudio::new(bytes, mime))
}

/// Scratch file handed to an external playback element while a finalized
/// blob is previewed.
///
/// The native analog of an object URL: created when a blob is installed,
/// released exactly once when the blob is superseded or cleared. Explicit
/// `release` is preferred; `Drop` covers teardown paths so the file is never
/// leaked, and the released flag keeps a double release from becoming a
/// double delete.
#[derive(Debug)]
pub struct PlaybackPreview {
    path: PathBuf,
    released: bool,
}

impl PlaybackPreview {
    /// Write `audio` into `dir` under its blob id and hold the path.
    pub fn create(audio: &FinalizedAudio, dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).context("Failed to create preview directory")?;

        let ext = extension_for_mime(&audio.mime_hint);
        let path = dir.join(format!("preview-{}.{ext}", audio.id));
        fs::write(&path, &audio.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(Self {
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the scratch file.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.released {
            warn!("Playback preview released twice: {}", self.path.display());
            return;
        }
        self.released = true;
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(
                "Failed to remove playback preview {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

impl Drop for PlaybackPreview {
    fn drop(&mut self) {
        if !self.released {
            self.release_inner();
        }
    }
}
