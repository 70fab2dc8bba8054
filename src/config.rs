use anyhow::Result;
use serde::Deserialize;

use crate::render::WaveformTheme;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub audio: AudioConfig,
    pub export: ExportConfig,
    #[serde(default)]
    pub theme: WaveformTheme,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Preferred capture sample rate (the device may override)
    pub sample_rate: u32,
    /// Preferred channel count (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Chunk granularity in milliseconds
    pub chunk_duration_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Directory recordings are saved into
    pub output_dir: String,
    /// Default download format: "wav" or "native"
    pub format: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audio: AudioConfig::default(),
            export: ExportConfig::default(),
            theme: WaveformTheme::default(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
            chunk_duration_ms: 100,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: "recordings".to_string(),
            format: "wav".to_string(),
        }
    }
}
