use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use voicecap::audio::{decode_bytes, AmplitudeEnvelope, CaptureBackendFactory, CaptureSource};
use voicecap::export::{save_recording, ExportFormat};
use voicecap::session::RecordingController;
use voicecap::Config;

#[derive(Parser)]
#[command(name = "voicecap")]
#[command(about = "Record, convert, and inspect voice recordings")]
struct Cli {
    /// Configuration file (without extension)
    #[arg(long, default_value = "config/voicecap")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record from the default microphone and save the result
    Record {
        /// Duration to record in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Export format: wav or native
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Decode any supported audio file and re-encode it as 16-bit PCM WAV
    Convert {
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Print the 100-bucket amplitude envelope of an audio file
    Envelope {
        input: PathBuf,

        /// Emit JSON instead of a bar chart
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let cfg = Config::load(&cli.config).unwrap_or_else(|e| {
        warn!("Using default configuration ({e})");
        Config::default()
    });

    match cli.command {
        Command::Record {
            duration,
            output_dir,
            format,
        } => record(cfg, duration, output_dir, format).await,
        Command::Convert { input, output_dir } => convert(&input, &output_dir),
        Command::Envelope { input, json } => envelope(&input, json),
    }
}

async fn record(
    cfg: Config,
    duration: u64,
    output_dir: Option<PathBuf>,
    format: Option<String>,
) -> Result<()> {
    let format = format.unwrap_or_else(|| cfg.export.format.clone());
    let format = ExportFormat::parse(&format)
        .with_context(|| format!("Unknown export format: {format}"))?;
    let output_dir = output_dir.unwrap_or_else(|| PathBuf::from(&cfg.export.output_dir));

    let audio_cfg = cfg.audio.clone();
    let mut controller = RecordingController::new(Box::new(move || {
        CaptureBackendFactory::create(CaptureSource::Microphone, audio_cfg.clone())
    }));

    controller.start().await?;
    info!("Recording for {} seconds...", duration);

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await; // first tick completes immediately
    while controller.elapsed_secs() < duration {
        ticker.tick().await;
        controller.tick_second();
        controller.pump();
        info!("  {}s", controller.elapsed_secs());
    }

    controller.stop().await?;

    let audio = controller
        .finalized()
        .context("Recording produced no audio")?;
    let path = save_recording(audio, format, &output_dir)?;
    println!("{}", path.display());

    Ok(())
}

fn convert(input: &PathBuf, output_dir: &PathBuf) -> Result<()> {
    let audio = voicecap::export::import_file(input)?;
    let path = save_recording(&audio, ExportFormat::Wav, output_dir)?;
    println!("{}", path.display());
    Ok(())
}

fn envelope(input: &PathBuf, json: bool) -> Result<()> {
    let bytes = std::fs::read(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let decoded = decode_bytes(bytes, None)?;
    let env = AmplitudeEnvelope::from_samples(&decoded.channels[0]);

    if json {
        let out = serde_json::json!({
            "buckets": env.values(),
            "duration_seconds": decoded.duration_seconds(),
            "sample_rate": decoded.sample_rate,
            "channels": decoded.channels.len(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (i, &v) in env.values().iter().enumerate() {
            let bar = "#".repeat((v * 60.0).round() as usize);
            println!("{i:3} {bar}");
        }
    }

    Ok(())
}
