// Default-microphone capture backend built on cpal.
//
// cpal streams are not Send, so the stream lives on a dedicated thread for
// the lifetime of the capture. The audio callback quantizes incoming samples
// to 16-bit PCM chunks and feeds the analysis ring; it never blocks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc as std_mpsc, Arc};
use std::thread::JoinHandle;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::backend::{AnalysisBuffer, AnalysisTap, AudioChunk, CaptureBackend};
use crate::config::AudioConfig;
use crate::error::AudioError;

pub struct MicrophoneBackend {
    config: AudioConfig,
    paused: Arc<AtomicBool>,
    tap: Arc<AnalysisBuffer>,
    /// Set once the device thread reports a running stream
    format: Option<(u32, u16)>,
    worker: Option<Worker>,
}

struct Worker {
    stop_tx: std_mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl MicrophoneBackend {
    pub fn new(config: AudioConfig) -> Self {
        Self {
            config,
            paused: Arc::new(AtomicBool::new(false)),
            tap: Arc::new(AnalysisBuffer::new()),
            format: None,
            worker: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for MicrophoneBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioChunk>, AudioError> {
        if self.worker.is_some() {
            return Err(AudioError::DeviceUnavailable(
                "capture already running".into(),
            ));
        }

        let (chunk_tx, chunk_rx) = mpsc::channel::<AudioChunk>(64);
        let (ready_tx, ready_rx) = std_mpsc::channel::<Result<(u32, u16), AudioError>>();
        let (stop_tx, stop_rx) = std_mpsc::channel::<()>();

        let paused = Arc::clone(&self.paused);
        let tap = Arc::clone(&self.tap);
        let chunk_ms = self.config.chunk_duration_ms.max(10);

        let handle = std::thread::spawn(move || {
            device_thread(chunk_tx, ready_tx, stop_rx, paused, tap, chunk_ms);
        });

        // The device thread reports success or failure before entering its
        // wait loop; a send-side drop means it panicked during setup.
        let format = match ready_rx.recv() {
            Ok(Ok(format)) => format,
            Ok(Err(e)) => {
                let _ = handle.join();
                return Err(e);
            }
            Err(_) => {
                let _ = handle.join();
                return Err(AudioError::DeviceUnavailable(
                    "capture thread exited during setup".into(),
                ));
            }
        };

        info!(
            "Microphone capture started: {}Hz, {} channels",
            format.0, format.1
        );

        self.paused.store(false, Ordering::SeqCst);
        self.format = Some(format);
        self.worker = Some(Worker { stop_tx, handle });

        Ok(chunk_rx)
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }

    async fn stop(&mut self) -> Result<(), AudioError> {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let joined = tokio::task::spawn_blocking(move || worker.handle.join()).await;
            match joined {
                Ok(Ok(())) => info!("Microphone capture stopped"),
                _ => warn!("Capture thread did not shut down cleanly"),
            }
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.worker.is_some()
    }

    fn analysis_tap(&self) -> Arc<dyn AnalysisTap> {
        Arc::clone(&self.tap) as Arc<dyn AnalysisTap>
    }

    fn format(&self) -> (u32, u16) {
        self.format
            .unwrap_or((self.config.sample_rate, self.config.channels))
    }

    fn name(&self) -> &str {
        "microphone"
    }
}

/// Owns the cpal stream until a stop signal arrives.
fn device_thread(
    chunk_tx: mpsc::Sender<AudioChunk>,
    ready_tx: std_mpsc::Sender<Result<(u32, u16), AudioError>>,
    stop_rx: std_mpsc::Receiver<()>,
    paused: Arc<AtomicBool>,
    tap: Arc<AnalysisBuffer>,
    chunk_ms: u64,
) {
    let host = cpal::default_host();
    let device = match host.default_input_device() {
        Some(d) => d,
        None => {
            let _ = ready_tx.send(Err(AudioError::DeviceUnavailable(
                "no default input device".into(),
            )));
            return;
        }
    };

    let supported = match device.default_input_config() {
        Ok(c) => c,
        Err(e) => {
            let _ = ready_tx.send(Err(AudioError::DeviceUnavailable(e.to_string())));
            return;
        }
    };

    let sample_format = supported.sample_format();
    let stream_config: cpal::StreamConfig = supported.into();
    let sample_rate = stream_config.sample_rate.0;
    let channels = stream_config.channels;
    let samples_per_chunk = ((sample_rate as u64 * chunk_ms / 1000) as usize * channels as usize)
        .max(channels as usize);

    let on_samples = make_sample_handler(
        chunk_tx,
        paused,
        tap,
        sample_rate,
        channels,
        samples_per_chunk,
    );

    let err_fn = |e: cpal::StreamError| warn!("Capture stream error: {}", e);

    let stream = match sample_format {
        cpal::SampleFormat::F32 => {
            let mut on_samples = on_samples;
            device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| on_samples(data),
                err_fn,
                None,
            )
        }
        cpal::SampleFormat::I16 => {
            let mut on_samples = on_samples;
            device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let floats: Vec<f32> =
                        data.iter().map(|&s| s as f32 / i16::MAX as f32).collect();
                    on_samples(&floats);
                },
                err_fn,
                None,
            )
        }
        cpal::SampleFormat::U16 => {
            let mut on_samples = on_samples;
            device.build_input_stream(
                &stream_config,
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    let floats: Vec<f32> = data
                        .iter()
                        .map(|&s| (s as f32 - 32768.0) / 32768.0)
                        .collect();
                    on_samples(&floats);
                },
                err_fn,
                None,
            )
        }
        other => {
            let _ = ready_tx.send(Err(AudioError::DeviceUnavailable(format!(
                "unsupported sample format: {other:?}"
            ))));
            return;
        }
    };

    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            let _ = ready_tx.send(Err(AudioError::DeviceUnavailable(e.to_string())));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(AudioError::DeviceUnavailable(e.to_string())));
        return;
    }

    let _ = ready_tx.send(Ok((sample_rate, channels)));

    // Block until stop; dropping the stream releases the device.
    let _ = stop_rx.recv();
    drop(stream);
    debug!("Capture device released");
}

/// Builds the callback body shared by all sample-format variants: feed the
/// analysis ring, quantize to i16, and ship fixed-size chunks without
/// blocking the audio thread.
fn make_sample_handler(
    chunk_tx: mpsc::Sender<AudioChunk>,
    paused: Arc<AtomicBool>,
    tap: Arc<AnalysisBuffer>,
    sample_rate: u32,
    channels: u16,
    samples_per_chunk: usize,
) -> impl FnMut(&[f32]) + Send + 'static {
    let mut pending: Vec<i16> = Vec::with_capacity(samples_per_chunk);
    let mut mono: Vec<f32> = Vec::new();

    move |data: &[f32]| {
        if paused.load(Ordering::SeqCst) {
            return;
        }

        mono.clear();
        for frame in data.chunks(channels as usize) {
            mono.push(frame[0]);
        }
        tap.push_samples(&mono);

        for &s in data {
            pending.push(super::wav::quantize_sample(s));
        }

        while pending.len() >= samples_per_chunk {
            let rest = pending.split_off(samples_per_chunk);
            let samples = std::mem::replace(&mut pending, rest);
            let chunk = AudioChunk {
                samples,
                sample_rate,
                channels,
            };
            // Never block inside the audio callback; a full buffer means the
            // consumer stalled, and dropping is the lesser evil.
            if chunk_tx.try_send(chunk).is_err() {
                debug!("Chunk buffer full, dropping capture fragment");
            }
        }
    }
}
