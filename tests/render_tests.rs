// Integration tests for the live and recorded waveform renderers. Frames are
// inspected as draw-op snapshots; a fake playback clock stands in for the
// audio element.

use std::sync::Arc;

use voicecap::audio::{encode_wav, AnalysisTap, ENVELOPE_BUCKETS};
use voicecap::capture::FinalizedAudio;
use voicecap::render::{
    DrawOp, LiveWaveformRenderer, PlaybackClock, RecordedWaveformRenderer, WaveformTheme,
};

/// Analysis tap that always returns the same window.
struct FixedTap {
    window: Vec<u8>,
}

impl AnalysisTap for FixedTap {
    fn window_size(&self) -> usize {
        self.window.len()
    }

    fn time_domain(&self, out: &mut [u8]) {
        let n = out.len().min(self.window.len());
        out[..n].copy_from_slice(&self.window[..n]);
    }
}

struct FakePlayback {
    time: f64,
    duration: f64,
    playing: bool,
}

impl PlaybackClock for FakePlayback {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn seek(&mut self, time: f64) {
        self.time = time.clamp(0.0, self.duration);
    }
}

fn fixed_tap(byte: u8) -> Arc<dyn AnalysisTap> {
    Arc::new(FixedTap {
        window: vec![byte; 2048],
    })
}

#[test]
fn test_live_renderer_paints_flat_line_when_inactive() {
    let mut renderer = LiveWaveformRenderer::new(fixed_tap(200), WaveformTheme::default(), 800, 96);

    assert!(!renderer.wants_frame());
    let frame = renderer.render_frame();

    // Muted fill + one centerline polyline, nothing else
    assert_eq!(frame.ops.len(), 2);
    match &frame.ops[1] {
        DrawOp::Polyline { points, .. } => {
            assert_eq!(points, &vec![(0.0, 48.0), (800.0, 48.0)]);
        }
        op => panic!("expected centerline polyline, got {op:?}"),
    }
}

#[test]
fn test_live_renderer_paints_flat_line_when_paused() {
    let mut renderer = LiveWaveformRenderer::new(fixed_tap(200), WaveformTheme::default(), 800, 96);
    renderer.set_active(true);
    renderer.set_paused(true);

    assert!(!renderer.wants_frame(), "pause cancels frame scheduling");
    let frame = renderer.render_frame();
    assert!(matches!(frame.ops[1], DrawOp::Polyline { .. }));
}

#[test]
fn test_live_renderer_maps_bytes_to_deviation() {
    let mut renderer = LiveWaveformRenderer::new(fixed_tap(128), WaveformTheme::default(), 800, 96);
    renderer.set_active(true);
    assert!(renderer.wants_frame());

    let frame = renderer.render_frame();
    // background fill + main stroke + glow re-stroke
    assert_eq!(frame.ops.len(), 3);

    let points = match &frame.ops[1] {
        DrawOp::Polyline { points, width, .. } => {
            assert_eq!(*width, 2.0);
            points
        }
        op => panic!("expected waveform polyline, got {op:?}"),
    };

    // Byte 128 is the centerline: (128 / 128) * height/2 == height/2
    assert_eq!(points.len(), 2049, "2048 samples plus the closing point");
    assert!(points[..2048].iter().all(|&(_, y)| y == 48.0));
    assert_eq!(points[2048], (800.0, 48.0));

    // A full-scale byte lands at the bottom edge
    let mut loud = LiveWaveformRenderer::new(fixed_tap(255), WaveformTheme::default(), 800, 96);
    loud.set_active(true);
    let frame = loud.render_frame();
    if let DrawOp::Polyline { points, .. } = &frame.ops[1] {
        let expected = (255.0 / 128.0) * 48.0;
        assert!((points[0].1 - expected).abs() < 1e-3);
    }
}

#[test]
fn test_live_renderer_glow_is_wider_translucent_restroke() {
    let theme = WaveformTheme::default();
    let mut renderer = LiveWaveformRenderer::new(fixed_tap(100), theme.clone(), 800, 96);
    renderer.set_active(true);

    let frame = renderer.render_frame();
    let (main, glow) = match (&frame.ops[1], &frame.ops[2]) {
        (
            DrawOp::Polyline {
                points: p1,
                width: w1,
                ..
            },
            DrawOp::Polyline {
                points: p2,
                width: w2,
                color,
            },
        ) => ((p1, w1), (p2, w2, color)),
        other => panic!("expected two strokes, got {other:?}"),
    };

    assert_eq!(main.0, glow.0, "glow re-strokes the same path");
    assert!(glow.1 > main.1, "glow stroke is wider");
    assert!(glow.2.a < 255, "glow stroke is translucent");
}

fn loaded_renderer(samples: Vec<f32>, sample_rate: u32) -> RecordedWaveformRenderer {
    let bytes = encode_wav(&[samples], sample_rate).expect("encode fixture");
    let audio = FinalizedAudio::new(bytes, "audio/wav");

    let mut renderer = RecordedWaveformRenderer::new(WaveformTheme::default(), 800, 60);
    let request = renderer.begin_load(&audio);
    let (id, result) = request.compute();
    renderer.apply(id, result);
    renderer
}

#[test]
fn test_recorded_renderer_draws_one_bar_per_bucket() {
    let samples: Vec<f32> = (0..16000).map(|i| (i as f32 * 0.02).sin()).collect();
    let renderer = loaded_renderer(samples, 16000);

    let frame = renderer.render();
    let bars: Vec<_> = frame
        .ops
        .iter()
        .filter(|op| matches!(op, DrawOp::FillRect { .. }))
        .collect();
    assert_eq!(bars.len(), ENVELOPE_BUCKETS);
    assert!(matches!(frame.ops[0], DrawOp::Clear));
}

#[test]
fn test_recorded_renderer_splits_played_and_unplayed_bars() {
    let samples: Vec<f32> = (0..16000).map(|i| (i as f32 * 0.02).sin()).collect();
    let mut renderer = loaded_renderer(samples, 16000);

    let theme = WaveformTheme::default();
    let mut playback = FakePlayback {
        time: 0.0,
        duration: renderer.cursor().duration,
        playing: false,
    };

    // Seek halfway via a canvas click
    renderer.seek_at(0.5, &mut playback);

    let frame = renderer.render();
    let mut played = 0;
    let mut unplayed = 0;
    for op in &frame.ops {
        if let DrawOp::FillRect { color, .. } = op {
            if *color == theme.bar_played {
                played += 1;
            } else if *color == theme.bar_unplayed {
                unplayed += 1;
            }
        }
    }

    // Bars at fraction <= 0.5: indices 0..=50
    assert_eq!(played, 51, "bars at or before the playback position");
    assert_eq!(unplayed, 49);
}

#[test]
fn test_click_seek_updates_cursor_optimistically() {
    let samples: Vec<f32> = (0..32000).map(|i| (i as f32 * 0.02).sin()).collect();
    let mut renderer = loaded_renderer(samples, 16000);
    let duration = renderer.cursor().duration;
    assert!((duration - 2.0).abs() < 0.01);

    let mut playback = FakePlayback {
        time: 0.0,
        duration,
        playing: false,
    };

    renderer.seek_at(0.25, &mut playback);

    // Both the element and the cursor move without waiting for a time update
    assert!((playback.time - duration * 0.25).abs() < 1e-9);
    assert!((renderer.cursor().current_time - duration * 0.25).abs() < 1e-9);
}

#[test]
fn test_playback_polling_stops_when_playback_ends() {
    let samples: Vec<f32> = (0..16000).map(|i| (i as f32 * 0.02).sin()).collect();
    let mut renderer = loaded_renderer(samples, 16000);

    let mut playback = FakePlayback {
        time: 0.3,
        duration: renderer.cursor().duration,
        playing: true,
    };

    renderer.start_tracking();
    assert!(renderer.wants_frame());

    renderer.poll_playback(&playback);
    assert!((renderer.cursor().current_time - 0.3).abs() < 1e-9);
    assert!(renderer.wants_frame(), "keeps polling while playing");

    playback.playing = false;
    renderer.poll_playback(&playback);
    assert!(!renderer.wants_frame(), "polling stops on pause/end");
}

#[test]
fn test_cursor_is_clamped_to_duration() {
    let samples: Vec<f32> = (0..16000).map(|i| (i as f32 * 0.02).sin()).collect();
    let mut renderer = loaded_renderer(samples, 16000);
    let duration = renderer.cursor().duration;

    let mut playback = FakePlayback {
        time: 0.0,
        duration,
        playing: false,
    };

    renderer.seek_at(7.5, &mut playback); // fraction clamps to 1.0
    assert!(renderer.cursor().current_time <= duration);

    renderer.seek_at(-1.0, &mut playback);
    assert_eq!(renderer.cursor().current_time, 0.0);
}

#[test]
fn test_reset_clears_display() {
    let samples: Vec<f32> = (0..16000).map(|i| (i as f32 * 0.02).sin()).collect();
    let mut renderer = loaded_renderer(samples, 16000);
    assert!(renderer.envelope().is_some());

    renderer.reset();
    assert!(renderer.envelope().is_none());

    let frame = renderer.render();
    assert_eq!(frame.ops.len(), 1, "only the clear op remains");
}
