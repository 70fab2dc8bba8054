// Live scrolling waveform: paints the capture session's analysis window as a
// time-domain line once per animation frame.

use std::sync::Arc;

use crate::audio::AnalysisTap;

use super::scene::{DrawOp, Frame, WaveformTheme};

/// Renders the live analysis tap while a recording is active.
///
/// Scheduling is cooperative: the driver asks `wants_frame` and calls
/// `render_frame` once per display tick. Deactivating or pausing cancels the
/// schedule; the next frame is a single flat centerline. Every frame redraws
/// from scratch.
pub struct LiveWaveformRenderer {
    tap: Arc<dyn AnalysisTap>,
    theme: WaveformTheme,
    width: u32,
    height: u32,
    active: bool,
    paused: bool,
    window: Vec<u8>,
}

impl LiveWaveformRenderer {
    pub fn new(tap: Arc<dyn AnalysisTap>, theme: WaveformTheme, width: u32, height: u32) -> Self {
        let window = vec![128u8; tap.window_size()];
        Self {
            tap,
            theme,
            width,
            height,
            active: false,
            paused: false,
            window,
        }
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.paused = false;
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Whether another animation frame should be scheduled after this one.
    pub fn wants_frame(&self) -> bool {
        self.active && !self.paused
    }

    /// Paint one frame: the latest time-domain window while running, a flat
    /// centerline while paused or inactive.
    pub fn render_frame(&mut self) -> Frame {
        let mut frame = Frame::new(self.width, self.height);
        let w = self.width as f32;
        let h = self.height as f32;
        let mid = h / 2.0;

        if !self.wants_frame() {
            frame.ops.push(DrawOp::FillRect {
                x: 0.0,
                y: 0.0,
                width: w,
                height: h,
                color: self.theme.muted,
            });
            frame.ops.push(DrawOp::Polyline {
                points: vec![(0.0, mid), (w, mid)],
                color: self.theme.primary,
                width: 2.0,
            });
            return frame;
        }

        self.tap.time_domain(&mut self.window);

        frame.ops.push(DrawOp::FillRect {
            x: 0.0,
            y: 0.0,
            width: w,
            height: h,
            color: self.theme.background,
        });

        // Byte 128 is the centerline; v/128 scales the unsigned deviation
        // across the full canvas height.
        let slice_width = w / self.window.len() as f32;
        let mut points: Vec<(f32, f32)> = Vec::with_capacity(self.window.len() + 1);
        for (i, &v) in self.window.iter().enumerate() {
            let x = i as f32 * slice_width;
            let y = (v as f32 / 128.0) * mid;
            points.push((x, y));
        }
        points.push((w, mid));

        frame.ops.push(DrawOp::Polyline {
            points: points.clone(),
            color: self.theme.primary,
            width: 2.0,
        });

        // Wider translucent accent re-stroke approximating the glow pass
        frame.ops.push(DrawOp::Polyline {
            points,
            color: self.theme.accent.with_alpha(self.theme.glow_alpha),
            width: 6.0,
        });

        frame
    }
}
