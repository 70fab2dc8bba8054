// Draw primitives shared by the live and recorded waveform renderers.
//
// Renderers do not touch a real canvas: they emit a Frame of draw ops that a
// front end (or a test) consumes. Colors come from explicit configuration
// handed to the renderer at construction, never from ambient lookup.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::Deserialize;

/// RGBA color, parsed from "#rrggbb" or "#rrggbbaa".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with alpha scaled by `alpha` in [0, 1].
    pub fn with_alpha(self, alpha: f32) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0) as u8;
        Self { a, ..self }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let parse = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| format!("bad color {s:?}: {e}"))
        };
        match hex.len() {
            6 => Ok(Self {
                r: parse(0..2)?,
                g: parse(2..4)?,
                b: parse(4..6)?,
                a: 255,
            }),
            8 => Ok(Self {
                r: parse(0..2)?,
                g: parse(2..4)?,
                b: parse(4..6)?,
                a: parse(6..8)?,
            }),
            _ => Err(format!("bad color {s:?}: expected #rrggbb or #rrggbbaa")),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Colors used by both waveform renderers.
#[derive(Debug, Clone, Deserialize)]
pub struct WaveformTheme {
    /// Canvas fill behind the live trace
    pub background: Color,
    /// Live trace stroke
    pub primary: Color,
    /// Secondary stroke accent
    pub accent: Color,
    /// Flat-line fill while paused
    pub muted: Color,
    /// Envelope bars at or before the playback position
    pub bar_played: Color,
    /// Envelope bars past the playback position
    pub bar_unplayed: Color,
    /// Alpha of the wide glow re-stroke on the live trace
    pub glow_alpha: f32,
}

impl Default for WaveformTheme {
    fn default() -> Self {
        Self {
            background: Color::rgb(0x1c, 0x1c, 0x24),
            primary: Color::rgb(0x7c, 0x5c, 0xff),
            accent: Color::rgb(0x2d, 0xd4, 0xbf),
            muted: Color::rgb(0x2a, 0x2a, 0x35),
            bar_played: Color::rgb(0x7c, 0x5c, 0xff),
            bar_unplayed: Color::rgb(0x6b, 0x72, 0x80),
            glow_alpha: 0.5,
        }
    }
}

/// A single draw command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    /// Connected line strip, stroked at `width` pixels
    Polyline {
        points: Vec<(f32, f32)>,
        color: Color,
        width: f32,
    },
}

/// One rendered frame: everything needed to repaint the canvas from scratch.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub ops: Vec<DrawOp>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }
}
