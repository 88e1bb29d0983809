//! Activity heat map colors
//!
//! A pixel's activity level `v` is the fraction of recent frames in which it
//! was lit. Levels map onto a blue-to-red hue ramp, `hue = (1 - v) * 240`, at
//! full saturation and half lightness: idle pixels are blue, pixels lit in
//! every frame are red.

use alloc::vec::Vec;
use embedded_graphics::pixelcolor::Rgb888;

/// Hue (degrees) of a pixel that was never lit.
pub const COLD_HUE: f32 = 240.0;

/// Color of one heat map cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatColor {
    /// Activity level in `[0, 1]`
    pub level: f32,
    /// Hue in degrees, `240` (cold) down to `0` (hot)
    pub hue: f32,
    /// The hue as an opaque RGB color
    pub rgb: Rgb888,
}

impl HeatColor {
    /// Color for an activity level; levels outside `[0, 1]` are clamped.
    pub fn for_level(level: f32) -> Self {
        let level = level.clamp(0.0, 1.0);
        let hue = (1.0 - level) * COLD_HUE;
        Self {
            level,
            hue,
            rgb: hue_to_rgb(hue),
        }
    }
}

/// Convert a hue at 100% saturation and 50% lightness to RGB.
fn hue_to_rgb(hue: f32) -> Rgb888 {
    let sector = hue / 60.0;
    // chroma is 1 and the lightness offset 0 at s=1, l=0.5
    let x = 1.0 - abs(sector % 2.0 - 1.0);
    let (r, g, b) = match sector as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    Rgb888::new(channel(r), channel(g), channel(b))
}

fn abs(v: f32) -> f32 {
    if v < 0.0 { -v } else { v }
}

fn channel(v: f32) -> u8 {
    (v * 255.0 + 0.5) as u8
}

/// Per-pixel heat colors with the same shape as the aggregated grids.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatGrid {
    cells: Vec<HeatColor>,
    rows: usize,
    columns: usize,
}

impl HeatGrid {
    /// Build a heat grid from per-pixel lit counts over `frames` frames.
    ///
    /// `counts` is row-major and must hold `rows * columns` entries.
    pub(crate) fn from_counts(counts: &[u32], frames: usize, rows: usize, columns: usize) -> Self {
        let frames = frames.max(1) as f32;
        let cells = counts
            .iter()
            .map(|count| HeatColor::for_level(*count as f32 / frames))
            .collect();
        Self {
            cells,
            rows,
            columns,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    /// Heat color at `(row, column)`, `None` when out of range.
    pub fn get(&self, row: usize, column: usize) -> Option<HeatColor> {
        if row < self.rows && column < self.columns {
            Some(self.cells[row * self.columns + column])
        } else {
            None
        }
    }
}
