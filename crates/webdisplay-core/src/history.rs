//! Bounded frame history
//!
//! Keeps the most recent decoded frames so pixel activity can be shown as a
//! heat map. With the default depth of 1 only the newest frame is retained
//! and the panel is drawn in plain on/off colors.

use alloc::collections::VecDeque;
use alloc::vec;
use core::num::NonZeroUsize;
use log::debug;

use crate::grid::PixelGrid;
use crate::heatmap::HeatGrid;

/// FIFO of decoded frames, oldest first.
///
/// All frames share one shape; pushing a frame of another shape discards
/// everything older.
#[derive(Debug, Clone)]
pub struct FrameHistory {
    frames: VecDeque<PixelGrid>,
    max_len: NonZeroUsize,
}

impl Default for FrameHistory {
    fn default() -> Self {
        Self::new(NonZeroUsize::MIN)
    }
}

impl FrameHistory {
    pub fn new(max_len: NonZeroUsize) -> Self {
        Self {
            frames: VecDeque::with_capacity(max_len.get()),
            max_len,
        }
    }

    /// Append a frame, evicting the oldest ones past the depth limit.
    pub fn push(&mut self, grid: PixelGrid) {
        if let Some(front) = self.frames.front()
            && front.dimensions() != grid.dimensions()
        {
            debug!(
                "Frame shape changed {:?} -> {:?}, clearing history",
                front.dimensions(),
                grid.dimensions()
            );
            self.frames.clear();
        }
        self.frames.push_back(grid);
        self.evict();
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn max_len(&self) -> NonZeroUsize {
        self.max_len
    }

    /// Change the depth limit. Shrinking drops the oldest frames right away.
    pub fn set_max_len(&mut self, max_len: NonZeroUsize) {
        self.max_len = max_len;
        self.evict();
    }

    /// Whether frames should be drawn as a heat map rather than on/off.
    pub fn uses_heat(&self) -> bool {
        self.max_len.get() > 1
    }

    /// Newest frame.
    pub fn latest(&self) -> Option<&PixelGrid> {
        self.frames.back()
    }

    /// Frames from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &PixelGrid> {
        self.frames.iter()
    }

    /// Reduce the history to per-pixel activity colors.
    ///
    /// Each pixel's level is the number of frames it is lit in divided by the
    /// number of frames currently held (not the depth limit). Recomputed on
    /// every call in O(rows * columns * frames), which is cheap at panel sizes
    /// of 128x64 and below.
    pub fn heat_grid(&self) -> Option<HeatGrid> {
        let (rows, columns) = self.frames.front()?.dimensions();

        let mut counts = vec![0u32; rows * columns];
        for frame in self.frames.iter() {
            for row in 0..rows {
                let lit = frame.row(row);
                let sums = &mut counts[row * columns..(row + 1) * columns];
                for (sum, pixel) in sums.iter_mut().zip(lit) {
                    *sum += *pixel as u32;
                }
            }
        }

        Some(HeatGrid::from_counts(
            &counts,
            self.frames.len(),
            rows,
            columns,
        ))
    }

    fn evict(&mut self) {
        while self.frames.len() > self.max_len.get() {
            self.frames.pop_front();
        }
    }
}
