use crate::config::MotionSettings;
use crate::detect::{BoundingBox, FrameMotion, MotionRegion};
use crate::frame::{IndexedFrame, PixelBuffer};

use super::grid::ActivityGrid;

/// Frame-difference motion tracker.
///
/// Holds only parameters; all per-sequence state lives in `MotionTrack`.
#[derive(Clone, Debug)]
pub struct MotionTracker {
    cell: u32,
    sample_step: u32,
    threshold: f64,
    saturation_cells: f64,
}

impl MotionTracker {
    pub fn new(settings: &MotionSettings) -> Self {
        Self {
            cell: settings.cell.max(1),
            sample_step: settings.sample_step.max(1),
            threshold: settings.threshold,
            saturation_cells: settings.saturation_cells,
        }
    }

    /// Motion regions between two frames, in blob seed order.
    pub fn regions(&self, prev: &PixelBuffer, curr: &PixelBuffer) -> Vec<MotionRegion> {
        let width = prev.width().min(curr.width());
        let height = prev.height().min(curr.height());
        let grid = ActivityGrid::diff(prev, curr, self.cell, self.sample_step, self.threshold);
        let cell = self.cell as i64;

        grid.blobs()
            .into_iter()
            .map(|blob| MotionRegion {
                bbox: BoundingBox::clamped(
                    blob.min_col as i64 * cell,
                    blob.min_row as i64 * cell,
                    (blob.max_col as i64 + 1) * cell,
                    (blob.max_row as i64 + 1) * cell,
                    width,
                    height,
                ),
                score: (blob.cells as f64 / self.saturation_cells).min(1.0) as f32,
            })
            .collect()
    }

    /// Lazily track `frames`. Yields one element per frame; the first is always empty.
    pub fn track<I>(&self, frames: I) -> MotionTrack<I::IntoIter>
    where
        I: IntoIterator<Item = IndexedFrame>,
    {
        MotionTrack {
            frames: frames.into_iter(),
            tracker: self.clone(),
            prev: None,
        }
    }
}

impl Default for MotionTracker {
    fn default() -> Self {
        Self::new(&MotionSettings::default())
    }
}

/// Pull-based tracking over a frame iterator.
///
/// Between pulls only the previous frame is retained. It is released when the
/// source runs dry, and the source itself (with any temporary files it owns) is
/// released when this iterator is dropped.
pub struct MotionTrack<I> {
    frames: I,
    tracker: MotionTracker,
    prev: Option<PixelBuffer>,
}

impl<I> MotionTrack<I> {
    /// True while a previous frame is being held for the next diff.
    pub fn holds_frame(&self) -> bool {
        self.prev.is_some()
    }
}

impl<I> Iterator for MotionTrack<I>
where
    I: Iterator<Item = IndexedFrame>,
{
    type Item = FrameMotion;

    fn next(&mut self) -> Option<FrameMotion> {
        let Some(frame) = self.frames.next() else {
            self.prev = None;
            return None;
        };

        let regions = match &self.prev {
            Some(prev) => self.tracker.regions(prev, &frame.buffer),
            None => Vec::new(),
        };
        self.prev = Some(frame.buffer);

        Some(FrameMotion {
            frame_index: frame.index,
            regions,
        })
    }
}
