//! Saturated color region scanner.

use crate::config::ScanSettings;
use crate::detect::result::{BoundingBox, Detection, ObjectClass};
use crate::frame::PixelBuffer;

const DOMINANT_MIN: u8 = 150;
const OTHER_MAX: u8 = 100;
const SCORE_CAP: f64 = 0.9;

/// Samples one pixel per grid cell and reports strongly red, green or blue cells.
///
/// Adjacent matching cells are reported individually; overlapping output is expected.
#[derive(Clone, Debug)]
pub struct ColorScanner {
    stride: u32,
}

impl ColorScanner {
    pub fn new(stride: u32) -> Self {
        Self {
            stride: stride.max(1),
        }
    }

    pub fn from_settings(settings: &ScanSettings) -> Self {
        Self::new(settings.color_stride)
    }

    pub fn scan(&self, buffer: &PixelBuffer) -> Vec<Detection> {
        let (width, height) = (buffer.width(), buffer.height());
        let step = self.stride;
        let mut detections = Vec::new();

        // The last partial row/column is never anchored.
        let mut y = 0;
        while y < height.saturating_sub(step) {
            let mut x = 0;
            while x < width.saturating_sub(step) {
                if let Some((label, score)) = classify(buffer.pixel_at(x, y)) {
                    let bbox = BoundingBox::clamped(
                        x as i64,
                        y as i64,
                        (x + step) as i64,
                        (y + step) as i64,
                        width,
                        height,
                    );
                    detections.push(Detection::new(label, score, bbox));
                }
                x += step;
            }
            y += step;
        }
        detections
    }
}

impl Default for ColorScanner {
    fn default() -> Self {
        Self::from_settings(&ScanSettings::default())
    }
}

fn classify([r, g, b]: [u8; 3]) -> Option<(ObjectClass, f64)> {
    let dominant = |d: u8, o1: u8, o2: u8| d > DOMINANT_MIN && o1 < OTHER_MAX && o2 < OTHER_MAX;

    // The three predicates are mutually exclusive.
    let (label, d, o1, o2) = if dominant(r, g, b) {
        (ObjectClass::Red, r, g, b)
    } else if dominant(b, r, g) {
        (ObjectClass::Blue, b, r, g)
    } else if dominant(g, r, b) {
        (ObjectClass::Green, g, r, b)
    } else {
        return None;
    };

    let margin = d as f64 - o1 as f64 - o2 as f64;
    Some((label, (margin / 255.0).min(SCORE_CAP).max(0.0)))
}
