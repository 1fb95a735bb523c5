//! Circularity and rectangularity heuristics.
//!
//! Both scores are the fraction of sampled in-bounds pixels whose mean
//! brightness exceeds a fixed threshold. Circularity samples a ring of
//! radius `stride`; rectangularity samples the full `(2·stride+1)²` square.

use crate::config::ScanSettings;
use crate::detect::result::{BoundingBox, Detection, ObjectClass};
use crate::frame::PixelBuffer;

const BRIGHTNESS_THRESHOLD: f64 = 128.0;
const CIRCULARITY_THRESHOLD: f64 = 0.7;
const RECTANGULARITY_THRESHOLD: f64 = 0.6;
const RING_STEP_DEGREES: usize = 10;

#[derive(Clone, Debug)]
pub struct ShapeScanner {
    stride: u32,
}

impl ShapeScanner {
    pub fn new(stride: u32) -> Self {
        Self {
            stride: stride.max(1),
        }
    }

    pub fn from_settings(settings: &ScanSettings) -> Self {
        Self::new(settings.shape_stride)
    }

    pub fn scan(&self, buffer: &PixelBuffer) -> Vec<Detection> {
        let (width, height) = (buffer.width(), buffer.height());
        let step = self.stride;
        let mut detections = Vec::new();

        let mut y = step;
        while y < height.saturating_sub(step) {
            let mut x = step;
            while x < width.saturating_sub(step) {
                let bbox = BoundingBox::clamped(
                    x as i64 - step as i64,
                    y as i64 - step as i64,
                    (x + step) as i64,
                    (y + step) as i64,
                    width,
                    height,
                );

                let circularity = self.circularity(buffer, x, y);
                if circularity > CIRCULARITY_THRESHOLD {
                    detections.push(Detection::new(ObjectClass::Circular, circularity, bbox));
                }

                let rectangularity = self.rectangularity(buffer, x, y);
                if rectangularity > RECTANGULARITY_THRESHOLD {
                    detections.push(Detection::new(
                        ObjectClass::Rectangular,
                        rectangularity,
                        bbox,
                    ));
                }
                x += step;
            }
            y += step;
        }
        detections
    }

    /// Bright fraction of the 36 ring points around `(cx, cy)`.
    fn circularity(&self, buffer: &PixelBuffer, cx: u32, cy: u32) -> f64 {
        let radius = self.stride as f64;
        let (width, height) = (buffer.width() as f64, buffer.height() as f64);
        let mut bright = 0usize;
        let mut total = 0usize;

        for angle in (0..360).step_by(RING_STEP_DEGREES) {
            let theta = (angle as f64).to_radians();
            let x = cx as f64 + radius * theta.cos();
            let y = cy as f64 + radius * theta.sin();
            if x < 0.0 || y < 0.0 || x >= width || y >= height {
                continue;
            }
            total += 1;
            if is_bright(buffer.pixel_at(x as u32, y as u32)) {
                bright += 1;
            }
        }
        ratio(bright, total)
    }

    /// Bright fraction of every pixel in the square centered at `(cx, cy)`.
    fn rectangularity(&self, buffer: &PixelBuffer, cx: u32, cy: u32) -> f64 {
        let size = self.stride as i64;
        let (cx, cy) = (cx as i64, cy as i64);
        let mut bright = 0usize;
        let mut total = 0usize;

        for x in (cx - size)..=(cx + size) {
            for y in (cy - size)..=(cy + size) {
                if let Some(rgb) = buffer.get(x, y) {
                    total += 1;
                    if is_bright(rgb) {
                        bright += 1;
                    }
                }
            }
        }
        ratio(bright, total)
    }
}

impl Default for ShapeScanner {
    fn default() -> Self {
        Self::from_settings(&ScanSettings::default())
    }
}

fn is_bright([r, g, b]: [u8; 3]) -> bool {
    (r as f64 + g as f64 + b as f64) / 3.0 > BRIGHTNESS_THRESHOLD
}

fn ratio(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bright_field_fires_both_shapes_everywhere() {
        let buffer = PixelBuffer::filled(120, 120, [255, 255, 255]);
        let detections = ShapeScanner::default().scan(&buffer);

        // Anchors at 30 and 60 on each axis (90 >= 120 - 30), two hits per anchor.
        assert_eq!(detections.len(), 8);
        assert_eq!(detections[0].label, ObjectClass::Circular);
        assert_eq!(detections[1].label, ObjectClass::Rectangular);
        assert!(detections.iter().all(|d| d.score == 1.0));
        assert_eq!(
            detections[0].bbox,
            BoundingBox {
                x1: 0,
                y1: 0,
                x2: 60,
                y2: 60
            }
        );
    }

    #[test]
    fn dark_field_yields_nothing() {
        let buffer = PixelBuffer::filled(200, 200, [128, 128, 128]);
        assert!(ShapeScanner::default().scan(&buffer).is_empty());
    }

    #[test]
    fn ring_without_fill_is_circular_only() {
        // Bright annulus around (60, 60) at radius ~30, dark elsewhere.
        let buffer = PixelBuffer::from_fn(120, 120, |x, y| {
            let dx = x as f64 - 60.0;
            let dy = y as f64 - 60.0;
            let d = (dx * dx + dy * dy).sqrt();
            if (27.0..=33.0).contains(&d) {
                [255, 255, 255]
            } else {
                [0, 0, 0]
            }
        });
        let detections = ShapeScanner::default().scan(&buffer);

        let at_center: Vec<_> = detections
            .iter()
            .filter(|d| d.bbox.center() == (60.0, 60.0))
            .map(|d| d.label)
            .collect();
        assert_eq!(at_center, vec![ObjectClass::Circular]);
    }

    #[test]
    fn brightness_uses_channel_mean() {
        assert!(is_bright([200, 200, 0]));
        assert!(!is_bright([255, 0, 128]));
    }
}
