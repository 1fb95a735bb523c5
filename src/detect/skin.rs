//! Skin-tone face heuristic.

use crate::config::ScanSettings;
use crate::detect::result::{BoundingBox, Detection, ObjectClass};
use crate::frame::PixelBuffer;

const SKIN_RATIO_THRESHOLD: f64 = 0.6;

/// Reports grid anchors whose sparse neighborhood is mostly skin-toned.
#[derive(Clone, Debug)]
pub struct SkinToneScanner {
    stride: u32,
    sample_step: u32,
}

impl SkinToneScanner {
    pub fn new(stride: u32, sample_step: u32) -> Self {
        Self {
            stride: stride.max(1),
            sample_step: sample_step.max(1),
        }
    }

    pub fn from_settings(settings: &ScanSettings) -> Self {
        Self::new(settings.face_stride, settings.face_sample_step)
    }

    pub fn scan(&self, buffer: &PixelBuffer) -> Vec<Detection> {
        let (width, height) = (buffer.width(), buffer.height());
        let step = self.stride;
        let mut faces = Vec::new();

        let mut y = step;
        while y < height.saturating_sub(step) {
            let mut x = step;
            while x < width.saturating_sub(step) {
                let skin = self.skin_ratio(buffer, x, y);
                if skin > SKIN_RATIO_THRESHOLD {
                    let bbox = BoundingBox::clamped(
                        x as i64 - step as i64,
                        y as i64 - step as i64,
                        (x + step) as i64,
                        (y + step) as i64,
                        width,
                        height,
                    );
                    faces.push(Detection::new(ObjectClass::Face, skin, bbox));
                }
                x += step;
            }
            y += step;
        }
        faces
    }

    fn skin_ratio(&self, buffer: &PixelBuffer, cx: u32, cy: u32) -> f64 {
        let size = self.stride as i64;
        let step = self.sample_step as usize;
        let (cx, cy) = (cx as i64, cy as i64);
        let mut skin = 0usize;
        let mut total = 0usize;

        for x in ((cx - size)..=(cx + size)).step_by(step) {
            for y in ((cy - size)..=(cy + size)).step_by(step) {
                if let Some(rgb) = buffer.get(x, y) {
                    total += 1;
                    if is_skin(rgb) {
                        skin += 1;
                    }
                }
            }
        }
        if total == 0 {
            0.0
        } else {
            skin as f64 / total as f64
        }
    }
}

impl Default for SkinToneScanner {
    fn default() -> Self {
        Self::from_settings(&ScanSettings::default())
    }
}

pub(crate) fn is_skin([r, g, b]: [u8; 3]) -> bool {
    r > g && g > b && r > 95 && g > 40 && b > 20
}
