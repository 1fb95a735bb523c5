//! Coarse pose derived from detection geometry.
//!
//! Rotation comes from where the first face sits relative to the image center;
//! translation from the mean center of every object. Neither is a real 3D
//! reconstruction: there is no Z rotation and depth is fixed at 1.0.

use crate::detect::result::{Detection, Pose, Vector3};
use crate::frame::PixelBuffer;

const MAX_ROTATION_DEGREES: f64 = 30.0;
const TRANSLATION_SPAN: f64 = 2.0;
const FIXED_DEPTH: f32 = 1.0;

/// Combine face and object detections of one buffer into a pose.
pub fn estimate(buffer: &PixelBuffer, faces: &[Detection], objects: &[Detection]) -> Pose {
    let (width, height) = (buffer.width() as f64, buffer.height() as f64);
    if width == 0.0 || height == 0.0 {
        return Pose::default();
    }

    let rotation = faces.first().map(|face| {
        let (cx, cy) = face.bbox.center();
        Vector3 {
            x: (offset(cx, width) * MAX_ROTATION_DEGREES) as f32,
            y: (offset(cy, height) * MAX_ROTATION_DEGREES) as f32,
            z: 0.0,
        }
    });

    let translation = if objects.is_empty() {
        None
    } else {
        let count = objects.len() as f64;
        let (sum_x, sum_y) = objects.iter().fold((0.0, 0.0), |(sx, sy), object| {
            let (cx, cy) = object.bbox.center();
            (sx + cx, sy + cy)
        });
        Some(Vector3 {
            x: (offset(sum_x / count, width) * TRANSLATION_SPAN) as f32,
            y: (offset(sum_y / count, height) * TRANSLATION_SPAN) as f32,
            z: FIXED_DEPTH,
        })
    };

    Pose {
        rotation,
        translation,
    }
}

/// Signed offset from the center, as a fraction of the extent.
fn offset(position: f64, extent: f64) -> f64 {
    (position - extent / 2.0) / extent
}
