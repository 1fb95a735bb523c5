use crate::config::{MotionSettings, ScanSettings};
use crate::detect::backend::{DetectionCapability, FrameStream, MotionStream, VisionBackend};
use crate::detect::color::ColorScanner;
use crate::detect::pose;
use crate::detect::result::{Detection, Pose};
use crate::detect::shape::ShapeScanner;
use crate::detect::skin::SkinToneScanner;
use crate::frame::PixelBuffer;
use crate::motion::MotionTracker;

/// Rule-based backend: color, shape and skin-tone scans plus frame differencing.
#[derive(Clone, Debug)]
pub struct HeuristicBackend {
    colors: ColorScanner,
    shapes: ShapeScanner,
    faces: SkinToneScanner,
    tracker: MotionTracker,
}

impl HeuristicBackend {
    pub fn new(scan: &ScanSettings, motion: &MotionSettings) -> Self {
        Self {
            colors: ColorScanner::from_settings(scan),
            shapes: ShapeScanner::from_settings(scan),
            faces: SkinToneScanner::from_settings(scan),
            tracker: MotionTracker::new(motion),
        }
    }
}

impl Default for HeuristicBackend {
    fn default() -> Self {
        Self::new(&ScanSettings::default(), &MotionSettings::default())
    }
}

impl VisionBackend for HeuristicBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn supports(&self, _capability: DetectionCapability) -> bool {
        true
    }

    fn detect_objects(&self, buffer: &PixelBuffer) -> Vec<Detection> {
        // Component order first, then row-major grid order within each pass.
        let mut objects = self.colors.scan(buffer);
        objects.extend(self.shapes.scan(buffer));
        objects.extend(self.faces.scan(buffer));
        objects
    }

    fn detect_faces(&self, buffer: &PixelBuffer) -> Vec<Detection> {
        self.faces.scan(buffer)
    }

    fn estimate_pose(&self, buffer: &PixelBuffer) -> Pose {
        let faces = self.detect_faces(buffer);
        let objects = self.detect_objects(buffer);
        pose::estimate(buffer, &faces, &objects)
    }

    fn track<'a>(&'a self, frames: FrameStream<'a>) -> MotionStream<'a> {
        Box::new(self.tracker.track(frames))
    }
}
