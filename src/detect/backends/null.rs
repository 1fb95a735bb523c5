use crate::detect::backend::{DetectionCapability, FrameStream, MotionStream, VisionBackend};
use crate::detect::result::{Detection, FrameMotion, Pose};
use crate::frame::PixelBuffer;

/// Stand-in for an external model backend that is not wired up.
///
/// Reports no signal for everything. Tracking still yields one empty element
/// per frame so callers see the same sequence shape as with a real backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullBackend;

impl NullBackend {
    pub fn new() -> Self {
        Self
    }
}

impl VisionBackend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn supports(&self, _capability: DetectionCapability) -> bool {
        true
    }

    fn detect_objects(&self, _buffer: &PixelBuffer) -> Vec<Detection> {
        Vec::new()
    }

    fn detect_faces(&self, _buffer: &PixelBuffer) -> Vec<Detection> {
        Vec::new()
    }

    fn estimate_pose(&self, _buffer: &PixelBuffer) -> Pose {
        Pose::default()
    }

    fn track<'a>(&'a self, frames: FrameStream<'a>) -> MotionStream<'a> {
        Box::new(frames.map(|frame| FrameMotion {
            frame_index: frame.index,
            regions: Vec::new(),
        }))
    }
}
