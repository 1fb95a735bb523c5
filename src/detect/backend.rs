use crate::detect::result::{Detection, FrameMotion, Pose};
use crate::frame::{IndexedFrame, PixelBuffer};

/// Capabilities a backend may provide.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionCapability {
    ObjectDetection,
    FaceDetection,
    MotionTracking,
    PoseEstimation,
}

/// Frames pulled by a tracker, in order.
pub type FrameStream<'a> = Box<dyn Iterator<Item = IndexedFrame> + 'a>;

/// Per-transition motion results, produced lazily.
pub type MotionStream<'a> = Box<dyn Iterator<Item = FrameMotion> + 'a>;

/// Vision backend trait.
///
/// Implementations treat every buffer as read-only and keep no state between
/// calls: the same buffer always yields the same result. "Nothing found" is an
/// empty list or an empty `Pose`, never an error.
pub trait VisionBackend: Send + Sync {
    /// Backend identifier, matched against the configured driver name.
    fn name(&self) -> &'static str;

    /// Returns true when the backend supports a capability.
    fn supports(&self, capability: DetectionCapability) -> bool;

    /// Every object class the backend knows, faces included.
    fn detect_objects(&self, buffer: &PixelBuffer) -> Vec<Detection>;

    fn detect_faces(&self, buffer: &PixelBuffer) -> Vec<Detection>;

    fn estimate_pose(&self, buffer: &PixelBuffer) -> Pose;

    /// Track motion across `frames`. The returned stream holds at most the
    /// previous frame between pulls.
    fn track<'a>(&'a self, frames: FrameStream<'a>) -> MotionStream<'a>;
}
