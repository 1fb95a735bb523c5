mod backend;
mod backends;
pub mod color;
pub mod pose;
mod registry;
mod result;
pub mod shape;
pub mod skin;

pub use backend::{DetectionCapability, FrameStream, MotionStream, VisionBackend};
pub use backends::{HeuristicBackend, NullBackend};
pub use color::ColorScanner;
pub use registry::BackendRegistry;
pub use result::{BoundingBox, Detection, FrameMotion, MotionRegion, ObjectClass, Pose, Vector3};
pub use shape::ShapeScanner;
pub use skin::SkinToneScanner;
