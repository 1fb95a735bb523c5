//! Heuristic Vision
//!
//! Rule-based image and video analysis without trained models.
//!
//! # Architecture
//!
//! Every detector is a deterministic scan over an RGB pixel buffer:
//!
//! 1. **Color regions**: stride-20 grid, dominant red/green/blue channel.
//! 2. **Shapes**: stride-30 grid, bright circular or rectangular neighbourhoods.
//! 3. **Faces**: stride-40 grid, skin-tone pixel ratio.
//! 4. **Motion**: 16px cell differencing between consecutive frames, merged
//!    into 4-connected regions.
//! 5. **Pose**: coarse rotation and translation from detection centroids.
//!
//! Video is sampled into frames by an external `ffmpeg` process under a hard
//! timeout; frames are decoded lazily and the temporary files removed when the
//! sequence is dropped.
//!
//! # Module Structure
//!
//! - `frame`: `PixelBuffer`, `IndexedFrame`, `ImageSource`
//! - `codec`: image decode/encode, resize and crop
//! - `detect`: scanners, result types, the `VisionBackend` trait and registry
//! - `motion`: activity grid and the lazy `MotionTracker`
//! - `ingest`: `ffmpeg` frame extraction and `FrameSequence`
//! - `vision`: the `Vision` facade
//! - `config`, `error`: ambient configuration and typed errors

pub mod codec;
pub mod config;
pub mod detect;
pub mod error;
pub mod frame;
pub mod ingest;
pub mod motion;
pub mod vision;

pub use config::VisionConfig;
pub use detect::{
    BackendRegistry, BoundingBox, Detection, DetectionCapability, FrameMotion, MotionRegion,
    ObjectClass, Pose, Vector3, VisionBackend,
};
pub use error::VisionError;
pub use frame::{ImageSource, IndexedFrame, PixelBuffer};
pub use ingest::{FrameExtractor, FrameSequence};
pub use motion::MotionTracker;
pub use vision::Vision;
