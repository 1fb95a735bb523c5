//! Public entry points.
//!
//! `Vision` resolves one backend per capability when it is built and routes
//! each call to it. Image inputs may be paths or decoded buffers; video input
//! goes through frame extraction first.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::codec;
use crate::config::VisionConfig;
use crate::detect::{
    BackendRegistry, Detection, DetectionCapability, MotionStream, Pose, VisionBackend,
};
use crate::frame::{ImageSource, IndexedFrame, PixelBuffer};
use crate::ingest::{ExtractConfig, FrameExtractor, TranscodeOptions};

pub struct Vision {
    config: VisionConfig,
    registry: BackendRegistry,
    extractor: FrameExtractor,
    objects: Arc<dyn VisionBackend>,
    faces: Arc<dyn VisionBackend>,
    pose: Arc<dyn VisionBackend>,
    motion: Arc<dyn VisionBackend>,
}

impl Vision {
    /// Build from `VisionConfig::load()`.
    pub fn new() -> Result<Self> {
        Self::from_config(VisionConfig::load()?)
    }

    /// Build with the built-in backends, default chosen by `config.driver`.
    pub fn from_config(config: VisionConfig) -> Result<Self> {
        let registry = BackendRegistry::from_config(&config)?;
        Self::with_registry(config, registry)
    }

    /// Build over a caller-assembled registry.
    pub fn with_registry(config: VisionConfig, registry: BackendRegistry) -> Result<Self> {
        let objects = registry.backend_for_capability(DetectionCapability::ObjectDetection)?;
        let faces = registry.backend_for_capability(DetectionCapability::FaceDetection)?;
        let pose = registry.backend_for_capability(DetectionCapability::PoseEstimation)?;
        let motion = registry.backend_for_capability(DetectionCapability::MotionTracking)?;
        let extractor = FrameExtractor::new(ExtractConfig::from_config(&config));
        Ok(Self {
            config,
            registry,
            extractor,
            objects,
            faces,
            pose,
            motion,
        })
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Name of the backend serving `capability`.
    pub fn backend_name(&self, capability: DetectionCapability) -> &'static str {
        match capability {
            DetectionCapability::ObjectDetection => self.objects.name(),
            DetectionCapability::FaceDetection => self.faces.name(),
            DetectionCapability::PoseEstimation => self.pose.name(),
            DetectionCapability::MotionTracking => self.motion.name(),
        }
    }

    /// Colored regions, bright shapes and faces, in that order.
    pub fn detect_objects<'a>(&self, image: impl Into<ImageSource<'a>>) -> Result<Vec<Detection>> {
        let buffer = image.into().load()?;
        Ok(self.objects.detect_objects(&buffer))
    }

    pub fn detect_faces<'a>(&self, image: impl Into<ImageSource<'a>>) -> Result<Vec<Detection>> {
        let buffer = image.into().load()?;
        Ok(self.faces.detect_faces(&buffer))
    }

    pub fn estimate_pose<'a>(&self, image: impl Into<ImageSource<'a>>) -> Result<Pose> {
        let buffer = image.into().load()?;
        Ok(self.pose.estimate_pose(&buffer))
    }

    /// Extract frames from `video` and track motion across them lazily.
    ///
    /// A missing video or a failed extraction yields an empty stream. The
    /// extraction directory is removed when the stream is dropped.
    pub fn track(&self, video: impl AsRef<Path>) -> Result<MotionStream<'_>> {
        let sequence = self.extractor.extract(video.as_ref())?;
        Ok(self.motion.track(Box::new(sequence)))
    }

    /// Track motion across frames already in memory.
    pub fn track_frames<'a, I>(&'a self, frames: I) -> MotionStream<'a>
    where
        I: IntoIterator<Item = IndexedFrame>,
        I::IntoIter: 'a,
    {
        self.motion.track(Box::new(frames.into_iter()))
    }

    /// Write `buffer` to `path` at the configured image quality.
    pub fn save(&self, buffer: &PixelBuffer, path: impl AsRef<Path>) -> Result<()> {
        codec::encode(buffer, path.as_ref(), self.config.image.default_quality)
    }

    /// Write the frame at `seconds` of `video` to `output`.
    pub fn extract_frame(
        &self,
        video: impl AsRef<Path>,
        seconds: f64,
        output: impl AsRef<Path>,
    ) -> Result<()> {
        self.extractor.extract_frame(video.as_ref(), seconds, output.as_ref())
    }

    pub fn transcode(
        &self,
        video: impl AsRef<Path>,
        output: impl AsRef<Path>,
        options: &TranscodeOptions,
    ) -> Result<()> {
        self.extractor.transcode(video.as_ref(), output.as_ref(), options)
    }
}
