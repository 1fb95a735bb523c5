use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::VisionError;

const DEFAULT_DRIVER: &str = "native";
const DEFAULT_IMAGE_QUALITY: u8 = 90;
const DEFAULT_FFMPEG_BINARY: &str = "ffmpeg";
const DEFAULT_FFMPEG_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MOTION_FPS: f64 = 2.0;
const DEFAULT_MOTION_SCALE: u32 = 320;
const DEFAULT_MOTION_CELL: u32 = 16;
const DEFAULT_MOTION_SAMPLE_STEP: u32 = 2;
const DEFAULT_MOTION_THRESHOLD: f64 = 30.0;
const DEFAULT_MOTION_SATURATION_CELLS: f64 = 20.0;
const DEFAULT_COLOR_STRIDE: u32 = 20;
const DEFAULT_SHAPE_STRIDE: u32 = 30;
const DEFAULT_FACE_STRIDE: u32 = 40;
const DEFAULT_FACE_SAMPLE_STEP: u32 = 5;

#[derive(Debug, Deserialize, Default)]
struct VisionConfigFile {
    driver: Option<String>,
    image: Option<ImageConfigFile>,
    scan: Option<ScanConfigFile>,
    motion: Option<MotionConfigFile>,
    ffmpeg: Option<FfmpegConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ImageConfigFile {
    default_quality: Option<u8>,
}

#[derive(Debug, Deserialize, Default)]
struct ScanConfigFile {
    color_stride: Option<u32>,
    shape_stride: Option<u32>,
    face_stride: Option<u32>,
    face_sample_step: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct MotionConfigFile {
    fps: Option<f64>,
    scale: Option<u32>,
    cell: Option<u32>,
    sample_step: Option<u32>,
    threshold: Option<f64>,
    saturation_cells: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct FfmpegConfigFile {
    binary: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Registered backend name used for every capability by default.
    pub driver: String,
    pub image: ImageSettings,
    pub scan: ScanSettings,
    pub motion: MotionSettings,
    pub ffmpeg: FfmpegSettings,
}

#[derive(Debug, Clone)]
pub struct ImageSettings {
    /// JPEG quality used when encoding prepared inputs.
    pub default_quality: u8,
}

/// Grid strides for the single-image scanners.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub color_stride: u32,
    pub shape_stride: u32,
    pub face_stride: u32,
    pub face_sample_step: u32,
}

#[derive(Debug, Clone)]
pub struct MotionSettings {
    /// Extraction sample rate (frames per second).
    pub fps: f64,
    /// Extraction target width; height follows the aspect ratio.
    pub scale: u32,
    /// Grid cell edge in pixels.
    pub cell: u32,
    /// Pixel stride inside a cell.
    pub sample_step: u32,
    /// Mean summed channel delta above which a cell is active.
    pub threshold: f64,
    /// Blob size (in cells) at which the region score saturates at 1.0.
    pub saturation_cells: f64,
}

#[derive(Debug, Clone)]
pub struct FfmpegSettings {
    pub binary: String,
    pub timeout: Duration,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            driver: DEFAULT_DRIVER.to_string(),
            image: ImageSettings::default(),
            scan: ScanSettings::default(),
            motion: MotionSettings::default(),
            ffmpeg: FfmpegSettings::default(),
        }
    }
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            default_quality: DEFAULT_IMAGE_QUALITY,
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            color_stride: DEFAULT_COLOR_STRIDE,
            shape_stride: DEFAULT_SHAPE_STRIDE,
            face_stride: DEFAULT_FACE_STRIDE,
            face_sample_step: DEFAULT_FACE_SAMPLE_STEP,
        }
    }
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_MOTION_FPS,
            scale: DEFAULT_MOTION_SCALE,
            cell: DEFAULT_MOTION_CELL,
            sample_step: DEFAULT_MOTION_SAMPLE_STEP,
            threshold: DEFAULT_MOTION_THRESHOLD,
            saturation_cells: DEFAULT_MOTION_SATURATION_CELLS,
        }
    }
}

impl Default for FfmpegSettings {
    fn default() -> Self {
        Self {
            binary: DEFAULT_FFMPEG_BINARY.to_string(),
            timeout: Duration::from_secs(DEFAULT_FFMPEG_TIMEOUT_SECS),
        }
    }
}

impl VisionConfig {
    /// Load from `VISION_CONFIG` (if set), then apply env overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("VISION_CONFIG").ok().map(PathBuf::from);
        Self::load_from(config_path.as_deref())
    }

    /// Load from an explicit file (JSON, or TOML by extension), then apply env overrides.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => read_config_file(path)?,
            None => VisionConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg);
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: VisionConfigFile) -> Self {
        let defaults = Self::default();
        let image = file.image.unwrap_or_default();
        let scan = file.scan.unwrap_or_default();
        let motion = file.motion.unwrap_or_default();
        let ffmpeg = file.ffmpeg.unwrap_or_default();
        Self {
            driver: file.driver.unwrap_or(defaults.driver),
            image: ImageSettings {
                default_quality: image
                    .default_quality
                    .unwrap_or(defaults.image.default_quality),
            },
            scan: ScanSettings {
                color_stride: scan.color_stride.unwrap_or(defaults.scan.color_stride),
                shape_stride: scan.shape_stride.unwrap_or(defaults.scan.shape_stride),
                face_stride: scan.face_stride.unwrap_or(defaults.scan.face_stride),
                face_sample_step: scan
                    .face_sample_step
                    .unwrap_or(defaults.scan.face_sample_step),
            },
            motion: MotionSettings {
                fps: motion.fps.unwrap_or(defaults.motion.fps),
                scale: motion.scale.unwrap_or(defaults.motion.scale),
                cell: motion.cell.unwrap_or(defaults.motion.cell),
                sample_step: motion.sample_step.unwrap_or(defaults.motion.sample_step),
                threshold: motion.threshold.unwrap_or(defaults.motion.threshold),
                saturation_cells: motion
                    .saturation_cells
                    .unwrap_or(defaults.motion.saturation_cells),
            },
            ffmpeg: FfmpegSettings {
                binary: ffmpeg.binary.unwrap_or(defaults.ffmpeg.binary),
                timeout: ffmpeg
                    .timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.ffmpeg.timeout),
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(driver) = non_empty_env("VISION_ADVANCED_DRIVER") {
            self.driver = driver;
        }
        if let Some(binary) = non_empty_env("VISION_FFMPEG_BINARY") {
            self.ffmpeg.binary = binary;
        }
        if let Some(timeout) = non_empty_env("VISION_FFMPEG_TIMEOUT") {
            let seconds: u64 = timeout.parse().map_err(|_| {
                VisionError::Config(
                    "VISION_FFMPEG_TIMEOUT must be an integer number of seconds".into(),
                )
            })?;
            self.ffmpeg.timeout = Duration::from_secs(seconds);
        }
        if let Some(fps) = non_empty_env("VISION_MOTION_FPS") {
            self.motion.fps = fps
                .parse()
                .map_err(|_| VisionError::Config("VISION_MOTION_FPS must be a number".into()))?;
        }
        if let Some(scale) = non_empty_env("VISION_MOTION_SCALE") {
            self.motion.scale = scale.parse().map_err(|_| {
                VisionError::Config("VISION_MOTION_SCALE must be an integer pixel width".into())
            })?;
        }
        if let Some(quality) = non_empty_env("VISION_IMAGE_QUALITY") {
            self.image.default_quality = quality.parse().map_err(|_| {
                VisionError::Config("VISION_IMAGE_QUALITY must be an integer 1-100".into())
            })?;
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        self.driver = self.driver.trim().to_lowercase();
        if self.driver.is_empty() {
            return Err(VisionError::Config("driver must not be empty".into()).into());
        }
        if !(1..=100).contains(&self.image.default_quality) {
            return Err(VisionError::Config("image quality must be within 1-100".into()).into());
        }
        for (name, value) in [
            ("scan.color_stride", self.scan.color_stride),
            ("scan.shape_stride", self.scan.shape_stride),
            ("scan.face_stride", self.scan.face_stride),
            ("scan.face_sample_step", self.scan.face_sample_step),
            ("motion.scale", self.motion.scale),
            ("motion.cell", self.motion.cell),
            ("motion.sample_step", self.motion.sample_step),
        ] {
            if value == 0 {
                let reason = format!("{} must be greater than zero", name);
                return Err(VisionError::Config(reason).into());
            }
        }
        if !(self.motion.fps.is_finite() && self.motion.fps > 0.0) {
            return Err(VisionError::Config("motion.fps must be greater than zero".into()).into());
        }
        if !(self.motion.saturation_cells.is_finite() && self.motion.saturation_cells > 0.0) {
            return Err(
                VisionError::Config("motion.saturation_cells must be greater than zero".into())
                    .into(),
            );
        }
        if !self.motion.threshold.is_finite() {
            return Err(VisionError::Config("motion.threshold must be finite".into()).into());
        }
        if self.ffmpeg.binary.trim().is_empty() {
            return Err(VisionError::Config("ffmpeg.binary must not be empty".into()).into());
        }
        if self.ffmpeg.timeout.is_zero() {
            return Err(
                VisionError::Config("ffmpeg.timeout_secs must be greater than zero".into()).into(),
            );
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<VisionConfigFile> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        VisionError::Config(format!("failed to read config file {}: {}", path.display(), e))
    })?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let parsed: std::result::Result<VisionConfigFile, String> = if is_toml {
        toml::from_str(&raw).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(&raw).map_err(|e| e.to_string())
    };
    let cfg = parsed.map_err(|e| {
        VisionError::Config(format!("invalid config file {}: {}", path.display(), e))
    })?;
    Ok(cfg)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
