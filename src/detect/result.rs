use serde::Serialize;
use std::fmt;

/// Pixel-space box, both corners inclusive and inside the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BoundingBox {
    /// Build a box from signed corners, clamping both into
    /// `[0, width) × [0, height)`. Corners are reordered when inverted.
    ///
    /// The caller guarantees `width > 0 && height > 0`.
    pub fn clamped(x1: i64, y1: i64, x2: i64, y2: i64, width: u32, height: u32) -> Self {
        let max_x = width.saturating_sub(1) as i64;
        let max_y = height.saturating_sub(1) as i64;
        let (x1, x2) = (x1.min(x2), x1.max(x2));
        let (y1, y2) = (y1.min(y2), y1.max(y2));
        Self {
            x1: x1.clamp(0, max_x) as u32,
            y1: y1.clamp(0, max_y) as u32,
            x2: x2.clamp(0, max_x) as u32,
            y2: y2.clamp(0, max_y) as u32,
        }
    }

    /// Geometric center in pixel coordinates.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.x1 as f64 + self.x2 as f64) / 2.0,
            (self.y1 as f64 + self.y2 as f64) / 2.0,
        )
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        other.x1 >= self.x1 && other.y1 >= self.y1 && other.x2 <= self.x2 && other.y2 <= self.y2
    }
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ObjectClass {
    #[serde(rename = "Red Object")]
    Red,
    #[serde(rename = "Blue Object")]
    Blue,
    #[serde(rename = "Green Object")]
    Green,
    #[serde(rename = "Circular Object")]
    Circular,
    #[serde(rename = "Rectangular Object")]
    Rectangular,
    #[serde(rename = "Face")]
    Face,
}

impl ObjectClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectClass::Red => "Red Object",
            ObjectClass::Blue => "Blue Object",
            ObjectClass::Green => "Green Object",
            ObjectClass::Circular => "Circular Object",
            ObjectClass::Rectangular => "Rectangular Object",
            ObjectClass::Face => "Face",
        }
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One heuristic hit. `score` is a rule-derived confidence, not a probability.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detection {
    pub label: ObjectClass,
    pub score: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    pub(crate) fn new(label: ObjectClass, score: f64, bbox: BoundingBox) -> Self {
        Self {
            label,
            score: score.clamp(0.0, 1.0) as f32,
            bbox,
        }
    }
}

/// One connected blob of changed cells between two frames.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MotionRegion {
    pub bbox: BoundingBox,
    pub score: f32,
}

/// Regions found for one frame transition. Frame 0 never has regions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameMotion {
    pub frame_index: usize,
    pub regions: Vec<MotionRegion>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Coarse pose. Rotation is in degrees (±30 on x/y); translation is
/// normalized (±1 on x/y) with a fixed depth.
///
/// A missing field means the input had no signal for it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Pose {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vector3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<Vector3>,
}

impl Pose {
    pub fn is_empty(&self) -> bool {
        self.rotation.is_none() && self.translation.is_none()
    }
}
