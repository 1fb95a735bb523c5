//! Pixel buffers and the inputs that produce them.
//!
//! - `PixelBuffer`: Immutable RGB view. Detectors only ever read from it.
//! - `IndexedFrame`: A buffer tagged with its position in a frame sequence.
//! - `ImageSource`: Either a path to decode or an already-decoded buffer.
//!
//! There is no mutating API on `PixelBuffer`. A scan borrows the buffer for the
//! duration of the call and cannot alter what the next scan sees.

use anyhow::Result;
use image::{DynamicImage, RgbImage};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::error::VisionError;

// ----------------------------------------------------------------------------
// PixelBuffer: read-only RGB view
// ----------------------------------------------------------------------------

/// Decoded RGB image. Pixels are private; access goes through `pixel_at`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbImage,
}

impl PixelBuffer {
    /// Wrap packed RGB24 bytes. The length must be exactly `width * height * 3`.
    pub fn from_rgb(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| VisionError::InvalidBuffer("frame dimensions overflow".into()))?;
        if pixels.len() != expected {
            return Err(VisionError::InvalidBuffer(format!(
                "RGB length mismatch: expected {}, got {}",
                expected,
                pixels.len()
            ))
            .into());
        }
        let image = RgbImage::from_raw(width, height, pixels)
            .ok_or_else(|| VisionError::InvalidBuffer("RGB buffer rejected".into()))?;
        Ok(Self { image })
    }

    /// Build a synthetic buffer by evaluating `f` at every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> [u8; 3],
    {
        let image = RgbImage::from_fn(width, height, |x, y| image::Rgb(f(x, y)));
        Self { image }
    }

    /// Uniformly filled buffer.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::from_fn(width, height, |_, _| rgb)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// RGB triple at `(x, y)`. Callers must stay within `width × height`.
    pub fn pixel_at(&self, x: u32, y: u32) -> [u8; 3] {
        self.image.get_pixel(x, y).0
    }

    /// Signed-coordinate lookup. Returns `None` outside the buffer.
    pub fn get(&self, x: i64, y: i64) -> Option<[u8; 3]> {
        if self.contains(x, y) {
            Some(self.pixel_at(x as u32, y as u32))
        } else {
            None
        }
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width() as i64 && y < self.height() as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Borrow the underlying image for codec operations.
    pub(crate) fn as_image(&self) -> &RgbImage {
        &self.image
    }
}

impl From<DynamicImage> for PixelBuffer {
    fn from(image: DynamicImage) -> Self {
        // Alpha is dropped; every heuristic works on RGB only.
        Self {
            image: image.to_rgb8(),
        }
    }
}

impl From<RgbImage> for PixelBuffer {
    fn from(image: RgbImage) -> Self {
        Self { image }
    }
}

// ----------------------------------------------------------------------------
// IndexedFrame: a buffer with its sequence position
// ----------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct IndexedFrame {
    pub index: usize,
    pub buffer: PixelBuffer,
}

impl IndexedFrame {
    pub fn new(index: usize, buffer: PixelBuffer) -> Self {
        Self { index, buffer }
    }

    /// Tag in-memory buffers with consecutive indices starting at 0.
    pub fn sequence<I>(buffers: I) -> impl Iterator<Item = IndexedFrame>
    where
        I: IntoIterator<Item = PixelBuffer>,
    {
        buffers
            .into_iter()
            .enumerate()
            .map(|(index, buffer)| IndexedFrame::new(index, buffer))
    }
}

// ----------------------------------------------------------------------------
// ImageSource: path or decoded buffer
// ----------------------------------------------------------------------------

/// Input accepted by the detection entry points.
#[derive(Clone, Copy, Debug)]
pub enum ImageSource<'a> {
    Path(&'a Path),
    Buffer(&'a PixelBuffer),
}

impl<'a> ImageSource<'a> {
    /// Resolve to a buffer, decoding from disk when given a path.
    ///
    /// Decode failures propagate; they are never retried.
    pub fn load(self) -> Result<Cow<'a, PixelBuffer>> {
        match self {
            ImageSource::Path(path) => Ok(Cow::Owned(codec::decode(path)?)),
            ImageSource::Buffer(buffer) => Ok(Cow::Borrowed(buffer)),
        }
    }
}

impl<'a> From<&'a Path> for ImageSource<'a> {
    fn from(path: &'a Path) -> Self {
        ImageSource::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for ImageSource<'a> {
    fn from(path: &'a PathBuf) -> Self {
        ImageSource::Path(path.as_path())
    }
}

impl<'a> From<&'a str> for ImageSource<'a> {
    fn from(path: &'a str) -> Self {
        ImageSource::Path(Path::new(path))
    }
}

impl<'a> From<&'a PixelBuffer> for ImageSource<'a> {
    fn from(buffer: &'a PixelBuffer) -> Self {
        ImageSource::Buffer(buffer)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
