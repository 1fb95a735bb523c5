//! Raster codec and preparation primitives backed by the `image` crate.
//!
//! Decoding sniffs the format from file content, not the extension.
//! Encoding picks the format from the output extension.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat};
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use crate::error::VisionError;
use crate::frame::PixelBuffer;

/// Decode an image file into a pixel buffer.
pub fn decode(path: &Path) -> Result<PixelBuffer> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(VisionError::NotFound {
                path: path.to_path_buf(),
            }
            .into())
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read image {}", path.display()))
        }
    };
    let image = image::load_from_memory(&bytes).map_err(|e| VisionError::UnsupportedFormat {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(PixelBuffer::from(image))
}

/// Encode a buffer to `path`. `quality` (1-100) applies to JPEG only.
pub fn encode(buffer: &PixelBuffer, path: &Path, quality: u8) -> Result<()> {
    let format = output_format(path)?;
    let file = File::create(path)
        .with_context(|| format!("failed to create output {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        ImageFormat::Jpeg => {
            JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100))
                .encode_image(buffer.as_image())
                .with_context(|| format!("failed to encode JPEG {}", path.display()))?;
        }
        ImageFormat::Gif => {
            DynamicImage::ImageRgb8(buffer.as_image().clone())
                .to_rgba8()
                .write_to(&mut writer, ImageFormat::Gif)
                .with_context(|| format!("failed to encode GIF {}", path.display()))?;
        }
        other => {
            buffer
                .as_image()
                .write_to(&mut writer, other)
                .with_context(|| format!("failed to encode {}", path.display()))?;
        }
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

fn output_format(path: &Path) -> Result<ImageFormat> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        "png" => Ok(ImageFormat::Png),
        "gif" => Ok(ImageFormat::Gif),
        _ => Err(VisionError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: "unsupported output format".into(),
        }
        .into()),
    }
}

/// Resize to `width × height`. With `preserve_aspect`, the image is fitted
/// inside the target box instead; each side stays at least 1px.
pub fn resize(buffer: &PixelBuffer, width: u32, height: u32, preserve_aspect: bool) -> PixelBuffer {
    let (src_w, src_h) = (buffer.width().max(1), buffer.height().max(1));
    let (width, height) = if preserve_aspect {
        let ratio = (width as f64 / src_w as f64).min(height as f64 / src_h as f64);
        (
            ((src_w as f64 * ratio).floor() as u32).max(1),
            ((src_h as f64 * ratio).floor() as u32).max(1),
        )
    } else {
        (width.max(1), height.max(1))
    };
    imageops::resize(buffer.as_image(), width, height, FilterType::Triangle).into()
}

/// Crop a region. The region is clamped to the buffer bounds.
pub fn crop(buffer: &PixelBuffer, x: u32, y: u32, width: u32, height: u32) -> PixelBuffer {
    let x = x.min(buffer.width());
    let y = y.min(buffer.height());
    let width = width.min(buffer.width() - x);
    let height = height.min(buffer.height() - y);
    imageops::crop_imm(buffer.as_image(), x, y, width, height)
        .to_image()
        .into()
}

/// Rotate clockwise by `degrees`, growing the canvas to fit the rotated
/// image. Uncovered pixels are filled with `background`.
///
/// Quarter turns are exact; other angles sample the nearest source pixel.
pub fn rotate(buffer: &PixelBuffer, degrees: f64, background: [u8; 3]) -> PixelBuffer {
    let degrees = if degrees.is_finite() {
        degrees.rem_euclid(360.0)
    } else {
        0.0
    };
    let image = buffer.as_image();
    match degrees {
        d if d == 0.0 => buffer.clone(),
        d if d == 90.0 => imageops::rotate90(image).into(),
        d if d == 180.0 => imageops::rotate180(image).into(),
        d if d == 270.0 => imageops::rotate270(image).into(),
        d => rotate_sampled(buffer, d.to_radians(), background),
    }
}

fn rotate_sampled(buffer: &PixelBuffer, theta: f64, background: [u8; 3]) -> PixelBuffer {
    let (w, h) = (buffer.width() as f64, buffer.height() as f64);
    let (sin, cos) = theta.sin_cos();
    // Tolerance keeps exact fits from growing by a pixel.
    let out_w = ((w * cos.abs() + h * sin.abs()) - 1e-9).ceil().max(1.0) as u32;
    let out_h = ((w * sin.abs() + h * cos.abs()) - 1e-9).ceil().max(1.0) as u32;
    let (src_cx, src_cy) = (w / 2.0, h / 2.0);
    let (dst_cx, dst_cy) = (out_w as f64 / 2.0, out_h as f64 / 2.0);

    PixelBuffer::from_fn(out_w, out_h, |x, y| {
        let dx = x as f64 + 0.5 - dst_cx;
        let dy = y as f64 + 0.5 - dst_cy;
        let sx = dx * cos + dy * sin + src_cx;
        let sy = -dx * sin + dy * cos + src_cy;
        buffer
            .get(sx.floor() as i64, sy.floor() as i64)
            .unwrap_or(background)
    })
}

/// Blend `mark` onto a copy of `buffer` with its top-left corner at `(x, y)`.
///
/// Each covered pixel becomes `base·(1−opacity) + mark·opacity`; `opacity` is
/// clamped to `[0, 1]` and the parts of `mark` outside `buffer` are dropped.
pub fn watermark(
    buffer: &PixelBuffer,
    mark: &PixelBuffer,
    x: i64,
    y: i64,
    opacity: f64,
) -> PixelBuffer {
    let opacity = if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut image = buffer.as_image().clone();
    for my in 0..mark.height() {
        for mx in 0..mark.width() {
            let (tx, ty) = (x + mx as i64, y + my as i64);
            if !buffer.contains(tx, ty) {
                continue;
            }
            let top = mark.pixel_at(mx, my);
            let pixel = image.get_pixel_mut(tx as u32, ty as u32);
            for (base, over) in pixel.0.iter_mut().zip(top) {
                let blended = *base as f64 * (1.0 - opacity) + over as f64 * opacity;
                *base = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    image.into()
}

/// Parse `#rrggbb` or `#rrggbbaa` (alpha ignored). The `#` is optional.
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim().trim_start_matches('#');
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}
