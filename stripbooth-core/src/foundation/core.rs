use std::sync::Arc;

use crate::foundation::error::{BoothError, BoothResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Number of photos captured per session and composited into one strip.
pub const PHOTO_COUNT: usize = 3;
/// Countdown start value before each flash.
pub const COUNTDOWN_SECONDS: u32 = 3;
/// Full flash duration; the capture instant is at its midpoint.
pub const FLASH_DURATION_MS: u64 = 200;

/// Width of one captured photo in pixels.
pub const PHOTO_WIDTH: u32 = 346;
/// Height of one captured photo in pixels.
pub const PHOTO_HEIGHT: u32 = 317;
/// Strip canvas width in pixels.
pub const STRIP_WIDTH: u32 = 400;
/// Strip canvas height in pixels.
pub const STRIP_HEIGHT: u32 = 1200;

/// JPEG quality for single captured frames.
pub const CAPTURE_JPEG_QUALITY: u8 = 90;
/// JPEG quality for composited strips and print artifacts.
pub const STRIP_JPEG_QUALITY: u8 = 95;

/// Raster dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create validated non-zero dimensions.
    pub fn new(width: u32, height: u32) -> BoothResult<Self> {
        if width == 0 || height == 0 {
            return Err(BoothError::validation("canvas width/height must be non-zero"));
        }
        Ok(Self { width, height })
    }

    /// Width divided by height.
    pub fn aspect_ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Encoded raster image (JPEG) with its pixel dimensions.
///
/// Bytes are shared so photos can be handed to parallel decoders without copying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    /// Encoded file bytes.
    pub bytes: Arc<Vec<u8>>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl EncodedImage {
    /// Wrap already-encoded bytes.
    pub fn new(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            bytes: Arc::new(bytes),
            width,
            height,
        }
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` when no bytes were produced.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Pixel dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }
}

/// Convert a `kurbo` affine into the `tiny-skia` transform used for drawing.
pub(crate) fn to_skia_transform(affine: Affine) -> resvg::tiny_skia::Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    resvg::tiny_skia::Transform::from_row(
        a as f32, b as f32, c as f32, d as f32, e as f32, f as f32,
    )
}
