use kurbo::{Point, Rect};

use crate::foundation::core::{PHOTO_COUNT, PHOTO_HEIGHT, PHOTO_WIDTH, STRIP_HEIGHT, STRIP_WIDTH};

/// Vertical gap between photos.
pub const PHOTO_SPACING: f64 = 30.0;
/// Height of the branding band at the bottom of the strip.
pub const BRAND_BAND_HEIGHT: f64 = 100.0;

/// Fixed geometry of the photo strip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StripLayout {
    /// Strip width.
    pub strip_width: f64,
    /// Strip height.
    pub strip_height: f64,
    /// Photo width.
    pub photo_width: f64,
    /// Photo height.
    pub photo_height: f64,
    /// Gap between photos.
    pub photo_spacing: f64,
    /// Bottom branding band.
    pub band_height: f64,
}

impl Default for StripLayout {
    fn default() -> Self {
        Self {
            strip_width: f64::from(STRIP_WIDTH),
            strip_height: f64::from(STRIP_HEIGHT),
            photo_width: f64::from(PHOTO_WIDTH),
            photo_height: f64::from(PHOTO_HEIGHT),
            photo_spacing: PHOTO_SPACING,
            band_height: BRAND_BAND_HEIGHT,
        }
    }
}

impl StripLayout {
    /// Height of the stacked photos including the gaps between them.
    pub fn photo_block_height(&self) -> f64 {
        let n = PHOTO_COUNT as f64;
        n * self.photo_height + (n - 1.0) * self.photo_spacing
    }

    /// Space above the first photo; the block is centred in the area above the band.
    pub fn top_padding(&self) -> f64 {
        (self.strip_height - self.photo_block_height() - self.band_height) / 2.0
    }

    /// Top-left corner of photo `index`.
    pub fn photo_origin(&self, index: usize) -> Point {
        let x = (self.strip_width - self.photo_width) / 2.0;
        let y = self.top_padding() + (index as f64) * (self.photo_height + self.photo_spacing);
        Point::new(x, y)
    }

    /// Destination rect of photo `index`.
    pub fn photo_rect(&self, index: usize) -> Rect {
        Rect::from_origin_size(self.photo_origin(index), (self.photo_width, self.photo_height))
    }

    /// The bottom band reserved for branding.
    pub fn band_rect(&self) -> Rect {
        Rect::new(
            0.0,
            self.strip_height - self.band_height,
            self.strip_width,
            self.strip_height,
        )
    }

    /// Where a branding graphic of `graphic_w` x `graphic_h` is drawn.
    ///
    /// Width is `scale` times the strip width, height keeps the graphic's aspect ratio, and the
    /// result is centred horizontally and vertically within the band. A graphic taller than the
    /// band overhangs it upwards symmetrically.
    pub fn branding_rect(&self, graphic_w: f64, graphic_h: f64, scale: f64) -> Rect {
        let w = self.strip_width * scale;
        let h = if graphic_w > 0.0 {
            graphic_h / graphic_w * w
        } else {
            0.0
        };
        let x = (self.strip_width - w) / 2.0;
        let y = self.strip_height - self.band_height + (self.band_height - h) / 2.0;
        Rect::new(x, y, x + w, y + h)
    }

    /// Baselines of the two text-fallback lines.
    pub fn fallback_baselines(&self) -> (f64, f64) {
        let first = self.strip_height - 60.0;
        (first, first + 30.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/layout.rs"]
mod tests;
