use kurbo::{Affine, Point, Rect};

use crate::{
    config::settings::VisualAdjustments,
    foundation::{
        core::Canvas,
        math::{premul_from_unit, unpremul_unit},
    },
};

const NEUTRAL_PERCENT: f64 = 100.0;

/// Region of the native frame sampled for one photo.
///
/// The pre-crop sample is the native size divided by `zoom`, centred, then offset by
/// `crop_x`/`crop_y` percent of the native width/height. The sample is then forced square on
/// its shorter side and re-centred with the same offset. The result may extend past the frame
/// edges; the drawing step clips it.
///
/// A zoom that is zero, negative or not finite is treated as `1.0`.
pub fn source_rect(adj: &VisualAdjustments, native: Canvas) -> Rect {
    let w = f64::from(native.width);
    let h = f64::from(native.height);
    let zoom = if adj.zoom.is_finite() && adj.zoom > 0.0 {
        adj.zoom
    } else {
        1.0
    };
    let offset_x = adj.crop_x / 100.0 * w;
    let offset_y = adj.crop_y / 100.0 * h;

    let mut sw = w / zoom;
    let mut sh = h / zoom;
    let mut sx = (w - sw) / 2.0 + offset_x;
    let mut sy = (h - sh) / 2.0 + offset_y;

    if native.aspect_ratio() > 1.0 {
        sw = sh;
        sx = (w - sw) / 2.0 + offset_x;
    } else {
        sh = sw;
        sy = (h - sh) / 2.0 + offset_y;
    }

    Rect::new(sx, sy, sx + sw, sy + sh)
}

/// Map from native frame coordinates to photo coordinates.
///
/// `source` is stretched onto the full `dest` canvas, then the drawing plane is rotated by
/// `rotation_deg` about the canvas centre.
pub fn capture_transform(source: Rect, rotation_deg: f64, dest: Canvas) -> Affine {
    let dw = f64::from(dest.width);
    let dh = f64::from(dest.height);
    let fit = Affine::scale_non_uniform(dw / source.width(), dh / source.height())
        * Affine::translate((-source.x0, -source.y0));
    if rotation_deg == 0.0 {
        return fit;
    }
    Affine::rotate_about(rotation_deg.to_radians(), Point::new(dw / 2.0, dh / 2.0)) * fit
}

/// Brightness, contrast and saturate filters in application order.
///
/// Terms hold percentages (`100` neutral); neutral terms are omitted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FilterChain {
    brightness: Option<f64>,
    contrast: Option<f64>,
    saturate: Option<f64>,
}

impl FilterChain {
    /// Build the chain from percentage adjustments.
    pub fn from_adjustments(adj: &VisualAdjustments) -> Self {
        let term = |pct: f64| (pct != NEUTRAL_PERCENT).then_some(pct);
        Self {
            brightness: term(adj.brightness),
            contrast: term(adj.contrast),
            saturate: term(adj.saturation),
        }
    }

    /// `true` when every term is neutral.
    pub fn is_neutral(&self) -> bool {
        self.brightness.is_none() && self.contrast.is_none() && self.saturate.is_none()
    }

    /// CSS filter string, e.g. `brightness(120%) contrast(90%)`; empty when neutral.
    pub fn css(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if let Some(b) = self.brightness {
            parts.push(format!("brightness({b}%)"));
        }
        if let Some(c) = self.contrast {
            parts.push(format!("contrast({c}%)"));
        }
        if let Some(s) = self.saturate {
            parts.push(format!("saturate({s}%)"));
        }
        parts.join(" ")
    }

    /// Apply the chain to straight-alpha `0..=1` components.
    pub fn apply_rgb(&self, mut rgb: [f64; 3]) -> [f64; 3] {
        if let Some(b) = self.brightness {
            let b = b / 100.0;
            rgb = rgb.map(|c| (c * b).clamp(0.0, 1.0));
        }
        if let Some(k) = self.contrast {
            let k = k / 100.0;
            rgb = rgb.map(|c| ((c - 0.5) * k + 0.5).clamp(0.0, 1.0));
        }
        if let Some(s) = self.saturate {
            let s = s / 100.0;
            let [r, g, b] = rgb;
            rgb = [
                (0.213 + 0.787 * s) * r + (0.715 - 0.715 * s) * g + (0.072 - 0.072 * s) * b,
                (0.213 - 0.213 * s) * r + (0.715 + 0.285 * s) * g + (0.072 - 0.072 * s) * b,
                (0.213 - 0.213 * s) * r + (0.715 - 0.715 * s) * g + (0.072 + 0.928 * s) * b,
            ]
            .map(|c| c.clamp(0.0, 1.0));
        }
        rgb
    }

    /// Filter premultiplied RGBA8 pixels in place. Alpha is untouched.
    pub fn apply_premul_in_place(&self, rgba: &mut [u8]) {
        if self.is_neutral() {
            return;
        }
        for px in rgba.chunks_exact_mut(4) {
            let a = px[3];
            if a == 0 {
                continue;
            }
            let rgb = [
                f64::from(unpremul_unit(px[0], a)),
                f64::from(unpremul_unit(px[1], a)),
                f64::from(unpremul_unit(px[2], a)),
            ];
            let out = self.apply_rgb(rgb);
            px[0] = premul_from_unit(out[0] as f32, a);
            px[1] = premul_from_unit(out[1] as f32, a);
            px[2] = premul_from_unit(out[2] as f32, a);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/adjust.rs"]
mod tests;
