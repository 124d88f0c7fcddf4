use resvg::tiny_skia::{Pixmap, Transform};

use crate::foundation::error::{BoothError, BoothResult};

// Avoid pathological allocations for malformed branding files.
const MAX_DIM: u32 = 8_192;

/// Rasterize an SVG tree to exactly `width` x `height` pixels (anisotropic fit).
pub fn rasterize_svg(tree: &usvg::Tree, width: u32, height: u32) -> BoothResult<Pixmap> {
    if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
        return Err(BoothError::validation(format!(
            "svg raster size out of range: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    let size = tree.size();
    if !size.width().is_finite() || size.width() <= 0.0 || size.height() <= 0.0 {
        return Err(BoothError::validation("svg has invalid width/height"));
    }

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| BoothError::validation("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    resvg::render(tree, Transform::from_scale(sx, sy), &mut pixmap.as_mut());
    Ok(pixmap)
}
