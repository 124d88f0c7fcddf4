use resvg::tiny_skia::Pixmap;
use serde::{Deserialize, Serialize};

use crate::{
    assets::decode::decode_image,
    compose::strip::draw_scaled,
    encode::jpeg::encode_jpeg,
    foundation::{
        core::{EncodedImage, Rect, STRIP_HEIGHT, STRIP_JPEG_QUALITY, STRIP_WIDTH},
        error::{BoothError, BoothResult},
    },
};

/// How a finished strip is laid out for printing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrintLayout {
    /// The strip as-is.
    #[default]
    Single,
    /// Two copies side by side on an 800x1200 postcard, to be cut in half.
    TwoUp,
}

/// Prepare the artifact handed to the persistence bridge.
#[tracing::instrument(skip(strip), fields(bytes = strip.len()))]
pub fn build_print_artifact(
    strip: &EncodedImage,
    layout: PrintLayout,
) -> BoothResult<EncodedImage> {
    match layout {
        PrintLayout::Single => Ok(strip.clone()),
        PrintLayout::TwoUp => two_up(strip),
    }
}

fn two_up(strip: &EncodedImage) -> BoothResult<EncodedImage> {
    let decoded = decode_image(&strip.bytes)
        .map_err(|e| BoothError::strip_assembly(format!("failed to load photo strip image: {e}")))?;

    let (w, h) = (f64::from(STRIP_WIDTH), f64::from(STRIP_HEIGHT));
    let mut canvas = Pixmap::new(STRIP_WIDTH * 2, STRIP_HEIGHT)
        .ok_or_else(|| BoothError::strip_assembly("failed to allocate print canvas"))?;
    draw_scaled(&mut canvas, &decoded, Rect::new(0.0, 0.0, w, h));
    draw_scaled(&mut canvas, &decoded, Rect::new(w, 0.0, 2.0 * w, h));

    let out = encode_jpeg(&canvas, STRIP_JPEG_QUALITY)
        .map_err(|e| BoothError::strip_assembly(format!("{e:#}")))?;
    drop(canvas);
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/print.rs"]
mod tests;
