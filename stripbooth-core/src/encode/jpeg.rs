use anyhow::Context as _;
use image::codecs::jpeg::JpegEncoder;
use resvg::tiny_skia::Pixmap;

use crate::foundation::core::EncodedImage;

/// Encode a premultiplied pixmap as JPEG at `quality` (1..=100).
///
/// JPEG has no alpha channel; pixels are composited over black, matching what a browser
/// canvas does for `image/jpeg` exports. For premultiplied data that is simply the colour
/// channels as stored.
pub fn encode_jpeg(pixmap: &Pixmap, quality: u8) -> anyhow::Result<EncodedImage> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let mut rgb = Vec::with_capacity((width as usize) * (height as usize) * 3);
    for px in pixmap.data().chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }
    let rgb = image::RgbImage::from_raw(width, height, rgb)
        .context("jpeg input buffer does not match pixmap dimensions")?;

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode_image(&rgb)
        .with_context(|| format!("encode {width}x{height} jpeg"))?;

    Ok(EncodedImage::new(out, width, height))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/jpeg.rs"]
mod tests;
