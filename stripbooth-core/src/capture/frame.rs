use resvg::tiny_skia::{self, FilterQuality, Paint, Pattern, Pixmap, SpreadMode, Transform};

use crate::{
    capture::{
        adjust::{FilterChain, capture_transform, source_rect},
        source::VideoSource,
    },
    config::settings::VisualAdjustments,
    encode::jpeg::encode_jpeg,
    foundation::{
        core::{
            CAPTURE_JPEG_QUALITY, Canvas, EncodedImage, PHOTO_COUNT, PHOTO_HEIGHT, PHOTO_WIDTH,
            Rect, to_skia_transform,
        },
        error::{BoothError, BoothResult},
    },
};

/// One photo taken during a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedPhoto {
    /// JPEG at `PHOTO_WIDTH` x `PHOTO_HEIGHT`.
    pub image: EncodedImage,
    /// Capture instant, milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    /// Position in capture order, `0..PHOTO_COUNT`.
    pub index: usize,
}

impl CapturedPhoto {
    /// Stamp `image` as photo `index`, taken now.
    pub fn new(image: EncodedImage, index: usize) -> BoothResult<Self> {
        if index >= PHOTO_COUNT {
            return Err(BoothError::validation(format!(
                "photo index {index} out of range 0..{PHOTO_COUNT}"
            )));
        }
        Ok(Self {
            image,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            index,
        })
    }
}

/// Take one still from `source` with `adj` baked in.
///
/// The frame is cropped to a square on its shorter side (see [`source_rect`]), stretched onto
/// a `PHOTO_WIDTH` x `PHOTO_HEIGHT` canvas, rotated about the canvas centre, filtered, and
/// encoded as JPEG at quality 90. Areas of the canvas not covered by the frame encode as
/// black.
#[tracing::instrument(skip_all, fields(zoom = adj.zoom, rotation = adj.rotation))]
pub fn capture_frame(
    source: &dyn VideoSource,
    adj: &VisualAdjustments,
) -> BoothResult<EncodedImage> {
    let state = source.ready_state();
    if !state.has_frame() {
        return Err(BoothError::capture_not_ready(format!(
            "video source is {state:?}"
        )));
    }
    let frame = source.sample()?;
    let src = source_rect(adj, frame.canvas());
    let dest = Canvas {
        width: PHOTO_WIDTH,
        height: PHOTO_HEIGHT,
    };

    let mut canvas = Pixmap::new(dest.width, dest.height)
        .ok_or_else(|| BoothError::frame_encoding("failed to allocate capture canvas"))?;
    draw_sample(&mut canvas, &frame.pixmap, src, adj.rotation, dest)?;
    FilterChain::from_adjustments(adj).apply_premul_in_place(canvas.data_mut());

    let encoded = encode_jpeg(&canvas, CAPTURE_JPEG_QUALITY)
        .map_err(|e| BoothError::frame_encoding(format!("{e:#}")))?;
    drop(canvas);

    tracing::debug!(bytes = encoded.len(), "frame captured");
    Ok(encoded)
}

// Source pixels outside the frame are not drawn, and the destination shrinks with the
// clipped source.
fn draw_sample(
    canvas: &mut Pixmap,
    frame: &Pixmap,
    src: Rect,
    rotation_deg: f64,
    dest: Canvas,
) -> BoothResult<()> {
    if !(src.width() > 0.0 && src.height() > 0.0) || !src.is_finite() {
        return Err(BoothError::frame_encoding(format!(
            "degenerate source rect {src:?}"
        )));
    }
    let bounds = Rect::new(0.0, 0.0, f64::from(frame.width()), f64::from(frame.height()));
    let clipped = src.intersect(bounds);
    if clipped.width() <= 0.0 || clipped.height() <= 0.0 {
        tracing::warn!(?src, "source rect lies outside the frame");
        return Ok(());
    }
    let Some(fill) = tiny_skia::Rect::from_ltrb(
        clipped.x0 as f32,
        clipped.y0 as f32,
        clipped.x1 as f32,
        clipped.y1 as f32,
    ) else {
        return Err(BoothError::frame_encoding("invalid clipped source rect"));
    };

    let paint = Paint {
        shader: Pattern::new(
            frame.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bilinear,
            1.0,
            Transform::identity(),
        ),
        anti_alias: true,
        ..Paint::default()
    };
    let transform = to_skia_transform(capture_transform(src, rotation_deg, dest));
    canvas.fill_rect(fill, &paint, transform, None);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/capture/frame.rs"]
mod tests;
