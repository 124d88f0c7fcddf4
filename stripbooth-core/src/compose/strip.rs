use std::{path::Path, sync::Arc};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use resvg::tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::{
    assets::{
        color::ColorDef,
        decode::{decode_image, looks_like_svg, parse_svg, system_fontdb},
        svg_raster::rasterize_svg,
    },
    capture::frame::CapturedPhoto,
    compose::layout::StripLayout,
    config::settings::AppSettings,
    encode::jpeg::encode_jpeg,
    foundation::{
        core::{EncodedImage, PHOTO_COUNT, STRIP_HEIGHT, STRIP_JPEG_QUALITY, STRIP_WIDTH},
        error::{BoothError, BoothResult},
    },
};

/// A finished strip and the photos it was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct PhotoStrip {
    /// Source photos, ordered by index.
    pub photos: Vec<CapturedPhoto>,
    /// `STRIP_WIDTH` x `STRIP_HEIGHT` JPEG.
    pub image: EncodedImage,
    /// When the strip was composited.
    pub created_at: DateTime<Utc>,
}

/// What goes in the bottom band.
#[derive(Clone, Debug, PartialEq)]
pub struct Branding {
    /// Encoded PNG/JPEG/SVG graphic; `None` draws the text fallback directly.
    pub graphic: Option<Arc<Vec<u8>>>,
    /// Graphic width as a fraction of the strip width.
    pub scale: f64,
    /// First fallback line.
    pub title: String,
    /// Second fallback line.
    pub subtitle: String,
}

impl Default for Branding {
    fn default() -> Self {
        let app = AppSettings::default();
        Self {
            graphic: None,
            scale: app.branding_scale,
            title: app.branding_title,
            subtitle: app.branding_subtitle,
        }
    }
}

impl Branding {
    /// Branding described by `settings`.
    ///
    /// An unreadable graphic file is logged and left out; the strip then carries the text
    /// fallback.
    pub fn from_settings(settings: &AppSettings) -> Self {
        let path = settings.branding_image_path.trim();
        let graphic = if path.is_empty() {
            None
        } else {
            match std::fs::read(Path::new(path)) {
                Ok(bytes) => Some(Arc::new(bytes)),
                Err(err) => {
                    tracing::warn!(path, %err, "failed to read branding graphic");
                    None
                }
            }
        };
        Self {
            graphic,
            scale: settings.branding_scale,
            title: settings.branding_title.clone(),
            subtitle: settings.branding_subtitle.clone(),
        }
    }

    /// Same branding with `bytes` as the graphic.
    pub fn with_graphic(mut self, bytes: Vec<u8>) -> Self {
        self.graphic = Some(Arc::new(bytes));
        self
    }
}

/// Builds photo strips.
///
/// Cheap to clone; the font database and branding graphic are shared.
#[derive(Clone)]
pub struct StripCompositor {
    layout: StripLayout,
    branding: Branding,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for StripCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripCompositor")
            .field("layout", &self.layout)
            .field("branding", &self.branding)
            .field("fonts", &self.fontdb.len())
            .finish()
    }
}

impl StripCompositor {
    /// Compositor using the system fonts for SVG text.
    pub fn new(branding: Branding) -> Self {
        Self::with_fontdb(branding, system_fontdb())
    }

    /// Compositor resolving SVG text against `fontdb`.
    pub fn with_fontdb(branding: Branding, fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self {
            layout: StripLayout::default(),
            branding,
            fontdb,
        }
    }

    /// Strip geometry.
    pub fn layout(&self) -> &StripLayout {
        &self.layout
    }

    /// Composite `photos` on a background-filled strip off the async runtime.
    ///
    /// Decoding has no timeout: a decoder that never returns stalls this call.
    pub async fn generate_strip(
        &self,
        photos: Vec<CapturedPhoto>,
        background: ColorDef,
    ) -> BoothResult<PhotoStrip> {
        if photos.len() != PHOTO_COUNT {
            return Err(BoothError::invalid_photo_count(PHOTO_COUNT, photos.len()));
        }
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.compose(photos, background))
            .await
            .map_err(|e| BoothError::strip_assembly(format!("compositing task failed: {e}")))?
    }

    /// Blocking form of [`generate_strip`](Self::generate_strip).
    #[tracing::instrument(skip_all, fields(photos = photos.len()))]
    pub fn compose(
        &self,
        mut photos: Vec<CapturedPhoto>,
        background: ColorDef,
    ) -> BoothResult<PhotoStrip> {
        if photos.len() != PHOTO_COUNT {
            return Err(BoothError::invalid_photo_count(PHOTO_COUNT, photos.len()));
        }
        check_indices(&photos)?;
        photos.sort_by_key(|p| p.index);

        let mut canvas = Pixmap::new(STRIP_WIDTH, STRIP_HEIGHT)
            .ok_or_else(|| BoothError::strip_assembly("failed to allocate strip canvas"))?;
        canvas.fill(background.to_skia());

        // Decodes run concurrently; draws follow index order.
        let decoded: Vec<BoothResult<Pixmap>> = photos
            .par_iter()
            .map(|p| {
                decode_image(&p.image.bytes).map_err(|e| {
                    BoothError::strip_assembly(format!("failed to load photo {}: {e}", p.index))
                })
            })
            .collect();
        for (photo, pixmap) in photos.iter().zip(decoded) {
            let pixmap = pixmap?;
            let slot = self.layout.photo_rect(photo.index);
            draw_scaled(&mut canvas, &pixmap, slot);
        }

        self.draw_branding(&mut canvas);

        let image = encode_jpeg(&canvas, STRIP_JPEG_QUALITY)
            .map_err(|e| BoothError::strip_assembly(format!("{e:#}")))?;
        drop(canvas);

        tracing::info!(bytes = image.len(), "photo strip composited");
        Ok(PhotoStrip {
            photos,
            image,
            created_at: Utc::now(),
        })
    }

    fn draw_branding(&self, canvas: &mut Pixmap) {
        if let Some(bytes) = &self.branding.graphic {
            match self.draw_graphic(canvas, bytes) {
                Ok(()) => return,
                Err(err) => {
                    tracing::warn!(%err, "failed to load branding graphic, using text fallback");
                }
            }
        }
        self.draw_text_fallback(canvas);
    }

    fn draw_graphic(&self, canvas: &mut Pixmap, bytes: &[u8]) -> BoothResult<()> {
        let (raster, rect) = if looks_like_svg(bytes) {
            let tree = parse_svg(bytes, Arc::clone(&self.fontdb))?;
            let size = tree.size();
            let rect = self.branding_rect(f64::from(size.width()), f64::from(size.height()))?;
            let w = rect.width().round().max(1.0) as u32;
            let h = rect.height().round().max(1.0) as u32;
            (rasterize_svg(&tree, w, h)?, rect)
        } else {
            let raster = decode_image(bytes)?;
            let rect =
                self.branding_rect(f64::from(raster.width()), f64::from(raster.height()))?;
            (raster, rect)
        };
        draw_scaled(canvas, &raster, rect);
        Ok(())
    }

    fn branding_rect(&self, graphic_w: f64, graphic_h: f64) -> BoothResult<kurbo::Rect> {
        let rect = self
            .layout
            .branding_rect(graphic_w, graphic_h, self.branding.scale);
        if !(rect.width() >= 1.0 && rect.height() >= 1.0) {
            return Err(BoothError::strip_assembly(format!(
                "branding graphic {graphic_w}x{graphic_h} at scale {} has no visible area",
                self.branding.scale
            )));
        }
        Ok(rect)
    }

    // Never fails: a broken fallback only loses the text.
    fn draw_text_fallback(&self, canvas: &mut Pixmap) {
        let (first, second) = self.layout.fallback_baselines();
        let svg = format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">
<g fill="#FFFFFF" text-anchor="middle" font-family="Futura, sans-serif">
<text x="{cx}" y="{first}" font-size="24" font-weight="bold">{title}</text>
<text x="{cx}" y="{second}" font-size="18">{subtitle}</text>
</g></svg>"##,
            w = self.layout.strip_width,
            h = self.layout.strip_height,
            cx = self.layout.strip_width / 2.0,
            title = escape_xml(&self.branding.title),
            subtitle = escape_xml(&self.branding.subtitle),
        );
        match parse_svg(svg.as_bytes(), Arc::clone(&self.fontdb)) {
            Ok(tree) => resvg::render(&tree, Transform::identity(), &mut canvas.as_mut()),
            Err(err) => tracing::warn!(%err, "branding text fallback failed"),
        }
    }
}

fn check_indices(photos: &[CapturedPhoto]) -> BoothResult<()> {
    let mut seen = [false; PHOTO_COUNT];
    for p in photos {
        match seen.get_mut(p.index) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => {
                return Err(BoothError::strip_assembly(format!(
                    "duplicate photo index {}",
                    p.index
                )));
            }
            None => {
                return Err(BoothError::strip_assembly(format!(
                    "photo index {} out of range",
                    p.index
                )));
            }
        }
    }
    Ok(())
}

/// Stretch `src` onto `dest` (strip coordinates) with bilinear filtering.
pub(crate) fn draw_scaled(canvas: &mut Pixmap, src: &Pixmap, dest: kurbo::Rect) {
    if src.width() == 0 || src.height() == 0 || dest.width() <= 0.0 || dest.height() <= 0.0 {
        return;
    }
    let sx = dest.width() / f64::from(src.width());
    let sy = dest.height() / f64::from(src.height());
    let transform = crate::foundation::core::to_skia_transform(
        kurbo::Affine::translate((dest.x0, dest.y0)) * kurbo::Affine::scale_non_uniform(sx, sy),
    );
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    canvas.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/compose/strip.rs"]
mod tests;
