use std::sync::Arc;

use anyhow::Context;
use resvg::tiny_skia::{IntSize, Pixmap};

use crate::foundation::{error::BoothResult, math::premultiply_rgba8_in_place};

/// Decode encoded raster bytes (JPEG, PNG, ...) into a premultiplied RGBA8 pixmap.
pub fn decode_image(bytes: &[u8]) -> BoothResult<Pixmap> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    let size = IntSize::from_wh(width, height).context("decoded image has zero size")?;
    let pixmap = Pixmap::from_vec(rgba8_premul, size).context("wrap decoded pixels")?;
    Ok(pixmap)
}

/// Parse SVG bytes into a `usvg` tree, resolving text against `fontdb`.
pub fn parse_svg(bytes: &[u8], fontdb: Arc<usvg::fontdb::Database>) -> BoothResult<usvg::Tree> {
    let opts = usvg::Options {
        fontdb,
        font_resolver: font_resolver(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// `true` when the bytes look like SVG markup rather than an encoded raster.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    trimmed.starts_with("<svg") || (trimmed.starts_with("<?xml") && text.contains("<svg"))
}

// Requested families first, then the generic families, then any installed face.
fn font_resolver() -> usvg::FontResolver<'static> {
    let requested = usvg::FontResolver::default_font_selector();
    usvg::FontResolver {
        select_font: Box::new(move |font, fontdb| {
            requested(font, fontdb).or_else(|| {
                let query = usvg::fontdb::Query {
                    families: &[usvg::fontdb::Family::SansSerif, usvg::fontdb::Family::Serif],
                    weight: usvg::fontdb::Weight(font.weight()),
                    ..Default::default()
                };
                fontdb
                    .query(&query)
                    .or_else(|| fontdb.faces().next().map(|f| f.id))
            })
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

/// System font database used for SVG branding and the text fallback.
///
/// The generic `sans-serif` and `serif` families are rebound to installed faces when their
/// built-in defaults (Arial, Times New Roman) are missing.
pub fn system_fontdb() -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    bind_generic_families(&mut db);
    tracing::debug!(faces = db.len(), "system fonts loaded");
    Arc::new(db)
}

pub(crate) fn bind_generic_families(db: &mut usvg::fontdb::Database) {
    use usvg::fontdb::{Family, Query};

    let family_names: Vec<String> = db
        .faces()
        .filter_map(|f| f.families.first().map(|(name, _)| name.clone()))
        .collect();
    let pick = |want_serif: bool| {
        family_names
            .iter()
            .find(|name| {
                let sans = name.contains("Sans");
                let serif = name.contains("Serif") && !sans;
                !name.contains("Mono") && if want_serif { serif } else { sans }
            })
            .or_else(|| family_names.first())
            .cloned()
    };
    let resolves = |db: &usvg::fontdb::Database, family: Family<'_>| {
        db.query(&Query {
            families: &[family],
            ..Query::default()
        })
        .is_some()
    };

    if !resolves(db, Family::SansSerif)
        && let Some(name) = pick(false)
    {
        db.set_sans_serif_family(name);
    }
    if !resolves(db, Family::Serif)
        && let Some(name) = pick(true)
    {
        db.set_serif_family(name);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
