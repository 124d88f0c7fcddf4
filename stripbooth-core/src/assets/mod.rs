//! Colour parsing and raster/SVG decoding.

pub(crate) mod color;
pub(crate) mod decode;
pub(crate) mod svg_raster;
