//! Raster encoders for captured frames and composited strips.

pub(crate) mod jpeg;
