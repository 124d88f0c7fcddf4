//! Artifact naming and the folder/download persistence seam.

pub(crate) mod bridge;
pub(crate) mod filename;
