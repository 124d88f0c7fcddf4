//! Strip compositing and print layout.

pub(crate) mod layout;
pub(crate) mod print;
pub(crate) mod strip;
