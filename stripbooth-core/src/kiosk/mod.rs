//! Per-guest screen flow and the hidden admin gesture.

pub(crate) mod session;
pub(crate) mod tap_gate;
