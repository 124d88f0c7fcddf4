//! Live-frame capture: the video source seam, per-frame geometry and filters, the capture
//! state machine and its timed driver.

pub(crate) mod adjust;
pub(crate) mod frame;
pub(crate) mod machine;
pub(crate) mod sequencer;
pub(crate) mod source;
