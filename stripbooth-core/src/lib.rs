//! Stripbooth is the capture-and-composite core of a kiosk photobooth.
//!
//! A session takes three photos from a live camera feed on a fixed countdown-and-flash
//! schedule, then composites them into a branded 400x1200 vertical strip that is saved to a
//! folder or handed to a download fallback.
//!
//! # Pipeline overview
//!
//! 1. **Capture**: [`CaptureSequencer`] drives the [`CaptureMachine`] on the tokio clock and
//!    calls [`capture_frame`] at each flash peak against a [`VideoSource`].
//! 2. **Composite**: [`StripCompositor::generate_strip`] decodes the three JPEGs in parallel,
//!    places them by index and draws the branding band.
//! 3. **Print**: [`build_print_artifact`] applies the selected [`PrintLayout`] and
//!    [`print_photo_strip`] persists it through a [`PersistenceBridge`] or a
//!    [`DownloadFallback`].
//!
//! The surrounding screen flow is modelled by [`KioskSession`]; settings records live behind
//! a [`SettingsStore`].
//!
//! Pixels are premultiplied RGBA8 until JPEG encoding, which composites over black.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod assets;
mod capture;
mod compose;
mod config;
mod encode;
mod foundation;
mod kiosk;
mod persist;

pub use assets::color::ColorDef;
pub use assets::decode::{decode_image, looks_like_svg, parse_svg, system_fontdb};
pub use assets::svg_raster::rasterize_svg;
pub use capture::adjust::{FilterChain, capture_transform, source_rect};
pub use capture::frame::{CapturedPhoto, capture_frame};
pub use capture::machine::{CaptureMachine, Input, MachineState, Phase, Step, transition};
pub use capture::sequencer::{
    CaptureHandle, CaptureSequencer, CaptureTiming, SequenceOutcome, SequencerEvent,
};
pub use capture::source::{
    CameraProvider, ReadyState, RetryPolicy, SharedFrameSource, StillFrameSource, VideoFrame,
    VideoSource, acquire_camera,
};
pub use compose::layout::{BRAND_BAND_HEIGHT, PHOTO_SPACING, StripLayout};
pub use compose::print::{PrintLayout, build_print_artifact};
pub use compose::strip::{Branding, PhotoStrip, StripCompositor};
pub use config::settings::{
    AppSettings, CONFIG_VERSION, DEFAULT_FILENAME_PREFIX, DEFAULT_STRIP_BACKGROUND,
    VisualAdjustments, merge_json, merge_with_defaults,
};
pub use config::store::{
    APP_SETTINGS_KEY, CAMERA_SETTINGS_KEY, JsonDirStore, MemoryStore, SettingsStore,
    load_app_settings, load_camera_settings, reset_app_settings, reset_camera_settings,
    save_app_settings, save_camera_settings,
};
pub use encode::jpeg::encode_jpeg;
pub use foundation::core::{
    Affine, CAPTURE_JPEG_QUALITY, COUNTDOWN_SECONDS, Canvas, EncodedImage, FLASH_DURATION_MS,
    PHOTO_COUNT, PHOTO_HEIGHT, PHOTO_WIDTH, Point, Rect, STRIP_HEIGHT, STRIP_JPEG_QUALITY,
    STRIP_WIDTH, Vec2,
};
pub use foundation::error::{BoothError, BoothResult, CameraFault};
pub use kiosk::session::{KioskSession, Screen};
pub use kiosk::tap_gate::{ADMIN_TAP_COUNT, ADMIN_TAP_WINDOW, TapGate, register_tap};
pub use persist::bridge::{
    DownloadDirFallback, DownloadFallback, FolderBridge, PersistenceBridge, PrintReceipt,
    SaveReport, SavedTo, print_photo_strip,
};
pub use persist::filename::artifact_filename;

/// Re-exported for callers that build or inspect frames directly.
pub use resvg::tiny_skia::Pixmap;
