use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU8, Ordering},
    },
    time::Duration,
};

use resvg::tiny_skia::Pixmap;

use crate::{
    assets::decode::decode_image,
    foundation::{
        core::Canvas,
        error::{BoothError, BoothResult, CameraFault},
    },
};

/// Readiness of a live video source, mirroring the media element ready states the kiosk
/// shell observes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    /// No camera is attached.
    NoSource,
    /// Dimensions are known but no frame has arrived yet.
    HaveMetadata,
    /// A current frame can be sampled.
    HaveEnoughData,
}

impl ReadyState {
    /// `true` when a frame can be sampled right now.
    pub fn has_frame(self) -> bool {
        self == Self::HaveEnoughData
    }

    fn to_u8(self) -> u8 {
        match self {
            Self::NoSource => 0,
            Self::HaveMetadata => 1,
            Self::HaveEnoughData => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::NoSource,
            1 => Self::HaveMetadata,
            _ => Self::HaveEnoughData,
        }
    }
}

/// One sampled frame: premultiplied RGBA8 at the source's native resolution.
#[derive(Clone, Debug)]
pub struct VideoFrame {
    /// Frame pixels.
    pub pixmap: Arc<Pixmap>,
}

impl VideoFrame {
    /// Native frame dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.pixmap.width(),
            height: self.pixmap.height(),
        }
    }
}

/// Read-only handle onto a live video feed.
///
/// Sampling is synchronous: the frame returned is whatever is current at the call.
pub trait VideoSource: Send + Sync {
    /// Current readiness.
    fn ready_state(&self) -> ReadyState;

    /// Native pixel dimensions, once known.
    fn native_size(&self) -> Option<Canvas>;

    /// Sample the current frame. Fails with [`BoothError::CaptureNotReady`] when no frame
    /// is available.
    fn sample(&self) -> BoothResult<VideoFrame>;
}

/// A still image presented as a video feed, with an externally settable ready state.
#[derive(Debug)]
pub struct StillFrameSource {
    frame: Arc<Pixmap>,
    state: AtomicU8,
}

impl StillFrameSource {
    /// Wrap an already decoded frame; the source starts out `HaveEnoughData`.
    pub fn new(frame: Pixmap) -> Self {
        Self {
            frame: Arc::new(frame),
            state: AtomicU8::new(ReadyState::HaveEnoughData.to_u8()),
        }
    }

    /// Decode encoded image bytes into a still source.
    pub fn from_encoded(bytes: &[u8]) -> BoothResult<Self> {
        Ok(Self::new(decode_image(bytes)?))
    }

    /// Override the reported ready state.
    pub fn set_ready_state(&self, state: ReadyState) {
        self.state.store(state.to_u8(), Ordering::Release);
    }
}

impl VideoSource for StillFrameSource {
    fn ready_state(&self) -> ReadyState {
        ReadyState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn native_size(&self) -> Option<Canvas> {
        match self.ready_state() {
            ReadyState::NoSource => None,
            _ => Some(Canvas {
                width: self.frame.width(),
                height: self.frame.height(),
            }),
        }
    }

    fn sample(&self) -> BoothResult<VideoFrame> {
        let state = self.ready_state();
        if !state.has_frame() {
            return Err(BoothError::capture_not_ready(format!(
                "video source is {state:?}"
            )));
        }
        Ok(VideoFrame {
            pixmap: Arc::clone(&self.frame),
        })
    }
}

#[derive(Debug, Default)]
struct Slot {
    size: Option<Canvas>,
    frame: Option<Arc<Pixmap>>,
}

/// Latest-frame slot fed by a hosting camera thread.
///
/// The producer calls [`announce`](Self::announce) once the stream dimensions are known and
/// [`publish`](Self::publish) for every frame; the capture path only ever reads the newest one.
#[derive(Debug, Default)]
pub struct SharedFrameSource {
    slot: Mutex<Slot>,
}

impl SharedFrameSource {
    /// Source with no camera attached.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stream metadata arrived; frames are not yet available.
    pub fn announce(&self, size: Canvas) {
        let mut slot = self.slot();
        slot.size = Some(size);
        slot.frame = None;
    }

    /// Replace the current frame.
    pub fn publish(&self, frame: Pixmap) {
        let mut slot = self.slot();
        slot.size = Some(Canvas {
            width: frame.width(),
            height: frame.height(),
        });
        slot.frame = Some(Arc::new(frame));
    }

    /// Camera went away; the source reports `NoSource` until the next announce/publish.
    pub fn disconnect(&self) {
        *self.slot() = Slot::default();
    }
}

impl VideoSource for SharedFrameSource {
    fn ready_state(&self) -> ReadyState {
        let slot = self.slot();
        match (&slot.size, &slot.frame) {
            (_, Some(_)) => ReadyState::HaveEnoughData,
            (Some(_), None) => ReadyState::HaveMetadata,
            (None, None) => ReadyState::NoSource,
        }
    }

    fn native_size(&self) -> Option<Canvas> {
        self.slot().size
    }

    fn sample(&self) -> BoothResult<VideoFrame> {
        let slot = self.slot();
        match &slot.frame {
            Some(frame) => Ok(VideoFrame {
                pixmap: Arc::clone(frame),
            }),
            None => Err(BoothError::capture_not_ready("no frame published yet")),
        }
    }
}

/// Opens camera devices on behalf of the core. Implemented by the hosting shell.
pub trait CameraProvider: Send + Sync {
    /// Open `device_id`, or the default camera when `None`.
    fn open(&self, device_id: Option<&str>) -> Result<Arc<dyn VideoSource>, CameraFault>;
}

/// Retry budget for camera acquisition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(2000),
        }
    }
}

/// Open a camera, retrying failed attempts per `policy`.
///
/// The fault of the last attempt is returned once the budget is spent; its
/// [`CameraFault::user_message`] is what the kiosk displays.
#[tracing::instrument(skip(provider))]
pub async fn acquire_camera(
    provider: &dyn CameraProvider,
    device_id: Option<&str>,
    policy: RetryPolicy,
) -> Result<Arc<dyn VideoSource>, CameraFault> {
    let mut attempt = 0u32;
    loop {
        match provider.open(device_id) {
            Ok(source) => {
                tracing::info!(attempt = attempt + 1, "camera acquired");
                return Ok(source);
            }
            Err(fault) if attempt < policy.max_retries => {
                attempt += 1;
                tracing::warn!(
                    %fault,
                    attempt,
                    max_retries = policy.max_retries,
                    "camera unavailable, retrying"
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(fault) => {
                tracing::warn!(%fault, "camera acquisition failed");
                return Err(fault);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/source.rs"]
mod tests;
