/// Convenience result type used across the booth core.
pub type BoothResult<T> = Result<T, BoothError>;

/// Top-level error taxonomy used by the capture, compositing and persistence APIs.
#[derive(thiserror::Error, Debug)]
pub enum BoothError {
    /// The live video source is not providing frames yet.
    #[error("capture not ready: {0}")]
    CaptureNotReady(String),

    /// Drawing or encoding a single captured frame failed.
    #[error("frame encoding error: {0}")]
    FrameEncoding(String),

    /// The compositor was handed the wrong number of photos.
    #[error("invalid photo count: expected {expected}, got {actual}")]
    InvalidPhotoCount {
        /// Required number of photos.
        expected: usize,
        /// Number of photos actually supplied.
        actual: usize,
    },

    /// A photo failed to decode (or the strip failed to encode) while compositing.
    #[error("strip assembly error: {0}")]
    StripAssembly(String),

    /// Writing the final artifact to its destination failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Invalid caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing settings records.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error with context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BoothError {
    /// Build [`BoothError::CaptureNotReady`].
    pub fn capture_not_ready(msg: impl Into<String>) -> Self {
        Self::CaptureNotReady(msg.into())
    }

    /// Build [`BoothError::FrameEncoding`].
    pub fn frame_encoding(msg: impl Into<String>) -> Self {
        Self::FrameEncoding(msg.into())
    }

    /// Build [`BoothError::InvalidPhotoCount`].
    pub fn invalid_photo_count(expected: usize, actual: usize) -> Self {
        Self::InvalidPhotoCount { expected, actual }
    }

    /// Build [`BoothError::StripAssembly`].
    pub fn strip_assembly(msg: impl Into<String>) -> Self {
        Self::StripAssembly(msg.into())
    }

    /// Build [`BoothError::Persistence`].
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Build [`BoothError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build [`BoothError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for errors the capture sequencer absorbs locally (the slot is retried).
    ///
    /// Everything else is fatal to the call that produced it and propagates to the session
    /// flow.
    pub fn is_capture_recoverable(&self) -> bool {
        matches!(self, Self::CaptureNotReady(_) | Self::FrameEncoding(_))
    }
}

/// Reasons a camera could not be acquired, as reported by the hosting camera provider.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraFault {
    /// Access to the camera was refused.
    #[error("camera permission denied")]
    PermissionDenied,
    /// No matching camera device exists.
    #[error("no camera found")]
    NotFound,
    /// The device exists but another process holds it.
    #[error("camera in use")]
    InUse,
    /// Any other provider failure.
    #[error("camera error: {0}")]
    Other(String),
}

impl CameraFault {
    /// Plain-language message for the kiosk screen.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied => {
                "Camera permission denied. Please allow camera access in settings.".to_owned()
            }
            Self::NotFound => "No camera found. Please connect a camera.".to_owned(),
            Self::InUse => {
                "Camera is in use by another application. Please close other apps using the camera."
                    .to_owned()
            }
            Self::Other(msg) => format!("Camera error: {msg}"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
