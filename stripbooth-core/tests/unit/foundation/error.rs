use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BoothError::capture_not_ready("x")
            .to_string()
            .contains("capture not ready:")
    );
    assert!(
        BoothError::frame_encoding("x")
            .to_string()
            .contains("frame encoding error:")
    );
    assert!(
        BoothError::strip_assembly("x")
            .to_string()
            .contains("strip assembly error:")
    );
    assert!(
        BoothError::persistence("x")
            .to_string()
            .contains("persistence error:")
    );
    assert_eq!(
        BoothError::invalid_photo_count(3, 2).to_string(),
        "invalid photo count: expected 3, got 2"
    );
}

#[test]
fn only_capture_errors_are_recoverable() {
    assert!(BoothError::capture_not_ready("x").is_capture_recoverable());
    assert!(BoothError::frame_encoding("x").is_capture_recoverable());
    assert!(!BoothError::invalid_photo_count(3, 1).is_capture_recoverable());
    assert!(!BoothError::strip_assembly("x").is_capture_recoverable());
    assert!(!BoothError::persistence("x").is_capture_recoverable());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BoothError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn camera_fault_messages_name_the_cause() {
    assert!(
        CameraFault::PermissionDenied
            .user_message()
            .contains("permission denied")
    );
    assert!(CameraFault::NotFound.user_message().contains("No camera found"));
    assert!(CameraFault::InUse.user_message().contains("in use"));
    assert_eq!(
        CameraFault::Other("usb reset".to_owned()).user_message(),
        "Camera error: usb reset"
    );
}
