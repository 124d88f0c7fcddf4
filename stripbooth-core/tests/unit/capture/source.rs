use std::sync::atomic::AtomicU32;

use super::*;

fn pixmap(w: u32, h: u32) -> Pixmap {
    let mut p = Pixmap::new(w, h).unwrap();
    p.fill(resvg::tiny_skia::Color::WHITE);
    p
}

#[test]
fn still_source_reports_state_and_refuses_sampling_when_not_ready() {
    let src = StillFrameSource::new(pixmap(64, 48));
    assert_eq!(src.ready_state(), ReadyState::HaveEnoughData);
    assert_eq!(src.native_size(), Some(Canvas { width: 64, height: 48 }));
    assert!(src.sample().is_ok());

    src.set_ready_state(ReadyState::HaveMetadata);
    let err = src.sample().unwrap_err();
    assert!(matches!(err, BoothError::CaptureNotReady(_)), "{err}");
    assert!(src.native_size().is_some());

    src.set_ready_state(ReadyState::NoSource);
    assert_eq!(src.native_size(), None);
}

#[test]
fn still_source_decodes_encoded_bytes() {
    let img = image::RgbImage::from_pixel(20, 10, image::Rgb([10, 20, 30]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    let src = StillFrameSource::from_encoded(&bytes).unwrap();
    assert_eq!(src.sample().unwrap().canvas(), Canvas { width: 20, height: 10 });

    assert!(StillFrameSource::from_encoded(b"nope").is_err());
}

#[test]
fn shared_source_walks_through_ready_states() {
    let src = SharedFrameSource::new();
    assert_eq!(src.ready_state(), ReadyState::NoSource);
    assert!(src.sample().is_err());

    src.announce(Canvas { width: 640, height: 480 });
    assert_eq!(src.ready_state(), ReadyState::HaveMetadata);
    assert_eq!(src.native_size(), Some(Canvas { width: 640, height: 480 }));
    assert!(src.sample().is_err());

    src.publish(pixmap(32, 32));
    assert_eq!(src.ready_state(), ReadyState::HaveEnoughData);
    assert_eq!(src.sample().unwrap().canvas(), Canvas { width: 32, height: 32 });

    src.disconnect();
    assert_eq!(src.ready_state(), ReadyState::NoSource);
    assert_eq!(src.native_size(), None);
}

struct FlakyProvider {
    failures_left: AtomicU32,
    calls: AtomicU32,
}

impl CameraProvider for FlakyProvider {
    fn open(&self, _device_id: Option<&str>) -> Result<Arc<dyn VideoSource>, CameraFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failures_left.load(Ordering::SeqCst) > 0 {
            self.failures_left.fetch_sub(1, Ordering::SeqCst);
            return Err(CameraFault::InUse);
        }
        Ok(Arc::new(StillFrameSource::new(pixmap(8, 8))))
    }
}

#[tokio::test(start_paused = true)]
async fn acquire_camera_retries_until_success() {
    let provider = FlakyProvider {
        failures_left: AtomicU32::new(2),
        calls: AtomicU32::new(0),
    };
    let start = tokio::time::Instant::now();
    let source = acquire_camera(&provider, None, RetryPolicy::default())
        .await
        .unwrap();
    assert!(source.ready_state().has_frame());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    assert_eq!(start.elapsed(), Duration::from_millis(4000));
}

#[tokio::test(start_paused = true)]
async fn acquire_camera_returns_last_fault_after_budget() {
    let provider = FlakyProvider {
        failures_left: AtomicU32::new(u32::MAX),
        calls: AtomicU32::new(0),
    };
    let fault = match acquire_camera(&provider, Some("cam-1"), RetryPolicy::default()).await {
        Ok(_) => panic!("expected failure"),
        Err(fault) => fault,
    };
    assert_eq!(fault, CameraFault::InUse);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
    assert!(fault.user_message().contains("in use"));
}
