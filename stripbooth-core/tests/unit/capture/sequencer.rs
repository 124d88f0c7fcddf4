use resvg::tiny_skia::Pixmap;

use super::*;
use crate::capture::source::StillFrameSource;

fn still() -> Arc<dyn VideoSource> {
    let mut p = Pixmap::new(64, 48).unwrap();
    p.fill(resvg::tiny_skia::Color::WHITE);
    Arc::new(StillFrameSource::new(p))
}

#[test]
fn default_offsets_follow_flash_duration() {
    let t = CaptureTiming::default();
    assert_eq!(t.capture_offset(), Duration::from_millis(100));
    assert_eq!(t.flash, Duration::from_millis(200));
    assert_eq!(t.advance_offset(), Duration::from_millis(500));
    assert_eq!(t.countdown, 3);
}

#[tokio::test(start_paused = true)]
async fn cancelled_before_start_returns_no_photos() {
    let seq = CaptureSequencer::new(still(), VisualAdjustments::default());
    seq.cancellation_token().cancel();
    let start = Instant::now();
    let outcome = seq.run().await;
    assert!(outcome.into_photos().is_none());
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn closed_event_receiver_does_not_stop_the_sequence() {
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);
    let outcome = CaptureSequencer::new(still(), VisualAdjustments::default())
        .with_events(tx)
        .run()
        .await;
    let photos = outcome.into_photos().unwrap();
    assert_eq!(photos.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_cancels() {
    let seq = CaptureSequencer::new(still(), VisualAdjustments::default());
    let token = seq.cancellation_token();
    let handle = seq.spawn();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!token.is_cancelled());
    drop(handle);
    assert!(token.is_cancelled());
}
