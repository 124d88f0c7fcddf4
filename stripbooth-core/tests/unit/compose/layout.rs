use super::*;

#[test]
fn photos_sit_at_fixed_slots() {
    let l = StripLayout::default();
    assert_eq!(l.photo_block_height(), 1011.0);
    assert_eq!(l.top_padding(), 44.5);
    assert_eq!(l.photo_origin(0), Point::new(27.0, 44.5));
    assert_eq!(l.photo_origin(1), Point::new(27.0, 391.5));
    assert_eq!(l.photo_origin(2), Point::new(27.0, 738.5));
    assert_eq!(l.photo_rect(2).y1, 1055.5);
}

#[test]
fn band_is_the_bottom_hundred_pixels() {
    let band = StripLayout::default().band_rect();
    assert_eq!((band.y0, band.y1, band.width()), (1100.0, 1200.0, 400.0));
}

#[test]
fn branding_is_scaled_and_centred_in_band() {
    let l = StripLayout::default();
    // 4:1 graphic at 90% width: 360x90, centred.
    let r = l.branding_rect(400.0, 100.0, 0.9);
    assert_eq!((r.x0, r.width()), (20.0, 360.0));
    assert!((r.height() - 90.0).abs() < 1e-9);
    assert!((r.y0 - 1105.0).abs() < 1e-9);
    assert!(r.y1 <= 1200.0);
}

#[test]
fn degenerate_graphic_has_no_height() {
    let r = StripLayout::default().branding_rect(0.0, 10.0, 0.9);
    assert_eq!(r.height(), 0.0);
}

#[test]
fn text_fallback_baselines() {
    assert_eq!(StripLayout::default().fallback_baselines(), (1140.0, 1170.0));
}
