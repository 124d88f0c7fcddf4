use super::*;

fn strip_jpeg() -> EncodedImage {
    let img = image::RgbImage::from_fn(STRIP_WIDTH, STRIP_HEIGHT, |_, y| {
        if y < 600 {
            image::Rgb([255, 0, 0])
        } else {
            image::Rgb([0, 0, 255])
        }
    });
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, 95)
        .encode_image(&img)
        .unwrap();
    EncodedImage::new(bytes, STRIP_WIDTH, STRIP_HEIGHT)
}

#[test]
fn single_layout_is_pass_through() {
    let strip = strip_jpeg();
    let out = build_print_artifact(&strip, PrintLayout::Single).unwrap();
    assert_eq!(out, strip);
    assert_eq!(PrintLayout::default(), PrintLayout::Single);
}

#[test]
fn two_up_duplicates_side_by_side() {
    let out = build_print_artifact(&strip_jpeg(), PrintLayout::TwoUp).unwrap();
    assert_eq!((out.width, out.height), (800, 1200));
    let rgb = image::load_from_memory(&out.bytes).unwrap().to_rgb8();
    for x in [100, 500] {
        let top = rgb.get_pixel(x, 100);
        let bottom = rgb.get_pixel(x, 1100);
        assert!(top[0] > 200 && top[2] < 50, "{top:?}");
        assert!(bottom[2] > 200 && bottom[0] < 50, "{bottom:?}");
    }
}

#[test]
fn two_up_rejects_undecodable_strip() {
    let bad = EncodedImage::new(b"nope".to_vec(), STRIP_WIDTH, STRIP_HEIGHT);
    let err = build_print_artifact(&bad, PrintLayout::TwoUp).unwrap_err();
    assert!(matches!(err, BoothError::StripAssembly(_)));
    // Pass-through never inspects the bytes.
    assert!(build_print_artifact(&bad, PrintLayout::Single).is_ok());
}

#[test]
fn layout_serializes_kebab_case() {
    assert_eq!(serde_json::to_string(&PrintLayout::TwoUp).unwrap(), "\"two-up\"");
    assert_eq!(
        serde_json::from_str::<PrintLayout>("\"single\"").unwrap(),
        PrintLayout::Single
    );
}
