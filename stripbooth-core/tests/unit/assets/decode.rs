use std::io::Cursor;

use super::*;

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let pixmap = decode_image(&buf).unwrap();
    assert_eq!(pixmap.width(), 1);
    assert_eq!(pixmap.height(), 1);
    assert_eq!(
        pixmap.data(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(decode_image(b"definitely not an image").is_err());
    assert!(decode_image(&[]).is_err());
}

#[test]
fn decode_svg_parse_ok_and_err() {
    let db = Arc::new(usvg::fontdb::Database::new());
    let ok = br#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2"></svg>"#;
    let tree = parse_svg(ok, db.clone()).unwrap();
    assert_eq!(tree.size().width(), 4.0);

    let bad = br#"<svg"#;
    assert!(parse_svg(bad, db).is_err());
}

#[test]
fn svg_sniffing() {
    assert!(looks_like_svg(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>"));
    assert!(looks_like_svg(
        b"<?xml version=\"1.0\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\"/>"
    ));
    assert!(!looks_like_svg(&[0x89, b'P', b'N', b'G']));
    assert!(!looks_like_svg(&[0xFF, 0xD8, 0xFF]));
}

#[test]
fn generic_families_resolve_to_installed_fonts() {
    let db = system_fontdb();
    if db.is_empty() {
        eprintln!("no system fonts installed, nothing to bind");
        return;
    }
    for family in [usvg::fontdb::Family::SansSerif, usvg::fontdb::Family::Serif] {
        let query = usvg::fontdb::Query {
            families: &[family],
            ..Default::default()
        };
        assert!(db.query(&query).is_some(), "{family:?} does not resolve");
    }
}

#[test]
fn text_in_a_missing_family_still_renders() {
    let db = system_fontdb();
    if db.is_empty() {
        eprintln!("no system fonts installed, text cannot render");
        return;
    }
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="40">
        <text x="4" y="30" font-size="28" font-family="No Such Family" fill="#000">Hi!</text>
        </svg>"##;
    let tree = parse_svg(svg, db).unwrap();
    let pixmap = crate::assets::svg_raster::rasterize_svg(&tree, 120, 40).unwrap();
    assert!(pixmap.data().chunks_exact(4).any(|px| px[3] > 0));
}
