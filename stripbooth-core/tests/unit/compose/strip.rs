use super::*;
use crate::foundation::core::{PHOTO_HEIGHT, PHOTO_WIDTH};

fn jpeg_photo(rgb: [u8; 3], index: usize) -> CapturedPhoto {
    let img = image::RgbImage::from_pixel(PHOTO_WIDTH, PHOTO_HEIGHT, image::Rgb(rgb));
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, 90)
        .encode_image(&img)
        .unwrap();
    CapturedPhoto::new(EncodedImage::new(bytes, PHOTO_WIDTH, PHOTO_HEIGHT), index).unwrap()
}

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn compositor(branding: Branding) -> StripCompositor {
    StripCompositor::with_fontdb(branding, Arc::new(usvg::fontdb::Database::new()))
}

fn rgb_photos() -> Vec<CapturedPhoto> {
    vec![
        jpeg_photo([255, 0, 0], 0),
        jpeg_photo([0, 255, 0], 1),
        jpeg_photo([0, 0, 255], 2),
    ]
}

fn green_bg() -> ColorDef {
    ColorDef::parse("#388046").unwrap()
}

fn near(px: &image::Rgb<u8>, want: [u8; 3]) -> bool {
    px.0.iter()
        .zip(want)
        .all(|(&a, b)| (i16::from(a) - i16::from(b)).abs() <= 24)
}

#[test]
fn strip_places_photos_by_index_over_background() {
    let strip = compositor(Branding::default())
        .compose(rgb_photos(), green_bg())
        .unwrap();
    assert_eq!((strip.image.width, strip.image.height), (STRIP_WIDTH, STRIP_HEIGHT));

    let rgb = image::load_from_memory(&strip.image.bytes).unwrap().to_rgb8();
    assert_eq!(rgb.dimensions(), (400, 1200));
    assert!(near(rgb.get_pixel(200, 200), [255, 0, 0]));
    assert!(near(rgb.get_pixel(200, 560), [0, 255, 0]));
    assert!(near(rgb.get_pixel(200, 900), [0, 0, 255]));
    // Margins and the gap between photos show the background.
    assert!(near(rgb.get_pixel(10, 20), [0x38, 0x80, 0x46]));
    assert!(near(rgb.get_pixel(200, 381), [0x38, 0x80, 0x46]));
}

#[test]
fn photos_out_of_order_are_drawn_by_index() {
    let mut photos = rgb_photos();
    photos.reverse();
    let strip = compositor(Branding::default())
        .compose(photos, green_bg())
        .unwrap();
    let idx: Vec<usize> = strip.photos.iter().map(|p| p.index).collect();
    assert_eq!(idx, vec![0, 1, 2]);
    let rgb = image::load_from_memory(&strip.image.bytes).unwrap().to_rgb8();
    assert!(near(rgb.get_pixel(200, 200), [255, 0, 0]));
}

#[test]
fn wrong_photo_count_is_rejected() {
    let mut photos = rgb_photos();
    photos.pop();
    let err = compositor(Branding::default())
        .compose(photos, green_bg())
        .unwrap_err();
    assert!(
        matches!(err, BoothError::InvalidPhotoCount { expected: 3, actual: 2 }),
        "{err}"
    );

    let err = compositor(Branding::default())
        .compose(Vec::new(), green_bg())
        .unwrap_err();
    assert!(matches!(err, BoothError::InvalidPhotoCount { actual: 0, .. }));
}

#[test]
fn undecodable_photo_aborts_the_strip() {
    let mut photos = rgb_photos();
    photos[1].image = EncodedImage::new(b"not a jpeg".to_vec(), PHOTO_WIDTH, PHOTO_HEIGHT);
    let err = compositor(Branding::default())
        .compose(photos, green_bg())
        .unwrap_err();
    assert!(matches!(err, BoothError::StripAssembly(_)), "{err}");
    assert!(err.to_string().contains("photo 1"));
}

#[test]
fn duplicate_indices_are_rejected() {
    let photos = vec![
        jpeg_photo([0, 0, 0], 0),
        jpeg_photo([0, 0, 0], 0),
        jpeg_photo([0, 0, 0], 2),
    ];
    let err = compositor(Branding::default())
        .compose(photos, green_bg())
        .unwrap_err();
    assert!(matches!(err, BoothError::StripAssembly(_)));
}

#[test]
fn raster_branding_is_drawn_in_the_band() {
    let branding = Branding::default().with_graphic(png_bytes(400, 100, [255, 255, 0, 255]));
    let strip = compositor(branding).compose(rgb_photos(), green_bg()).unwrap();
    let rgb = image::load_from_memory(&strip.image.bytes).unwrap().to_rgb8();
    assert!(near(rgb.get_pixel(200, 1150), [255, 255, 0]));
    // Left of the 90%-wide graphic is background.
    assert!(near(rgb.get_pixel(5, 1150), [0x38, 0x80, 0x46]));
    // Above the band is untouched.
    assert!(near(rgb.get_pixel(200, 1090), [0x38, 0x80, 0x46]));
}

#[test]
fn svg_branding_is_drawn_in_the_band() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="10">
        <rect width="40" height="10" fill="#ffffff"/></svg>"##;
    let branding = Branding::default().with_graphic(svg.to_vec());
    let strip = compositor(branding).compose(rgb_photos(), green_bg()).unwrap();
    let rgb = image::load_from_memory(&strip.image.bytes).unwrap().to_rgb8();
    assert!(near(rgb.get_pixel(200, 1150), [255, 255, 255]));
}

#[test]
fn broken_branding_falls_back_without_error() {
    let branding = Branding::default().with_graphic(b"garbage".to_vec());
    let strip = compositor(branding).compose(rgb_photos(), green_bg()).unwrap();
    assert_eq!(strip.image.width, STRIP_WIDTH);
}

fn band_ink(strip: &PhotoStrip) -> usize {
    let rgb = image::load_from_memory(&strip.image.bytes).unwrap().to_rgb8();
    (1100..STRIP_HEIGHT)
        .flat_map(|y| (0..STRIP_WIDTH).map(move |x| (x, y)))
        .filter(|&(x, y)| !near(rgb.get_pixel(x, y), [0x38, 0x80, 0x46]))
        .count()
}

#[test]
fn text_fallback_draws_with_system_fonts() {
    let fontdb = system_fontdb();
    if fontdb.is_empty() {
        eprintln!("no system fonts installed, fallback text cannot render");
        return;
    }
    let strip = StripCompositor::with_fontdb(Branding::default(), fontdb)
        .compose(rgb_photos(), green_bg())
        .unwrap();
    assert!(band_ink(&strip) > 50, "text fallback left the band empty");
}

#[test]
fn branding_with_no_visible_area_is_an_error() {
    let mut canvas = Pixmap::new(STRIP_WIDTH, STRIP_HEIGHT).unwrap();
    let zero_scale = Branding {
        scale: 0.0,
        ..Branding::default()
    };
    let png = png_bytes(400, 100, [255, 255, 0, 255]);
    assert!(compositor(zero_scale).draw_graphic(&mut canvas, &png).is_err());

    // 400x1 at 90% width is under a pixel tall.
    let sliver = png_bytes(400, 1, [255, 255, 0, 255]);
    assert!(
        compositor(Branding::default())
            .draw_graphic(&mut canvas, &sliver)
            .is_err()
    );
    assert!(canvas.data().iter().all(|&b| b == 0));
}

#[test]
fn zero_scale_branding_falls_back_to_text() {
    let fontdb = system_fontdb();
    if fontdb.is_empty() {
        eprintln!("no system fonts installed, fallback text cannot render");
        return;
    }
    let branding = Branding {
        scale: 0.0,
        ..Branding::default()
    }
    .with_graphic(png_bytes(400, 100, [255, 255, 0, 255]));
    let strip = StripCompositor::with_fontdb(branding, fontdb)
        .compose(rgb_photos(), green_bg())
        .unwrap();
    let rgb = image::load_from_memory(&strip.image.bytes).unwrap().to_rgb8();
    assert!(!near(rgb.get_pixel(200, 1150), [255, 255, 0]));
    assert!(band_ink(&strip) > 50);
}

#[test]
fn fallback_text_is_escaped() {
    assert_eq!(escape_xml("A & B <C>"), "A &amp; B &lt;C&gt;");
    let branding = Branding {
        title: "Tom & Jerry's <party>".to_owned(),
        ..Branding::default()
    };
    assert!(compositor(branding).compose(rgb_photos(), green_bg()).is_ok());
}

#[test]
fn branding_from_settings_tolerates_missing_file() {
    let settings = AppSettings {
        branding_image_path: "/definitely/not/here.png".to_owned(),
        branding_title: "HELLO".to_owned(),
        ..AppSettings::default()
    };
    let b = Branding::from_settings(&settings);
    assert!(b.graphic.is_none());
    assert_eq!(b.title, "HELLO");
    assert_eq!(b.scale, 0.9);
}

#[tokio::test]
async fn async_generation_checks_count_first() {
    let c = compositor(Branding::default());
    let err = c
        .generate_strip(vec![jpeg_photo([0, 0, 0], 0)], green_bg())
        .await
        .unwrap_err();
    assert!(matches!(err, BoothError::InvalidPhotoCount { actual: 1, .. }));

    let strip = c.generate_strip(rgb_photos(), green_bg()).await.unwrap();
    assert_eq!(strip.photos.len(), 3);
}
