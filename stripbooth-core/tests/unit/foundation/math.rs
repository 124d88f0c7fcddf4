use super::*;

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(0, 255), 0);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(100, 128), ((100u32 * 128 + 127) / 255) as u8);
}

#[test]
fn premultiply_zeroes_transparent_pixels() {
    let mut px = vec![200, 100, 50, 0, 200, 100, 50, 255];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &[0, 0, 0, 0]);
    assert_eq!(&px[4..8], &[200, 100, 50, 255]);
}

#[test]
fn unpremul_then_premul_is_stable_for_opaque() {
    for c in [0u8, 1, 77, 128, 254, 255] {
        let v = unpremul_unit(c, 255);
        assert_eq!(premul_from_unit(v, 255), c);
    }
    assert_eq!(unpremul_unit(10, 0), 0.0);
}
