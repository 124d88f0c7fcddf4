pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Premultiply a straight-alpha channel value.
pub(crate) fn premul_u8(c: u8, a: u8) -> u8 {
    mul_div255_u8(u16::from(c), u16::from(a))
}

/// Recover a straight-alpha channel value as `0..=1`.
///
/// Fully transparent pixels map to `0.0`.
pub(crate) fn unpremul_unit(c: u8, a: u8) -> f32 {
    if a == 0 {
        return 0.0;
    }
    (f32::from(c) / f32::from(a)).clamp(0.0, 1.0)
}

/// Quantize `0..=1` back into a premultiplied channel for alpha `a`.
pub(crate) fn premul_from_unit(v: f32, a: u8) -> u8 {
    (v.clamp(0.0, 1.0) * f32::from(a)).round() as u8
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = premul_u8(px[0], a);
        px[1] = premul_u8(px[1], a);
        px[2] = premul_u8(px[2], a);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
