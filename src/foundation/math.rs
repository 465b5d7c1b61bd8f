pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Blend straight-alpha `src` over `dst` with coverage `a` (0..=255).
pub(crate) fn blend_channel(dst: u8, src: u8, a: u8) -> u8 {
    let a = u16::from(a);
    let inv = 255 - a;
    (mul_div255_u16(u16::from(src), a) + mul_div255_u16(u16::from(dst), inv)).min(255) as u8
}

/// ITU-R 601-2 luma transform, rounded to nearest.
pub(crate) fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    let l = u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114;
    ((l + 500) / 1000) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
