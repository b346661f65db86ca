use crate::foundation::core::Frame;
use crate::foundation::error::{AdforgeError, AdforgeResult};

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Standard premultiplied source-over blend of `src` onto `dst`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Blend equal-sized premultiplied RGBA8 buffers with `over`.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> AdforgeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(AdforgeError::validation(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Alpha-composite `src` onto `dst` with its top-left corner at (x, y),
/// clipping to the destination bounds. Pixels outside the clipped source
/// rect are left untouched.
pub fn blit_over(dst: &mut Frame, src: &Frame, x: i64, y: i64) {
    let dst_w = i64::from(dst.width());
    let dst_h = i64::from(dst.height());
    let src_w = i64::from(src.width());
    let src_h = i64::from(src.height());

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + src_w).min(dst_w);
    let y1 = (y + src_h).min(dst_h);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let dst_stride = dst.width() as usize * 4;
    let src_stride = src.width() as usize * 4;
    let src_data = src.data();
    let dst_data = dst.data_mut();

    for dy in y0..y1 {
        let sy = (dy - y) as usize;
        let d_row = dy as usize * dst_stride;
        let s_row = sy * src_stride;
        for dx in x0..x1 {
            let sx = (dx - x) as usize;
            let d = d_row + dx as usize * 4;
            let s = s_row + sx * 4;
            let out = over(
                [
                    dst_data[d],
                    dst_data[d + 1],
                    dst_data[d + 2],
                    dst_data[d + 3],
                ],
                [
                    src_data[s],
                    src_data[s + 1],
                    src_data[s + 2],
                    src_data[s + 3],
                ],
                1.0,
            );
            dst_data[d..d + 4].copy_from_slice(&out);
        }
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
