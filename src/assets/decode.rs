use anyhow::Context;

use crate::foundation::core::Frame;
use crate::foundation::error::AdforgeResult;

/// A raster asset decoded into premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    /// Decoded pixels.
    pub frame: Frame,
    /// Whether the source format carried an alpha channel at all. Sources
    /// without one decode to fully opaque frames and cannot honor baked-in
    /// product shadows.
    pub source_has_alpha: bool,
}

/// Decode PNG/JPEG bytes into a premultiplied frame.
pub fn decode_image(bytes: &[u8]) -> AdforgeResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let source_has_alpha = dyn_img.color().has_alpha();
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        frame: Frame::from_premul_parts(width, height, rgba8_premul)?,
        source_has_alpha,
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
