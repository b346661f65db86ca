use crate::foundation::core::{Frame, PixelRect};
use crate::foundation::error::{AdforgeError, AdforgeResult};

/// Resampling filter pinned for every resize in the pipeline.
///
/// Pinning the filter (rather than relying on a library default) keeps
/// creatives byte-identical across library upgrades and platforms.
pub const RESIZE_FILTER: image::imageops::FilterType = image::imageops::FilterType::Lanczos3;

/// Resize a premultiplied frame to exactly `width` x `height` using
/// [`RESIZE_FILTER`].
///
/// Operating on premultiplied pixels keeps transparent regions from bleeding
/// halo colors into the interpolation.
pub fn resize_frame(frame: &Frame, width: u32, height: u32) -> AdforgeResult<Frame> {
    if width == 0 || height == 0 {
        return Err(AdforgeError::validation(
            "resize target width/height must be > 0",
        ));
    }
    if width == frame.width() && height == frame.height() {
        return Ok(frame.clone());
    }

    let src = image::RgbaImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or_else(|| AdforgeError::validation("frame byte length mismatch during resize"))?;
    let resized = image::imageops::resize(&src, width, height, RESIZE_FILTER);
    Frame::from_premul_parts(width, height, resized.into_raw())
}

/// Copy the `rect` window out of `frame` into a new frame.
pub fn crop_frame(frame: &Frame, rect: PixelRect) -> AdforgeResult<Frame> {
    if rect.width == 0 || rect.height == 0 {
        return Err(AdforgeError::validation("crop width/height must be > 0"));
    }
    if rect.right() > frame.width() || rect.bottom() > frame.height() {
        return Err(AdforgeError::validation(format!(
            "crop rect {}x{}+{}+{} exceeds frame {}x{}",
            rect.width,
            rect.height,
            rect.x,
            rect.y,
            frame.width(),
            frame.height()
        )));
    }

    let src_stride = frame.width() as usize * 4;
    let out_stride = rect.width as usize * 4;
    let mut data = Vec::with_capacity(out_stride * rect.height as usize);
    for row in rect.y..rect.bottom() {
        let start = row as usize * src_stride + rect.x as usize * 4;
        data.extend_from_slice(&frame.data()[start..start + out_stride]);
    }
    Frame::from_premul_parts(rect.width, rect.height, data)
}

#[cfg(test)]
#[path = "../../tests/unit/render/resample.rs"]
mod tests;
