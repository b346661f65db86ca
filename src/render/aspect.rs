use crate::{
    composition::model::AspectRatioSpec,
    foundation::core::{FocalPoint, Frame, PixelRect},
    foundation::error::{AdforgeError, AdforgeResult},
    render::resample::{crop_frame, resize_frame},
};

/// Largest uniform upscale the transform will apply before declaring the
/// base image too small to yield an acceptable creative.
pub const MAX_UPSCALE: f64 = 2.0;

/// Cover-scale and crop `base` to exactly the spec's target dimensions,
/// keeping `focal` inside the output frame.
///
/// The base is scaled uniformly so the target area is fully covered, then the
/// excess along one axis is cropped symmetrically around the focal point.
/// When the focal point sits closer to an edge than half the crop window, the
/// window shifts inward just enough to stay in bounds — the anchor is
/// preserved as fully as geometry allows rather than exact centering.
#[tracing::instrument(skip(base), fields(ratio = %spec.name))]
pub fn transform(base: &Frame, spec: &AspectRatioSpec, focal: FocalPoint) -> AdforgeResult<Frame> {
    spec.validate()?;

    let bw = f64::from(base.width());
    let bh = f64::from(base.height());
    let tw = f64::from(spec.width);
    let th = f64::from(spec.height);

    let scale = (tw / bw).max(th / bh);
    if scale > MAX_UPSCALE {
        return Err(AdforgeError::insufficient_resolution(format!(
            "{}x{} base would need {:.2}x upscale for {} ({}x{}); max is {MAX_UPSCALE}x",
            base.width(),
            base.height(),
            scale,
            spec.name,
            spec.width,
            spec.height
        )));
    }

    // Rounded cover dimensions, nudged up so the crop window always fits.
    let scaled_w = ((bw * scale).round() as u32).max(spec.width);
    let scaled_h = ((bh * scale).round() as u32).max(spec.height);
    let scaled = resize_frame(base, scaled_w, scaled_h)?;

    let fx = (f64::from(focal.x) * scale).round() as i64;
    let fy = (f64::from(focal.y) * scale).round() as i64;
    let crop_x = (fx - i64::from(spec.width) / 2).clamp(0, i64::from(scaled_w - spec.width)) as u32;
    let crop_y =
        (fy - i64::from(spec.height) / 2).clamp(0, i64::from(scaled_h - spec.height)) as u32;

    crop_frame(
        &scaled,
        PixelRect::new(crop_x, crop_y, spec.width, spec.height),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/aspect.rs"]
mod tests;
