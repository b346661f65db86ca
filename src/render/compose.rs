use crate::{
    composition::layers::{LayerRole, LayerStack},
    composition::model::{AnchorRule, PlacementRule},
    foundation::core::{FocalPoint, Frame, PixelRect},
    foundation::error::{AdforgeError, AdforgeResult},
    render::resample::resize_frame,
};

/// Fraction of background height kept clear under bottom-anchored products.
const BOTTOM_OFFSET_FRAC: f64 = 0.08;
/// Fraction of background width used as side inset for left/right anchors.
const SIDE_INSET_FRAC: f64 = 0.10;

/// A flattened background-plus-product image together with the placement
/// geometry downstream stages need.
#[derive(Clone, Debug)]
pub struct ComposedBase {
    /// Flattened image at the background's resolution.
    pub frame: Frame,
    /// Product placement center; the default focal point for cropping.
    pub anchor: FocalPoint,
    /// Bounding box the product was blitted into.
    pub product_rect: PixelRect,
}

/// Place a product image onto a background with standard `over` blending.
///
/// The product is pre-scaled to `rule.scale_frac` of the background width,
/// capped at `rule.max_height_frac` of the background height. Its shadow is
/// expected to be baked into its own alpha; no lighting or color matching is
/// computed here — visual consistency comes from reusing the identical
/// product asset across every background.
///
/// Pixels outside the returned `product_rect` are byte-identical to the
/// background, and the output has exactly the background's dimensions.
#[tracing::instrument(skip(background, product), fields(bg_w = background.width(), bg_h = background.height()))]
pub fn compose(
    background: &Frame,
    product: &Frame,
    rule: &PlacementRule,
) -> AdforgeResult<ComposedBase> {
    rule.validate()?;
    if !product.has_transparency() {
        return Err(AdforgeError::missing_alpha(
            "product image carries no transparency; shadow and cut-out must be baked into its alpha",
        ));
    }

    let bg_w = background.width();
    let bg_h = background.height();

    // Width-driven scale, then cap against the height budget.
    let mut target_w = (f64::from(bg_w) * rule.scale_frac).round().max(1.0);
    let mut scale = target_w / f64::from(product.width());
    let mut target_h = (f64::from(product.height()) * scale).round().max(1.0);

    let max_h = (f64::from(bg_h) * rule.max_height_frac).round().max(1.0);
    if target_h > max_h {
        scale = max_h / f64::from(product.height());
        target_h = max_h;
        target_w = (f64::from(product.width()) * scale).round().max(1.0);
    }

    let target_w = target_w as u32;
    let target_h = target_h as u32;
    if target_w > bg_w || target_h > bg_h {
        return Err(AdforgeError::size_mismatch(format!(
            "product {}x{} scaled to {}x{} exceeds background {}x{}",
            product.width(),
            product.height(),
            target_w,
            target_h,
            bg_w,
            bg_h
        )));
    }

    let scaled = resize_frame(product, target_w, target_h)?;

    let bottom_y = || -> i64 {
        i64::from(bg_h)
            - i64::from(target_h)
            - (f64::from(bg_h) * BOTTOM_OFFSET_FRAC).round() as i64
    };
    let side_inset = (f64::from(bg_w) * SIDE_INSET_FRAC).round() as i64;
    let (x, y) = match rule.anchor {
        AnchorRule::Center => (
            (i64::from(bg_w) - i64::from(target_w)) / 2,
            (i64::from(bg_h) - i64::from(target_h)) / 2,
        ),
        AnchorRule::CenterBottom => ((i64::from(bg_w) - i64::from(target_w)) / 2, bottom_y()),
        AnchorRule::Left => (side_inset, bottom_y()),
        AnchorRule::Right => (i64::from(bg_w) - i64::from(target_w) - side_inset, bottom_y()),
    };
    let x = x.clamp(0, i64::from(bg_w - target_w));
    let y = y.clamp(0, i64::from(bg_h - target_h));

    let mut stack = LayerStack::new(background.clone());
    stack.push(LayerRole::Product, scaled, x, y)?;
    let product_rect = stack
        .product_rect()
        .ok_or_else(|| AdforgeError::validation("product layer missing after push"))?;
    let anchor = product_rect.center();

    Ok(ComposedBase {
        frame: stack.flatten(),
        anchor,
        product_rect,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
