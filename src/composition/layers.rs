use crate::{
    foundation::core::{Frame, PixelRect},
    foundation::error::{AdforgeError, AdforgeResult},
    render::composite::blit_over,
};

/// Role of a layer above the background, in required stacking order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LayerRole {
    /// The single product cut-out (shadow baked into its alpha).
    Product,
    /// Rasterized message text together with its backing bar.
    Text,
    /// Optional CTA button.
    Cta,
    /// Badge logo; always last so nothing occludes it.
    Logo,
}

#[derive(Debug)]
struct Layer {
    role: LayerRole,
    frame: Frame,
    x: i64,
    y: i64,
}

/// Ordered bottom-to-top stack of visual layers over one background.
///
/// Invariants enforced by [`LayerStack::push`]: the background sits at index
/// 0, at most one product layer exists, and roles may only be appended in
/// non-decreasing stacking order — stages append, never reorder or remove.
#[derive(Debug)]
pub struct LayerStack {
    background: Frame,
    layers: Vec<Layer>,
}

impl LayerStack {
    /// Start a stack over the given background.
    pub fn new(background: Frame) -> Self {
        Self {
            background,
            layers: Vec::new(),
        }
    }

    /// Append a layer at (x, y), top-left relative to the background.
    pub fn push(&mut self, role: LayerRole, frame: Frame, x: i64, y: i64) -> AdforgeResult<()> {
        if let Some(last) = self.layers.last()
            && role < last.role
        {
            return Err(AdforgeError::validation(format!(
                "layer {:?} may not be stacked above {:?}",
                role, last.role
            )));
        }
        if role == LayerRole::Product && self.layers.iter().any(|l| l.role == LayerRole::Product) {
            return Err(AdforgeError::validation(
                "layer stack already contains a product layer",
            ));
        }
        self.layers.push(Layer { role, frame, x, y });
        Ok(())
    }

    /// Placement rect of the product layer, clipped to the background, if one
    /// was pushed.
    pub fn product_rect(&self) -> Option<PixelRect> {
        let layer = self.layers.iter().find(|l| l.role == LayerRole::Product)?;
        let x = layer.x.clamp(0, i64::from(self.background.width())) as u32;
        let y = layer.y.clamp(0, i64::from(self.background.height())) as u32;
        let right = (layer.x + i64::from(layer.frame.width()))
            .clamp(0, i64::from(self.background.width())) as u32;
        let bottom = (layer.y + i64::from(layer.frame.height()))
            .clamp(0, i64::from(self.background.height())) as u32;
        Some(PixelRect::new(x, y, right - x, bottom - y))
    }

    /// Alpha-composite all layers bottom-to-top into a single frame.
    pub fn flatten(self) -> Frame {
        let mut out = self.background;
        for layer in self.layers {
            blit_over(&mut out, &layer.frame, layer.x, layer.y);
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/layers.rs"]
mod tests;
