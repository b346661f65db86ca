use crate::{
    assets::store::PreparedBrand,
    composition::layers::{LayerRole, LayerStack},
    composition::model::{AspectRatioSpec, Corner},
    foundation::core::Frame,
    foundation::error::{AdforgeError, AdforgeResult},
    render::resample::resize_frame,
};

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

/// Vertical fraction of the creative where the CTA button is anchored,
/// sitting just below a center-placed product.
const CTA_ANCHOR_FRAC: f64 = 0.70;
/// Spacing between product bottom estimate and the CTA button.
const CTA_SPACING_FRAC: f64 = 0.03;
/// Bottom clearance the CTA button must keep.
const CTA_BOTTOM_MARGIN_FRAC: f64 = 0.05;
/// Multiplier applied to the font size on each shrink step while fitting.
const SHRINK_STEP: f32 = 0.9;

/// Draws campaign message text and the badge logo onto finished creatives.
///
/// Holds the Parley font/layout contexts, so one renderer instance is reused
/// across renders (and one per worker in parallel runs).
pub struct BrandOverlayRenderer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl Default for BrandOverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

struct FittedText {
    layout: parley::Layout<TextBrushRgba8>,
    font_size: f32,
    width: f64,
    height: f64,
}

impl BrandOverlayRenderer {
    /// Construct a renderer with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Draw the message text (over its backing bar), the optional CTA button,
    /// and the badge logo onto `creative`.
    ///
    /// Layers are applied in fixed order — text bar, text, CTA, logo — so the
    /// logo is never occluded. Output dimensions equal the input's.
    #[tracing::instrument(skip_all, fields(ratio = %spec.name))]
    pub fn overlay(
        &mut self,
        creative: Frame,
        message: &str,
        brand: &PreparedBrand,
        spec: &AspectRatioSpec,
    ) -> AdforgeResult<Frame> {
        if creative.width() != spec.width || creative.height() != spec.height {
            return Err(AdforgeError::validation(format!(
                "creative {}x{} does not match spec {} ({}x{})",
                creative.width(),
                creative.height(),
                spec.name,
                spec.width,
                spec.height
            )));
        }
        if message.trim().is_empty() {
            return Err(AdforgeError::validation("campaign message must be non-empty"));
        }

        let w = creative.width();
        let h = creative.height();
        let min_dim = w.min(h);
        let layout_rules = &brand.layout;

        let margin_x = (f64::from(w) * layout_rules.safe_margin_frac).round();
        let margin_y = (f64::from(h) * layout_rules.safe_margin_frac).round();
        let wrap_width = (f64::from(w) * layout_rules.max_text_width_frac)
            .min(f64::from(w) - 2.0 * margin_x)
            .max(1.0);

        // Uppercase headline treatment, as outdoor brands favor.
        let text = message.to_uppercase();
        let brush = TextBrushRgba8 {
            r: brand.text_rgb[0],
            g: brand.text_rgb[1],
            b: brand.text_rgb[2],
            a: 255,
        };
        let start_size = (layout_rules.font_scale * f64::from(min_dim)) as f32;
        let fitted = self.fit_message(
            &text,
            &brand.font_bytes,
            start_size,
            layout_rules.min_font_px,
            layout_rules.max_lines,
            wrap_width as f32,
            brush,
        )?;

        let pad_x = f64::from(fitted.font_size) * 0.4;
        let pad_y = f64::from(fitted.font_size) * 0.3;
        let bar_w = fitted.width + 2.0 * pad_x;
        let bar_h = fitted.height + 2.0 * pad_y;
        let bar_x = match layout_rules.text_position {
            Corner::TopLeft | Corner::BottomLeft => margin_x,
            Corner::TopRight | Corner::BottomRight => (f64::from(w) - bar_w - margin_x).max(0.0),
        };
        let bar_y = match layout_rules.text_position {
            Corner::TopLeft | Corner::TopRight => margin_y,
            Corner::BottomLeft | Corner::BottomRight => (f64::from(h) - bar_h - margin_y).max(0.0),
        };

        let text_layer = rasterize_text_layer(RasterizeText {
            width: w,
            height: h,
            bar_x,
            bar_y,
            bar_w,
            bar_h,
            corner_radius: f64::from(fitted.font_size) * 0.25,
            pad_x,
            pad_y,
            bar_rgb: brand.bar_rgb,
            bar_opacity: layout_rules.text_bar_opacity,
            layout: &fitted.layout,
            font_bytes: &brand.font_bytes,
        })?;

        let mut stack = LayerStack::new(creative);
        stack.push(LayerRole::Text, text_layer, 0, 0)?;

        if let Some(cta) = &brand.cta {
            let cta_w =
                ((layout_rules.cta_frac_for(&spec.name) * f64::from(min_dim)).round() as u32).max(1);
            let cta_h = ((f64::from(cta.height()) * f64::from(cta_w) / f64::from(cta.width()))
                .round() as u32)
                .max(1);
            let scaled = resize_frame(cta, cta_w, cta_h)?;
            let x = (i64::from(w) - i64::from(cta_w)) / 2;
            let mut y = ((CTA_ANCHOR_FRAC + CTA_SPACING_FRAC) * f64::from(h)).round() as i64;
            let max_y = i64::from(h)
                - (f64::from(h) * CTA_BOTTOM_MARGIN_FRAC).round() as i64
                - i64::from(cta_h);
            y = y.min(max_y).max(0);
            stack.push(LayerRole::Cta, scaled, x, y)?;
        }

        let logo_w =
            ((layout_rules.logo_frac_for(&spec.name) * f64::from(min_dim)).round() as u32).max(1);
        let logo_h = ((f64::from(brand.logo.height()) * f64::from(logo_w)
            / f64::from(brand.logo.width()))
        .round() as u32)
            .max(1);
        let logo = resize_frame(&brand.logo, logo_w, logo_h)?;
        let logo_x = match brand.logo_position {
            Corner::TopLeft | Corner::BottomLeft => margin_x as i64,
            Corner::TopRight | Corner::BottomRight => {
                i64::from(w) - i64::from(logo_w) - margin_x as i64
            }
        };
        let logo_y = match brand.logo_position {
            Corner::TopLeft | Corner::TopRight => margin_y as i64,
            Corner::BottomLeft | Corner::BottomRight => {
                i64::from(h) - i64::from(logo_h) - margin_y as i64
            }
        };
        stack.push(LayerRole::Logo, logo, logo_x, logo_y)?;

        Ok(stack.flatten())
    }

    /// Shape and lay out plain text using the provided font bytes.
    fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
        max_width_px: f32,
    ) -> AdforgeResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(AdforgeError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            AdforgeError::validation("no font families registered from font bytes")
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| AdforgeError::validation("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(Some(max_width_px));
        layout.align(
            Some(max_width_px),
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }

    /// Lay the message out at `start_size`, shrinking stepwise until it fits
    /// the wrap width and line budget, or the floor is hit.
    #[allow(clippy::too_many_arguments)]
    fn fit_message(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        start_size: f32,
        min_size: f32,
        max_lines: usize,
        wrap_width: f32,
        brush: TextBrushRgba8,
    ) -> AdforgeResult<FittedText> {
        let mut size = start_size.max(min_size);
        loop {
            let layout = self.layout_plain(text, font_bytes, size, brush, wrap_width)?;
            let (width, height, lines) = measure_layout(&layout);
            if lines <= max_lines && width <= f64::from(wrap_width) * 1.001 {
                return Ok(FittedText {
                    layout,
                    font_size: size,
                    width,
                    height,
                });
            }

            let next = size * SHRINK_STEP;
            if next < min_size {
                return Err(AdforgeError::text_overflow(format!(
                    "message needs {lines} lines ({width:.0}px wide) at the {min_size}px floor; budget is {max_lines} lines within {wrap_width:.0}px"
                )));
            }
            size = next;
        }
    }
}

fn measure_layout(layout: &parley::Layout<TextBrushRgba8>) -> (f64, f64, usize) {
    let mut width = 0.0f64;
    let mut height = 0.0f64;
    let mut lines = 0usize;
    for line in layout.lines() {
        let m = line.metrics();
        width = width.max(f64::from(m.advance));
        height += f64::from(m.ascent + m.descent + m.leading);
        lines += 1;
    }
    (width, height, lines)
}

struct RasterizeText<'a> {
    width: u32,
    height: u32,
    bar_x: f64,
    bar_y: f64,
    bar_w: f64,
    bar_h: f64,
    corner_radius: f64,
    pad_x: f64,
    pad_y: f64,
    bar_rgb: [u8; 3],
    bar_opacity: f32,
    layout: &'a parley::Layout<TextBrushRgba8>,
    font_bytes: &'a [u8],
}

/// Rasterize the backing bar and glyph runs into a transparent full-size
/// layer, ready to composite over the creative.
fn rasterize_text_layer(params: RasterizeText<'_>) -> AdforgeResult<Frame> {
    use vello_cpu::kurbo::{Rect, RoundedRect, Shape};

    let width_u16: u16 = params
        .width
        .try_into()
        .map_err(|_| AdforgeError::validation("creative width exceeds u16"))?;
    let height_u16: u16 = params
        .height
        .try_into()
        .map_err(|_| AdforgeError::validation("creative height exceeds u16"))?;

    let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

    let bar_alpha = ((params.bar_opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        params.bar_rgb[0],
        params.bar_rgb[1],
        params.bar_rgb[2],
        bar_alpha as u8,
    ));
    let bar = RoundedRect::from_rect(
        Rect::new(
            params.bar_x,
            params.bar_y,
            params.bar_x + params.bar_w,
            params.bar_y + params.bar_h,
        ),
        params.corner_radius,
    );
    ctx.fill_path(&bar.to_path(0.1));

    let font = vello_cpu::peniko::FontData::new(
        vello_cpu::peniko::Blob::from(params.font_bytes.to_vec()),
        0,
    );
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((
        params.bar_x + params.pad_x,
        params.bar_y + params.pad_y,
    )));
    for line in params.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };

            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));

            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }

    let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    Frame::from_premul_parts(params.width, params.height, pixmap.data_as_u8_slice().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
