use crate::foundation::error::{AdforgeError, AdforgeResult};

/// A validated campaign definition, as handed over by the (external) brief
/// parsing layer. The core assumes [`CampaignBrief::validate`] has passed.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CampaignBrief {
    /// Human-readable campaign name.
    pub campaign_name: String,
    /// Products to feature; each is rendered into every canonical ratio.
    pub products: Vec<ProductRef>,
    /// Target region identifier (metadata only inside the core).
    pub target_region: String,
    /// Target audience description (metadata only inside the core).
    pub target_audience: String,
    /// Message drawn onto every creative.
    pub campaign_message: String,
}

/// Reference to a product and its image asset key.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ProductRef {
    /// Stable product identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Asset key of the product image (transparent PNG, shadow baked in).
    pub image: String,
}

impl CampaignBrief {
    /// Check structural invariants before the core is invoked.
    pub fn validate(&self) -> AdforgeResult<()> {
        if self.campaign_name.trim().is_empty() {
            return Err(AdforgeError::validation("campaign_name must be non-empty"));
        }
        if self.campaign_message.trim().is_empty() {
            return Err(AdforgeError::validation(
                "campaign_message must be non-empty",
            ));
        }
        if self.products.is_empty() {
            return Err(AdforgeError::validation(
                "brief must contain at least one product",
            ));
        }

        let mut seen = std::collections::BTreeSet::new();
        for product in &self.products {
            if product.id.trim().is_empty() {
                return Err(AdforgeError::validation("product id must be non-empty"));
            }
            if product.image.trim().is_empty() {
                return Err(AdforgeError::validation(format!(
                    "product '{}' has an empty image asset key",
                    product.id
                )));
            }
            if !seen.insert(product.id.as_str()) {
                return Err(AdforgeError::validation(format!(
                    "duplicate product id '{}'",
                    product.id
                )));
            }
        }
        Ok(())
    }
}

/// Named target width/height pair the render pipeline must always produce.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AspectRatioSpec {
    /// Ratio name used to key creatives (e.g. `1x1`).
    pub name: String,
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
}

impl AspectRatioSpec {
    /// Build a spec from name and target dimensions.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    /// The fixed, exhaustive set of output formats in render order:
    /// 1:1 (1080x1080), 9:16 (1080x1920), 16:9 (1920x1080).
    pub fn canonical() -> [AspectRatioSpec; 3] {
        [
            AspectRatioSpec::new("1x1", 1080, 1080),
            AspectRatioSpec::new("9x16", 1080, 1920),
            AspectRatioSpec::new("16x9", 1920, 1080),
        ]
    }

    /// Width over height.
    pub fn ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Check target dimensions are positive.
    pub fn validate(&self) -> AdforgeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(AdforgeError::validation(
                "aspect ratio width/height must be > 0",
            ));
        }
        if self.name.trim().is_empty() {
            return Err(AdforgeError::validation("aspect ratio name must be non-empty"));
        }
        Ok(())
    }
}

/// Horizontal/vertical anchor for product placement on the background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorRule {
    /// Centered both ways.
    Center,
    /// Centered horizontally, standing near the bottom edge.
    CenterBottom,
    /// Inset from the left edge, near the bottom.
    Left,
    /// Inset from the right edge, near the bottom.
    Right,
}

/// Where and how large the product is composited onto the background.
///
/// Fractions are relative to the background master, so the same rule scales
/// with any canonical background resolution.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacementRule {
    /// Anchor position on the background.
    pub anchor: AnchorRule,
    /// Product width as a fraction of background width.
    pub scale_frac: f64,
    /// Cap on product height as a fraction of background height.
    pub max_height_frac: f64,
}

impl PlacementRule {
    /// Documented per-ratio placement defaults.
    ///
    /// The fractions are chosen so the product stays inside the crop window
    /// the aspect transform later cuts from a square master background.
    pub fn for_ratio(ratio_name: &str) -> Self {
        match ratio_name {
            "1x1" => Self {
                anchor: AnchorRule::Center,
                scale_frac: 0.55,
                max_height_frac: 0.50,
            },
            "9x16" => Self {
                anchor: AnchorRule::Center,
                scale_frac: 0.42,
                max_height_frac: 0.40,
            },
            "16x9" => Self {
                anchor: AnchorRule::Center,
                scale_frac: 0.50,
                max_height_frac: 0.35,
            },
            _ => Self {
                anchor: AnchorRule::Center,
                scale_frac: 0.40,
                max_height_frac: 0.50,
            },
        }
    }

    /// Check fractions are sane.
    pub fn validate(&self) -> AdforgeResult<()> {
        if !(self.scale_frac > 0.0 && self.scale_frac <= 1.0) {
            return Err(AdforgeError::validation(
                "placement scale_frac must be in (0, 1]",
            ));
        }
        if !(self.max_height_frac > 0.0 && self.max_height_frac <= 1.0) {
            return Err(AdforgeError::validation(
                "placement max_height_frac must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Corner of the creative used for badge and text placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
}

/// Brand color palette in `#RRGGBB` hex.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct BrandColors {
    /// Primary brand color.
    pub primary: String,
    /// Secondary color; used for the text backing bar.
    pub secondary: String,
    /// Light text color drawn over the backing bar.
    pub text_light: String,
}

/// Layout constants for brand elements.
///
/// All values are documented defaults rather than inferred legacy behavior;
/// campaigns may override any of them.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutRules {
    /// Font size as a fraction of the creative's shorter dimension.
    pub font_scale: f64,
    /// Floor below which text shrinking gives up with a text overflow error.
    pub min_font_px: f32,
    /// Maximum wrapped line count before the font size is reduced.
    pub max_lines: usize,
    /// Safe margin from each edge as a fraction of the relevant dimension.
    pub safe_margin_frac: f64,
    /// Maximum text block width as a fraction of the creative width.
    pub max_text_width_frac: f64,
    /// Opacity of the backing bar behind the message text.
    pub text_bar_opacity: f32,
    /// Corner anchoring the message text block.
    pub text_position: Corner,
    /// Corner anchoring the badge logo.
    pub logo_position: Corner,
    /// Logo width as a fraction of the creative's shorter dimension.
    /// `None` uses the per-ratio defaults of [`LayoutRules::logo_frac_for`].
    pub logo_frac: Option<f64>,
    /// CTA button width as a fraction of the creative's shorter dimension.
    /// `None` uses the per-ratio defaults of [`LayoutRules::cta_frac_for`].
    pub cta_frac: Option<f64>,
}

impl Default for LayoutRules {
    fn default() -> Self {
        Self {
            font_scale: 0.065,
            min_font_px: 14.0,
            max_lines: 3,
            safe_margin_frac: 0.05,
            max_text_width_frac: 0.70,
            text_bar_opacity: 0.75,
            text_position: Corner::TopLeft,
            logo_position: Corner::BottomRight,
            logo_frac: None,
            cta_frac: None,
        }
    }
}

impl LayoutRules {
    /// Badge width fraction for the named target ratio.
    ///
    /// Wide 16:9 creatives carry a smaller badge than the square and tall
    /// formats; a pinned `logo_frac` overrides the lookup for every ratio.
    pub fn logo_frac_for(&self, ratio_name: &str) -> f64 {
        self.logo_frac.unwrap_or(match ratio_name {
            "16x9" => 0.15,
            _ => 0.20,
        })
    }

    /// CTA button width fraction for the named target ratio.
    ///
    /// The tall 9:16 format gets the largest button, 16:9 the smallest; a
    /// pinned `cta_frac` overrides the lookup for every ratio.
    pub fn cta_frac_for(&self, ratio_name: &str) -> f64 {
        self.cta_frac.unwrap_or(match ratio_name {
            "9x16" => 0.55,
            "16x9" => 0.40,
            _ => 0.45,
        })
    }

    /// Check layout constants are in range.
    pub fn validate(&self) -> AdforgeResult<()> {
        if !(self.font_scale > 0.0 && self.font_scale < 1.0) {
            return Err(AdforgeError::validation("font_scale must be in (0, 1)"));
        }
        if !(self.min_font_px > 0.0) {
            return Err(AdforgeError::validation("min_font_px must be > 0"));
        }
        if self.max_lines == 0 {
            return Err(AdforgeError::validation("max_lines must be >= 1"));
        }
        if !(self.safe_margin_frac >= 0.0 && self.safe_margin_frac < 0.5) {
            return Err(AdforgeError::validation(
                "safe_margin_frac must be in [0, 0.5)",
            ));
        }
        if !(self.max_text_width_frac > 0.0 && self.max_text_width_frac <= 1.0) {
            return Err(AdforgeError::validation(
                "max_text_width_frac must be in (0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.text_bar_opacity) {
            return Err(AdforgeError::validation(
                "text_bar_opacity must be in [0, 1]",
            ));
        }
        if let Some(frac) = self.logo_frac
            && !(frac > 0.0 && frac <= 1.0)
        {
            return Err(AdforgeError::validation("logo_frac must be in (0, 1]"));
        }
        if let Some(frac) = self.cta_frac
            && !(frac > 0.0 && frac <= 1.0)
        {
            return Err(AdforgeError::validation("cta_frac must be in (0, 1]"));
        }
        Ok(())
    }
}

/// Brand configuration, loaded once per run and shared read-only across all
/// renders.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct BrandConfig {
    /// Brand display name.
    pub brand_name: String,
    /// Color palette.
    pub colors: BrandColors,
    /// Asset key of the headline font file (TTF/OTF bytes).
    pub font: String,
    /// Asset key of the badge-style logo image.
    pub logo: String,
    /// Optional asset key of a CTA button image.
    #[serde(default)]
    pub cta_button: Option<String>,
    /// Layout constants.
    #[serde(default)]
    pub layout: LayoutRules,
}

impl BrandConfig {
    /// Check structural invariants and color formats.
    pub fn validate(&self) -> AdforgeResult<()> {
        if self.brand_name.trim().is_empty() {
            return Err(AdforgeError::validation("brand_name must be non-empty"));
        }
        if self.font.trim().is_empty() {
            return Err(AdforgeError::validation("brand font key must be non-empty"));
        }
        if self.logo.trim().is_empty() {
            return Err(AdforgeError::validation("brand logo key must be non-empty"));
        }
        parse_hex_rgb(&self.colors.primary)?;
        parse_hex_rgb(&self.colors.secondary)?;
        parse_hex_rgb(&self.colors.text_light)?;
        self.layout.validate()
    }
}

/// Parse a `#RRGGBB` hex color into RGB bytes.
pub fn parse_hex_rgb(hex: &str) -> AdforgeResult<[u8; 3]> {
    let stripped = hex.strip_prefix('#').unwrap_or(hex);
    if stripped.len() != 6 || !stripped.is_ascii() {
        return Err(AdforgeError::validation(format!(
            "color '{hex}' is not #RRGGBB hex"
        )));
    }
    let mut out = [0u8; 3];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = u8::from_str_radix(&stripped[i * 2..i * 2 + 2], 16).map_err(|_| {
            AdforgeError::validation(format!("color '{hex}' is not #RRGGBB hex"))
        })?;
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
