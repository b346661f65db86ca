use std::{
    collections::HashMap,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::{
    assets::decode,
    composition::model::{BrandConfig, CampaignBrief, Corner, LayoutRules, ProductRef,
        parse_hex_rgb},
    foundation::core::Frame,
    foundation::error::{AdforgeError, AdforgeResult},
};

/// Immutable store of decoded assets keyed by the asset keys used in briefs
/// and brand configuration.
///
/// All IO and decoding is front-loaded here so the render stages stay pure
/// and deterministic. Assets can come from a filesystem root or be inserted
/// directly as in-memory bytes.
#[derive(Clone, Debug, Default)]
pub struct PreparedAssetStore {
    images: HashMap<String, (Arc<Frame>, bool)>,
    fonts: HashMap<String, Arc<Vec<u8>>>,
}

impl PreparedAssetStore {
    /// Empty store for fully in-memory operation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and load every asset referenced by `brief` and `brand` from
    /// files under `root`. Keys are normalized relative paths.
    pub fn prepare(
        brief: &CampaignBrief,
        brand: &BrandConfig,
        root: impl Into<PathBuf>,
    ) -> AdforgeResult<Self> {
        let root = root.into();
        let mut store = Self::new();

        for product in &brief.products {
            let bytes = read_bytes(&root, &product.image)?;
            store.insert_image_bytes(&product.image, &bytes)?;
        }
        let logo_bytes = read_bytes(&root, &brand.logo)?;
        store.insert_image_bytes(&brand.logo, &logo_bytes)?;
        if let Some(cta) = &brand.cta_button {
            let cta_bytes = read_bytes(&root, cta)?;
            store.insert_image_bytes(cta, &cta_bytes)?;
        }
        let font_bytes = read_bytes(&root, &brand.font)?;
        store.insert_font_bytes(&brand.font, font_bytes);

        Ok(store)
    }

    /// Decode image bytes and register them under `key`.
    pub fn insert_image_bytes(&mut self, key: &str, bytes: &[u8]) -> AdforgeResult<()> {
        let decoded = decode::decode_image(bytes)?;
        self.images.insert(
            key.to_string(),
            (Arc::new(decoded.frame), decoded.source_has_alpha),
        );
        Ok(())
    }

    /// Register an already-decoded frame under `key`.
    pub fn insert_frame(&mut self, key: &str, frame: Frame, has_alpha: bool) {
        self.images
            .insert(key.to_string(), (Arc::new(frame), has_alpha));
    }

    /// Register raw font bytes (TTF/OTF) under `key`.
    pub fn insert_font_bytes(&mut self, key: &str, bytes: Vec<u8>) {
        self.fonts.insert(key.to_string(), Arc::new(bytes));
    }

    /// Look up a decoded image and whether its source had an alpha channel.
    pub fn image(&self, key: &str) -> AdforgeResult<(Arc<Frame>, bool)> {
        self.images
            .get(key)
            .cloned()
            .ok_or_else(|| AdforgeError::validation(format!("unknown image asset key '{key}'")))
    }

    /// Look up registered font bytes.
    pub fn font(&self, key: &str) -> AdforgeResult<Arc<Vec<u8>>> {
        self.fonts
            .get(key)
            .cloned()
            .ok_or_else(|| AdforgeError::validation(format!("unknown font asset key '{key}'")))
    }
}

fn read_bytes(root: &Path, key: &str) -> AdforgeResult<Vec<u8>> {
    let rel = normalize_rel_path(key)?;
    let path = root.join(rel);
    std::fs::read(&path)
        .with_context(|| format!("read asset '{}'", path.display()))
        .map_err(Into::into)
}

/// Normalize an asset key into a safe relative path (no absolute paths, no
/// parent-directory escapes).
pub fn normalize_rel_path(key: &str) -> AdforgeResult<String> {
    let path = Path::new(key);
    let mut out = Vec::new();
    for comp in path.components() {
        match comp {
            Component::Normal(c) => out.push(c.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => {
                return Err(AdforgeError::validation(format!(
                    "asset key '{key}' must be a plain relative path"
                )));
            }
        }
    }
    if out.is_empty() {
        return Err(AdforgeError::validation("asset key must be non-empty"));
    }
    Ok(out.join("/"))
}

/// A product resolved to its decoded image, ready to render.
#[derive(Clone, Debug)]
pub struct Product {
    /// Stable product identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Decoded product image (premultiplied, shadow baked in).
    pub image: Arc<Frame>,
    /// Whether the source image carried an alpha channel.
    pub has_alpha: bool,
}

impl Product {
    /// Resolve a brief product reference against the store.
    pub fn resolve(product: &ProductRef, store: &PreparedAssetStore) -> AdforgeResult<Self> {
        let (image, has_alpha) = store.image(&product.image)?;
        Ok(Self {
            id: product.id.clone(),
            name: product.name.clone(),
            image,
            has_alpha,
        })
    }
}

/// Brand configuration resolved to decoded assets and parsed colors, shared
/// read-only across all renders of a run.
#[derive(Clone, Debug)]
pub struct PreparedBrand {
    /// Badge-style logo (carries its own backing, visible over any backdrop).
    pub logo: Arc<Frame>,
    /// Headline font bytes.
    pub font_bytes: Arc<Vec<u8>>,
    /// Optional CTA button image.
    pub cta: Option<Arc<Frame>>,
    /// Straight-alpha RGB of the message text.
    pub text_rgb: [u8; 3],
    /// Straight-alpha RGB of the text backing bar.
    pub bar_rgb: [u8; 3],
    /// Corner of the badge logo.
    pub logo_position: Corner,
    /// Layout constants.
    pub layout: LayoutRules,
}

impl PreparedBrand {
    /// Resolve a brand configuration against the store.
    pub fn resolve(brand: &BrandConfig, store: &PreparedAssetStore) -> AdforgeResult<Self> {
        brand.validate()?;
        let (logo, _) = store.image(&brand.logo)?;
        let cta = match &brand.cta_button {
            Some(key) => Some(store.image(key)?.0),
            None => None,
        };
        Ok(Self {
            logo,
            font_bytes: store.font(&brand.font)?,
            cta,
            text_rgb: parse_hex_rgb(&brand.colors.text_light)?,
            bar_rgb: parse_hex_rgb(&brand.colors.secondary)?,
            logo_position: brand.layout.logo_position,
            layout: brand.layout,
        })
    }
}

/// Resolve every product plus the brand in one step.
pub fn prepare_campaign(
    brief: &CampaignBrief,
    brand: &BrandConfig,
    store: &PreparedAssetStore,
) -> AdforgeResult<(Vec<Product>, PreparedBrand)> {
    brief.validate()?;
    let mut products = Vec::with_capacity(brief.products.len());
    for product in &brief.products {
        products.push(Product::resolve(product, store)?);
    }
    Ok((products, PreparedBrand::resolve(brand, store)?))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
