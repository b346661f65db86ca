//! Adforge turns one campaign definition plus product images into a
//! deterministic set of branded ad creatives across three fixed aspect
//! ratios (1:1, 9:16, 16:9).
//!
//! # Pipeline overview
//!
//! 1. **Compose**: place the product (shadow baked into its alpha) onto the
//!    background with premultiplied `over` blending ([`compose`])
//! 2. **Transform**: cover-scale and crop to each target ratio while keeping
//!    the product's focal point in frame ([`transform`])
//! 3. **Overlay**: draw the campaign message, its backing bar, and the badge
//!    logo per target dimensions ([`BrandOverlayRenderer`])
//! 4. **Orchestrate**: fan the three stages out over products x ratios with
//!    partial-success batch semantics ([`render_campaign`])
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: identical inputs produce pixel-identical
//!   creatives; resampling filters and layout constants are pinned.
//! - **No IO in renderers**: decoding is front-loaded in
//!   [`PreparedAssetStore`]; the stages only see in-memory frames.
//! - **Premultiplied RGBA8** end-to-end.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod assets;
mod composition;
mod foundation;
mod render;

pub use assets::decode::{DecodedImage, decode_image};
pub use assets::store::{
    PreparedAssetStore, PreparedBrand, Product, normalize_rel_path, prepare_campaign,
};
pub use composition::layers::{LayerRole, LayerStack};
pub use composition::model::{
    AnchorRule, AspectRatioSpec, BrandColors, BrandConfig, CampaignBrief, Corner, LayoutRules,
    PlacementRule, ProductRef, parse_hex_rgb,
};
pub use foundation::core::{FocalPoint, Frame, PixelRect, Rgba8Premul};
pub use foundation::error::{AdforgeError, AdforgeResult};
pub use render::aspect::{MAX_UPSCALE, transform};
pub use render::compose::{ComposedBase, compose};
pub use render::composite::{PremulRgba8, blit_over, over, over_in_place};
pub use render::overlay::{BrandOverlayRenderer, TextBrushRgba8};
pub use render::pipeline::{
    CancelFlag, Creative, CreativeBatch, RenderFailure, RenderOpts, RenderStats, RenderThreading,
    render_campaign, render_campaign_with_stats, render_creative,
};
pub use render::resample::{RESIZE_FILTER, crop_frame, resize_frame};
