use std::sync::{Arc, atomic::AtomicUsize};

use tracing_subscriber::prelude::*;

use super::*;
use crate::{
    composition::model::{Corner, LayoutRules},
    foundation::core::Rgba8Premul,
};

/// Probe list for a usable system TTF; text tests skip when none is present.
const FONT_PROBES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

fn system_font() -> Option<Vec<u8>> {
    FONT_PROBES.iter().find_map(|p| std::fs::read(p).ok())
}

fn background() -> Frame {
    Frame::solid(1024, 1024, Rgba8Premul::from_straight_rgba(120, 120, 120, 255)).unwrap()
}

fn opaque_product(id: &str) -> Product {
    Product {
        id: id.to_string(),
        name: id.to_string(),
        image: Arc::new(
            Frame::solid(200, 200, Rgba8Premul::from_straight_rgba(255, 0, 0, 255)).unwrap(),
        ),
        has_alpha: false,
    }
}

fn cutout_product(id: &str) -> Product {
    let mut frame =
        Frame::solid(200, 200, Rgba8Premul::from_straight_rgba(220, 30, 30, 255)).unwrap();
    frame.data_mut()[0..4].copy_from_slice(&[0, 0, 0, 0]);
    Product {
        id: id.to_string(),
        name: id.to_string(),
        image: Arc::new(frame),
        has_alpha: true,
    }
}

fn brand_with_font(font: Vec<u8>) -> PreparedBrand {
    PreparedBrand {
        font_bytes: Arc::new(font),
        ..dummy_brand()
    }
}

fn dummy_brand() -> PreparedBrand {
    PreparedBrand {
        logo: Arc::new(
            Frame::solid(64, 64, Rgba8Premul::from_straight_rgba(255, 255, 255, 255)).unwrap(),
        ),
        font_bytes: Arc::new(Vec::new()),
        cta: None,
        text_rgb: [255, 255, 255],
        bar_rgb: [8, 28, 21],
        logo_position: Corner::BottomRight,
        layout: LayoutRules::default(),
    }
}

#[test]
fn product_without_alpha_fails_every_ratio_but_not_the_batch() {
    let products = [opaque_product("boot-x1")];
    let (batch, stats) = render_campaign_with_stats(
        &products,
        &background(),
        &dummy_brand(),
        "Conquer Every Trail",
        &RenderOpts::default(),
    )
    .unwrap();

    assert!(batch.creatives.is_empty());
    assert_eq!(batch.failures.len(), 3);
    for failure in &batch.failures {
        assert_eq!(failure.product_id, "boot-x1");
        assert!(matches!(failure.error, AdforgeError::MissingAlpha(_)));
    }
    let ratios: Vec<&str> = batch.failures.iter().map(|f| f.ratio.as_str()).collect();
    assert_eq!(ratios, ["1x1", "9x16", "16x9"]);

    assert_eq!(stats.pairings_total, 3);
    assert_eq!(stats.failed, 3);
    assert_eq!(stats.rendered, 0);
    assert_eq!(stats.skipped, 0);
}

#[test]
fn cancelled_run_skips_every_pairing() {
    let opts = RenderOpts::default();
    opts.cancel.cancel();
    assert!(opts.cancel.is_cancelled());

    let products = [opaque_product("boot-x1"), opaque_product("pack-20l")];
    let (batch, stats) = render_campaign_with_stats(
        &products,
        &background(),
        &dummy_brand(),
        "Conquer Every Trail",
        &opts,
    )
    .unwrap();

    assert!(batch.creatives.is_empty());
    assert!(batch.failures.is_empty());
    assert_eq!(stats.pairings_total, 6);
    assert_eq!(stats.skipped, 6);
}

/// Flips a [`CancelFlag`] when the orchestrator opens its second
/// per-pairing span, so cancellation lands while a batch is in flight.
struct CancelOnSecondPairing {
    cancel: CancelFlag,
    seen: AtomicUsize,
}

impl<S: tracing::Subscriber> tracing_subscriber::layer::Layer<S> for CancelOnSecondPairing {
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if attrs.metadata().name() == "render_creative"
            && self.seen.fetch_add(1, Ordering::Relaxed) == 1
        {
            self.cancel.cancel();
        }
    }
}

#[test]
fn mid_run_cancel_keeps_already_produced_creatives_untouched() {
    let Some(font) = system_font() else {
        eprintln!("no system font found; skipping");
        return;
    };
    let brand = brand_with_font(font);
    let products = [cutout_product("boot-x1")];
    let background = background();

    // The in-flight pairing finishes; only not-yet-started pairings are
    // skipped.
    let opts = RenderOpts::default();
    let layer = CancelOnSecondPairing {
        cancel: opts.cancel.clone(),
        seen: AtomicUsize::new(0),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    let (batch, stats) = tracing::subscriber::with_default(subscriber, || {
        render_campaign_with_stats(&products, &background, &brand, "Conquer Every Trail", &opts)
    })
    .unwrap();

    assert_eq!(stats.pairings_total, 3);
    assert_eq!(stats.rendered, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.failed, 0);
    let ratios: Vec<&str> = batch.creatives.iter().map(|c| c.ratio.as_str()).collect();
    assert_eq!(ratios, ["1x1", "9x16"]);

    // The creative produced before the cancel matches an uncancelled render
    // of the same pairing byte for byte.
    let spec = &AspectRatioSpec::canonical()[0];
    let reference = render_creative(
        &mut BrandOverlayRenderer::new(),
        &products[0],
        &background,
        &brand,
        "Conquer Every Trail",
        spec,
    )
    .unwrap();
    assert_eq!(batch.get("boot-x1", "1x1").unwrap().frame, reference.frame);
}

#[test]
fn zero_worker_threads_are_rejected() {
    let opts = RenderOpts {
        threading: RenderThreading {
            parallel: true,
            threads: Some(0),
        },
        cancel: CancelFlag::new(),
    };
    let err = render_campaign_with_stats(
        &[opaque_product("boot-x1")],
        &background(),
        &dummy_brand(),
        "Go",
        &opts,
    )
    .unwrap_err();
    assert!(matches!(err, AdforgeError::Validation(_)));
}

#[test]
fn parallel_fanout_reassociates_failures_by_key() {
    let opts = RenderOpts {
        threading: RenderThreading {
            parallel: true,
            threads: Some(2),
        },
        cancel: CancelFlag::new(),
    };
    let products = [opaque_product("a"), opaque_product("b")];
    let (batch, stats) = render_campaign_with_stats(
        &products,
        &background(),
        &dummy_brand(),
        "Go",
        &opts,
    )
    .unwrap();

    assert_eq!(stats.pairings_total, 6);
    assert_eq!(batch.failures.len(), 6);
    let keys: Vec<(&str, &str)> = batch
        .failures
        .iter()
        .map(|f| (f.product_id.as_str(), f.ratio.as_str()))
        .collect();
    assert_eq!(
        keys,
        [
            ("a", "1x1"),
            ("a", "9x16"),
            ("a", "16x9"),
            ("b", "1x1"),
            ("b", "9x16"),
            ("b", "16x9"),
        ]
    );
}

#[test]
fn batch_lookup_by_product_and_ratio() {
    let mut batch = CreativeBatch::default();
    assert!(batch.is_complete());
    batch.creatives.push(Creative {
        product_id: "boot-x1".to_string(),
        ratio: "9x16".to_string(),
        frame: Frame::new(2, 2).unwrap(),
    });

    assert!(batch.get("boot-x1", "9x16").is_some());
    assert!(batch.get("boot-x1", "1x1").is_none());
    assert!(batch.get("pack-20l", "9x16").is_none());
}
