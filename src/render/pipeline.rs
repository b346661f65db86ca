use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use rayon::prelude::*;

use crate::{
    assets::store::{PreparedBrand, Product},
    composition::model::{AspectRatioSpec, PlacementRule},
    foundation::core::Frame,
    foundation::error::{AdforgeError, AdforgeResult},
    render::aspect::transform,
    render::compose::compose,
    render::overlay::BrandOverlayRenderer,
};

/// One finished rendered image for a given product and aspect ratio.
#[derive(Clone, Debug)]
pub struct Creative {
    /// Product this creative features.
    pub product_id: String,
    /// Aspect ratio name (e.g. `9x16`).
    pub ratio: String,
    /// Final rendered pixels.
    pub frame: Frame,
}

/// A per-pairing failure reported alongside successful creatives.
#[derive(Debug)]
pub struct RenderFailure {
    /// Product whose pairing failed.
    pub product_id: String,
    /// Aspect ratio name of the failed pairing.
    pub ratio: String,
    /// Why the pairing failed.
    pub error: AdforgeError,
}

/// Batch result: successes and failures together cover every scheduled
/// (product, ratio) pairing unless the run was cancelled.
#[derive(Debug, Default)]
pub struct CreativeBatch {
    /// Successfully rendered creatives, in scheduling order.
    pub creatives: Vec<Creative>,
    /// Pairings that failed, with their typed errors.
    pub failures: Vec<RenderFailure>,
}

impl CreativeBatch {
    /// Whether every scheduled pairing produced a creative.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Look up a creative by its (product id, ratio name) key.
    pub fn get(&self, product_id: &str, ratio: &str) -> Option<&Creative> {
        self.creatives
            .iter()
            .find(|c| c.product_id == product_id && c.ratio == ratio)
    }
}

/// Fan-out configuration for the orchestrator.
#[derive(Clone, Debug, Default)]
pub struct RenderThreading {
    /// Render pairings on a rayon pool instead of sequentially.
    pub parallel: bool,
    /// Worker count; `None` uses the rayon default.
    pub threads: Option<usize>,
}

/// Cooperative cancellation handle shared between caller and orchestrator.
///
/// Cancelling skips pairings that have not started; creatives already
/// produced are returned untouched.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Fresh, uncancelled flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request early termination of remaining pairings.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Orchestrator options.
#[derive(Clone, Debug, Default)]
pub struct RenderOpts {
    /// Threading configuration.
    pub threading: RenderThreading,
    /// Cancellation handle.
    pub cancel: CancelFlag,
}

/// Counters describing one batch run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Pairings scheduled (products x ratios).
    pub pairings_total: u64,
    /// Pairings that produced a creative.
    pub rendered: u64,
    /// Pairings that failed with a typed error.
    pub failed: u64,
    /// Pairings skipped because of cancellation.
    pub skipped: u64,
}

/// Render a single (product, aspect ratio) pairing: compose, transform,
/// overlay.
///
/// This is the primary one-shot API; [`render_campaign`] fans it out over
/// every product and canonical ratio.
#[tracing::instrument(skip_all, fields(product = %product.id, ratio = %spec.name))]
pub fn render_creative(
    renderer: &mut BrandOverlayRenderer,
    product: &Product,
    background: &Frame,
    brand: &PreparedBrand,
    message: &str,
    spec: &AspectRatioSpec,
) -> AdforgeResult<Creative> {
    if !product.has_alpha {
        return Err(AdforgeError::missing_alpha(format!(
            "product '{}' image has no alpha channel",
            product.id
        )));
    }

    let placement = PlacementRule::for_ratio(&spec.name);
    let composed = compose(background, &product.image, &placement)?;
    let framed = transform(&composed.frame, spec, composed.anchor)?;
    let frame = renderer.overlay(framed, message, brand, spec)?;

    Ok(Creative {
        product_id: product.id.clone(),
        ratio: spec.name.clone(),
        frame,
    })
}

/// Render every product into every canonical aspect ratio with default
/// options (sequential, no cancellation).
pub fn render_campaign(
    products: &[Product],
    background: &Frame,
    brand: &PreparedBrand,
    message: &str,
) -> AdforgeResult<CreativeBatch> {
    render_campaign_with_stats(products, background, brand, message, &RenderOpts::default())
        .map(|(batch, _)| batch)
}

/// Render every product into every canonical aspect ratio.
///
/// Pairings are independent: a failure on one is collected as a
/// [`RenderFailure`] and never aborts the others. With
/// `opts.threading.parallel`, pairings run on a rayon pool with one overlay
/// renderer per worker; results are re-associated with their (product id,
/// ratio name) key, so output order matches scheduling order either way.
pub fn render_campaign_with_stats(
    products: &[Product],
    background: &Frame,
    brand: &PreparedBrand,
    message: &str,
    opts: &RenderOpts,
) -> AdforgeResult<(CreativeBatch, RenderStats)> {
    let specs = AspectRatioSpec::canonical();
    let tasks: Vec<(&Product, &AspectRatioSpec)> = products
        .iter()
        .flat_map(|p| specs.iter().map(move |s| (p, s)))
        .collect();

    let mut stats = RenderStats {
        pairings_total: tasks.len() as u64,
        ..RenderStats::default()
    };
    let mut batch = CreativeBatch::default();

    let outcomes: Vec<Option<AdforgeResult<Creative>>> = if opts.threading.parallel {
        let pool = build_thread_pool(opts.threading.threads)?;
        pool.install(|| {
            tasks
                .par_iter()
                .map_init(BrandOverlayRenderer::new, |renderer, (product, spec)| {
                    if opts.cancel.is_cancelled() {
                        return None;
                    }
                    Some(render_creative(
                        renderer, product, background, brand, message, spec,
                    ))
                })
                .collect()
        })
    } else {
        let mut renderer = BrandOverlayRenderer::new();
        tasks
            .iter()
            .map(|(product, spec)| {
                if opts.cancel.is_cancelled() {
                    return None;
                }
                Some(render_creative(
                    &mut renderer,
                    product,
                    background,
                    brand,
                    message,
                    spec,
                ))
            })
            .collect()
    };

    for ((product, spec), outcome) in tasks.iter().zip(outcomes) {
        match outcome {
            None => stats.skipped += 1,
            Some(Ok(creative)) => {
                stats.rendered += 1;
                batch.creatives.push(creative);
            }
            Some(Err(error)) => {
                stats.failed += 1;
                batch.failures.push(RenderFailure {
                    product_id: product.id.clone(),
                    ratio: spec.name.clone(),
                    error,
                });
            }
        }
    }

    Ok((batch, stats))
}

fn build_thread_pool(threads: Option<usize>) -> AdforgeResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(AdforgeError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| AdforgeError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
