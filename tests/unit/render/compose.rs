use super::*;
use crate::foundation::core::Rgba8Premul;

const BG: Rgba8Premul = Rgba8Premul {
    r: 0,
    g: 0,
    b: 255,
    a: 255,
};

/// Opaque red product with one transparent corner pixel, so the asset reads
/// as a cut-out with baked transparency.
fn product(w: u32, h: u32) -> Frame {
    let mut frame = Frame::solid(w, h, Rgba8Premul::from_straight_rgba(255, 0, 0, 255)).unwrap();
    frame.data_mut()[0..4].copy_from_slice(&[0, 0, 0, 0]);
    frame
}

#[test]
fn output_matches_background_dims_and_reports_geometry() {
    let background = Frame::solid(100, 100, BG).unwrap();
    let rule = PlacementRule::for_ratio("1x1");

    let composed = compose(&background, &product(10, 10), &rule).unwrap();
    assert_eq!(composed.frame.width(), 100);
    assert_eq!(composed.frame.height(), 100);

    // 0.55 width-driven scale caps at 0.50 of height for a square product.
    let rect = composed.product_rect;
    assert_eq!((rect.width, rect.height), (50, 50));
    assert_eq!((rect.x, rect.y), (25, 25));
    assert_eq!(composed.anchor, rect.center());
}

#[test]
fn pixels_outside_product_rect_equal_the_background() {
    let background = Frame::solid(120, 120, BG).unwrap();
    let rule = PlacementRule::for_ratio("16x9");

    let composed = compose(&background, &product(16, 16), &rule).unwrap();
    let rect = composed.product_rect;
    for y in 0..composed.frame.height() {
        for x in 0..composed.frame.width() {
            if !rect.contains(x, y) {
                assert_eq!(
                    composed.frame.pixel(x, y).unwrap(),
                    BG,
                    "pixel ({x}, {y}) outside {rect:?} must be untouched"
                );
            }
        }
    }
}

#[test]
fn opaque_product_is_rejected_with_missing_alpha() {
    let background = Frame::solid(100, 100, BG).unwrap();
    let opaque = Frame::solid(10, 10, Rgba8Premul::from_straight_rgba(255, 0, 0, 255)).unwrap();

    let err = compose(&background, &opaque, &PlacementRule::for_ratio("1x1")).unwrap_err();
    assert!(matches!(err, AdforgeError::MissingAlpha(_)));
}

#[test]
fn out_of_range_placement_rule_is_rejected_up_front() {
    let background = Frame::solid(100, 100, BG).unwrap();

    // A scale fraction above 1 would ask for a product wider than the
    // background itself; it fails validation before any pixel work.
    let rule = PlacementRule {
        anchor: AnchorRule::Center,
        scale_frac: 1.5,
        max_height_frac: 1.0,
    };
    let err = compose(&background, &product(100, 10), &rule).unwrap_err();
    assert!(matches!(err, AdforgeError::Validation(_)));

    let rule = PlacementRule {
        anchor: AnchorRule::Center,
        scale_frac: 0.5,
        max_height_frac: 0.0,
    };
    let err = compose(&background, &product(10, 10), &rule).unwrap_err();
    assert!(matches!(err, AdforgeError::Validation(_)));
}

#[test]
fn bottom_anchors_keep_the_bottom_offset_clear() {
    let background = Frame::solid(200, 200, BG).unwrap();
    let rule = PlacementRule {
        anchor: AnchorRule::CenterBottom,
        scale_frac: 0.3,
        max_height_frac: 0.5,
    };

    let composed = compose(&background, &product(30, 30), &rule).unwrap();
    let rect = composed.product_rect;
    assert_eq!((rect.width, rect.height), (60, 60));
    // 8% of 200 px stays clear under the product.
    assert_eq!(rect.bottom(), 200 - 16);
    assert_eq!(rect.x, 70);
}

#[test]
fn side_anchors_inset_from_the_edges() {
    let background = Frame::solid(200, 200, BG).unwrap();
    let mut rule = PlacementRule {
        anchor: AnchorRule::Left,
        scale_frac: 0.2,
        max_height_frac: 0.5,
    };

    let left = compose(&background, &product(20, 20), &rule).unwrap();
    assert_eq!(left.product_rect.x, 20);

    rule.anchor = AnchorRule::Right;
    let right = compose(&background, &product(20, 20), &rule).unwrap();
    assert_eq!(right.product_rect.right(), 200 - 20);
}

#[test]
fn compose_is_deterministic() {
    let background = Frame::solid(100, 100, BG).unwrap();
    let rule = PlacementRule::for_ratio("9x16");
    let a = compose(&background, &product(12, 12), &rule).unwrap();
    let b = compose(&background, &product(12, 12), &rule).unwrap();
    assert_eq!(a.frame, b.frame);
    assert_eq!(a.anchor, b.anchor);
}
