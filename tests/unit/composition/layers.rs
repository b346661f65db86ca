use super::*;
use crate::foundation::core::Rgba8Premul;

fn solid(w: u32, h: u32, r: u8, g: u8, b: u8) -> Frame {
    Frame::solid(w, h, Rgba8Premul::from_straight_rgba(r, g, b, 255)).unwrap()
}

#[test]
fn roles_must_be_appended_in_stacking_order() {
    let mut stack = LayerStack::new(solid(8, 8, 0, 0, 0));
    stack.push(LayerRole::Product, solid(2, 2, 1, 1, 1), 0, 0).unwrap();
    stack.push(LayerRole::Text, solid(2, 2, 2, 2, 2), 0, 0).unwrap();
    stack.push(LayerRole::Logo, solid(2, 2, 3, 3, 3), 0, 0).unwrap();

    // Nothing may be stacked above the logo.
    let err = stack
        .push(LayerRole::Text, solid(2, 2, 4, 4, 4), 0, 0)
        .unwrap_err();
    assert!(err.to_string().contains("validation error:"));
}

#[test]
fn second_product_layer_is_rejected() {
    let mut stack = LayerStack::new(solid(8, 8, 0, 0, 0));
    stack.push(LayerRole::Product, solid(2, 2, 1, 1, 1), 0, 0).unwrap();
    assert!(
        stack
            .push(LayerRole::Product, solid(2, 2, 1, 1, 1), 4, 4)
            .is_err()
    );
}

#[test]
fn product_rect_reports_placement_clipped_to_background() {
    let mut stack = LayerStack::new(solid(10, 10, 0, 0, 0));
    assert!(stack.product_rect().is_none());

    stack
        .push(LayerRole::Product, solid(4, 4, 1, 1, 1), -2, 8)
        .unwrap();
    let rect = stack.product_rect().unwrap();
    assert_eq!((rect.x, rect.y, rect.width, rect.height), (0, 8, 2, 2));
}

#[test]
fn flatten_composites_bottom_to_top_and_leaves_rest_untouched() {
    let bg_px = Rgba8Premul::from_straight_rgba(0, 0, 255, 255);
    let product_px = Rgba8Premul::from_straight_rgba(255, 0, 0, 255);
    let logo_px = Rgba8Premul::from_straight_rgba(0, 255, 0, 255);

    let mut stack = LayerStack::new(Frame::solid(6, 6, bg_px).unwrap());
    stack
        .push(LayerRole::Product, Frame::solid(2, 2, product_px).unwrap(), 1, 1)
        .unwrap();
    stack
        .push(LayerRole::Logo, Frame::solid(1, 1, logo_px).unwrap(), 1, 1)
        .unwrap();

    let out = stack.flatten();
    assert_eq!(out.width(), 6);
    assert_eq!(out.height(), 6);
    // Logo drawn last wins where it overlaps the product.
    assert_eq!(out.pixel(1, 1).unwrap(), logo_px);
    assert_eq!(out.pixel(2, 2).unwrap(), product_px);
    assert_eq!(out.pixel(0, 0).unwrap(), bg_px);
    assert_eq!(out.pixel(5, 5).unwrap(), bg_px);
}
