use kurbo::{Point, Size, Vec2};

use vista_core::overlay::{clamp_to_image, BitMask, Polyline};
use vista_core::selection::VertexSelection;

// ---------------------------------------------------------------------------
// BitMask
// ---------------------------------------------------------------------------

#[test]
fn test_fill_circle_area_close_to_disc() {
    let mut mask = BitMask::new(64, 64);
    mask.fill_circle(Point::new(32.0, 32.0), 10.0, true);
    let area = mask.count_ones() as f64;
    let expected = std::f64::consts::PI * 100.0;
    assert!((area - expected).abs() / expected < 0.05, "area {area}");
}

#[test]
fn test_circle_clipped_at_border() {
    let mut mask = BitMask::new(10, 10);
    mask.fill_circle(Point::new(0.0, 0.0), 3.0, true);
    assert!(mask.get(0, 0));
    assert!(mask.get(2, 0));
    assert!(!mask.get(3, 3));
}

#[test]
fn test_stroke_capsule_covers_segment() {
    let mut mask = BitMask::new(50, 20);
    mask.stroke_capsule(Point::new(5.0, 10.0), Point::new(45.0, 10.0), 2.0, true);
    for x in 5..45 {
        assert!(mask.get(x, 9) && mask.get(x, 10), "gap at x={x}");
    }
    assert!(!mask.get(25, 14));
    assert!(!mask.get(25, 5));
}

#[test]
fn test_erase_clears_bits() {
    let mut mask = BitMask::new(20, 20);
    mask.fill_circle(Point::new(10.0, 10.0), 6.0, true);
    mask.fill_circle(Point::new(10.0, 10.0), 3.0, false);
    assert!(!mask.get(10, 10));
    assert!(mask.get(10, 5));
}

#[test]
fn test_clear_resets_mask() {
    let mut mask = BitMask::new(8, 8);
    mask.fill_circle(Point::new(4.0, 4.0), 2.0, true);
    assert!(!mask.is_empty());
    mask.clear();
    assert!(mask.is_empty());
    assert_eq!(mask.size(), (8, 8));
}

// ---------------------------------------------------------------------------
// Polyline
// ---------------------------------------------------------------------------

#[test]
fn test_translate_selected_only_moves_selection() {
    let mut line = Polyline::new(vec![
        Point::new(1.0, 1.0),
        Point::new(5.0, 5.0),
        Point::new(9.0, 9.0),
    ]);
    line.selected = true;
    line.selection.insert(1);
    let moved = line.translate_selected(Vec2::new(2.0, -1.0), Size::new(10.0, 10.0));
    assert!(moved);
    assert_eq!(line.vertices[0], Point::new(1.0, 1.0));
    assert_eq!(line.vertices[1], Point::new(7.0, 4.0));
    assert_eq!(line.vertices[2], Point::new(9.0, 9.0));
}

#[test]
fn test_translate_clamps_and_reports_no_motion_at_edge() {
    let mut line = Polyline::new(vec![Point::new(10.0, 0.0)]);
    line.selection.insert(0);
    assert!(!line.translate_selected(Vec2::new(5.0, -5.0), Size::new(10.0, 10.0)));
    assert_eq!(line.vertices[0], Point::new(10.0, 0.0));
}

#[test]
fn test_deselect_drops_selection() {
    let mut line = Polyline::new(vec![Point::ZERO, Point::new(1.0, 1.0)]);
    line.selected = true;
    line.selection.insert(0);
    line.deselect();
    assert!(!line.selected);
    assert!(line.selection.is_empty());
}

#[test]
fn test_clamp_to_image_is_closed_range() {
    let bounds = Size::new(100.0, 50.0);
    assert_eq!(clamp_to_image(Point::new(120.0, -3.0), bounds), Point::new(100.0, 0.0));
    assert_eq!(clamp_to_image(Point::new(40.0, 20.0), bounds), Point::new(40.0, 20.0));
}

// ---------------------------------------------------------------------------
// VertexSelection
// ---------------------------------------------------------------------------

#[test]
fn test_selection_iterates_ascending() {
    let mut sel = VertexSelection::new();
    for i in [7, 2, 5, 0] {
        sel.insert(i);
    }
    assert_eq!(sel.iter().collect::<Vec<_>>(), vec![0, 2, 5, 7]);
    assert_eq!(sel.first(), Some(0));
    assert_eq!(sel.last(), Some(7));
    assert_eq!(sel.anchor(), Some(0));
}

#[test]
fn test_retain_below_after_shrink() {
    let mut sel = VertexSelection::new();
    sel.insert(1);
    sel.insert(6);
    sel.retain_below(4);
    assert_eq!(sel.iter().collect::<Vec<_>>(), vec![1]);
    assert_eq!(sel.anchor(), Some(1));
}
