//! Hit-testing in screen space.
//!
//! Image-space coordinates are mapped through the current forward transform
//! first, so proximity is what the user sees regardless of zoom.

use std::collections::BTreeSet;

use kurbo::{Affine, Point, Rect};

use crate::consts::EPSILON;
use crate::selection::VertexSelection;

/// Index and screen distance of the closest candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub index: usize,
    pub distance: f64,
}

/// Closest of `points` to `pointer` after mapping through `transform`,
/// if it lies within `tolerance`.
pub fn nearest_within(
    points: &[Point],
    transform: Affine,
    pointer: Point,
    tolerance: f64,
) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    for (index, &p) in points.iter().enumerate() {
        let distance = (transform * p).distance(pointer);
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(Hit { index, distance });
        }
    }
    best.filter(|hit| hit.distance <= tolerance)
}

/// Euclidean distance from `p` to the segment `a`-`b`.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let ap = p - a;
    let len = ab.hypot();
    if len < EPSILON {
        return p.distance(a);
    }
    let projected = ap.dot(ab) / len;
    if projected < 0.0 {
        p.distance(a)
    } else if projected > len {
        p.distance(b)
    } else {
        ab.cross(ap).abs() / len
    }
}

/// Distance from `pointer` to the selected part of a polyline.
///
/// A selected vertex whose successor is also selected contributes the
/// segment between them; otherwise it contributes the vertex alone.
pub fn selection_distance(
    vertices: &[Point],
    selection: &VertexSelection,
    transform: Affine,
    pointer: Point,
) -> Option<f64> {
    selection
        .iter()
        .filter_map(|i| {
            let a = transform * *vertices.get(i)?;
            let d = match vertices.get(i + 1) {
                Some(&next) if selection.contains(i + 1) => {
                    point_segment_distance(pointer, a, transform * next)
                }
                _ => a.distance(pointer),
            };
            Some(d)
        })
        .min_by(f64::total_cmp)
}

/// Distance from `pointer` to the whole polyline.
pub fn polyline_distance(vertices: &[Point], transform: Affine, pointer: Point) -> Option<f64> {
    match vertices {
        [] => None,
        [only] => Some((transform * *only).distance(pointer)),
        _ => vertices
            .windows(2)
            .map(|w| point_segment_distance(pointer, transform * w[0], transform * w[1]))
            .min_by(f64::total_cmp),
    }
}

/// Whether `p` lies inside `rect`, borders included.
pub fn rect_contains_inclusive(rect: Rect, p: Point) -> bool {
    let r = rect.abs();
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}

/// Indices of `vertices` whose screen position falls inside `rect`.
pub fn vertices_in_rect(vertices: &[Point], transform: Affine, rect: Rect) -> BTreeSet<usize> {
    vertices
        .iter()
        .enumerate()
        .filter(|(_, v)| rect_contains_inclusive(rect, transform * **v))
        .map(|(i, _)| i)
        .collect()
}
