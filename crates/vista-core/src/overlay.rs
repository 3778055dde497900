//! Interactive overlays: point markers, the editable polyline and 1-bit masks.

use kurbo::{Point, Rect, Size};

use crate::query::point_segment_distance;
use crate::selection::VertexSelection;

/// A 1-bit-per-pixel bitmap, packed row-major into 64-bit words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitMask {
    width: u32,
    height: u32,
    words: Vec<u64>,
}

impl BitMask {
    pub fn new(width: u32, height: u32) -> Self {
        let bits = width as usize * height as usize;
        Self {
            width,
            height,
            words: vec![0; bits.div_ceil(64)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn bit_index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bit_index(x, y)
            .is_some_and(|i| self.words[i / 64] & (1u64 << (i % 64)) != 0)
    }

    /// Set one pixel; coordinates outside the mask are ignored.
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if let Some(i) = self.bit_index(x, y) {
            let bit = 1u64 << (i % 64);
            if value {
                self.words[i / 64] |= bit;
            } else {
                self.words[i / 64] &= !bit;
            }
        }
    }

    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Stamp a filled disc centred at `center` (image coordinates).
    pub fn fill_circle(&mut self, center: Point, radius: f64, value: bool) {
        self.stroke_capsule(center, center, radius, value);
    }

    /// Fill every pixel whose centre lies within `radius` of segment `a`-`b`.
    pub fn stroke_capsule(&mut self, a: Point, b: Point, radius: f64, value: bool) {
        let bounds = Rect::from_points(a, b).inflate(radius, radius);
        let x0 = bounds.x0.floor().max(0.0) as u32;
        let y0 = bounds.y0.floor().max(0.0) as u32;
        let x1 = (bounds.x1.ceil().max(0.0) as u32).min(self.width);
        let y1 = (bounds.y1.ceil().max(0.0) as u32).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if point_segment_distance(center, a, b) <= radius {
                    self.set(x, y, value);
                }
            }
        }
    }
}

/// Ordered polyline with a selection of vertices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polyline {
    pub vertices: Vec<Point>,
    /// The selection is only meaningful while this is set.
    pub selected: bool,
    pub selection: VertexSelection,
}

impl Polyline {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self {
            vertices,
            selected: false,
            selection: VertexSelection::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Deselect the polyline and drop its vertex selection.
    pub fn deselect(&mut self) {
        self.selected = false;
        self.selection.clear();
    }

    /// Shift every selected vertex by `delta`, clamping into `bounds`.
    /// Returns whether any vertex actually moved.
    pub fn translate_selected(&mut self, delta: kurbo::Vec2, bounds: Size) -> bool {
        let mut moved = false;
        for index in self.selection.iter() {
            if let Some(v) = self.vertices.get_mut(index) {
                let next = clamp_to_image(*v + delta, bounds);
                if next != *v {
                    *v = next;
                    moved = true;
                }
            }
        }
        moved
    }
}

/// Clamp `p` into `[0, w] x [0, h]`.
pub fn clamp_to_image(p: Point, bounds: Size) -> Point {
    Point::new(p.x.clamp(0.0, bounds.width), p.y.clamp(0.0, bounds.height))
}
