//! Drawing seam between the view and whatever toolkit hosts it.
//!
//! The view never rasterizes anything itself. It describes a frame as calls
//! on a [`Surface`], all in widget coordinates except where a transform is
//! passed explicitly.

use kurbo::{Affine, Point, Rect};

use crate::config::Color;
use crate::overlay::BitMask;
use crate::raster::Raster;

/// Sampling used when the host maps a raster through its transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

impl FilterMode {
    pub fn from_smooth(smooth: bool) -> Self {
        if smooth {
            Self::Linear
        } else {
            Self::Nearest
        }
    }
}

/// Raster ready for display plus the transform that places it.
#[derive(Clone, Copy, Debug)]
pub struct DisplayFrame<'a> {
    pub raster: &'a Raster,
    /// Changes whenever the pixels of `raster` change, so hosts can cache
    /// uploaded textures.
    pub revision: u64,
    /// Raster pixels to widget coordinates.
    pub transform: Affine,
    pub filter: FilterMode,
}

/// Host-side renderer.
pub trait Surface {
    fn fill_background(&mut self, color: Color);

    fn draw_raster(&mut self, frame: &DisplayFrame<'_>);

    /// Tint set bits of `mask`; `transform` maps mask pixels to the widget.
    fn draw_mask(&mut self, mask: &BitMask, revision: u64, transform: Affine, color: Color);

    fn draw_polyline(&mut self, points: &[Point], width: f64, color: Color);

    fn draw_circle(&mut self, center: Point, radius: f64, fill: Option<Color>, stroke: Color);

    fn draw_rect(&mut self, rect: Rect, fill: Option<Color>, stroke: Color);

    /// Single line of text with its top-left corner at `pos`.
    fn draw_text(&mut self, pos: Point, text: &str, color: Color);
}

/// Extra content painted after the image and overlays, in registration order.
pub trait Drawable {
    fn paint(&mut self, surface: &mut dyn Surface);
}

impl<F: FnMut(&mut dyn Surface)> Drawable for F {
    fn paint(&mut self, surface: &mut dyn Surface) {
        self(surface)
    }
}

/// Colors and sizes of the built-in overlays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayStyle {
    pub outline: Color,
    pub point_radius: f64,
    pub vertex_radius: f64,
    pub line_width: f64,
}

impl OverlayStyle {
    pub fn new(outline: Color) -> Self {
        Self {
            outline,
            point_radius: 5.0,
            vertex_radius: 4.0,
            line_width: 2.0,
        }
    }

    pub fn highlight(&self) -> Color {
        Color::rgb(255, 210, 0)
    }

    pub fn delete_pending(&self) -> Color {
        Color::rgb(230, 40, 40)
    }

    pub fn mask_tint(&self) -> Color {
        self.outline.with_alpha(110)
    }
}
