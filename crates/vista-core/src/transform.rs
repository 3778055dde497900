//! Affine chain between image pixels and widget coordinates.
//!
//! Every transform here is derived from a [`ViewGeometry`] snapshot; nothing is
//! cached, so the chain can never drift from the zoom/pan/rotation state that
//! produced it.

use kurbo::{Affine, Point, Size, Vec2};

use crate::consts::EPSILON;

/// Snapshot of everything the transform chain depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewGeometry {
    /// Widget size in screen pixels.
    pub widget: Size,
    /// Source image size in image pixels.
    pub image: Size,
    pub zoom_exponent: f64,
    pub zoom_base: f64,
    /// Pan offset in the rotated, pre-zoom frame.
    pub pan: Vec2,
    /// Rotation in degrees, clockwise on screen.
    pub rotation_degrees: f64,
    /// Clamp the fit scale to at most 1 so small images are not magnified.
    pub prevent_magnification: bool,
}

/// Size of the axis-aligned bounding box of `size` rotated by `degrees`.
pub fn rotated_bounds(size: Size, degrees: f64) -> Size {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    Size::new(
        size.width * cos + size.height * sin,
        size.width * sin + size.height * cos,
    )
}

impl ViewGeometry {
    pub fn image_center(&self) -> Vec2 {
        Vec2::new(self.image.width / 2.0, self.image.height / 2.0)
    }

    /// Bounding box of the image after rotation.
    pub fn effective_image_size(&self) -> Size {
        rotated_bounds(self.image, self.rotation_degrees)
    }

    /// Scale at which the rotated image exactly fits the widget.
    pub fn fit_scale(&self) -> f64 {
        let eff = self.effective_image_size();
        if eff.width <= EPSILON || eff.height <= EPSILON {
            return 1.0;
        }
        let mut fit = (self.widget.width / eff.width).min(self.widget.height / eff.height);
        if self.prevent_magnification {
            fit = fit.min(1.0);
        }
        fit.max(EPSILON)
    }

    /// User zoom on top of the fit scale: `zoom_base ^ zoom_exponent`.
    pub fn zoom_factor(&self) -> f64 {
        self.zoom_base.powf(self.zoom_exponent)
    }

    /// Screen pixels per image pixel.
    pub fn scale_factor(&self) -> f64 {
        self.fit_scale() * self.zoom_factor()
    }

    fn rotation(&self) -> Affine {
        Affine::rotate(self.rotation_degrees.to_radians())
    }

    /// Image space to widget space.
    pub fn forward(&self) -> Affine {
        let fit = self.fit_scale();
        let c = self.image_center();
        let centering = Vec2::new(
            self.widget.width / fit / 2.0 - c.x,
            self.widget.height / fit / 2.0 - c.y,
        );
        Affine::scale(fit)
            * Affine::translate(centering)
            * Affine::translate(c)
            * Affine::scale(self.zoom_factor())
            * Affine::translate(self.pan)
            * self.rotation()
            * Affine::translate(-c)
    }

    /// Widget space to image space.
    pub fn inverse(&self) -> Affine {
        self.forward().inverse()
    }

    /// Transform for a raster already downsampled to `downsampled` pixels.
    ///
    /// Zoom and fit are baked into the smaller raster, so only the residual
    /// rounding between the requested and the realised size is scaled here.
    /// The pan offset is scaled by the effective scale factor.
    pub fn downsampled(&self, downsampled: Size) -> Affine {
        let s = self.scale_factor();
        let residual_x = s * self.image.width / downsampled.width.max(EPSILON);
        let residual_y = s * self.image.height / downsampled.height.max(EPSILON);
        let widget_center = Vec2::new(self.widget.width / 2.0, self.widget.height / 2.0);
        Affine::translate(widget_center)
            * Affine::translate(self.pan * s)
            * self.rotation()
            * Affine::scale_non_uniform(residual_x, residual_y)
            * Affine::translate(Vec2::new(-downsampled.width / 2.0, -downsampled.height / 2.0))
    }

    /// Scale and rotation without translation, for converting deltas.
    pub fn scale_rotate(&self) -> Affine {
        Affine::scale(self.scale_factor()) * self.rotation()
    }

    pub fn scale_only(&self) -> Affine {
        Affine::scale(self.scale_factor())
    }

    pub fn rotate_only(&self) -> Affine {
        self.rotation()
    }

    pub fn map_to_image(&self, screen: Point) -> Point {
        self.inverse() * screen
    }

    pub fn map_from_image(&self, image: Point) -> Point {
        self.forward() * image
    }

    /// Whether `p` lies inside `[0, w) x [0, h)`.
    pub fn contains_image_point(&self, p: Point) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.image.width && p.y < self.image.height
    }
}

/// Apply the linear part of `affine` to a vector.
pub fn map_vector(affine: Affine, v: Vec2) -> Vec2 {
    let [a, b, c, d, _, _] = affine.as_coeffs();
    Vec2::new(a * v.x + c * v.y, b * v.x + d * v.y)
}
