//! Zoom, pan and rotation state plus the rules that keep it consistent.

use kurbo::{Point, Size, Vec2};
use tracing::debug;

use crate::consts::{DEFAULT_ZOOM_BASE, EPSILON};
use crate::transform::{map_vector, ViewGeometry};

/// User-controlled view parameters. The transform is always derived from
/// these, never stored alongside them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    /// Magnification over the fit scale is `zoom_base ^ zoom_exponent`.
    pub zoom_exponent: f64,
    /// Pan in the rotated, pre-zoom frame.
    pub pan_offset: Vec2,
    /// Normalized to `[0, 360)`.
    pub rotation_degrees: f64,
    /// Track exact 1:1 magnification across resizes instead of the fit.
    pub hundred_percent: bool,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom_exponent: 0.0,
            pan_offset: Vec2::ZERO,
            rotation_degrees: 0.0,
            hundred_percent: false,
        }
    }
}

/// Pan/zoom controller. Every mutator is a no-op while no image size is known.
#[derive(Clone, Debug)]
pub struct Viewport {
    state: ViewportState,
    widget: Size,
    image: Option<Size>,
    zoom_base: f64,
    prevent_magnification: bool,
}

pub fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

impl Viewport {
    pub fn new(widget: Size) -> Self {
        Self {
            state: ViewportState::default(),
            widget,
            image: None,
            zoom_base: DEFAULT_ZOOM_BASE,
            prevent_magnification: false,
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    /// Restore a previously captured state, re-applying pan limits.
    pub fn restore(&mut self, state: ViewportState) {
        self.state = state;
        self.enforce_pan_constraints();
    }

    pub fn widget_size(&self) -> Size {
        self.widget
    }

    pub fn image_size(&self) -> Option<Size> {
        self.image
    }

    pub fn zoom_base(&self) -> f64 {
        self.zoom_base
    }

    pub fn set_zoom_base(&mut self, base: f64) {
        if base > 1.0 + EPSILON {
            self.zoom_base = base;
            self.refresh_hundred_percent();
            self.enforce_pan_constraints();
        }
    }

    pub fn prevent_magnification(&self) -> bool {
        self.prevent_magnification
    }

    pub fn set_prevent_magnification(&mut self, enabled: bool) {
        self.prevent_magnification = enabled;
        self.refresh_hundred_percent();
        self.enforce_pan_constraints();
    }

    /// Current transform inputs, or `None` without an image.
    pub fn geometry(&self) -> Option<ViewGeometry> {
        self.image.map(|image| ViewGeometry {
            widget: self.widget,
            image,
            zoom_exponent: self.state.zoom_exponent,
            zoom_base: self.zoom_base,
            pan: self.state.pan_offset,
            rotation_degrees: self.state.rotation_degrees,
            prevent_magnification: self.prevent_magnification,
        })
    }

    /// Screen pixels per image pixel, `None` without an image.
    pub fn scaling_factor(&self) -> Option<f64> {
        self.geometry().map(|g| g.scale_factor())
    }

    /// Install a new image size. A change of dimensions leaves 100% mode.
    pub fn set_image_size(&mut self, image: Option<Size>) {
        if self.image != image {
            self.state.hundred_percent = false;
        }
        self.image = image;
        self.enforce_pan_constraints();
    }

    /// Back to fit, no pan, no rotation.
    pub fn reset(&mut self) {
        self.state = ViewportState::default();
    }

    pub fn set_widget_size(&mut self, widget: Size) {
        self.widget = widget;
        self.refresh_hundred_percent();
        self.enforce_pan_constraints();
    }

    /// Change the zoom exponent by `delta`, keeping the image point under
    /// `anchor` in place. The exponent never drops below 0.
    pub fn zoom_by(&mut self, delta: f64, anchor: Point) {
        if self.image.is_none() {
            return;
        }
        // Fit is the floor, unless 100% already sits below it.
        let floor = self.state.zoom_exponent.min(0.0);
        let target = (self.state.zoom_exponent + delta).max(floor);
        self.state.hundred_percent = false;
        self.set_exponent_keeping_anchor(target, anchor);
    }

    pub fn zoom_to_fit(&mut self) {
        if self.image.is_none() {
            return;
        }
        self.state.zoom_exponent = 0.0;
        self.state.hundred_percent = false;
        self.enforce_pan_constraints();
    }

    /// Zoom so one image pixel covers exactly one screen pixel.
    pub fn zoom_to_hundred_percent(&mut self, anchor: Point) {
        let Some(exponent) = self.hundred_percent_exponent() else {
            return;
        };
        self.set_exponent_keeping_anchor(exponent, anchor);
        self.state.hundred_percent = true;
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        let Some(geometry) = self.geometry() else {
            return;
        };
        let image_delta = map_vector(geometry.scale_only().inverse(), delta);
        self.state.pan_offset += image_delta;
        self.enforce_pan_constraints();
    }

    pub fn set_pan_offset(&mut self, pan: Vec2) {
        if self.image.is_none() {
            return;
        }
        self.state.pan_offset = pan;
        self.enforce_pan_constraints();
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        if self.image.is_none() {
            return;
        }
        self.state.rotation_degrees = normalize_degrees(degrees);
        self.refresh_hundred_percent();
        self.enforce_pan_constraints();
    }

    pub fn rotate_by(&mut self, degrees: f64) {
        self.set_rotation(self.state.rotation_degrees + degrees);
    }

    /// Largest pan magnitude per axis that keeps the view inside the image.
    pub fn pan_limits(&self) -> Vec2 {
        let Some(g) = self.geometry() else {
            return Vec2::ZERO;
        };
        let eff = g.effective_image_size();
        let visible = g.fit_scale() * g.zoom_factor();
        Vec2::new(
            ((eff.width - self.widget.width / visible) / 2.0).max(0.0),
            ((eff.height - self.widget.height / visible) / 2.0).max(0.0),
        )
    }

    /// Clamp the pan offset into `[-limit, limit]` on each axis.
    pub fn enforce_pan_constraints(&mut self) {
        if self.image.is_none() {
            return;
        }
        let limit = self.pan_limits();
        let pan = &mut self.state.pan_offset;
        pan.x = pan.x.clamp(-limit.x, limit.x);
        pan.y = pan.y.clamp(-limit.y, limit.y);
    }

    fn hundred_percent_exponent(&self) -> Option<f64> {
        let g = self.geometry()?;
        Some((1.0 / g.fit_scale()).ln() / self.zoom_base.ln())
    }

    fn refresh_hundred_percent(&mut self) {
        if !self.state.hundred_percent {
            return;
        }
        if let Some(exponent) = self.hundred_percent_exponent() {
            debug!(exponent, "keeping 100% magnification");
            self.state.zoom_exponent = exponent;
        }
    }

    fn set_exponent_keeping_anchor(&mut self, exponent: f64, anchor: Point) {
        let Some(before) = self.geometry() else {
            return;
        };
        let p0 = before.map_to_image(anchor);
        self.state.zoom_exponent = exponent;
        let Some(after) = self.geometry() else {
            return;
        };
        let p1 = after.map_to_image(anchor);
        self.state.pan_offset += map_vector(after.rotate_only(), p1 - p0);
        self.enforce_pan_constraints();
    }
}
