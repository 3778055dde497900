//! The image view: owns the viewport, source image, overlays and display
//! cache, and exposes everything a host calls.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use tracing::{debug, info, warn};

use crate::config::{Color, ViewConfig};
use crate::consts::DOWNSAMPLE_SCALE_TOLERANCE;
use crate::error::Result;
use crate::interaction::{Gesture, InteractionFeature, InteractionMode};
use crate::notify::{EventBus, EventKind, ViewEvent};
use crate::overlay::{BitMask, Polyline};
use crate::raster::Raster;
use crate::render::{DisplayFrame, Drawable, FilterMode, OverlayStyle, Surface};
use crate::resample::{DevicePreference, ResampleRequest, Resampler, SharpenParams};
use crate::selection::VertexSelection;
use crate::viewport::{Viewport, ViewportState};

/// What a cached display raster was computed for.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ResampleKey {
    image_revision: u64,
    scale: f64,
    sharpen: Option<SharpenParams>,
}

#[derive(Debug)]
struct DisplayCache {
    key: ResampleKey,
    raster: Raster,
    revision: u64,
}

#[derive(Debug)]
struct Precomputed {
    raster: Raster,
    revision: u64,
}

/// Image viewing widget core.
///
/// All methods are synchronous and expected to run on the UI thread. Zoom, pan
/// and rotation calls are silently ignored while no image is assigned.
pub struct ImageView {
    pub(crate) config: ViewConfig,
    pub(crate) viewport: Viewport,
    image: Option<Raster>,
    image_revision: u64,
    precomputed: Option<Precomputed>,
    display: Option<DisplayCache>,
    resampler: Resampler,
    next_revision: u64,
    pub(crate) points: Vec<Point>,
    pub(crate) polyline: Polyline,
    pub(crate) paint_mask: Option<BitMask>,
    overlay_mask: Option<BitMask>,
    overlay_mask_color: Color,
    paint_mask_revision: u64,
    overlay_mask_revision: u64,
    pub(crate) feature: InteractionFeature,
    pub(crate) painting: bool,
    pub(crate) mode: InteractionMode,
    pub(crate) gesture: Option<Gesture>,
    pub(crate) screen_bounds: Option<Rect>,
    pub(crate) events: EventBus,
    post_paint: Vec<Box<dyn Drawable>>,
}

impl std::fmt::Debug for ImageView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageView")
            .field("viewport", &self.viewport)
            .field("image", &self.image.as_ref().map(Raster::size))
            .field("points", &self.points.len())
            .field("polyline", &self.polyline.len())
            .field("feature", &self.feature)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl ImageView {
    pub fn new(widget: Size) -> Self {
        Self::with_config(widget, ViewConfig::default())
    }

    pub fn with_config(widget: Size, config: ViewConfig) -> Self {
        let mut viewport = Viewport::new(widget);
        viewport.set_zoom_base(config.zoom_base);
        viewport.set_prevent_magnification(config.prevent_magnification);
        let resampler = Resampler::new(config.use_gpu);
        Self {
            overlay_mask_color: Color::rgba(255, 0, 0, 90),
            config,
            viewport,
            image: None,
            image_revision: 0,
            precomputed: None,
            display: None,
            resampler,
            next_revision: 1,
            points: Vec::new(),
            polyline: Polyline::default(),
            paint_mask: None,
            overlay_mask: None,
            paint_mask_revision: 0,
            overlay_mask_revision: 0,
            feature: InteractionFeature::None,
            painting: false,
            mode: InteractionMode::Idle,
            gesture: None,
            screen_bounds: None,
            events: EventBus::new(),
            post_paint: Vec::new(),
        }
    }

    /// Replace the resampler, e.g. with one using an injected backend.
    pub fn with_resampler(mut self, resampler: Resampler) -> Self {
        self.resampler = resampler;
        self.display = None;
        self
    }

    fn bump_revision(&mut self) -> u64 {
        let r = self.next_revision;
        self.next_revision += 1;
        r
    }

    // ---- image assignment ----

    /// Take ownership of `raster` as the new source image.
    ///
    /// If the dimensions differ from the previous image, the paint mask,
    /// overlay mask and 100% mode are reset.
    pub fn assign_image(&mut self, raster: Raster) {
        self.install_image(raster, None);
    }

    /// Like [`assign_image`](Self::assign_image), also taking a downsampled
    /// copy that is shown while the view scale matches its size.
    pub fn assign_image_with_downsampled(&mut self, raster: Raster, downsampled: Raster) {
        self.install_image(raster, Some(downsampled));
    }

    /// Validate and assign a raw 8-bit buffer. On failure the previous image
    /// stays in place.
    pub fn assign_raw(
        &mut self,
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<()> {
        match Raster::from_raw(width, height, channels, data) {
            Ok(raster) => {
                self.assign_image(raster);
                Ok(())
            }
            Err(e) => {
                warn!(width, height, channels, "image assignment refused: {e}");
                Err(e)
            }
        }
    }

    fn install_image(&mut self, raster: Raster, downsampled: Option<Raster>) {
        let size = raster.size();
        let dims_changed = self.image.as_ref().map(Raster::size) != Some(size);
        info!(
            width = size.0,
            height = size.1,
            channels = raster.channels(),
            precomputed = downsampled.is_some(),
            "image assigned"
        );
        if dims_changed {
            self.paint_mask = None;
            self.overlay_mask = None;
            self.paint_mask_revision = self.bump_revision();
            self.overlay_mask_revision = self.bump_revision();
        }
        self.cancel_gesture();
        self.image_revision = self.bump_revision();
        self.precomputed = match downsampled {
            Some(raster) => Some(Precomputed {
                raster,
                revision: self.bump_revision(),
            }),
            None => None,
        };
        self.display = None;
        self.image = Some(raster);
        self.viewport
            .set_image_size(Some(Size::new(size.0 as f64, size.1 as f64)));
        if self.painting {
            self.ensure_paint_mask();
        }
    }

    /// Drop the image and return the view to fit, no pan, no rotation.
    pub fn reset_image(&mut self) {
        self.cancel_gesture();
        self.image = None;
        self.precomputed = None;
        self.display = None;
        self.paint_mask = None;
        self.overlay_mask = None;
        self.viewport.reset();
        self.viewport.set_image_size(None);
        debug!("image reset");
    }

    pub fn image_assigned(&self) -> bool {
        self.image.is_some()
    }

    pub fn image(&self) -> Option<&Raster> {
        self.image.as_ref()
    }

    // ---- geometry ----

    pub fn widget_size(&self) -> Size {
        self.viewport.widget_size()
    }

    pub fn resize(&mut self, widget: Size) {
        self.viewport.set_widget_size(widget);
    }

    /// Forward transform from image pixels to widget coordinates.
    pub fn transform(&self) -> Option<Affine> {
        self.viewport.geometry().map(|g| g.forward())
    }

    /// Image coordinate under `screen`, or `None` outside the image.
    pub fn map_to_image_coordinates(&self, screen: Point) -> Option<Point> {
        let geometry = self.viewport.geometry()?;
        let p = geometry.map_to_image(screen);
        geometry.contains_image_point(p).then_some(p)
    }

    pub fn map_from_image(&self, image: Point) -> Option<Point> {
        self.viewport.geometry().map(|g| g.map_from_image(image))
    }

    /// Screen pixels per image pixel, `None` without an image.
    pub fn current_scaling_factor(&self) -> Option<f64> {
        self.viewport.scaling_factor()
    }

    /// Part of the image visible in the widget, in image coordinates.
    pub fn visible_image_rect(&self) -> Option<Rect> {
        let geometry = self.viewport.geometry()?;
        let inverse = geometry.inverse();
        let w = geometry.widget;
        let corners = [
            Point::ZERO,
            Point::new(w.width, 0.0),
            Point::new(0.0, w.height),
            Point::new(w.width, w.height),
        ];
        let bounds = corners
            .iter()
            .map(|&c| inverse * c)
            .fold(None::<Rect>, |acc, p| match acc {
                Some(r) => Some(r.union_pt(p)),
                None => Some(Rect::from_points(p, p)),
            })?;
        let visible = bounds.intersect(geometry.image.to_rect());
        (visible.area() > 0.0).then_some(visible)
    }

    // ---- zoom, pan, rotation ----

    pub fn viewport_state(&self) -> ViewportState {
        self.viewport.state()
    }

    pub fn zoom_exponent(&self) -> f64 {
        self.viewport.state().zoom_exponent
    }

    pub fn pan_offset(&self) -> Vec2 {
        self.viewport.state().pan_offset
    }

    pub fn rotation(&self) -> f64 {
        self.viewport.state().rotation_degrees
    }

    pub fn is_hundred_percent(&self) -> bool {
        self.viewport.state().hundred_percent
    }

    pub fn zoom_by(&mut self, delta: f64, anchor: Point) {
        self.viewport.zoom_by(delta, anchor);
    }

    pub fn zoom_to_fit(&mut self) {
        self.viewport.zoom_to_fit();
    }

    pub fn zoom_to_hundred_percent(&mut self, anchor: Point) {
        self.viewport.zoom_to_hundred_percent(anchor);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.viewport.pan_by(delta);
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.viewport.set_rotation(degrees);
    }

    pub fn rotate_by(&mut self, degrees: f64) {
        self.viewport.rotate_by(degrees);
    }

    // ---- configuration ----

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Apply a whole configuration, invalidating the display raster when
    /// anything resample-related changed.
    pub fn set_config(&mut self, config: ViewConfig) {
        if self.config.affects_resampling(&config) {
            debug!("resample settings changed");
            self.display = None;
        }
        self.viewport.set_zoom_base(config.zoom_base);
        self.viewport
            .set_prevent_magnification(config.prevent_magnification);
        self.resampler.set_preference(config.use_gpu);
        self.config = config;
    }

    fn update_config(&mut self, apply: impl FnOnce(&mut ViewConfig)) {
        let mut next = self.config.clone();
        apply(&mut next);
        self.set_config(next);
    }

    pub fn set_high_quality_downscaling(&mut self, enabled: bool) {
        self.update_config(|c| c.high_quality_downscaling = enabled);
    }

    pub fn set_smooth_transform(&mut self, enabled: bool) {
        self.update_config(|c| c.smooth_transform = enabled);
    }

    pub fn set_use_gpu(&mut self, preference: DevicePreference) {
        self.update_config(|c| c.use_gpu = preference);
    }

    pub fn set_sharpening(&mut self, enabled: bool, strength: f32, radius: f32) {
        self.update_config(|c| {
            c.sharpen.enabled = enabled;
            c.sharpen.strength = strength;
            c.sharpen.radius = radius;
        });
    }

    pub fn set_brush_radius(&mut self, radius: f64) {
        self.update_config(|c| c.brush_radius = radius.max(0.0));
    }

    pub fn set_outline_color(&mut self, color: Color) {
        self.update_config(|c| c.outline_color = color);
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.update_config(|c| c.background_color = color);
    }

    pub fn set_pan_zoom_enabled(&mut self, enabled: bool) {
        self.update_config(|c| c.pan_zoom_enabled = enabled);
    }

    pub fn set_right_click_for_hundred_percent(&mut self, enabled: bool) {
        self.update_config(|c| c.right_click_for_hundred_percent = enabled);
    }

    pub fn set_prevent_magnification(&mut self, enabled: bool) {
        self.update_config(|c| c.prevent_magnification = enabled);
    }

    pub fn set_grab_tolerance(&mut self, pixels: f64) {
        self.update_config(|c| c.grab_tolerance = pixels.max(0.0));
    }

    pub fn set_zoom_base(&mut self, base: f64) {
        self.update_config(|c| c.zoom_base = base);
    }

    /// Name of the backend the next resample tries first.
    pub fn resample_backend_name(&self) -> &str {
        self.resampler.active_backend_name()
    }

    // ---- overlays ----

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn set_points(&mut self, points: Vec<Point>) {
        self.cancel_gesture();
        self.points = points;
    }

    /// Append a point and return its index.
    pub fn add_point(&mut self, p: Point) -> usize {
        self.points.push(p);
        self.points.len() - 1
    }

    pub fn delete_point(&mut self, index: usize) -> Option<Point> {
        if index >= self.points.len() {
            return None;
        }
        self.cancel_gesture();
        Some(self.points.remove(index))
    }

    pub fn clear_points(&mut self) {
        self.cancel_gesture();
        self.points.clear();
    }

    pub fn polyline(&self) -> &Polyline {
        &self.polyline
    }

    pub fn polyline_selection(&self) -> &VertexSelection {
        &self.polyline.selection
    }

    /// Replace the polyline vertices, keeping the selection where valid.
    pub fn set_polyline(&mut self, vertices: Vec<Point>) {
        self.cancel_gesture();
        self.polyline.vertices = vertices;
        let len = self.polyline.len();
        self.polyline.selection.retain_below(len);
    }

    pub fn clear_polyline(&mut self) {
        self.cancel_gesture();
        self.polyline = Polyline::default();
    }

    pub fn set_polyline_selected(&mut self, selected: bool) {
        if selected {
            self.polyline.selected = true;
        } else {
            self.polyline.deselect();
        }
    }

    pub fn paint_mask(&self) -> Option<&BitMask> {
        self.paint_mask.as_ref()
    }

    pub fn take_paint_mask(&mut self) -> Option<BitMask> {
        self.touch_mask();
        self.paint_mask.take()
    }

    pub fn clear_paint_mask(&mut self) {
        if let Some(mask) = self.paint_mask.as_mut() {
            mask.clear();
            self.paint_mask_revision = self.bump_revision();
        }
    }

    pub fn overlay_mask(&self) -> Option<&BitMask> {
        self.overlay_mask.as_ref()
    }

    /// Show an externally supplied mask as a translucent layer.
    pub fn set_overlay_mask(&mut self, mask: Option<BitMask>) {
        self.overlay_mask = mask;
        self.overlay_mask_revision = self.bump_revision();
    }

    pub fn set_overlay_mask_color(&mut self, color: Color) {
        self.overlay_mask_color = color;
    }

    pub(crate) fn ensure_paint_mask(&mut self) {
        let Some((w, h)) = self.image.as_ref().map(Raster::size) else {
            return;
        };
        if self.paint_mask.as_ref().map(BitMask::size) != Some((w, h)) {
            debug!(w, h, "allocating paint mask");
            self.paint_mask = Some(BitMask::new(w, h));
            self.touch_mask();
        }
    }

    /// Mark the paint mask as changed; the overlay mask keeps its revision.
    pub(crate) fn touch_mask(&mut self) {
        self.paint_mask_revision = self.bump_revision();
    }

    // ---- interaction flags ----

    pub fn interaction_feature(&self) -> InteractionFeature {
        self.feature
    }

    pub fn set_interaction_feature(&mut self, feature: InteractionFeature) {
        if feature != self.feature {
            self.cancel_gesture();
            if !feature.edits_polyline() {
                self.polyline.deselect();
            }
            self.feature = feature;
        }
    }

    pub fn painting_active(&self) -> bool {
        self.painting
    }

    /// Toggle mask painting; the mask is allocated on first activation.
    pub fn set_painting_active(&mut self, active: bool) {
        self.cancel_gesture();
        self.painting = active;
        if active {
            self.ensure_paint_mask();
        }
    }

    pub fn interaction_mode(&self) -> &InteractionMode {
        &self.mode
    }

    /// Desktop rectangle used for cursor wrapping during drags; `None`
    /// disables wrapping.
    pub fn set_screen_bounds(&mut self, bounds: Option<Rect>) {
        self.screen_bounds = bounds;
    }

    pub(crate) fn cancel_gesture(&mut self) {
        self.gesture = None;
        self.mode = InteractionMode::Idle;
    }

    // ---- notifications and hooks ----

    pub fn subscribe(&mut self, kind: EventKind, callback: impl FnMut(&ViewEvent) + 'static) {
        self.events.subscribe(kind, callback);
    }

    pub fn subscribe_all(&mut self, callback: impl FnMut(&ViewEvent) + 'static) {
        self.events.subscribe_all(callback);
    }

    /// Register content painted after the view's own rendering.
    pub fn add_post_paint(&mut self, drawable: impl Drawable + 'static) {
        self.post_paint.push(Box::new(drawable));
    }

    pub fn clear_post_paint(&mut self) {
        self.post_paint.clear();
    }

    // ---- display ----

    fn resample_key(&self, scale: f64) -> ResampleKey {
        ResampleKey {
            image_revision: self.image_revision,
            scale,
            sharpen: self.config.sharpen.params(),
        }
    }

    fn downscaling(&self) -> Option<f64> {
        let scale = self.viewport.scaling_factor()?;
        (self.config.high_quality_downscaling && scale < 1.0).then_some(scale)
    }

    fn precomputed_for(&self, scale: f64) -> Option<&Precomputed> {
        let image = self.image.as_ref()?;
        self.precomputed.as_ref().filter(|p| {
            let realised = p.raster.width() as f64 / image.width() as f64;
            (realised - scale).abs() <= DOWNSAMPLE_SCALE_TOLERANCE
        })
    }

    /// Bring the downsampled display raster up to date. Cheap when nothing
    /// relevant changed since the last call.
    pub fn prepare_display(&mut self) {
        let Some(scale) = self.downscaling() else {
            return;
        };
        if self.precomputed_for(scale).is_some() {
            return;
        }
        let key = self.resample_key(scale);
        if self.display.as_ref().is_some_and(|c| c.key == key) {
            return;
        }
        let Some(image) = self.image.as_ref() else {
            return;
        };
        let request = ResampleRequest {
            scale,
            sharpen: key.sharpen,
        };
        self.display = match self.resampler.resample(image, &request) {
            Some(raster) => Some(DisplayCache {
                key,
                raster,
                revision: self.bump_revision(),
            }),
            None => None,
        };
    }

    /// The raster to draw and its placement. Call
    /// [`prepare_display`](Self::prepare_display) first to get the
    /// downsampled variant; otherwise the full image is returned.
    pub fn display_frame(&self) -> Option<DisplayFrame<'_>> {
        let image = self.image.as_ref()?;
        let geometry = self.viewport.geometry()?;
        let filter = FilterMode::from_smooth(self.config.smooth_transform);

        if let Some(scale) = self.downscaling() {
            let small = self
                .precomputed_for(scale)
                .map(|p| (&p.raster, p.revision))
                .or_else(|| {
                    let key = self.resample_key(scale);
                    self.display
                        .as_ref()
                        .filter(|c| c.key == key)
                        .map(|c| (&c.raster, c.revision))
                });
            if let Some((raster, revision)) = small {
                let size = Size::new(raster.width() as f64, raster.height() as f64);
                return Some(DisplayFrame {
                    raster,
                    revision,
                    transform: geometry.downsampled(size),
                    filter,
                });
            }
        }

        Some(DisplayFrame {
            raster: image,
            revision: self.image_revision,
            transform: geometry.forward(),
            filter,
        })
    }

    /// Render one frame onto `surface`: background, image, masks, overlays,
    /// then every post-paint drawable.
    pub fn paint(&mut self, surface: &mut dyn Surface) {
        self.prepare_display();
        surface.fill_background(self.config.background_color);

        if let Some(frame) = self.display_frame() {
            surface.draw_raster(&frame);
        }
        if let Some(forward) = self.transform() {
            self.paint_overlays(surface, forward);
        }
        for drawable in &mut self.post_paint {
            drawable.paint(surface);
        }
    }

    fn paint_overlays(&self, surface: &mut dyn Surface, forward: Affine) {
        let style = OverlayStyle::new(self.config.outline_color);

        if let Some(mask) = &self.overlay_mask {
            surface.draw_mask(
                mask,
                self.overlay_mask_revision,
                forward,
                self.overlay_mask_color,
            );
        }
        if let Some(mask) = &self.paint_mask {
            surface.draw_mask(mask, self.paint_mask_revision, forward, style.mask_tint());
        }

        if !self.polyline.is_empty() {
            let screen: Vec<Point> = self.polyline.vertices.iter().map(|&v| forward * v).collect();
            surface.draw_polyline(&screen, style.line_width, style.outline);
            if self.polyline.selected {
                let preview = match &self.mode {
                    InteractionMode::RubberBandSelecting { preview, .. } => Some(preview),
                    _ => None,
                };
                for (i, &p) in screen.iter().enumerate() {
                    let highlighted = self.polyline.selection.contains(i)
                        || preview.is_some_and(|s| s.contains(&i));
                    let fill = highlighted.then_some(style.highlight());
                    surface.draw_circle(p, style.vertex_radius, fill, style.outline);
                }
                for i in self.polyline.selection.iter() {
                    if self.polyline.selection.contains(i + 1) && i + 1 < screen.len() {
                        surface.draw_polyline(
                            &screen[i..=i + 1],
                            style.line_width,
                            style.highlight(),
                        );
                    }
                }
            }
        }

        if let InteractionMode::RubberBandSelecting {
            origin, current, ..
        } = &self.mode
        {
            surface.draw_rect(
                Rect::from_points(*origin, *current),
                Some(style.outline.with_alpha(40)),
                style.outline,
            );
        }

        let pending = match self.mode {
            InteractionMode::PointGrabbed {
                index,
                delete_pending: true,
            } => Some(index),
            _ => None,
        };
        for (i, &p) in self.points.iter().enumerate() {
            let color = if pending == Some(i) {
                style.delete_pending()
            } else {
                style.outline
            };
            surface.draw_circle(
                forward * p,
                style.point_radius,
                Some(color.with_alpha(160)),
                color,
            );
        }
    }
}
