//! Pointer interaction: press, move and release sequences turned into pan,
//! zoom, point and polyline edits, and mask painting.

mod event;
mod gesture;
mod mode;

pub use event::{CursorShape, Modifiers, PointerButton, PointerEvent, PointerResponse};
pub use gesture::{wrap_cursor, Gesture};
pub use mode::{InteractionFeature, InteractionMode};

use std::collections::BTreeSet;

use kurbo::{Point, Rect};
use tracing::debug;

use crate::consts::PAN_ZOOM_SENSITIVITY;
use crate::notify::ViewEvent;
use crate::query::{nearest_within, polyline_distance, selection_distance, vertices_in_rect};
use crate::transform::{map_vector, ViewGeometry};
use crate::view::ImageView;

impl ImageView {
    /// Start a gesture. The mode chosen here holds until [`pointer_up`](Self::pointer_up).
    pub fn pointer_down(&mut self, event: &PointerEvent) -> PointerResponse {
        let Some(geometry) = self.viewport.geometry() else {
            return PointerResponse::default();
        };
        self.gesture = Some(Gesture::new(event));
        let mode = self.resolve_press(event, &geometry);
        let cursor = press_cursor(&mode);
        debug!(?mode, button = ?event.button, "pointer down");
        self.mode = mode;
        PointerResponse::repaint(cursor)
    }

    fn resolve_press(&mut self, event: &PointerEvent, geometry: &ViewGeometry) -> InteractionMode {
        let forward = geometry.forward();
        let tolerance = self.config.grab_tolerance;
        let editing_polyline = self.feature.edits_polyline();
        let mods = event.modifiers;

        if editing_polyline && !self.polyline.is_empty() && mods.alt {
            if !mods.ctrl {
                self.polyline.selection.clear();
            }
            self.polyline.selected = true;
            return InteractionMode::RubberBandSelecting {
                origin: event.pos,
                current: event.pos,
                preview: BTreeSet::new(),
            };
        }

        let point_hit = if self.feature.manipulates_points() {
            nearest_within(&self.points, forward, event.pos, tolerance)
        } else {
            None
        };
        let vertex_hit = if editing_polyline {
            nearest_within(&self.polyline.vertices, forward, event.pos, tolerance)
        } else {
            None
        };
        let on_selection = editing_polyline
            && self.polyline.selected
            && selection_distance(
                &self.polyline.vertices,
                &self.polyline.selection,
                forward,
                event.pos,
            )
            .is_some_and(|d| d <= tolerance);

        if let Some(point) = point_hit {
            let vertex_closer = vertex_hit.is_some_and(|v| v.distance < point.distance);
            if !vertex_closer || !self.polyline.selected {
                return InteractionMode::PointGrabbed {
                    index: point.index,
                    delete_pending: false,
                };
            }
        }

        if editing_polyline && self.polyline.selected && (vertex_hit.is_some() || on_selection) {
            let plain = !mods.ctrl && !mods.shift;
            let grabs_selection = on_selection
                && vertex_hit.is_none_or(|v| self.polyline.selection.contains(v.index));
            if plain && grabs_selection {
                return InteractionMode::PolylineVertexGrabbed { moved: false };
            }
            if let Some(vertex) = vertex_hit {
                if mods.shift {
                    self.polyline.selection.extend_to(vertex.index);
                } else if mods.ctrl {
                    self.polyline.selection.toggle(vertex.index);
                } else {
                    self.polyline.selection.select_only(vertex.index);
                    return InteractionMode::PolylineVertexGrabbed { moved: false };
                }
            }
            return InteractionMode::Idle;
        }

        if event.button == PointerButton::Middle && self.config.pan_zoom_enabled {
            return InteractionMode::PanZooming {
                anchor: event.pos,
                initial: self.viewport.state(),
                travel_y: 0.0,
            };
        }

        if !self.painting || event.button == PointerButton::Middle {
            return InteractionMode::Dragging;
        }

        self.ensure_paint_mask();
        let value = event.button == PointerButton::Primary;
        let at = geometry.map_to_image(event.pos);
        let radius = self.config.brush_radius;
        if let Some(mask) = self.paint_mask.as_mut() {
            mask.fill_circle(at, radius, value);
        }
        self.touch_mask();
        InteractionMode::Painting { last: at, value }
    }

    /// Update the active gesture, or report the hover cursor when none is active.
    pub fn pointer_move(&mut self, event: &PointerEvent) -> PointerResponse {
        let Some(geometry) = self.viewport.geometry() else {
            return PointerResponse::default();
        };
        let Some(gesture) = self.gesture.as_mut() else {
            return PointerResponse::cursor(self.hover_cursor(event.pos, &geometry));
        };
        let delta = event.pos - gesture.last;
        gesture.last = event.pos;
        if event.pos != gesture.down {
            gesture.moved = true;
        }

        let mut mode = std::mem::take(&mut self.mode);
        let mut wraps = false;
        let mut cursor = press_cursor(&mode);
        match &mut mode {
            InteractionMode::Idle => {}
            InteractionMode::Dragging => {
                self.viewport.pan_by(delta);
                wraps = true;
            }
            InteractionMode::PointGrabbed {
                index,
                delete_pending,
            } => {
                let step = map_vector(geometry.scale_rotate().inverse(), delta);
                if let Some(p) = self.points.get_mut(*index) {
                    *p += step;
                    let widget = geometry.widget.to_rect();
                    *delete_pending =
                        !widget.contains(event.pos) || !geometry.contains_image_point(*p);
                }
                if *delete_pending {
                    cursor = CursorShape::DeletePending;
                }
            }
            InteractionMode::PolylineVertexGrabbed { moved } => {
                let step = map_vector(geometry.scale_rotate().inverse(), delta);
                if self.polyline.translate_selected(step, geometry.image) {
                    *moved = true;
                }
            }
            InteractionMode::RubberBandSelecting {
                origin,
                current,
                preview,
            } => {
                *current = event.pos;
                *preview = vertices_in_rect(
                    &self.polyline.vertices,
                    geometry.forward(),
                    Rect::from_points(*origin, *current),
                );
            }
            InteractionMode::Painting { last, value } => {
                let at = geometry.map_to_image(event.pos);
                let radius = self.config.brush_radius;
                if let Some(mask) = self.paint_mask.as_mut() {
                    mask.stroke_capsule(*last, at, radius, *value);
                }
                *last = at;
                self.touch_mask();
            }
            InteractionMode::PanZooming {
                anchor,
                initial,
                travel_y,
            } => {
                *travel_y += delta.y;
                self.viewport.restore(*initial);
                self.viewport
                    .zoom_by(-*travel_y * PAN_ZOOM_SENSITIVITY, *anchor);
                wraps = true;
            }
        }
        self.mode = mode;

        let warp_cursor = if wraps { self.wrap(event) } else { None };
        PointerResponse {
            repaint: true,
            cursor,
            warp_cursor,
        }
    }

    /// Wrap the cursor at the screen edge and shift the gesture's reference
    /// point by the same amount, so the next delta stays continuous.
    fn wrap(&mut self, event: &PointerEvent) -> Option<Point> {
        let bounds = self.screen_bounds?;
        let warped = wrap_cursor(event.global, bounds)?;
        if let Some(gesture) = self.gesture.as_mut() {
            gesture.last += warped - event.global;
        }
        Some(warped)
    }

    /// Finish the gesture and emit the notifications it produced.
    /// Releases of a button other than the one that started the gesture are ignored.
    pub fn pointer_up(&mut self, event: &PointerEvent) -> PointerResponse {
        let Some(gesture) = self.gesture.filter(|g| g.button == event.button) else {
            return PointerResponse::default();
        };
        self.gesture = None;
        let mode = std::mem::take(&mut self.mode);
        let Some(geometry) = self.viewport.geometry() else {
            return PointerResponse::default();
        };
        let moved = gesture.moved || event.pos != gesture.down;
        debug!(?mode, moved, "pointer up");

        let grabbed_point = matches!(mode, InteractionMode::PointGrabbed { .. });
        let plain_click = matches!(mode, InteractionMode::Idle | InteractionMode::Dragging);

        match mode {
            InteractionMode::PointGrabbed {
                index,
                delete_pending,
            } => {
                if delete_pending && index < self.points.len() {
                    self.points.remove(index);
                    self.events.emit(ViewEvent::PointDeleted(index));
                } else {
                    self.events.emit(ViewEvent::PointModified(index));
                }
            }
            InteractionMode::PolylineVertexGrabbed { moved: true } => {
                self.events.emit(ViewEvent::PolylineModified);
            }
            InteractionMode::RubberBandSelecting { preview, .. } => {
                self.polyline.selection.union_with(&preview);
            }
            InteractionMode::Painting { .. } => {
                self.events.emit(ViewEvent::MaskModified);
            }
            _ => {}
        }

        if !moved {
            let image_point = geometry.map_to_image(event.pos);
            let inside = geometry.contains_image_point(image_point);
            if self.feature.adds_points() {
                if inside && !grabbed_point {
                    self.points.push(image_point);
                    self.events.emit(ViewEvent::PointAdded(self.points.len() - 1));
                }
            } else if plain_click {
                self.click_without_add(event, &geometry);
            }
            if inside {
                self.events.emit(ViewEvent::PixelClicked {
                    x: image_point.x.floor() as i64,
                    y: image_point.y.floor() as i64,
                });
            }
        }

        let Some(geometry) = self.viewport.geometry() else {
            return PointerResponse::repaint(CursorShape::Default);
        };
        PointerResponse::repaint(self.hover_cursor(event.pos, &geometry))
    }

    fn click_without_add(&mut self, event: &PointerEvent, geometry: &ViewGeometry) {
        if self.feature.edits_polyline() {
            let near = polyline_distance(&self.polyline.vertices, geometry.forward(), event.pos)
                .is_some_and(|d| d <= self.config.grab_tolerance);
            if near {
                self.polyline.selected = true;
            } else {
                self.polyline.deselect();
            }
        }
        if event.button == PointerButton::Secondary && self.config.right_click_for_hundred_percent
        {
            if self.viewport.state().hundred_percent {
                self.viewport.zoom_to_fit();
            } else {
                self.viewport.zoom_to_hundred_percent(event.pos);
            }
        }
    }

    fn hover_cursor(&self, pos: Point, geometry: &ViewGeometry) -> CursorShape {
        let forward = geometry.forward();
        let tolerance = self.config.grab_tolerance;
        let over_point = self.feature.manipulates_points()
            && nearest_within(&self.points, forward, pos, tolerance).is_some();
        let over_vertex = self.feature.edits_polyline()
            && self.polyline.selected
            && nearest_within(&self.polyline.vertices, forward, pos, tolerance).is_some();
        if over_point || over_vertex {
            CursorShape::OpenHand
        } else if self.painting {
            CursorShape::Crosshair
        } else {
            CursorShape::Default
        }
    }
}

fn press_cursor(mode: &InteractionMode) -> CursorShape {
    match mode {
        InteractionMode::Idle => CursorShape::Default,
        InteractionMode::Dragging
        | InteractionMode::PointGrabbed { .. }
        | InteractionMode::PolylineVertexGrabbed { .. } => CursorShape::ClosedHand,
        InteractionMode::RubberBandSelecting { .. } | InteractionMode::Painting { .. } => {
            CursorShape::Crosshair
        }
        InteractionMode::PanZooming { .. } => CursorShape::Zoom,
    }
}

