use kurbo::{Point, Size};
use vista_core::interaction::{PointerButton, PointerEvent, PointerResponse};

use crate::app::VistaApp;
use crate::convert::{to_button, to_cursor_icon, to_modifiers, to_point, to_pos2};
use crate::surface::EguiSurface;

/// Scroll distance, in points, that changes the zoom exponent by one.
const WHEEL_POINTS_PER_STEP: f64 = 50.0;

pub fn show(ctx: &egui::Context, app: &mut VistaApp) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let rect = ui.available_rect_before_wrap();
            let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());

            let size = Size::new(rect.width() as f64, rect.height() as f64);
            if app.view.widget_size() != size {
                app.view.resize(size);
            }

            if !app.view.image_assigned() {
                ui.painter()
                    .rect_filled(rect, 0.0, egui::Color32::from_gray(30));
                show_placeholder(ui);
                return;
            }

            let screen = ctx.screen_rect();
            app.view.set_screen_bounds(Some(kurbo::Rect::new(
                screen.min.x as f64,
                screen.min.y as f64,
                screen.max.x as f64,
                screen.max.y as f64,
            )));

            handle_pointer(ctx, ui, &response, app, rect);
            handle_wheel(ui, &response, app, rect);
            if response.double_clicked_by(egui::PointerButton::Primary) {
                app.view.zoom_to_fit();
            }

            app.textures.begin_frame();
            let painter = ui.painter_at(rect);
            let mut surface = EguiSurface {
                painter: &painter,
                origin: rect.min.to_vec2(),
                rect,
                cache: &mut app.textures,
            };
            app.view.paint(&mut surface);
        });
}

/// Forward raw pointer events to the view in widget coordinates.
fn handle_pointer(
    ctx: &egui::Context,
    ui: &egui::Ui,
    response: &egui::Response,
    app: &mut VistaApp,
    rect: egui::Rect,
) {
    let events = ui.input(|i| i.events.clone());
    let modifiers = to_modifiers(ui.input(|i| i.modifiers));
    let local = |pos: egui::Pos2| to_point(pos - rect.min.to_vec2());

    for event in events {
        let result = match event {
            egui::Event::PointerButton {
                pos,
                button,
                pressed,
                modifiers: mods,
                ..
            } => {
                let Some(button) = to_button(button) else {
                    continue;
                };
                let pointer = PointerEvent::new(local(pos), button)
                    .with_modifiers(to_modifiers(mods))
                    .with_global(to_point(pos));
                if pressed {
                    if !response.hovered() || app.ui_state.pressed.is_some() {
                        continue;
                    }
                    app.ui_state.pressed = Some(button);
                    app.view.pointer_down(&pointer)
                } else if app.ui_state.pressed == Some(button) {
                    app.ui_state.pressed = None;
                    app.view.pointer_up(&pointer)
                } else {
                    continue;
                }
            }
            egui::Event::PointerMoved(pos) => {
                let inside = rect.contains(pos);
                if !inside && app.ui_state.pressed.is_none() {
                    app.ui_state.hover_image = None;
                    continue;
                }
                let p = local(pos);
                app.ui_state.hover_image = app
                    .view
                    .map_to_image_coordinates(p)
                    .map(|q| (q.x, q.y));
                let button = app.ui_state.pressed.unwrap_or(PointerButton::Primary);
                let pointer = PointerEvent::new(p, button)
                    .with_modifiers(modifiers)
                    .with_global(to_point(pos));
                app.view.pointer_move(&pointer)
            }
            _ => continue,
        };
        apply_response(ctx, app, &result);
    }

    if response.hovered() || app.ui_state.pressed.is_some() {
        ctx.set_cursor_icon(to_cursor_icon(app.ui_state.cursor));
    }
}

fn apply_response(ctx: &egui::Context, app: &mut VistaApp, response: &PointerResponse) {
    if let Some(target) = response.warp_cursor {
        ctx.send_viewport_cmd(egui::ViewportCommand::CursorPosition(to_pos2(target)));
    }
    if response.repaint {
        ctx.request_repaint();
    }
    app.ui_state.cursor = response.cursor;
}

fn handle_wheel(ui: &egui::Ui, response: &egui::Response, app: &mut VistaApp, rect: egui::Rect) {
    let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
    if scroll_delta == 0.0 || !response.hovered() {
        return;
    }
    let anchor = ui
        .input(|i| i.pointer.hover_pos())
        .map(|p| to_point(p - rect.min.to_vec2()))
        .unwrap_or_else(|| Point::new(rect.width() as f64 / 2.0, rect.height() as f64 / 2.0));
    app.view
        .zoom_by(scroll_delta as f64 / WHEEL_POINTS_PER_STEP, anchor);
}

fn show_placeholder(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.label(
            egui::RichText::new("Open an image to begin")
                .size(18.0)
                .color(egui::Color32::from_gray(100)),
        );
    });
}
