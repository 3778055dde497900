use kurbo::Point;
use vista_core::resample::DevicePreference;

use crate::app::VistaApp;
use crate::convert::{from_color32, to_color32};
use crate::panels::section_header;
use crate::state::{UIState, FEATURES, FEATURE_NAMES};

const LEFT_PANEL_WIDTH: f32 = 260.0;

pub fn show(ctx: &egui::Context, app: &mut VistaApp) {
    egui::SidePanel::left("controls")
        .default_width(LEFT_PANEL_WIDTH)
        .resizable(true)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.set_min_width(LEFT_PANEL_WIDTH - 20.0);

                interaction_section(ui, app);
                ui.separator();
                navigation_section(ui, app);
                ui.separator();
                display_section(ui, app);
                ui.separator();
                colors_section(ui, app);
            });
        });
}

fn interaction_section(ui: &mut egui::Ui, app: &mut VistaApp) {
    let counts = format!(
        "{} pts, {} vtx",
        app.view.points().len(),
        app.view.polyline().len()
    );
    section_header(ui, "Interaction", Some(&counts));
    ui.add_space(4.0);

    let mut index = UIState::feature_index(app.view.interaction_feature());
    if egui::ComboBox::from_label("Edit")
        .selected_text(FEATURE_NAMES[index])
        .show_index(ui, &mut index, FEATURE_NAMES.len(), |i| {
            FEATURE_NAMES[i].to_string()
        })
        .changed()
    {
        app.view.set_interaction_feature(FEATURES[index]);
    }

    let mut painting = app.view.painting_active();
    if ui.checkbox(&mut painting, "Paint mask").changed() {
        app.view.set_painting_active(painting);
    }
    let mut brush = app.view.config().brush_radius;
    if ui
        .add(egui::Slider::new(&mut brush, 1.0..=100.0).text("Brush").logarithmic(true))
        .changed()
    {
        app.view.set_brush_radius(brush);
    }

    ui.horizontal(|ui| {
        if ui.button("New polyline").clicked() {
            if let Some((w, h)) = app.view.image().map(|r| r.size()) {
                let (w, h) = (w as f64, h as f64);
                app.view.set_polyline(vec![
                    Point::new(w * 0.25, h * 0.25),
                    Point::new(w * 0.75, h * 0.25),
                    Point::new(w * 0.75, h * 0.75),
                    Point::new(w * 0.25, h * 0.75),
                ]);
                app.view.set_polyline_selected(true);
            }
        }
        if ui.button("Clear polyline").clicked() {
            app.view.clear_polyline();
        }
    });
    ui.horizontal(|ui| {
        if ui.button("Clear points").clicked() {
            app.view.clear_points();
        }
        if ui.button("Clear mask").clicked() {
            app.view.clear_paint_mask();
        }
    });
}

fn navigation_section(ui: &mut egui::Ui, app: &mut VistaApp) {
    let status = app
        .view
        .is_hundred_percent()
        .then_some("100%");
    section_header(ui, "Navigation", status);
    ui.add_space(4.0);

    let mut rotation = app.view.rotation();
    if ui
        .add(egui::Slider::new(&mut rotation, -180.0..=180.0).text("Rotation").suffix("\u{00b0}"))
        .changed()
    {
        app.view.set_rotation(rotation);
    }

    let mut config = app.view.config().clone();
    ui.checkbox(&mut config.pan_zoom_enabled, "Middle-drag zooms");
    ui.checkbox(&mut config.right_click_for_hundred_percent, "Right click toggles 100%");
    ui.checkbox(&mut config.prevent_magnification, "Never magnify on fit");
    ui.add(egui::Slider::new(&mut config.zoom_base, 1.05..=3.0).text("Zoom step"));
    ui.add(egui::Slider::new(&mut config.grab_tolerance, 2.0..=30.0).text("Grab radius"));
    if config != *app.view.config() {
        app.view.set_config(config);
    }
}

fn display_section(ui: &mut egui::Ui, app: &mut VistaApp) {
    let backend = app.view.resample_backend_name().to_string();
    section_header(ui, "Display", Some(&backend));
    ui.add_space(4.0);

    let mut config = app.view.config().clone();
    ui.checkbox(&mut config.smooth_transform, "Smooth magnification");
    ui.checkbox(&mut config.high_quality_downscaling, "High quality downscaling");

    if config.high_quality_downscaling {
        ui.checkbox(&mut config.sharpen.enabled, "Sharpen after downscaling");
        if config.sharpen.enabled {
            ui.add(egui::Slider::new(&mut config.sharpen.strength, 0.0..=2.0).text("Strength"));
            ui.add(egui::Slider::new(&mut config.sharpen.radius, 0.3..=5.0).text("Radius"));
        }
        egui::ComboBox::from_label("Device")
            .selected_text(config.use_gpu.to_string())
            .show_ui(ui, |ui| {
                for &choice in DevicePreference::ALL {
                    ui.selectable_value(&mut config.use_gpu, choice, choice.to_string());
                }
            });
    }

    ui.checkbox(&mut app.ui_state.show_info_overlay, "Show zoom overlay");

    if config != *app.view.config() {
        app.view.set_config(config);
    }
}

fn colors_section(ui: &mut egui::Ui, app: &mut VistaApp) {
    section_header(ui, "Colors", None);
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        let mut outline = to_color32(app.view.config().outline_color);
        if ui.color_edit_button_srgba(&mut outline).changed() {
            app.view.set_outline_color(from_color32(outline));
        }
        ui.label("Outline");
    });
    ui.horizontal(|ui| {
        let mut background = to_color32(app.view.config().background_color);
        if ui.color_edit_button_srgba(&mut background).changed() {
            app.view.set_background_color(from_color32(background));
        }
        ui.label("Background");
    });
}
