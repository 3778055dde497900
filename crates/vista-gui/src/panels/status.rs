use crate::app::VistaApp;

pub fn show(ctx: &egui::Context, app: &mut VistaApp) {
    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        ui.add_space(2.0);

        // Log area, fixed height for 4 lines.
        let line_height = ui.text_style_height(&egui::TextStyle::Body);
        let spacing = ui.spacing().item_spacing.y;
        let log_height = line_height * 4.0 + spacing * 3.0;

        egui::ScrollArea::vertical()
            .max_height(log_height)
            .min_scrolled_height(log_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if app.ui_state.log_messages.is_empty() {
                    for _ in 0..4 {
                        ui.label("");
                    }
                } else {
                    for msg in &app.ui_state.log_messages {
                        ui.label(msg);
                    }
                }
            });

        ui.horizontal(|ui| {
            if let Some(image) = app.view.image() {
                ui.label(format!("{}x{}", image.width(), image.height()));
                ui.separator();
            }
            match app.view.current_scaling_factor() {
                Some(scale) => ui.label(format!("Zoom: {:.1}%", scale * 100.0)),
                None => ui.label("Zoom: -"),
            };
            ui.separator();
            ui.label(format!("Rotation: {:.0}\u{00b0}", app.view.rotation()));
            ui.separator();
            if let Some((x, y)) = app.ui_state.hover_image {
                ui.label(format!("({x:.1}, {y:.1})"));
                ui.separator();
            }
            if let Some((x, y)) = app.ui_state.last_click {
                ui.label(format!("Clicked: {x}, {y}"));
                ui.separator();
            }
            ui.label(format!("Resampler: {}", app.view.resample_backend_name()));
        });

        ui.add_space(2.0);
    });
}
