use kurbo::Point;

use crate::app::{load_raster, VistaApp};
use crate::messages::AppMessage;

const OPEN_SHORTCUT: egui::KeyboardShortcut =
    egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O);
const QUIT_SHORTCUT: egui::KeyboardShortcut =
    egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q);

pub fn show(ctx: &egui::Context, app: &mut VistaApp) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                let open = egui::Button::new("Open...")
                    .shortcut_text(ctx.format_shortcut(&OPEN_SHORTCUT));
                if ui.add(open).clicked() {
                    ui.close();
                    open_file(app);
                }

                if ui
                    .add_enabled(app.view.paint_mask().is_some(), egui::Button::new("Save Mask..."))
                    .clicked()
                {
                    ui.close();
                    save_mask(app);
                }

                ui.separator();

                if ui.button("Import Config...").clicked() {
                    ui.close();
                    import_config(app);
                }

                if ui.button("Export Config...").clicked() {
                    ui.close();
                    export_config(app);
                }

                ui.separator();

                let quit = egui::Button::new("Quit")
                    .shortcut_text(ctx.format_shortcut(&QUIT_SHORTCUT));
                if ui.add(quit).clicked() {
                    ui.close();
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Zoom to Fit").clicked() {
                    ui.close();
                    app.view.zoom_to_fit();
                }
                if ui.button("Zoom 100%").clicked() {
                    ui.close();
                    let centre = widget_centre(app);
                    app.view.zoom_to_hundred_percent(centre);
                }
                ui.separator();
                if ui.button("Rotate Left").clicked() {
                    ui.close();
                    app.view.rotate_by(-90.0);
                }
                if ui.button("Rotate Right").clicked() {
                    ui.close();
                    app.view.rotate_by(90.0);
                }
                if ui.button("Reset Rotation").clicked() {
                    ui.close();
                    app.view.set_rotation(0.0);
                }
            });

            ui.menu_button("Edit", |ui| {
                if ui.button("Reset Defaults").clicked() {
                    ui.close();
                    app.view.set_config(Default::default());
                    app.ui_state.add_log("Config reset to defaults".into());
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    ui.close();
                    app.show_about = true;
                }
            });
        });

        if ctx.input_mut(|i| i.consume_shortcut(&OPEN_SHORTCUT)) {
            open_file(app);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&QUIT_SHORTCUT)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

fn widget_centre(app: &VistaApp) -> Point {
    let size = app.view.widget_size();
    Point::new(size.width / 2.0, size.height / 2.0)
}

fn open_file(app: &mut VistaApp) {
    let tx = app.msg_tx.clone();
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "tif", "tiff", "bmp"])
            .add_filter("All files", &["*"])
            .pick_file()
        {
            let msg = match load_raster(&path) {
                Ok(raster) => AppMessage::ImageLoaded { path, raster },
                Err(e) => AppMessage::Error {
                    message: format!("{}: {e:#}", path.display()),
                },
            };
            let _ = tx.send(msg);
        }
    });
}

fn save_mask(app: &mut VistaApp) {
    let Some(mask) = app.view.paint_mask().cloned() else {
        return;
    };
    let tx = app.msg_tx.clone();
    std::thread::spawn(move || {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name("mask.png")
            .save_file()
        else {
            return;
        };
        let (w, h) = mask.size();
        let img = image::GrayImage::from_fn(w, h, |x, y| {
            image::Luma([if mask.get(x, y) { 255 } else { 0 }])
        });
        let msg = match img.save(&path) {
            Ok(()) => AppMessage::Saved { path },
            Err(e) => AppMessage::Error {
                message: format!("Failed to save {}: {e}", path.display()),
            },
        };
        let _ = tx.send(msg);
    });
}

fn import_config(app: &mut VistaApp) {
    let tx = app.msg_tx.clone();
    std::thread::spawn(move || {
        let config = rfd::FileDialog::new()
            .add_filter("TOML", &["toml"])
            .pick_file()
            .and_then(|path| {
                let content = std::fs::read_to_string(&path).ok()?;
                toml::from_str(&content).ok()
            });
        if let Some(config) = config {
            let _ = tx.send(AppMessage::ConfigImported { config });
        }
    });
}

fn export_config(app: &mut VistaApp) {
    let config = app.view.config().clone();
    let tx = app.msg_tx.clone();

    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("TOML", &["toml"])
            .set_file_name("vista.toml")
            .save_file()
        {
            if let Ok(content) = toml::to_string_pretty(&config) {
                if std::fs::write(&path, content).is_ok() {
                    let _ = tx.send(AppMessage::Saved { path });
                }
            }
        }
    });
}
