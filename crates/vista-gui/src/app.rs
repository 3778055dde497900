use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;

use kurbo::{Point, Size};
use vista_core::config::Color;
use vista_core::notify::ViewEvent;
use vista_core::render::Surface;
use vista_core::ImageView;

use crate::messages::AppMessage;
use crate::panels;
use crate::state::UIState;
use crate::surface::TextureCache;

pub struct VistaApp {
    pub view: ImageView,
    pub textures: TextureCache,
    pub msg_tx: mpsc::Sender<AppMessage>,
    pub msg_rx: mpsc::Receiver<AppMessage>,
    pub ui_state: UIState,
    /// Filled by the view's notification callbacks, drained every frame.
    events: Rc<RefCell<Vec<ViewEvent>>>,
    /// Text drawn by the post-paint info overlay.
    info_text: Rc<RefCell<String>>,
    pub show_about: bool,
}

impl VistaApp {
    pub fn new(initial: Option<PathBuf>) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        let mut view = ImageView::new(Size::new(1280.0, 800.0));

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        view.subscribe_all(move |event| sink.borrow_mut().push(event.clone()));

        let info_text = Rc::new(RefCell::new(String::new()));
        let text = Rc::clone(&info_text);
        view.add_post_paint(move |surface: &mut dyn Surface| {
            let text = text.borrow();
            if !text.is_empty() {
                surface.draw_text(Point::new(8.0, 8.0), &text, Color::rgba(255, 255, 255, 200));
            }
        });

        let app = Self {
            view,
            textures: TextureCache::default(),
            msg_tx,
            msg_rx,
            ui_state: UIState::default(),
            events,
            info_text,
            show_about: false,
        };
        if let Some(path) = initial {
            app.load_file(path);
        }
        app
    }

    /// Decode `path` on a background thread; the result arrives as a message.
    pub fn load_file(&self, path: PathBuf) {
        let tx = self.msg_tx.clone();
        std::thread::spawn(move || {
            let msg = match load_raster(&path) {
                Ok(raster) => AppMessage::ImageLoaded { path, raster },
                Err(e) => AppMessage::Error {
                    message: format!("{}: {e:#}", path.display()),
                },
            };
            let _ = tx.send(msg);
        });
    }

    fn poll_messages(&mut self) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                AppMessage::ImageLoaded { path, raster } => {
                    self.ui_state.add_log(format!(
                        "Opened: {} ({}x{}, {} channels)",
                        path.display(),
                        raster.width(),
                        raster.height(),
                        raster.channels()
                    ));
                    self.ui_state.file_path = Some(path);
                    self.textures.clear();
                    self.view.assign_image(raster);
                }
                AppMessage::ConfigImported { config } => {
                    self.view.set_config(config);
                    self.ui_state.add_log("Config imported".into());
                }
                AppMessage::Saved { path } => {
                    self.ui_state.add_log(format!("Saved: {}", path.display()));
                }
                AppMessage::Error { message } => {
                    self.ui_state.add_log(format!("ERROR: {message}"));
                }
            }
        }
    }

    fn drain_view_events(&mut self) {
        let events: Vec<ViewEvent> = self.events.borrow_mut().drain(..).collect();
        for event in events {
            match event {
                ViewEvent::PixelClicked { x, y } => {
                    self.ui_state.last_click = Some((x, y));
                }
                ViewEvent::PointAdded(i) => self.ui_state.add_log(format!("Point {i} added")),
                ViewEvent::PointDeleted(i) => self.ui_state.add_log(format!("Point {i} deleted")),
                ViewEvent::PointModified(i) => self.ui_state.add_log(format!("Point {i} moved")),
                ViewEvent::PolylineModified => self.ui_state.add_log("Polyline edited".into()),
                ViewEvent::MaskModified => self.ui_state.add_log("Mask painted".into()),
            }
        }
    }

    fn update_info_text(&self) {
        let mut text = self.info_text.borrow_mut();
        text.clear();
        if !self.ui_state.show_info_overlay {
            return;
        }
        if let Some(scale) = self.view.current_scaling_factor() {
            text.push_str(&format!(
                "{:.1}%  {:.0}\u{00b0}",
                scale * 100.0,
                self.view.rotation()
            ));
        }
    }
}

/// Decode `path`, converting anything but 8-bit gray, RGB or RGBA to RGBA.
pub fn load_raster(path: &std::path::Path) -> anyhow::Result<vista_core::raster::Raster> {
    let img = image::open(path)?;
    let img = match img.color() {
        image::ColorType::L8 | image::ColorType::Rgb8 | image::ColorType::Rgba8 => img,
        _ => image::DynamicImage::ImageRgba8(img.to_rgba8()),
    };
    Ok(vista_core::raster::Raster::from_dynamic(&img)?)
}

impl eframe::App for VistaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_messages();

        panels::menu_bar::show(ctx, self);
        panels::status::show(ctx, self);
        panels::controls::show(ctx, self);
        self.update_info_text();
        panels::viewport::show(ctx, self);
        self.drain_view_events();

        if self.show_about {
            egui::Window::new("About Vista")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("Vista");
                        ui.label("Pan, zoom and annotate images");
                        ui.add_space(8.0);
                        ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                        ui.add_space(8.0);
                        if ui.button("Close").clicked() {
                            self.show_about = false;
                        }
                    });
                });
        }
    }
}
