mod app;
mod convert;
mod messages;
mod panels;
mod state;
mod surface;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let path = std::env::args_os().nth(1).map(std::path::PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Vista"),
        ..Default::default()
    };

    eframe::run_native(
        "Vista",
        options,
        Box::new(move |_cc| Ok(Box::new(app::VistaApp::new(path)))),
    )
}
