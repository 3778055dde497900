use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use kurbo::{Point, Size};
use vista_core::resample::create_backend;
use vista_core::ImageView;

use super::{load_config, load_raster};

#[derive(Args)]
pub struct InfoArgs {
    /// Input image file
    pub file: PathBuf,

    /// Widget width used for the fit computation
    #[arg(long, default_value = "1280")]
    pub width: f64,

    /// Widget height used for the fit computation
    #[arg(long, default_value = "800")]
    pub height: f64,

    /// View configuration (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let raster = load_raster(&args.file)?;
    let (w, h) = raster.size();
    let channels = raster.channels();

    let config = load_config(args.config.as_deref())?;
    let backend = create_backend(config.use_gpu);
    let mut view = ImageView::with_config(Size::new(args.width, args.height), config);
    view.assign_image(raster);
    let fit = view.current_scaling_factor().unwrap_or(1.0);
    let center = Point::new(args.width / 2.0, args.height / 2.0);
    view.zoom_to_hundred_percent(center);

    println!("File:        {}", args.file.display());
    println!("Dimensions:  {}x{}", w, h);
    println!("Channels:    {}", channels);
    println!("Widget:      {}x{}", args.width, args.height);
    println!("Fit scale:   {:.4}", fit);
    println!("100% zoom:   exponent {:.4}", view.zoom_exponent());
    println!("Backend:     {}", backend.name());

    Ok(())
}
