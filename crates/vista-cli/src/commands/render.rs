use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use kurbo::{Point, Size, Vec2};
use vista_core::config::Color;
use vista_core::render::Surface;
use vista_core::ImageView;

use super::{load_config, load_raster};
use crate::canvas::Canvas;
use crate::summary::print_render_summary;

#[derive(Args)]
pub struct RenderArgs {
    /// Input image file
    pub file: PathBuf,

    /// Widget width in screen pixels
    #[arg(long, default_value = "1280")]
    pub width: u32,

    /// Widget height in screen pixels
    #[arg(long, default_value = "800")]
    pub height: u32,

    /// Zoom exponent relative to fit (scale = fit * base^zoom)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub zoom: f64,

    /// Rotation in degrees
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub rotate: f64,

    /// Horizontal pan in screen pixels
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub pan_x: f64,

    /// Vertical pan in screen pixels
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub pan_y: f64,

    /// Start at 100% instead of fit
    #[arg(long)]
    pub hundred_percent: bool,

    /// Marker point in image coordinates, e.g. --point 120.5,64 (repeatable)
    #[arg(long = "point")]
    pub points: Vec<String>,

    /// Polyline in image coordinates, e.g. --polyline 0,0,100,0,100,50
    #[arg(long)]
    pub polyline: Option<String>,

    /// Enable sharpening after downscaling
    #[arg(long)]
    pub sharpen: bool,

    /// Draw a crosshair at the widget centre
    #[arg(long)]
    pub crosshair: bool,

    /// View configuration (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output file path
    #[arg(short, long, default_value = "view.png")]
    pub output: PathBuf,
}

fn parse_coords(text: &str) -> Result<Vec<f64>> {
    text.split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid coordinate list '{text}'"))
}

fn parse_point(text: &str) -> Result<Point> {
    match parse_coords(text)?.as_slice() {
        [x, y] => Ok(Point::new(*x, *y)),
        _ => anyhow::bail!("Expected X,Y but got '{text}'"),
    }
}

fn parse_polyline(text: &str) -> Result<Vec<Point>> {
    let coords = parse_coords(text)?;
    if coords.len() % 2 != 0 {
        anyhow::bail!("Polyline needs an even number of coordinates");
    }
    Ok(coords
        .chunks_exact(2)
        .map(|c| Point::new(c[0], c[1]))
        .collect())
}

pub fn run(args: &RenderArgs) -> Result<()> {
    let raster = load_raster(&args.file)?;
    println!("Loaded {}x{} image", raster.width(), raster.height());

    let mut config = load_config(args.config.as_deref())?;
    if args.sharpen {
        config.sharpen.enabled = true;
    }

    let widget = Size::new(args.width as f64, args.height as f64);
    let center = Point::new(widget.width / 2.0, widget.height / 2.0);
    let mut view = ImageView::with_config(widget, config);
    view.assign_image(raster);

    view.set_rotation(args.rotate);
    if args.hundred_percent {
        view.zoom_to_hundred_percent(center);
    }
    if args.zoom != 0.0 {
        view.zoom_by(args.zoom, center);
    }
    view.pan_by(Vec2::new(args.pan_x, args.pan_y));

    let points = args
        .points
        .iter()
        .map(|p| parse_point(p))
        .collect::<Result<Vec<_>>>()?;
    view.set_points(points);
    if let Some(ref text) = args.polyline {
        view.set_polyline(parse_polyline(text)?);
    }

    if args.crosshair {
        let color = view.config().outline_color;
        view.add_post_paint(move |surface: &mut dyn Surface| {
            let arm = 12.0;
            surface.draw_polyline(
                &[center - Vec2::new(arm, 0.0), center + Vec2::new(arm, 0.0)],
                1.0,
                color,
            );
            surface.draw_polyline(
                &[center - Vec2::new(0.0, arm), center + Vec2::new(0.0, arm)],
                1.0,
                color,
            );
            surface.draw_circle(center, 2.0, Some(Color::rgb(255, 255, 255)), color);
        });
    }

    let mut canvas = Canvas::new(args.width, args.height);
    view.paint(&mut canvas);

    print_render_summary(&view, &args.file, &args.output, view.resample_backend_name());

    canvas
        .into_image()
        .save(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    println!("Saved to {}", args.output.display());

    Ok(())
}
