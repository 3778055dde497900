pub mod config;
pub mod info;
pub mod render;

use std::path::Path;

use anyhow::{Context, Result};
use vista_core::config::ViewConfig;
use vista_core::raster::Raster;

/// Decode `path` into a raster the view accepts, converting exotic color
/// types to 8-bit RGBA.
pub fn load_raster(path: &Path) -> Result<Raster> {
    let img = image::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    match Raster::from_dynamic(&img) {
        Ok(raster) => Ok(raster),
        Err(e) => {
            tracing::debug!("converting to RGBA8: {e}");
            Ok(Raster::from_dynamic(&image::DynamicImage::ImageRgba8(img.to_rgba8()))?)
        }
    }
}

/// Read a TOML view configuration, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<ViewConfig> {
    let Some(path) = path else {
        return Ok(ViewConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}
