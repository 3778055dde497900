use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BRUSH_RADIUS, DEFAULT_GRAB_TOLERANCE, DEFAULT_SHARPEN_RADIUS,
    DEFAULT_SHARPEN_STRENGTH, DEFAULT_ZOOM_BASE,
};
use crate::resample::{DevicePreference, SharpenParams};

/// 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Post-downscale sharpening.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharpenConfig {
    pub enabled: bool,
    pub strength: f32,
    /// Gaussian sigma in output pixels.
    pub radius: f32,
}

impl Default for SharpenConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            strength: DEFAULT_SHARPEN_STRENGTH,
            radius: DEFAULT_SHARPEN_RADIUS,
        }
    }
}

impl SharpenConfig {
    pub fn params(&self) -> Option<SharpenParams> {
        self.enabled.then_some(SharpenParams {
            strength: self.strength,
            radius: self.radius,
        })
    }
}

/// Every host-tunable setting of the view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Area-average the image for display below 100%.
    pub high_quality_downscaling: bool,
    /// Bilinear rather than nearest-neighbour magnification.
    pub smooth_transform: bool,
    pub use_gpu: DevicePreference,
    pub sharpen: SharpenConfig,
    /// Paint brush radius in image pixels.
    pub brush_radius: f64,
    pub outline_color: Color,
    pub background_color: Color,
    /// Middle-drag zooms instead of panning.
    pub pan_zoom_enabled: bool,
    /// Right click toggles between 100% and fit.
    pub right_click_for_hundred_percent: bool,
    /// Never magnify beyond 100% when fitting.
    pub prevent_magnification: bool,
    /// Hit-test radius in screen pixels.
    pub grab_tolerance: f64,
    pub zoom_base: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            high_quality_downscaling: true,
            smooth_transform: true,
            use_gpu: DevicePreference::Auto,
            sharpen: SharpenConfig::default(),
            brush_radius: DEFAULT_BRUSH_RADIUS,
            outline_color: Color::rgb(0, 170, 255),
            background_color: Color::rgb(30, 30, 30),
            pan_zoom_enabled: true,
            right_click_for_hundred_percent: false,
            prevent_magnification: false,
            grab_tolerance: DEFAULT_GRAB_TOLERANCE,
            zoom_base: DEFAULT_ZOOM_BASE,
        }
    }
}

impl ViewConfig {
    /// Whether switching from `self` to `other` invalidates the downsampled raster.
    pub fn affects_resampling(&self, other: &Self) -> bool {
        self.high_quality_downscaling != other.high_quality_downscaling
            || self.sharpen != other.sharpen
            || self.use_gpu != other.use_gpu
            || self.prevent_magnification != other.prevent_magnification
            || self.zoom_base != other.zoom_base
    }
}
