/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Multiplicative step between consecutive integer zoom exponents.
pub const DEFAULT_ZOOM_BASE: f64 = 1.5;

/// Screen-space radius (pixels) within which a point or vertex counts as hit.
pub const DEFAULT_GRAB_TOLERANCE: f64 = 10.0;

/// Default radius (image pixels) of the mask painting brush.
pub const DEFAULT_BRUSH_RADIUS: f64 = 10.0;

/// Default unsharp-mask strength applied after downscaling.
pub const DEFAULT_SHARPEN_STRENGTH: f32 = 0.5;

/// Default Gaussian sigma (pixels) of the unsharp-mask blur.
pub const DEFAULT_SHARPEN_RADIUS: f32 = 1.0;

/// Zoom exponent change per screen pixel of vertical drag in pan-zoom mode.
pub const PAN_ZOOM_SENSITIVITY: f64 = 0.02;

/// Tolerance when deciding whether a precomputed downsampled raster still
/// matches the current effective scale.
pub const DOWNSAMPLE_SCALE_TOLERANCE: f64 = 1e-3;

/// Margin (pixels) from the screen edge at which drag gestures wrap the cursor.
pub const CURSOR_WRAP_MARGIN: f64 = 1.0;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f64 = 1e-10;
