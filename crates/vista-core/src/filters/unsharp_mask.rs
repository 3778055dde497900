use ndarray::Array2;

use crate::filters::gaussian_blur::gaussian_blur_plane;

/// Sharpen one plane: `original * (1 + strength) - blurred * strength`.
///
/// `radius` is the Gaussian sigma of the blurred copy. Values are clamped to
/// the u8 range.
pub fn unsharp_mask_plane(data: &Array2<f32>, strength: f32, radius: f32) -> Array2<f32> {
    let blurred = gaussian_blur_plane(data, radius);
    ndarray::Zip::from(data)
        .and(&blurred)
        .map_collect(|&orig, &blur| (orig * (1.0 + strength) - blur * strength).clamp(0.0, 255.0))
}
