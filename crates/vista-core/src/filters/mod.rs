pub mod area_average;
pub mod gaussian_blur;
pub mod unsharp_mask;
