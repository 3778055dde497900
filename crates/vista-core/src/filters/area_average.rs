//! Box-filter (area-averaging) minification.
//!
//! Each output pixel is the coverage-weighted mean of every source pixel its
//! footprint overlaps, which avoids the aliasing of point or bilinear sampling
//! when shrinking.

use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Output size for scaling `(width, height)` by `scale`, never below 1x1.
pub fn scaled_size(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let w = ((width as f64 * scale).round() as u32).max(1);
    let h = ((height as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// Source contributions `(index, weight)` for each output sample along one axis.
/// Weights of each output sample sum to 1.
pub fn coverage_weights(in_len: usize, out_len: usize) -> Vec<Vec<(usize, f32)>> {
    let ratio = in_len as f64 / out_len as f64;
    (0..out_len)
        .map(|o| {
            let start = o as f64 * ratio;
            let end = ((o + 1) as f64 * ratio).min(in_len as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(in_len);
            let total = end - start;
            (first..last)
                .filter_map(|i| {
                    let covered = (end.min(i as f64 + 1.0) - start.max(i as f64)) / total;
                    (covered > 0.0).then_some((i, covered as f32))
                })
                .collect()
        })
        .collect()
}

/// Resize one plane to `(out_h, out_w)` by area averaging.
pub fn area_average_plane(data: &Array2<f32>, out_h: usize, out_w: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    let col_weights = coverage_weights(w, out_w);
    let row_weights = coverage_weights(h, out_h);

    let horizontal = |row: usize, ocol: usize| -> f32 {
        col_weights[ocol]
            .iter()
            .map(|&(c, wt)| data[[row, c]] * wt)
            .sum()
    };

    let after_rows = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        let rows: Vec<Vec<f32>> = (0..h)
            .into_par_iter()
            .map(|row| (0..out_w).map(|c| horizontal(row, c)).collect())
            .collect();
        let flat: Vec<f32> = rows.into_iter().flatten().collect();
        Array2::from_shape_vec((h, out_w), flat).unwrap_or_else(|_| Array2::zeros((h, out_w)))
    } else {
        Array2::from_shape_fn((h, out_w), |(row, c)| horizontal(row, c))
    };

    Array2::from_shape_fn((out_h, out_w), |(orow, col)| {
        row_weights[orow]
            .iter()
            .map(|&(r, wt)| after_rows[[r, col]] * wt)
            .sum()
    })
}
