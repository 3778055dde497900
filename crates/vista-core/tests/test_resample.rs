mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ndarray::Array2;

use vista_core::error::{Result, ViewError};
use vista_core::filters::area_average::{area_average_plane, scaled_size};
use vista_core::filters::gaussian_blur::{gaussian_blur_plane, make_gaussian_kernel};
use vista_core::filters::unsharp_mask::unsharp_mask_plane;
use vista_core::raster::Raster;
use vista_core::resample::cpu::CpuBackend;
use vista_core::resample::{
    DevicePreference, PlaneBuffer, ResampleRequest, Resampler, ResizeBackend, SharpenParams,
};

use common::{ramp_raster, rgb_raster, uniform_raster};

// ---------------------------------------------------------------------------
// Injected backends
// ---------------------------------------------------------------------------

/// CPU backend that counts how often each step runs.
#[derive(Default)]
struct CountingBackend {
    uploads: AtomicUsize,
    resizes: AtomicUsize,
    sharpens: AtomicUsize,
}

impl ResizeBackend for CountingBackend {
    fn name(&self) -> &str {
        "counting"
    }

    fn is_gpu(&self) -> bool {
        true
    }

    fn upload(&self, raster: &Raster) -> Result<PlaneBuffer> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        CpuBackend.upload(raster)
    }

    fn area_average(&self, input: &PlaneBuffer, w: usize, h: usize) -> Result<PlaneBuffer> {
        self.resizes.fetch_add(1, Ordering::SeqCst);
        CpuBackend.area_average(input, w, h)
    }

    fn unsharp_mask(&self, input: &PlaneBuffer, strength: f32, radius: f32) -> Result<PlaneBuffer> {
        self.sharpens.fetch_add(1, Ordering::SeqCst);
        CpuBackend.unsharp_mask(input, strength, radius)
    }

    fn download(&self, buffer: &PlaneBuffer) -> Result<Raster> {
        CpuBackend.download(buffer)
    }
}

/// Backend that fails at a chosen step.
struct FailingBackend {
    fail_at: &'static str,
    attempts: AtomicUsize,
}

impl FailingBackend {
    fn new(fail_at: &'static str) -> Self {
        Self {
            fail_at,
            attempts: AtomicUsize::new(0),
        }
    }

    fn step(&self, name: &str) -> Result<()> {
        if name == self.fail_at {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            return Err(ViewError::Gpu(format!("injected failure in {name}")));
        }
        Ok(())
    }
}

impl ResizeBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    fn upload(&self, raster: &Raster) -> Result<PlaneBuffer> {
        self.step("upload")?;
        CpuBackend.upload(raster)
    }

    fn area_average(&self, input: &PlaneBuffer, w: usize, h: usize) -> Result<PlaneBuffer> {
        self.step("area_average")?;
        CpuBackend.area_average(input, w, h)
    }

    fn unsharp_mask(&self, input: &PlaneBuffer, strength: f32, radius: f32) -> Result<PlaneBuffer> {
        self.step("unsharp_mask")?;
        CpuBackend.unsharp_mask(input, strength, radius)
    }

    fn download(&self, buffer: &PlaneBuffer) -> Result<Raster> {
        self.step("download")?;
        CpuBackend.download(buffer)
    }
}

fn sharpen() -> Option<SharpenParams> {
    Some(SharpenParams {
        strength: 0.8,
        radius: 1.0,
    })
}

// ---------------------------------------------------------------------------
// Sharpen gating
// ---------------------------------------------------------------------------

#[test]
fn test_no_resample_or_sharpen_at_full_scale() {
    let backend = Arc::new(CountingBackend::default());
    let mut resampler =
        Resampler::new(DevicePreference::Gpu).with_accelerated_backend(backend.clone());
    let out = resampler.resample(
        &ramp_raster(64, 64),
        &ResampleRequest {
            scale: 1.0,
            sharpen: sharpen(),
        },
    );
    assert!(out.is_none());
    assert_eq!(backend.sharpens.load(Ordering::SeqCst), 0);
    assert_eq!(backend.uploads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_sharpen_runs_when_downscaling() {
    let backend = Arc::new(CountingBackend::default());
    let mut resampler =
        Resampler::new(DevicePreference::Gpu).with_accelerated_backend(backend.clone());
    let out = resampler
        .resample(
            &ramp_raster(64, 64),
            &ResampleRequest {
                scale: 0.5,
                sharpen: sharpen(),
            },
        )
        .unwrap();
    assert_eq!(out.size(), (32, 32));
    assert_eq!(backend.resizes.load(Ordering::SeqCst), 1);
    assert_eq!(backend.sharpens.load(Ordering::SeqCst), 1);
}

#[test]
fn test_sharpen_skipped_when_disabled() {
    let backend = Arc::new(CountingBackend::default());
    let mut resampler =
        Resampler::new(DevicePreference::Auto).with_accelerated_backend(backend.clone());
    resampler
        .resample(
            &ramp_raster(64, 64),
            &ResampleRequest {
                scale: 0.5,
                sharpen: None,
            },
        )
        .unwrap();
    assert_eq!(backend.resizes.load(Ordering::SeqCst), 1);
    assert_eq!(backend.sharpens.load(Ordering::SeqCst), 0);
}

#[test]
fn test_cpu_preference_bypasses_accelerated_backend() {
    let backend = Arc::new(CountingBackend::default());
    let mut resampler =
        Resampler::new(DevicePreference::Cpu).with_accelerated_backend(backend.clone());
    assert_eq!(resampler.active_backend_name(), "CPU/Rayon");
    let out = resampler.resample(
        &ramp_raster(40, 40),
        &ResampleRequest {
            scale: 0.25,
            sharpen: None,
        },
    );
    assert_eq!(out.unwrap().size(), (10, 10));
    assert_eq!(backend.uploads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_active_backend_name_follows_preference() {
    let backend = Arc::new(CountingBackend::default());
    let mut resampler = Resampler::new(DevicePreference::Auto).with_accelerated_backend(backend);
    assert_eq!(resampler.active_backend_name(), "counting");
    resampler.set_preference(DevicePreference::Cpu);
    assert_eq!(resampler.active_backend_name(), "CPU/Rayon");
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

#[test]
fn test_gpu_fallback_transparency() {
    let source = rgb_raster(97, 61);
    let request = ResampleRequest {
        scale: 0.37,
        sharpen: sharpen(),
    };
    let expected = Resampler::new(DevicePreference::Cpu)
        .resample(&source, &request)
        .unwrap();

    for step in ["upload", "area_average", "unsharp_mask", "download"] {
        let failing = Arc::new(FailingBackend::new(step));
        let mut resampler =
            Resampler::new(DevicePreference::Gpu).with_accelerated_backend(failing.clone());
        let out = resampler.resample(&source, &request).unwrap();
        assert_eq!(out, expected, "fallback after failing {step} differs");
        assert_eq!(failing.attempts.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn test_fallback_retried_on_every_call() {
    let failing = Arc::new(FailingBackend::new("area_average"));
    let mut resampler =
        Resampler::new(DevicePreference::Gpu).with_accelerated_backend(failing.clone());
    let request = ResampleRequest {
        scale: 0.5,
        sharpen: None,
    };
    for _ in 0..3 {
        assert!(resampler.resample(&ramp_raster(20, 20), &request).is_some());
    }
    assert_eq!(failing.attempts.load(Ordering::SeqCst), 3);
}

// ---------------------------------------------------------------------------
// Area averaging and sharpening kernels
// ---------------------------------------------------------------------------

#[test]
fn test_scaled_size_rounds_and_keeps_one_pixel() {
    assert_eq!(scaled_size(100, 60, 0.5), (50, 30));
    assert_eq!(scaled_size(99, 61, 0.5), (50, 31));
    assert_eq!(scaled_size(10, 10, 0.001), (1, 1));
}

#[test]
fn test_uniform_image_stays_uniform() {
    let mut resampler = Resampler::new(DevicePreference::Cpu);
    let out = resampler
        .resample(
            &uniform_raster(123, 77, 200),
            &ResampleRequest {
                scale: 0.31,
                sharpen: sharpen(),
            },
        )
        .unwrap();
    assert!(out.data().iter().all(|&v| v == 200));
}

#[test]
fn test_area_average_suppresses_checkerboard() {
    // A one-pixel checkerboard aliases badly under point sampling.
    let plane = Array2::from_shape_fn((64, 64), |(r, c)| {
        if (r + c) % 2 == 0 {
            255.0
        } else {
            0.0
        }
    });
    let out = area_average_plane(&plane, 16, 16);
    for v in out.iter() {
        assert!((v - 127.5).abs() < 1e-3, "expected mid-gray, got {v}");
    }
}

#[test]
fn test_area_average_preserves_mean_on_fractional_ratio() {
    let plane = Array2::from_shape_fn((30, 45), |(r, c)| (r * 3 + c) as f32);
    let out = area_average_plane(&plane, 7, 11);
    let mean_in = plane.mean().unwrap();
    let mean_out = out.mean().unwrap();
    assert!((mean_in - mean_out).abs() < 0.5);
}

#[test]
fn test_gaussian_kernel_normalized() {
    let k = make_gaussian_kernel(1.5);
    assert_eq!(k.len() % 2, 1);
    let sum: f32 = k.iter().sum();
    assert!((sum - 1.0).abs() < 1e-5);
}

#[test]
fn test_blur_with_zero_sigma_is_identity() {
    let plane = Array2::from_shape_fn((5, 5), |(r, c)| (r * 5 + c) as f32);
    assert_eq!(gaussian_blur_plane(&plane, 0.0), plane);
}

#[test]
fn test_unsharp_mask_increases_edge_contrast() {
    let plane = Array2::from_shape_fn((16, 16), |(_, c)| if c < 8 { 80.0 } else { 160.0 });
    let out = unsharp_mask_plane(&plane, 1.0, 1.0);
    assert!(out[[8, 7]] < 80.0);
    assert!(out[[8, 8]] > 160.0);
    // Flat regions far from the edge are untouched.
    assert!((out[[8, 0]] - 80.0).abs() < 1e-3);
}
