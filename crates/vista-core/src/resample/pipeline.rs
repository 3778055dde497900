//! Downscale-and-sharpen for display below 100%, with CPU fallback.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::filters::area_average::scaled_size;
use crate::raster::Raster;

use super::cpu::CpuBackend;
use super::{create_gpu_backend, DevicePreference, ResizeBackend};

/// Unsharp-mask parameters applied after downscaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SharpenParams {
    pub strength: f32,
    /// Gaussian sigma in output pixels.
    pub radius: f32,
}

/// What the view needs displayed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResampleRequest {
    /// Effective screen pixels per image pixel.
    pub scale: f64,
    pub sharpen: Option<SharpenParams>,
}

/// Produces the downsampled display raster.
///
/// The device backend is created lazily the first time it is needed. Any
/// failure along the device chain is logged and the whole chain is redone on
/// the CPU, so callers only ever see a finished raster.
pub struct Resampler {
    cpu: CpuBackend,
    gpu: Option<Arc<dyn ResizeBackend>>,
    preference: DevicePreference,
    gpu_probed: bool,
}

impl Resampler {
    pub fn new(preference: DevicePreference) -> Self {
        Self {
            cpu: CpuBackend,
            gpu: None,
            preference,
            gpu_probed: false,
        }
    }

    /// Use `backend` as the accelerated path instead of probing for a GPU.
    pub fn with_accelerated_backend(mut self, backend: Arc<dyn ResizeBackend>) -> Self {
        self.gpu = Some(backend);
        self.gpu_probed = true;
        self
    }

    pub fn preference(&self) -> DevicePreference {
        self.preference
    }

    pub fn set_preference(&mut self, preference: DevicePreference) {
        self.preference = preference;
    }

    /// Name of the backend the next resample will try first.
    pub fn active_backend_name(&self) -> &str {
        match (&self.gpu, self.preference.wants_gpu()) {
            (Some(gpu), true) => gpu.name(),
            _ => self.cpu.name(),
        }
    }

    fn accelerated(&mut self) -> Option<Arc<dyn ResizeBackend>> {
        if !self.preference.wants_gpu() {
            return None;
        }
        if !self.gpu_probed {
            self.gpu_probed = true;
            self.gpu = create_gpu_backend();
        }
        self.gpu.clone()
    }

    /// Downscale `source` for display, or `None` when `scale >= 1` (the full
    /// raster is shown directly and sharpening never applies).
    pub fn resample(&mut self, source: &Raster, request: &ResampleRequest) -> Option<Raster> {
        if !(request.scale > 0.0 && request.scale < 1.0) {
            return None;
        }
        let (out_w, out_h) = scaled_size(source.width(), source.height(), request.scale);
        debug!(
            scale = request.scale,
            out_w,
            out_h,
            sharpen = request.sharpen.is_some(),
            "resampling display raster"
        );

        if let Some(gpu) = self.accelerated() {
            match run_chain(gpu.as_ref(), source, out_w, out_h, request.sharpen) {
                Ok(raster) => return Some(raster),
                Err(e) => warn!(backend = gpu.name(), "resample failed, retrying on CPU: {e}"),
            }
        }

        match run_chain(&self.cpu, source, out_w, out_h, request.sharpen) {
            Ok(raster) => Some(raster),
            Err(e) => {
                warn!("CPU resample failed: {e}");
                None
            }
        }
    }
}

fn run_chain(
    backend: &dyn ResizeBackend,
    source: &Raster,
    out_w: u32,
    out_h: u32,
    sharpen: Option<SharpenParams>,
) -> Result<Raster> {
    let uploaded = backend.upload(source)?;
    let resized = backend.area_average(&uploaded, out_w as usize, out_h as usize)?;
    let finished = match sharpen {
        Some(p) => backend.unsharp_mask(&resized, p.strength, p.radius)?,
        None => resized,
    };
    backend.download(&finished)
}
