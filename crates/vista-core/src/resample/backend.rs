use std::fmt;
use std::sync::Arc;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::raster::{PixelFormat, Raster};

use super::cpu::CpuBackend;

/// Which device the resampling pipeline should prefer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DevicePreference {
    /// Use the GPU when one can be initialised, otherwise the CPU.
    #[default]
    Auto,
    Cpu,
    Gpu,
}

impl fmt::Display for DevicePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "Auto"),
            Self::Cpu => write!(f, "CPU"),
            Self::Gpu => write!(f, "GPU"),
        }
    }
}

impl DevicePreference {
    pub const ALL: &[Self] = &[Self::Auto, Self::Cpu, Self::Gpu];

    pub fn wants_gpu(self) -> bool {
        !matches!(self, Self::Cpu)
    }
}

/// Storage behind a [`PlaneBuffer`].
pub(crate) enum BufferInner {
    Cpu(Vec<Array2<f32>>),
    #[cfg(feature = "gpu")]
    Wgpu {
        planes: Vec<wgpu::Buffer>,
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
    },
}

/// One f32 plane per channel, resident wherever the producing backend keeps it.
pub struct PlaneBuffer {
    pub(crate) inner: BufferInner,
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
}

impl PlaneBuffer {
    /// Host-resident buffer from per-channel planes of shape `(height, width)`.
    pub fn from_planes(planes: Vec<Array2<f32>>, format: PixelFormat) -> Self {
        let (height, width) = planes.first().map_or((0, 0), |p| p.dim());
        Self {
            inner: BufferInner::Cpu(planes),
            width,
            height,
            format,
        }
    }

    /// The planes, if this buffer lives in host memory.
    pub fn cpu_planes(&self) -> Option<&[Array2<f32>]> {
        match &self.inner {
            BufferInner::Cpu(planes) => Some(planes),
            #[cfg(feature = "gpu")]
            BufferInner::Wgpu { .. } => None,
        }
    }
}

impl fmt::Debug for PlaneBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = match &self.inner {
            BufferInner::Cpu(_) => "cpu",
            #[cfg(feature = "gpu")]
            BufferInner::Wgpu { .. } => "gpu",
        };
        f.debug_struct("PlaneBuffer")
            .field("location", &location)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .finish()
    }
}

/// The operations of the downscale-and-sharpen chain.
///
/// Every step is fallible so a device backend can report failure and let the
/// pipeline redo the whole chain on the CPU.
pub trait ResizeBackend: Send + Sync {
    fn name(&self) -> &str;

    fn is_gpu(&self) -> bool {
        false
    }

    fn upload(&self, raster: &Raster) -> Result<PlaneBuffer>;

    /// Area-averaging resize to `out_width` x `out_height`.
    fn area_average(&self, input: &PlaneBuffer, out_width: usize, out_height: usize)
        -> Result<PlaneBuffer>;

    /// `original * (1 + strength) - gaussian(original, radius) * strength`.
    fn unsharp_mask(&self, input: &PlaneBuffer, strength: f32, radius: f32) -> Result<PlaneBuffer>;

    fn download(&self, buffer: &PlaneBuffer) -> Result<Raster>;
}

/// Try to bring up a GPU backend. `None` when the `gpu` feature is off or no
/// adapter is usable.
pub fn create_gpu_backend() -> Option<Arc<dyn ResizeBackend>> {
    #[cfg(feature = "gpu")]
    {
        match super::wgpu_backend::WgpuBackend::new() {
            Ok(backend) => return Some(Arc::new(backend)),
            Err(e) => tracing::warn!("GPU resize backend unavailable: {e}"),
        }
    }
    #[cfg(not(feature = "gpu"))]
    tracing::debug!("built without the `gpu` feature, resizing on CPU");
    None
}

/// Backend for the given preference, falling back to the CPU.
pub fn create_backend(preference: DevicePreference) -> Arc<dyn ResizeBackend> {
    if preference.wants_gpu() {
        if let Some(gpu) = create_gpu_backend() {
            return gpu;
        }
    }
    Arc::new(CpuBackend)
}
