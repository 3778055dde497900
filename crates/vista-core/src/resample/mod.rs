mod backend;
pub mod cpu;
pub mod pipeline;
#[cfg(feature = "gpu")]
pub mod wgpu_backend;

pub(crate) use backend::BufferInner;
pub use backend::{
    create_backend, create_gpu_backend, DevicePreference, PlaneBuffer, ResizeBackend,
};
pub use pipeline::{ResampleRequest, Resampler, SharpenParams};
