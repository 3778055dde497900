use ndarray::Array2;

#[cfg(feature = "gpu")]
use crate::error::ViewError;
use crate::error::Result;
use crate::filters::area_average::area_average_plane;
use crate::filters::unsharp_mask::unsharp_mask_plane;
use crate::raster::Raster;

use super::{BufferInner, PlaneBuffer, ResizeBackend};

/// CPU backend; always available.
pub struct CpuBackend;

impl ResizeBackend for CpuBackend {
    fn name(&self) -> &str {
        "CPU/Rayon"
    }

    fn upload(&self, raster: &Raster) -> Result<PlaneBuffer> {
        Ok(PlaneBuffer::from_planes(raster.to_planes(), raster.format()))
    }

    fn area_average(
        &self,
        input: &PlaneBuffer,
        out_width: usize,
        out_height: usize,
    ) -> Result<PlaneBuffer> {
        let planes = cpu_planes(input)?
            .iter()
            .map(|p| area_average_plane(p, out_height, out_width))
            .collect();
        Ok(PlaneBuffer::from_planes(planes, input.format))
    }

    fn unsharp_mask(&self, input: &PlaneBuffer, strength: f32, radius: f32) -> Result<PlaneBuffer> {
        let planes = cpu_planes(input)?
            .iter()
            .map(|p| unsharp_mask_plane(p, strength, radius))
            .collect();
        Ok(PlaneBuffer::from_planes(planes, input.format))
    }

    fn download(&self, buffer: &PlaneBuffer) -> Result<Raster> {
        Raster::from_planes(cpu_planes(buffer)?, buffer.format)
    }
}

fn cpu_planes(buf: &PlaneBuffer) -> Result<&[Array2<f32>]> {
    match &buf.inner {
        BufferInner::Cpu(planes) => Ok(planes),
        #[cfg(feature = "gpu")]
        _ => Err(ViewError::Gpu("CpuBackend received a device buffer".into())),
    }
}
