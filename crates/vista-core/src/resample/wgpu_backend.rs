//! wgpu-based resize backend (Metal / Vulkan / DX12).

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::error::{Result, ViewError};
use crate::filters::gaussian_blur::make_gaussian_kernel;
use crate::raster::Raster;

use super::{BufferInner, PlaneBuffer, ResizeBackend};

// ---------------------------------------------------------------------------
// Inline WGSL shaders
// ---------------------------------------------------------------------------

const AREA_AVERAGE_WGSL: &str = r"
struct Params { in_w: u32, in_h: u32, out_w: u32, out_h: u32 }
@group(0) @binding(0) var<storage, read>       input:  array<f32>;
@group(0) @binding(1) var<storage, read_write> output: array<f32>;
@group(0) @binding(2) var<uniform>             params: Params;
@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    let ox = gid.x; let oy = gid.y;
    if ox >= params.out_w || oy >= params.out_h { return; }
    let rx = f32(params.in_w) / f32(params.out_w);
    let ry = f32(params.in_h) / f32(params.out_h);
    let x0 = f32(ox) * rx;
    let x1 = min(f32(ox + 1u) * rx, f32(params.in_w));
    let y0 = f32(oy) * ry;
    let y1 = min(f32(oy + 1u) * ry, f32(params.in_h));
    let first_x = u32(floor(x0));
    let last_x = min(u32(ceil(x1)), params.in_w);
    let first_y = u32(floor(y0));
    let last_y = min(u32(ceil(y1)), params.in_h);
    var sum = 0.0;
    for (var iy = first_y; iy < last_y; iy = iy + 1u) {
        let wy = min(f32(iy + 1u), y1) - max(f32(iy), y0);
        for (var ix = first_x; ix < last_x; ix = ix + 1u) {
            let wx = min(f32(ix + 1u), x1) - max(f32(ix), x0);
            sum = sum + input[iy * params.in_w + ix] * wx * wy;
        }
    }
    output[oy * params.out_w + ox] = sum / ((x1 - x0) * (y1 - y0));
}
";

const CONVOLVE_WGSL: &str = r"
struct Params { h: u32, w: u32, kernel_len: u32, pad: u32 }
@group(0) @binding(0) var<storage, read>       input:  array<f32>;
@group(0) @binding(1) var<storage, read_write> output: array<f32>;
@group(0) @binding(2) var<storage, read>       kernel: array<f32>;
@group(0) @binding(3) var<uniform>             params: Params;
@compute @workgroup_size(16, 16)
fn convolve_rows(@builtin(global_invocation_id) gid: vec3<u32>) {
    if gid.x >= params.w || gid.y >= params.h { return; }
    let row = gid.y; let col = i32(gid.x);
    let radius = i32(params.kernel_len / 2u);
    var sum = 0.0;
    for (var k = 0; k < i32(params.kernel_len); k = k + 1) {
        let c = clamp(col + k - radius, 0, i32(params.w) - 1);
        sum = sum + input[row * params.w + u32(c)] * kernel[k];
    }
    output[row * params.w + gid.x] = sum;
}
@compute @workgroup_size(16, 16)
fn convolve_cols(@builtin(global_invocation_id) gid: vec3<u32>) {
    if gid.x >= params.w || gid.y >= params.h { return; }
    let row = i32(gid.y); let col = gid.x;
    let radius = i32(params.kernel_len / 2u);
    var sum = 0.0;
    for (var k = 0; k < i32(params.kernel_len); k = k + 1) {
        let r = clamp(row + k - radius, 0, i32(params.h) - 1);
        sum = sum + input[u32(r) * params.w + col] * kernel[k];
    }
    output[gid.y * params.w + col] = sum;
}
";

const UNSHARP_COMBINE_WGSL: &str = r"
struct Params { w: u32, h: u32, strength: f32, pad: u32 }
@group(0) @binding(0) var<storage, read>       original: array<f32>;
@group(0) @binding(1) var<storage, read>       blurred:  array<f32>;
@group(0) @binding(2) var<storage, read_write> output:   array<f32>;
@group(0) @binding(3) var<uniform>             params:   Params;
@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    if gid.x >= params.w || gid.y >= params.h { return; }
    let i = gid.y * params.w + gid.x;
    let s = params.strength;
    output[i] = clamp(original[i] * (1.0 + s) - blurred[i] * s, 0.0, 255.0);
}
";

/// Edge length of the square workgroups every shader above is compiled with.
const TILE: u32 = 16;

// ---------------------------------------------------------------------------
// Uniform parameter structs (must match WGSL layouts exactly)
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct AreaParams {
    in_w: u32,
    in_h: u32,
    out_w: u32,
    out_h: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ConvolveParams {
    h: u32,
    w: u32,
    kernel_len: u32,
    pad: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct CombineParams {
    w: u32,
    h: u32,
    strength: f32,
    pad: u32,
}

fn gpu_planes(buf: &PlaneBuffer) -> Result<&[wgpu::Buffer]> {
    match &buf.inner {
        BufferInner::Wgpu { planes, .. } => Ok(planes),
        BufferInner::Cpu(_) => Err(ViewError::Gpu("expected a device buffer".into())),
    }
}

/// 2-D workgroup counts covering a `width` x `height` plane in `TILE`-sized tiles.
fn workgroup_grid(width: usize, height: usize, max_per_dim: u32) -> Result<(u32, u32, u32)> {
    let tile = TILE as usize;
    let gx = width.div_ceil(tile);
    let gy = height.div_ceil(tile);
    let limit = max_per_dim as usize;
    if gx > limit || gy > limit {
        return Err(ViewError::Gpu(format!(
            "{width}x{height} plane needs {gx}x{gy} workgroups, device allows {max_per_dim} per dimension"
        )));
    }
    Ok((gx as u32, gy as u32, 1))
}

/// Byte size of one f32 plane, rejected when it cannot be bound as a storage buffer.
fn plane_bytes(width: usize, height: usize, max_binding: u64, max_buffer: u64) -> Result<u64> {
    let bytes = (width as u64)
        .saturating_mul(height as u64)
        .saturating_mul(std::mem::size_of::<f32>() as u64);
    let limit = max_binding.min(max_buffer);
    if bytes > limit {
        return Err(ViewError::Gpu(format!(
            "{width}x{height} plane is {bytes} bytes, device binds at most {limit}"
        )));
    }
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// WgpuBackend
// ---------------------------------------------------------------------------

pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    adapter_name: String,
    limits: wgpu::Limits,
    area_pipeline: wgpu::ComputePipeline,
    convolve_rows_pipeline: wgpu::ComputePipeline,
    convolve_cols_pipeline: wgpu::ComputePipeline,
    combine_pipeline: wgpu::ComputePipeline,
}

impl WgpuBackend {
    pub fn new() -> std::result::Result<Self, String> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| format!("No suitable GPU adapter found: {e}"))?;

        let adapter_name = adapter.get_info().name.clone();
        tracing::info!("GPU adapter: {adapter_name}");

        // Buffer and dispatch limits come from the adapter.
        let adapter_limits = adapter.limits();
        let required_limits = wgpu::Limits {
            max_buffer_size: adapter_limits.max_buffer_size,
            max_storage_buffer_binding_size: adapter_limits.max_storage_buffer_binding_size,
            max_compute_workgroups_per_dimension: adapter_limits
                .max_compute_workgroups_per_dimension,
            ..wgpu::Limits::default()
        };

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("vista"),
            required_features: wgpu::Features::empty(),
            required_limits,
            ..Default::default()
        }))
        .map_err(|e| format!("Failed to create GPU device: {e}"))?;

        let limits = device.limits();
        tracing::debug!(
            max_binding = limits.max_storage_buffer_binding_size as u64,
            max_workgroups = limits.max_compute_workgroups_per_dimension,
            "GPU device limits"
        );

        let device: Arc<wgpu::Device> = Arc::new(device);
        let queue: Arc<wgpu::Queue> = Arc::new(queue);

        let mk = |label, src: &str| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(src.into()),
            })
        };

        let area_mod = mk("area_average", AREA_AVERAGE_WGSL);
        let conv_mod = mk("convolve", CONVOLVE_WGSL);
        let combine_mod = mk("unsharp_combine", UNSHARP_COMBINE_WGSL);

        let pipe = |module: &wgpu::ShaderModule, entry: &str| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: None,
                layout: None,
                module,
                entry_point: Some(entry),
                compilation_options: Default::default(),
                cache: None,
            })
        };

        Ok(Self {
            adapter_name,
            limits,
            area_pipeline: pipe(&area_mod, "main"),
            convolve_rows_pipeline: pipe(&conv_mod, "convolve_rows"),
            convolve_cols_pipeline: pipe(&conv_mod, "convolve_cols"),
            combine_pipeline: pipe(&combine_mod, "main"),
            device,
            queue,
        })
    }

    // --- Limit checks ---

    fn check_plane(&self, width: usize, height: usize) -> Result<u64> {
        plane_bytes(
            width,
            height,
            self.limits.max_storage_buffer_binding_size as u64,
            self.limits.max_buffer_size,
        )
    }

    fn grid(&self, width: usize, height: usize) -> Result<(u32, u32, u32)> {
        workgroup_grid(
            width,
            height,
            self.limits.max_compute_workgroups_per_dimension,
        )
    }

    /// Run `f` inside a validation error scope, turning captured errors into `ViewError::Gpu`.
    fn scoped<T>(&self, f: impl FnOnce() -> T) -> Result<T> {
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f();
        match pollster::block_on(scope.pop()) {
            Some(err) => Err(ViewError::Gpu(err.to_string())),
            None => Ok(value),
        }
    }

    // --- Buffer helpers ---

    fn create_storage(&self, data: &[f32]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: None,
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_SRC
                    | wgpu::BufferUsages::COPY_DST,
            })
    }

    fn create_storage_uninit(&self, byte_size: u64) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size: byte_size,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_uniform<T: Pod>(&self, data: &T) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: None,
                contents: bytemuck::bytes_of(data),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
    }

    fn download_f32(&self, buffer: &wgpu::Buffer) -> Result<Vec<f32>> {
        let size = buffer.size();
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut enc = self.device.create_command_encoder(&Default::default());
        enc.copy_buffer_to_buffer(buffer, 0, &staging, 0, size);
        self.queue.submit(std::iter::once(enc.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        slice.map_async(wgpu::MapMode::Read, move |r| {
            tx.send(r).ok();
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| ViewError::Gpu(format!("Device poll failed: {e}")))?;
        rx.recv()
            .map_err(|_| ViewError::Gpu("GPU channel closed".into()))?
            .map_err(|e| ViewError::Gpu(format!("Buffer mapping failed: {e}")))?;

        let data = slice.get_mapped_range();
        let result: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging.unmap();
        Ok(result)
    }

    /// Dispatch a single compute pass with one bind group at group(0).
    fn dispatch(
        &self,
        pipeline: &wgpu::ComputePipeline,
        entries: &[wgpu::BindGroupEntry],
        workgroups: (u32, u32, u32),
    ) -> Result<()> {
        self.scoped(|| {
            let layout = pipeline.get_bind_group_layout(0);
            let bg = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: None,
                layout: &layout,
                entries,
            });
            let mut enc = self.device.create_command_encoder(&Default::default());
            {
                let mut pass = enc.begin_compute_pass(&Default::default());
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &bg, &[]);
                pass.dispatch_workgroups(workgroups.0, workgroups.1, workgroups.2);
            }
            self.queue.submit(std::iter::once(enc.finish()));
        })
    }

    fn make_buffer(
        &self,
        planes: Vec<wgpu::Buffer>,
        like: &PlaneBuffer,
        height: usize,
        width: usize,
    ) -> PlaneBuffer {
        PlaneBuffer {
            inner: BufferInner::Wgpu {
                planes,
                device: Arc::clone(&self.device),
                queue: Arc::clone(&self.queue),
            },
            width,
            height,
            format: like.format,
        }
    }

    fn blur_plane(
        &self,
        input: &wgpu::Buffer,
        h: u32,
        w: u32,
        kernel_buf: &wgpu::Buffer,
        kernel_len: u32,
    ) -> Result<wgpu::Buffer> {
        let params = self.create_uniform(&ConvolveParams {
            h,
            w,
            kernel_len,
            pad: 0,
        });
        let groups = self.grid(w as usize, h as usize)?;

        let after_rows = self.create_storage_uninit(input.size());
        self.dispatch(
            &self.convolve_rows_pipeline,
            &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: input.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: after_rows.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: kernel_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: params.as_entire_binding(),
                },
            ],
            groups,
        )?;

        let after_cols = self.create_storage_uninit(input.size());
        self.dispatch(
            &self.convolve_cols_pipeline,
            &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: after_rows.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: after_cols.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: kernel_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: params.as_entire_binding(),
                },
            ],
            groups,
        )?;
        Ok(after_cols)
    }
}

// ---------------------------------------------------------------------------
// ResizeBackend implementation
// ---------------------------------------------------------------------------

impl ResizeBackend for WgpuBackend {
    fn name(&self) -> &str {
        &self.adapter_name
    }

    fn is_gpu(&self) -> bool {
        true
    }

    fn upload(&self, raster: &Raster) -> Result<PlaneBuffer> {
        let (width, height) = (raster.width() as usize, raster.height() as usize);
        self.check_plane(width, height)?;
        let planes: Vec<wgpu::Buffer> = self.scoped(|| {
            raster
                .to_planes()
                .iter()
                .map(|p| self.create_storage(&p.iter().copied().collect::<Vec<f32>>()))
                .collect()
        })?;
        Ok(PlaneBuffer {
            inner: BufferInner::Wgpu {
                planes,
                device: Arc::clone(&self.device),
                queue: Arc::clone(&self.queue),
            },
            width,
            height,
            format: raster.format(),
        })
    }

    fn area_average(
        &self,
        input: &PlaneBuffer,
        out_width: usize,
        out_height: usize,
    ) -> Result<PlaneBuffer> {
        let out_bytes = self.check_plane(out_width, out_height)?;
        let groups = self.grid(out_width, out_height)?;
        let params = self.create_uniform(&AreaParams {
            in_w: input.width as u32,
            in_h: input.height as u32,
            out_w: out_width as u32,
            out_h: out_height as u32,
        });

        let planes = gpu_planes(input)?
            .iter()
            .map(|plane| {
                let out = self.create_storage_uninit(out_bytes);
                self.dispatch(
                    &self.area_pipeline,
                    &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: plane.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: out.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: params.as_entire_binding(),
                        },
                    ],
                    groups,
                )?;
                Ok(out)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.make_buffer(planes, input, out_height, out_width))
    }

    fn unsharp_mask(&self, input: &PlaneBuffer, strength: f32, radius: f32) -> Result<PlaneBuffer> {
        self.check_plane(input.width, input.height)?;
        let groups = self.grid(input.width, input.height)?;
        let (h, w) = (input.height as u32, input.width as u32);
        let kernel = make_gaussian_kernel(radius.max(f32::EPSILON));
        let kernel_buf = self.create_storage(&kernel);
        let params = self.create_uniform(&CombineParams {
            w,
            h,
            strength,
            pad: 0,
        });

        let planes = gpu_planes(input)?
            .iter()
            .map(|plane| {
                let blurred = self.blur_plane(plane, h, w, &kernel_buf, kernel.len() as u32)?;
                let out = self.create_storage_uninit(plane.size());
                self.dispatch(
                    &self.combine_pipeline,
                    &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: plane.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: blurred.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: out.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: params.as_entire_binding(),
                        },
                    ],
                    groups,
                )?;
                Ok(out)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.make_buffer(planes, input, input.height, input.width))
    }

    fn download(&self, buffer: &PlaneBuffer) -> Result<Raster> {
        let planes = gpu_planes(buffer)?
            .iter()
            .map(|plane| {
                let data = self.download_f32(plane)?;
                ndarray::Array2::from_shape_vec((buffer.height, buffer.width), data)
                    .map_err(|e| ViewError::Gpu(format!("Downloaded plane has wrong shape: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Raster::from_planes(&planes, buffer.format)
    }
}
