//! Thin wgpu device layer: buffer allocation, host/device transfer and
//! single-kernel compute dispatch for the parity runners.

use std::sync::mpsc;

use bytemuck::Pod;
use prim_core::launch::LaunchConfig;
use thiserror::Error;
use tracing::{debug, info};
use wgpu::util::DeviceExt;

/// Fatal device-side failures. None of these are retried; the CLI exits with
/// [`HarnessError::exit_code`].
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("no compatible GPU adapter found: {0}")]
    AdapterUnavailable(String),
    #[error("failed to request wgpu device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
    #[error("failed to allocate {size} bytes for '{label}': {reason}")]
    Allocation {
        label: String,
        size: u64,
        reason: String,
    },
    #[error("transfer of '{label}' failed: {reason}")]
    Transfer { label: String, reason: String },
    #[error("dispatch of '{entry_point}' failed: {reason}")]
    Dispatch { entry_point: String, reason: String },
}

impl HarnessError {
    pub fn exit_code(&self) -> i32 {
        match self {
            HarnessError::AdapterUnavailable(_) => 100,
            HarnessError::DeviceRequest(_) => 101,
            HarnessError::Allocation { .. } => 102,
            HarnessError::Transfer { .. } => 103,
            HarnessError::Dispatch { .. } => 104,
        }
    }
}

/// Where buffers live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationStrategy {
    /// Device-local storage; uploads go through the queue, downloads through a staging copy.
    Device,
    /// Host-mappable storage buffers, read and written without staging.
    Unified,
}

#[derive(Debug)]
pub struct DeviceBuffer {
    label: String,
    buffer: wgpu::Buffer,
    size: u64,
}

impl DeviceBuffer {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Allocated size in bytes (padded to a multiple of 4).
    pub fn size(&self) -> u64 {
        self.size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    ReadWrite,
}

/// Storage buffer bound at the next binding slot.
#[derive(Debug, Clone, Copy)]
pub struct Binding<'a> {
    pub buffer: &'a DeviceBuffer,
    pub access: Access,
}

impl<'a> Binding<'a> {
    pub fn read(buffer: &'a DeviceBuffer) -> Self {
        Self {
            buffer,
            access: Access::Read,
        }
    }

    pub fn read_write(buffer: &'a DeviceBuffer) -> Self {
        Self {
            buffer,
            access: Access::ReadWrite,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    pub label: &'static str,
    pub source: &'static str,
    pub entry_point: &'static str,
}

pub struct DeviceContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    limits: wgpu::Limits,
    strategy: AllocationStrategy,
    adapter_name: String,
}

impl DeviceContext {
    pub fn new(prefer_unified: bool) -> Result<Self, HarnessError> {
        pollster::block_on(Self::new_async(prefer_unified))
    }

    pub async fn new_async(prefer_unified: bool) -> Result<Self, HarnessError> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .map_err(|err| HarnessError::AdapterUnavailable(err.to_string()))?;

        let unified = prefer_unified && Self::supports_unified(&adapter);
        let required_features = if unified {
            wgpu::Features::MAPPABLE_PRIMARY_BUFFERS
        } else {
            wgpu::Features::empty()
        };
        let limits = wgpu::Limits::downlevel_defaults();
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("parity_lab_device"),
                required_features,
                required_limits: limits.clone(),
                ..Default::default()
            })
            .await?;

        let strategy = if unified {
            AllocationStrategy::Unified
        } else {
            AllocationStrategy::Device
        };
        let adapter_name = adapter.get_info().name;
        if prefer_unified && !unified {
            info!(adapter = %adapter_name, "unified memory requested but not supported; using device buffers");
        }
        info!(adapter = %adapter_name, ?strategy, "device ready");

        Ok(Self {
            device,
            queue,
            limits,
            strategy,
            adapter_name,
        })
    }

    pub fn supports_unified(adapter: &wgpu::Adapter) -> bool {
        adapter
            .features()
            .contains(wgpu::Features::MAPPABLE_PRIMARY_BUFFERS)
    }

    pub fn strategy(&self) -> AllocationStrategy {
        self.strategy
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    /// Largest workgroup the device accepts.
    pub fn max_group_size(&self) -> u32 {
        self.limits
            .max_compute_invocations_per_workgroup
            .min(self.limits.max_compute_workgroup_size_x)
    }

    /// Copies `data` into a new storage buffer.
    pub fn upload<T: Pod>(&self, label: &str, data: &[T]) -> Result<DeviceBuffer, HarnessError> {
        let bytes = padded_bytes(bytemuck::cast_slice(data));
        match self.strategy {
            AllocationStrategy::Device => {
                let buffer = self.create_buffer(
                    label,
                    bytes.len() as u64,
                    wgpu::BufferUsages::STORAGE
                        | wgpu::BufferUsages::COPY_DST
                        | wgpu::BufferUsages::COPY_SRC,
                    false,
                )?;
                self.queue.write_buffer(&buffer.buffer, 0, &bytes);
                Ok(buffer)
            }
            AllocationStrategy::Unified => {
                let buffer = self.create_buffer(label, bytes.len() as u64, unified_usage(), true)?;
                buffer
                    .buffer
                    .slice(..)
                    .get_mapped_range_mut()
                    .copy_from_slice(&bytes);
                buffer.buffer.unmap();
                Ok(buffer)
            }
        }
    }

    /// Uninitialised-by-host output buffer holding `count` elements of `T`.
    pub fn alloc_output<T: Pod>(&self, label: &str, count: usize) -> Result<DeviceBuffer, HarnessError> {
        let size = padded_len(count * std::mem::size_of::<T>()) as u64;
        let usage = match self.strategy {
            AllocationStrategy::Device => {
                wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_SRC
                    | wgpu::BufferUsages::COPY_DST
            }
            AllocationStrategy::Unified => unified_usage(),
        };
        self.create_buffer(label, size, usage, false)
    }

    /// Reads the first `count` elements of `buffer` back to the host.
    pub fn download<T: Pod>(&self, buffer: &DeviceBuffer, count: usize) -> Result<Vec<T>, HarnessError> {
        let bytes = count * std::mem::size_of::<T>();
        if bytes as u64 > buffer.size {
            return Err(HarnessError::Transfer {
                label: buffer.label.clone(),
                reason: format!("requested {bytes} bytes from a {}-byte buffer", buffer.size),
            });
        }

        let staging;
        let readable = match self.strategy {
            AllocationStrategy::Unified => &buffer.buffer,
            AllocationStrategy::Device => {
                staging = self.create_buffer(
                    &format!("{}_staging", buffer.label),
                    buffer.size,
                    wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                    false,
                )?;
                let mut encoder = self
                    .device
                    .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                        label: Some("parity_lab_readback"),
                    });
                encoder.copy_buffer_to_buffer(&buffer.buffer, 0, &staging.buffer, 0, buffer.size);
                self.queue.submit(Some(encoder.finish()));
                &staging.buffer
            }
        };

        let transfer_error = |reason: String| HarnessError::Transfer {
            label: buffer.label.clone(),
            reason,
        };

        let slice = readable.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait)
            .map_err(|err| transfer_error(err.to_string()))?;
        receiver
            .recv()
            .map_err(|err| transfer_error(err.to_string()))?
            .map_err(|err| transfer_error(err.to_string()))?;

        let mut out = vec![T::zeroed(); count];
        {
            let data = slice.get_mapped_range();
            bytemuck::cast_slice_mut::<T, u8>(&mut out).copy_from_slice(&data[..bytes]);
        }
        readable.unmap();
        debug!(label = %buffer.label, bytes, "downloaded");
        Ok(out)
    }

    /// Runs `kernel` once over `launch`. Storage buffers bind in order from 0;
    /// `params` binds as a uniform right after them.
    pub fn dispatch<P: Pod>(
        &self,
        kernel: &Kernel,
        bindings: &[Binding<'_>],
        params: &P,
        launch: LaunchConfig,
    ) -> Result<(), HarnessError> {
        let dispatch_error = |reason: String| HarnessError::Dispatch {
            entry_point: kernel.entry_point.to_string(),
            reason,
        };

        if launch.group_size() > self.max_group_size() {
            return Err(dispatch_error(format!(
                "group size {} exceeds device limit {}",
                launch.group_size(),
                self.max_group_size()
            )));
        }
        let workgroups = launch.workgroups();
        if workgroups > self.limits.max_compute_workgroups_per_dimension {
            return Err(dispatch_error(format!(
                "{workgroups} workgroups exceed device limit {}",
                self.limits.max_compute_workgroups_per_dimension
            )));
        }
        if workgroups == 0 {
            return Ok(());
        }

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(kernel.label),
                source: wgpu::ShaderSource::Wgsl(kernel.source.into()),
            });

        let params_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("parity_lab_params"),
                contents: bytemuck::bytes_of(params),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let uniform_slot = bindings.len() as u32;
        let mut layout_entries: Vec<wgpu::BindGroupLayoutEntry> = bindings
            .iter()
            .enumerate()
            .map(|(slot, binding)| {
                layout_entry(
                    slot as u32,
                    wgpu::BufferBindingType::Storage {
                        read_only: binding.access == Access::Read,
                    },
                )
            })
            .collect();
        layout_entries.push(layout_entry(uniform_slot, wgpu::BufferBindingType::Uniform));

        let bind_group_layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(kernel.label),
                entries: &layout_entries,
            });

        let mut group_entries: Vec<wgpu::BindGroupEntry> = bindings
            .iter()
            .enumerate()
            .map(|(slot, binding)| wgpu::BindGroupEntry {
                binding: slot as u32,
                resource: binding.buffer.buffer.as_entire_binding(),
            })
            .collect();
        group_entries.push(wgpu::BindGroupEntry {
            binding: uniform_slot,
            resource: params_buffer.as_entire_binding(),
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(kernel.label),
            layout: &bind_group_layout,
            entries: &group_entries,
        });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(kernel.label),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let pipeline = self
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(kernel.label),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(kernel.entry_point),
                compilation_options: Default::default(),
                cache: None,
            });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(kernel.label),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor::default());
            pass.set_pipeline(&pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }
        self.queue.submit(Some(encoder.finish()));

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(dispatch_error(err.to_string()));
        }
        debug!(entry_point = kernel.entry_point, workgroups, "dispatched");
        Ok(())
    }

    fn create_buffer(
        &self,
        label: &str,
        size: u64,
        usage: wgpu::BufferUsages,
        mapped_at_creation: bool,
    ) -> Result<DeviceBuffer, HarnessError> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation,
        });
        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());
        if let Some(err) = validation.or(out_of_memory) {
            return Err(HarnessError::Allocation {
                label: label.to_string(),
                size,
                reason: err.to_string(),
            });
        }
        debug!(label, size, "allocated");
        Ok(DeviceBuffer {
            label: label.to_string(),
            buffer,
            size,
        })
    }
}

fn unified_usage() -> wgpu::BufferUsages {
    wgpu::BufferUsages::STORAGE
        | wgpu::BufferUsages::MAP_READ
        | wgpu::BufferUsages::MAP_WRITE
        | wgpu::BufferUsages::COPY_SRC
        | wgpu::BufferUsages::COPY_DST
}

fn layout_entry(binding: u32, ty: wgpu::BufferBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Byte length rounded up to whole 32-bit words, never zero (empty bindings are invalid).
pub fn padded_len(bytes: usize) -> usize {
    bytes.div_ceil(4).max(1) * 4
}

fn padded_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut padded = vec![0u8; padded_len(bytes.len())];
    padded[..bytes.len()].copy_from_slice(bytes);
    padded
}
