use bytemuck::Pod;
use prim_core::launch::LaunchConfig;
use prim_shaders::{compute, entry_points, WORKGROUP_SIZE};

use crate::device::{Binding, DeviceContext, HarnessError, Kernel};

const THREAD_LOAD: Kernel = Kernel {
    label: "ThreadLoad",
    source: compute::THREAD_LOAD,
    entry_point: entry_points::THREAD_LOAD,
};

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct LoadParams {
    count: u32,
    _pad: [u32; 3],
}

/// Round-trips `input` through the thread-load kernel. The kernel moves 32-bit
/// words, so any `Pod` element works regardless of its width.
pub fn run_gpu_load<T: Pod>(ctx: &DeviceContext, input: &[T]) -> Result<Vec<T>, HarnessError> {
    if input.is_empty() {
        return Ok(Vec::new());
    }

    let words = std::mem::size_of_val(input).div_ceil(4);
    let count = u32::try_from(words).map_err(|_| HarnessError::Dispatch {
        entry_point: THREAD_LOAD.entry_point.to_string(),
        reason: format!("{words} words do not fit a 32-bit invocation index"),
    })?;

    let input_buffer = ctx.upload("ThreadLoadInput", input)?;
    let output_buffer = ctx.alloc_output::<T>("ThreadLoadOutput", input.len())?;
    let params = LoadParams {
        count,
        _pad: [0; 3],
    };

    ctx.dispatch(
        &THREAD_LOAD,
        &[Binding::read(&input_buffer), Binding::read_write(&output_buffer)],
        &params,
        LaunchConfig::new(count, WORKGROUP_SIZE),
    )?;

    ctx.download(&output_buffer, input.len())
}
