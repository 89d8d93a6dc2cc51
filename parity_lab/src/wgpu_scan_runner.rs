use prim_core::launch::LaunchConfig;
use prim_shaders::{compute, entry_points, WORKGROUP_SIZE};

use crate::cpu::{ScanCase, ScanKind};
use crate::device::{Binding, DeviceContext, HarnessError, Kernel};

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ScanParams {
    count: u32,
    initial: u32,
    _pad: [u32; 2],
}

fn scan_kernel(entry_point: &'static str) -> Kernel {
    Kernel {
        label: "Scan",
        source: compute::SCAN,
        entry_point,
    }
}

fn element_count(len: usize, entry_point: &str) -> Result<u32, HarnessError> {
    u32::try_from(len).map_err(|_| HarnessError::Dispatch {
        entry_point: entry_point.to_string(),
        reason: format!("{len} elements do not fit a 32-bit invocation index"),
    })
}

pub fn run_gpu_scan_u32(ctx: &DeviceContext, case: &ScanCase) -> Result<Vec<u32>, HarnessError> {
    let entry_point = match case.kind {
        ScanKind::Inclusive => entry_points::INCLUSIVE_SCAN_U32,
        ScanKind::Exclusive => entry_points::EXCLUSIVE_SCAN_U32,
        ScanKind::ExclusiveByKey => entry_points::EXCLUSIVE_SCAN_BY_KEY_U32,
    };
    if case.values.is_empty() {
        return Ok(Vec::new());
    }
    let count = element_count(case.values.len(), entry_point)?;

    let values = ctx.upload("ScanValues", &case.values)?;
    // The layout always has a keys slot; unkeyed scans never read it.
    let keys = if case.kind == ScanKind::ExclusiveByKey {
        Some(ctx.upload("ScanKeys", &case.keys)?)
    } else {
        None
    };
    let output = ctx.alloc_output::<u32>("ScanOutput", case.values.len())?;
    let params = ScanParams {
        count,
        initial: case.initial,
        _pad: [0; 2],
    };

    ctx.dispatch(
        &scan_kernel(entry_point),
        &[
            Binding::read(&values),
            Binding::read(keys.as_ref().unwrap_or(&values)),
            Binding::read_write(&output),
        ],
        &params,
        LaunchConfig::new(count, WORKGROUP_SIZE),
    )?;

    ctx.download(&output, case.values.len())
}

/// Inclusive `f32` sum. Values travel as raw bits through the `u32` bindings.
pub fn run_gpu_inclusive_scan_f32(ctx: &DeviceContext, values: &[f32]) -> Result<Vec<f32>, HarnessError> {
    let entry_point = entry_points::INCLUSIVE_SCAN_F32;
    if values.is_empty() {
        return Ok(Vec::new());
    }
    let count = element_count(values.len(), entry_point)?;

    let input = ctx.upload("FloatScanValues", values)?;
    let output = ctx.alloc_output::<f32>("FloatScanOutput", values.len())?;
    let params = ScanParams {
        count,
        initial: 0,
        _pad: [0; 2],
    };

    ctx.dispatch(
        &scan_kernel(entry_point),
        &[
            Binding::read(&input),
            Binding::read(&input),
            Binding::read_write(&output),
        ],
        &params,
        LaunchConfig::new(count, WORKGROUP_SIZE),
    )?;

    ctx.download(&output, values.len())
}
