//! WGSL sources for the device-side stand-ins the parity lab runs against.

/// Workgroup size baked into every kernel below.
pub const WORKGROUP_SIZE: u32 = 64;

pub mod compute {
    /// Word-wise copy `output[i] = input[i]` (thread-level load).
    pub const THREAD_LOAD: &str = include_str!("kernels/thread_load.wgsl");
    /// Inclusive / exclusive / exclusive-by-key `u32` scans and an inclusive `f32` sum.
    pub const SCAN: &str = include_str!("kernels/scan.wgsl");
}

pub mod entry_points {
    pub const THREAD_LOAD: &str = "thread_load";
    pub const INCLUSIVE_SCAN_U32: &str = "inclusive_scan_u32";
    pub const EXCLUSIVE_SCAN_U32: &str = "exclusive_scan_u32";
    pub const EXCLUSIVE_SCAN_BY_KEY_U32: &str = "exclusive_scan_by_key_u32";
    pub const INCLUSIVE_SCAN_F32: &str = "inclusive_scan_f32";
}

#[cfg(test)]
mod tests {
    use super::*;
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    fn validate_wgsl(label: &str, source: &str) -> naga::Module {
        let module =
            naga::front::wgsl::parse_str(source).unwrap_or_else(|err| panic!("{label}: {err:?}"));
        let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
        validator
            .validate(&module)
            .unwrap_or_else(|err| panic!("{label}: {err:?}"));
        module
    }

    fn assert_entry_points(module: &naga::Module, expected: &[&str]) {
        for name in expected {
            let entry = module
                .entry_points
                .iter()
                .find(|ep| ep.name == *name)
                .unwrap_or_else(|| panic!("missing entry point {name}"));
            assert_eq!(entry.workgroup_size, [WORKGROUP_SIZE, 1, 1], "{name}");
        }
    }

    #[test]
    fn thread_load_validates() {
        let module = validate_wgsl("thread_load", compute::THREAD_LOAD);
        assert_entry_points(&module, &[entry_points::THREAD_LOAD]);
    }

    #[test]
    fn scan_validates() {
        let module = validate_wgsl("scan", compute::SCAN);
        assert_entry_points(
            &module,
            &[
                entry_points::INCLUSIVE_SCAN_U32,
                entry_points::EXCLUSIVE_SCAN_U32,
                entry_points::EXCLUSIVE_SCAN_BY_KEY_U32,
                entry_points::INCLUSIVE_SCAN_F32,
            ],
        );
    }
}
