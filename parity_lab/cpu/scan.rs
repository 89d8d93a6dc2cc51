use prim_core::random::random_data;
use prim_core::scan::{host_exclusive_scan, host_exclusive_scan_by_key, host_inclusive_scan};
use serde::{Deserialize, Serialize};

use super::{generate_initial_value, generate_segment_keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanKind {
    Inclusive,
    Exclusive,
    ExclusiveByKey,
}

impl ScanKind {
    pub const ALL: [ScanKind; 3] = [ScanKind::Inclusive, ScanKind::Exclusive, ScanKind::ExclusiveByKey];

    pub fn name(self) -> &'static str {
        match self {
            ScanKind::Inclusive => "inclusive_scan",
            ScanKind::Exclusive => "exclusive_scan",
            ScanKind::ExclusiveByKey => "exclusive_scan_by_key",
        }
    }
}

/// `u32` scan case under wrapping addition (matches `u32` addition in WGSL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanCase {
    pub kind: ScanKind,
    pub seed: u64,
    pub values: Vec<u32>,
    /// Segment keys; only consulted by [`ScanKind::ExclusiveByKey`].
    #[serde(default)]
    pub keys: Vec<u32>,
    #[serde(default)]
    pub initial: u32,
}

impl ScanCase {
    pub fn generate(kind: ScanKind, count: usize, seed: u64, key_p: f32) -> Self {
        let values = random_data(count, 0u32, 1000, seed);
        let keys = match kind {
            ScanKind::ExclusiveByKey => generate_segment_keys(count, key_p, seed),
            ScanKind::Inclusive | ScanKind::Exclusive => Vec::new(),
        };
        let initial = match kind {
            ScanKind::Inclusive => 0,
            ScanKind::Exclusive | ScanKind::ExclusiveByKey => generate_initial_value(seed),
        };
        Self {
            kind,
            seed,
            values,
            keys,
            initial,
        }
    }

    pub fn reference(&self) -> Vec<u32> {
        match self.kind {
            ScanKind::Inclusive => host_inclusive_scan(&self.values, u32::wrapping_add),
            ScanKind::Exclusive => host_exclusive_scan(&self.values, self.initial, u32::wrapping_add),
            ScanKind::ExclusiveByKey => host_exclusive_scan_by_key(
                &self.values,
                &self.keys,
                self.initial,
                u32::wrapping_add,
                |earlier, later| earlier == later,
            ),
        }
    }
}

/// Inclusive `f32` sum; the reference accumulates in `f64` and narrows at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatScanCase {
    pub seed: u64,
    pub values: Vec<f32>,
}

impl FloatScanCase {
    pub fn generate(count: usize, seed: u64) -> Self {
        Self {
            seed,
            values: random_data(count, -1.0f32, 1.0, seed),
        }
    }

    pub fn reference(&self) -> Vec<f32> {
        let wide: Vec<f64> = host_inclusive_scan(&self.values, |a: f64, b: f64| a + b);
        wide.into_iter().map(|v| v as f32).collect()
    }
}
