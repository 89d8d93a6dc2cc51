//! Harness settings shared by the parity lab runners and CLI.

use std::{env, fs, path::Path};

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Environment toggle that asks for host-mappable (unified) device buffers.
pub const UNIFIED_MEMORY_ENV: &str = "PARITY_LAB_USE_UNIFIED";

/// Fixed seeds that always run after the derived ones.
pub const DEFAULT_SEEDS: [u64; 4] = [0, 2, 10, 1000];

/// Per-run settings; every field has a default so partial JSON files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessSettings {
    /// Elements per test case.
    pub size: usize,
    /// Number of seeds derived from `base_seed` before the fixed list.
    pub random_seeds_count: usize,
    pub base_seed: u64,
    pub seeds: Vec<u64>,
    /// Overrides the per-type default tolerance when set.
    pub tolerance: Option<f32>,
    pub unified_memory: bool,
    /// Probability used for 0/1 key and flag sequences.
    pub bernoulli_p: f32,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            size: 256,
            random_seeds_count: 2,
            base_seed: 0xA11CE,
            seeds: DEFAULT_SEEDS.to_vec(),
            tolerance: None,
            unified_memory: false,
            bernoulli_p: 0.5,
        }
    }
}

impl HarnessSettings {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read settings {}", path.as_ref().display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid settings JSON in {}", path.as_ref().display()))
    }

    /// Turns on unified memory when [`UNIFIED_MEMORY_ENV`] is present in the environment.
    pub fn apply_env(mut self) -> Self {
        if env::var_os(UNIFIED_MEMORY_ENV).is_some() {
            self.unified_memory = true;
        }
        self
    }

    /// `random_seeds_count` seeds derived from `base_seed`, then the fixed `seeds`.
    pub fn seed_schedule(&self) -> Vec<u64> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.base_seed);
        let mut schedule: Vec<u64> = (0..self.random_seeds_count)
            .map(|_| u64::from(rng.gen::<u32>()))
            .collect();
        schedule.extend_from_slice(&self.seeds);
        schedule
    }

    /// Tolerance for a type whose default is `default_percent`.
    pub fn tolerance_or(&self, default_percent: f32) -> f32 {
        self.tolerance.unwrap_or(default_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_is_deterministic_and_ends_with_fixed_seeds() {
        let settings = HarnessSettings::default();
        let schedule = settings.seed_schedule();
        assert_eq!(schedule.len(), settings.random_seeds_count + DEFAULT_SEEDS.len());
        assert_eq!(&schedule[settings.random_seeds_count..], &DEFAULT_SEEDS);
        assert_eq!(schedule, settings.seed_schedule());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings: HarnessSettings =
            serde_json::from_str(r#"{ "size": 1024, "tolerance": 0.02 }"#).unwrap();
        assert_eq!(settings.size, 1024);
        assert_eq!(settings.tolerance_or(0.01), 0.02);
        assert_eq!(settings.seeds, DEFAULT_SEEDS.to_vec());
        assert!(!settings.unified_memory);
    }

    #[test]
    fn tolerance_falls_back_to_type_default() {
        let settings = HarnessSettings::default();
        assert_eq!(settings.tolerance_or(0.075), 0.075);
    }
}
