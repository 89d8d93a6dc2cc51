use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use prim_core::CustomPair;
use serde::{Deserialize, Serialize};

use crate::cpu::{FloatScanCase, LoadCase, LoadElement, ScanCase, ScanKind};

/// Thread-load payload tagged with its element type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "element", content = "values", rename_all = "snake_case")]
pub enum LoadData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    CustomU64(Vec<CustomPair<u64>>),
    CustomF64(Vec<CustomPair<f64>>),
}

impl LoadData {
    pub fn generate(element: LoadElement, count: usize, seed: u64) -> Self {
        match element {
            LoadElement::U8 => LoadData::U8(LoadCase::<u8>::generate(count, seed).input),
            LoadElement::U16 => LoadData::U16(LoadCase::<u16>::generate(count, seed).input),
            LoadElement::U32 => LoadData::U32(LoadCase::<u32>::generate(count, seed).input),
            LoadElement::U64 => LoadData::U64(LoadCase::<u64>::generate(count, seed).input),
            LoadElement::CustomU64 => {
                LoadData::CustomU64(LoadCase::<CustomPair<u64>>::generate(count, seed).input)
            }
            LoadElement::CustomF64 => {
                LoadData::CustomF64(LoadCase::<CustomPair<f64>>::generate(count, seed).input)
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            LoadData::U8(v) => v.len(),
            LoadData::U16(v) => v.len(),
            LoadData::U32(v) => v.len(),
            LoadData::U64(v) => v.len(),
            LoadData::CustomU64(v) => v.len(),
            LoadData::CustomF64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One labelled unit of work for the runners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseSet {
    ThreadLoad {
        label: String,
        seed: u64,
        data: LoadData,
    },
    Scan {
        label: String,
        case: ScanCase,
    },
    FloatScan {
        label: String,
        case: FloatScanCase,
    },
}

impl CaseSet {
    pub fn label(&self) -> &str {
        match self {
            CaseSet::ThreadLoad { label, .. }
            | CaseSet::Scan { label, .. }
            | CaseSet::FloatScan { label, .. } => label,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CaseSet::ThreadLoad { .. } => "thread_load",
            CaseSet::Scan { case, .. } => case.kind.name(),
            CaseSet::FloatScan { .. } => "inclusive_scan_f32",
        }
    }

    pub fn seed(&self) -> u64 {
        match self {
            CaseSet::ThreadLoad { seed, .. } => *seed,
            CaseSet::Scan { case, .. } => case.seed,
            CaseSet::FloatScan { case, .. } => case.seed,
        }
    }

    fn validate(&self) -> Result<()> {
        if let CaseSet::Scan { label, case } = self {
            if case.kind == ScanKind::ExclusiveByKey && case.keys.len() != case.values.len() {
                bail!(
                    "case set '{label}': {} keys for {} values",
                    case.keys.len(),
                    case.values.len()
                );
            }
        }
        Ok(())
    }
}

/// Writes labelled case sets to JSON so other runners can replay them.
pub fn export_case_sets_to_json<P: AsRef<Path>>(sets: &[CaseSet], path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(sets).context("failed to serialise case sets")?;
    fs::write(&path, json)
        .with_context(|| format!("failed to write cases JSON to {}", path.as_ref().display()))?;
    Ok(())
}

pub fn import_case_sets_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<CaseSet>> {
    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.as_ref().display()))?;
    let sets: Vec<CaseSet> = serde_json::from_str(&data)
        .with_context(|| format!("invalid case JSON in {}", path.as_ref().display()))?;
    for set in &sets {
        set.validate()?;
    }
    Ok(sets)
}
