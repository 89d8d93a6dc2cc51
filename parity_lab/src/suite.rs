//! Seed-driven parity suite: generate, compute the host reference, dispatch,
//! then hand both sides to the oracle.

use bytemuck::Pod;
use prim_core::{
    config::HarnessSettings,
    oracle::{compare_eq_slice, compare_near_slice, precision_threshold, Comparable, Failure},
    Report,
};
use tracing::{debug, info, info_span, warn};

use crate::{
    case_io::{CaseSet, LoadData},
    cpu::{FloatScanCase, LoadCase, LoadElement, ScanCase, ScanKind},
    device::{DeviceContext, HarnessError},
    wgpu_load_runner::run_gpu_load,
    wgpu_scan_runner::{run_gpu_inclusive_scan_f32, run_gpu_scan_u32},
};

#[derive(Debug, Clone)]
pub struct CaseOutcome {
    pub label: String,
    pub kind: &'static str,
    pub seed: u64,
    pub report: Report,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.report.passed()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SuiteOutcome {
    pub cases: Vec<CaseOutcome>,
}

impl SuiteOutcome {
    pub fn passed(&self) -> bool {
        self.cases.iter().all(CaseOutcome::passed)
    }

    pub fn failed(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.cases.iter().filter(|case| !case.passed())
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }
}

/// Every case set the suite runs, in seed-schedule order.
pub fn build_case_sets(settings: &HarnessSettings) -> Vec<CaseSet> {
    let mut sets = Vec::new();
    for seed in settings.seed_schedule() {
        for element in LoadElement::ALL {
            sets.push(CaseSet::ThreadLoad {
                label: format!("thread_load_{}_0x{seed:X}", element.name()),
                seed,
                data: LoadData::generate(element, settings.size, seed),
            });
        }
        for kind in ScanKind::ALL {
            sets.push(CaseSet::Scan {
                label: format!("{}_u32_0x{seed:X}", kind.name()),
                case: ScanCase::generate(kind, settings.size, seed, settings.bernoulli_p),
            });
        }
        sets.push(CaseSet::FloatScan {
            label: format!("inclusive_scan_f32_0x{seed:X}"),
            case: FloatScanCase::generate(settings.size, seed),
        });
    }
    sets
}

/// Runs one set. Device failures are fatal and returned; mismatches land in the report.
pub fn run_case_set(
    ctx: &DeviceContext,
    set: &CaseSet,
    settings: &HarnessSettings,
) -> Result<CaseOutcome, HarnessError> {
    let span = info_span!("case", label = set.label(), seed = set.seed());
    let _guard = span.enter();

    let report = match set {
        CaseSet::ThreadLoad { seed, data, .. } => match data {
            LoadData::U8(values) => check_load(ctx, *seed, values)?,
            LoadData::U16(values) => check_load(ctx, *seed, values)?,
            LoadData::U32(values) => check_load(ctx, *seed, values)?,
            LoadData::U64(values) => check_load(ctx, *seed, values)?,
            LoadData::CustomU64(values) => check_load(ctx, *seed, values)?,
            LoadData::CustomF64(values) => check_load(ctx, *seed, values)?,
        },
        CaseSet::Scan { case, .. } => {
            let result = run_gpu_scan_u32(ctx, case)?;
            let mut report = Report::new();
            compare_eq_slice(&result, &case.reference(), &mut report);
            report
        }
        CaseSet::FloatScan { case, .. } => {
            let result = run_gpu_inclusive_scan_f32(ctx, &case.values)?;
            let tolerance = settings.tolerance_or(precision_threshold::<f32>());
            let mut report = Report::new();
            compare_near_slice(&result, &case.reference(), tolerance, &mut report);
            report
        }
    };

    for failure in report.failures() {
        warn!(label = set.label(), "{failure}");
    }
    debug!(checked = report.checked(), passed = report.passed(), "compared");

    Ok(CaseOutcome {
        label: set.label().to_string(),
        kind: set.kind(),
        seed: set.seed(),
        report,
    })
}

fn check_load<T: Pod + Comparable>(ctx: &DeviceContext, seed: u64, values: &[T]) -> Result<Report, HarnessError> {
    let case = LoadCase::new(seed, values.to_vec());
    let result = run_gpu_load(ctx, &case.input)?;
    let mut report = Report::new();
    compare_eq_slice(&result, &case.reference(), &mut report);
    Ok(report)
}

/// Runs every set, stopping at the first device failure.
pub fn run_suite(
    ctx: &DeviceContext,
    sets: &[CaseSet],
    settings: &HarnessSettings,
) -> Result<SuiteOutcome, HarnessError> {
    let mut outcome = SuiteOutcome::default();
    for set in sets {
        info!(label = set.label(), kind = set.kind(), "running case set");
        outcome.cases.push(run_case_set(ctx, set, settings)?);
    }
    info!(
        total = outcome.cases.len(),
        failed = outcome.failed_count(),
        "suite finished"
    );
    Ok(outcome)
}

/// First failure of every failing case, for summaries.
pub fn first_failures(outcome: &SuiteOutcome) -> Vec<(&str, &Failure)> {
    outcome
        .failed()
        .filter_map(|case| {
            case.report
                .failures()
                .first()
                .map(|failure| (case.label.as_str(), failure))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_sets_cover_every_seed_and_primitive() {
        let settings = HarnessSettings {
            size: 16,
            ..HarnessSettings::default()
        };
        let sets = build_case_sets(&settings);
        let per_seed = LoadElement::ALL.len() + ScanKind::ALL.len() + 1;
        assert_eq!(sets.len(), settings.seed_schedule().len() * per_seed);
        assert!(sets.iter().all(|set| match set {
            CaseSet::ThreadLoad { data, .. } => data.len() == 16,
            CaseSet::Scan { case, .. } => case.values.len() == 16,
            CaseSet::FloatScan { case, .. } => case.values.len() == 16,
        }));
    }

    #[test]
    fn thread_load_inputs_stay_in_bounds() {
        let settings = HarnessSettings::default();
        for set in build_case_sets(&settings) {
            if let CaseSet::ThreadLoad {
                data: LoadData::U8(values),
                ..
            } = set
            {
                assert_eq!(values.len(), 256);
                assert!(values.iter().all(|v| (2..=200).contains(v)));
            }
        }
    }

    #[test]
    fn build_is_deterministic() {
        let settings = HarnessSettings {
            size: 32,
            ..HarnessSettings::default()
        };
        assert_eq!(build_case_sets(&settings), build_case_sets(&settings));
    }
}
