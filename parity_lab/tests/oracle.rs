//! Oracle behaviour on the payloads the suite actually compares.

use prim_core::{
    bf16,
    oracle::{check_eq_slice, check_near_slice, precision_threshold, Failure},
    CustomPair,
};
use proptest::prelude::*;

#[test]
fn custom_pairs_report_each_component() {
    let result = [CustomPair::new(1.0f64, 5.0), CustomPair::new(2.0, 2.0)];
    let expected = [CustomPair::new(1.0f64, 2.0), CustomPair::new(3.0, 9.0)];
    let report = check_near_slice(&result, &expected, 0.01);
    assert_eq!(report.failures().len(), 3);
    assert_eq!(report.failing_indices(), vec![0, 1]);
}

#[test]
fn bf16_uses_its_coarser_default() {
    let p = precision_threshold::<bf16>();
    let expected: Vec<bf16> = [1.0f32, 64.0, -3.0].iter().map(|&v| bf16::from_f32(v)).collect();
    let close: Vec<bf16> = [1.05f32, 66.0, -3.1].iter().map(|&v| bf16::from_f32(v)).collect();
    assert!(check_near_slice(&close, &expected, p).passed());
    assert!(!check_near_slice(&close, &expected, precision_threshold::<f32>()).passed());
}

#[test]
fn failures_render_with_their_index() {
    let report = check_eq_slice(&[CustomPair::new(1u64, 2)], &[CustomPair::new(1u64, 3)]);
    let rendered = report.to_string();
    assert!(rendered.contains(".y"), "{rendered}");
    assert!(rendered.contains("where index = 0"), "{rendered}");
    assert!(matches!(report.failures(), [Failure::Value(_)]));
}

proptest! {
    /// Within `percent * |expected|` always passes; far outside always fails.
    #[test]
    fn near_respects_relative_bound(expected in 1.0f64..1.0e6, frac in 0.0f64..0.9) {
        let inside = expected * (1.0 + 0.01 * frac);
        prop_assert!(check_near_slice(&[inside], &[expected], 0.01).passed());
        let outside = expected * 1.5;
        prop_assert!(!check_near_slice(&[outside], &[expected], 0.01).passed());
    }

    /// Near zero only the absolute floor applies.
    #[test]
    fn near_zero_uses_absolute_floor(expected in -1.0e-4f32..1.0e-4, offset in -0.009f32..0.009) {
        prop_assert!(check_near_slice(&[expected + offset], &[expected], 0.01).passed());
        prop_assert!(!check_near_slice(&[expected + 0.02], &[expected], 0.01).passed());
    }

    /// Identical slices always pass exact comparison.
    #[test]
    fn identical_slices_pass(values in prop::collection::vec(any::<u64>(), 0..64)) {
        let report = check_eq_slice(&values, &values);
        prop_assert!(report.passed());
        prop_assert_eq!(report.checked(), values.len());
    }
}
