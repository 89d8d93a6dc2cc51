//! Algebraic properties of the host reference scans.

use parity_lab::cpu::{generate_segment_keys, FloatScanCase, ScanCase, ScanKind};
use prim_core::scan::{host_exclusive_scan, host_exclusive_scan_by_key, host_inclusive_scan};
use proptest::prelude::*;

proptest! {
    /// Every inclusive prefix equals a left fold of the same prefix.
    #[test]
    fn inclusive_matches_prefix_fold(values in prop::collection::vec(any::<u32>(), 1..200)) {
        let out: Vec<u32> = host_inclusive_scan(&values, u32::wrapping_add);
        for (i, &got) in out.iter().enumerate() {
            let folded = values[..=i].iter().fold(0u32, |acc, &v| acc.wrapping_add(v));
            prop_assert_eq!(got, folded);
        }
    }

    /// out[0] = init and out[i] = out[i - 1] + in[i - 1].
    #[test]
    fn exclusive_recurrence(values in prop::collection::vec(any::<u32>(), 1..200), init in any::<u32>()) {
        let out = host_exclusive_scan(&values, init, u32::wrapping_add);
        prop_assert_eq!(out.len(), values.len());
        prop_assert_eq!(out[0], init);
        for i in 1..out.len() {
            prop_assert_eq!(out[i], out[i - 1].wrapping_add(values[i - 1]));
        }
    }

    /// With a single segment the keyed scan degenerates to the plain exclusive scan.
    #[test]
    fn single_segment_by_key_is_plain_exclusive(values in prop::collection::vec(0u32..1000, 1..200), init in 0u32..100) {
        let keys = vec![7u32; values.len()];
        let keyed = host_exclusive_scan_by_key(&values, &keys, init, u32::wrapping_add, |a, b| a == b);
        let plain = host_exclusive_scan(&values, init, u32::wrapping_add);
        prop_assert_eq!(keyed, plain);
    }

    /// Every segment head restarts at the initial value.
    #[test]
    fn segment_heads_restart(seed in any::<u64>(), p in 0.0f32..=1.0) {
        let case = ScanCase::generate(ScanKind::ExclusiveByKey, 128, seed, p);
        let out = case.reference();
        prop_assert_eq!(out[0], case.initial);
        for i in 1..out.len() {
            if case.keys[i] != case.keys[i - 1] {
                prop_assert_eq!(out[i], case.initial);
            }
        }
    }
}

#[test]
fn ordered_segment_predicate_restarts_on_descent() {
    let out = host_exclusive_scan_by_key(
        &[5u32, 6, 7, 8],
        &[3u32, 1, 2, 4],
        10u32,
        u32::wrapping_add,
        |earlier, later| earlier < later,
    );
    assert_eq!(out, vec![10, 10, 16, 23]);
}

#[test]
fn keys_are_non_decreasing_segment_ids() {
    let keys = generate_segment_keys(1000, 0.3, 11);
    assert!(keys.windows(2).all(|w| w[1] == w[0] || w[1] == w[0] + 1));
    assert!(keys.last().copied().unwrap_or(0) > 0);
}

#[test]
fn never_firing_flags_keep_one_segment() {
    let keys = generate_segment_keys(64, 0.0, 3);
    assert!(keys.iter().all(|&k| k == 0));
}

#[test]
fn float_reference_accumulates_in_double() {
    let case = FloatScanCase {
        seed: 0,
        values: vec![1.0e8, 1.0, -1.0e8, 1.0],
    };
    assert_eq!(case.reference(), vec![1.0e8, 1.0e8, 1.0, 2.0]);
}

#[test]
fn inclusive_u32_scan_wraps() {
    let case = ScanCase {
        kind: ScanKind::Inclusive,
        seed: 0,
        values: vec![u32::MAX, 2],
        keys: Vec::new(),
        initial: 0,
    };
    assert_eq!(case.reference(), vec![u32::MAX, 1]);
}
