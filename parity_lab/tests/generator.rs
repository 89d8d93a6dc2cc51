//! Determinism and bounds of the seeded generators.

use parity_lab::cpu::{LoadCase, LoadElement, ScanCase, ScanKind, LOAD_BOUNDS};
use parity_lab::case_io::LoadData;
use prim_core::{
    random::{random_data, random_data01, MAX_RANDOM_SIZE},
    CustomPair,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn same_seed_same_inputs(seed in any::<u64>()) {
        for element in LoadElement::ALL {
            prop_assert_eq!(
                LoadData::generate(element, 64, seed),
                LoadData::generate(element, 64, seed)
            );
        }
        for kind in ScanKind::ALL {
            prop_assert_eq!(
                ScanCase::generate(kind, 64, seed, 0.5),
                ScanCase::generate(kind, 64, seed, 0.5)
            );
        }
    }

    #[test]
    fn bounds_hold_for_any_order(seed in any::<u64>(), a in -1000i32..1000, b in -1000i32..1000) {
        let data: Vec<i32> = random_data(128, a, b, seed);
        let (lo, hi) = (a.min(b), a.max(b));
        prop_assert!(data.iter().all(|v| (lo..=hi).contains(v)));
    }

    #[test]
    fn custom_pairs_stay_in_load_bounds(seed in any::<u64>()) {
        let case = LoadCase::<CustomPair<f64>>::generate(64, seed);
        let (lo, hi) = (f64::from(LOAD_BOUNDS.0), f64::from(LOAD_BOUNDS.1));
        prop_assert!(case.input.iter().all(|p| (lo..=hi).contains(&p.x) && (lo..=hi).contains(&p.y)));
        prop_assert_eq!(case.reference(), case.input.clone());
    }
}

#[test]
fn different_seeds_differ() {
    let a: Vec<u64> = random_data(64, 0, u64::MAX, 1);
    let b: Vec<u64> = random_data(64, 0, u64::MAX, 2);
    assert_ne!(a, b);
}

#[test]
fn bernoulli_stream_tiles_past_the_block() {
    let count = MAX_RANDOM_SIZE + 17;
    let flags: Vec<u8> = random_data01(count, 0.5, 9);
    assert_eq!(flags.len(), count);
    assert_eq!(&flags[MAX_RANDOM_SIZE..], &flags[..17]);
    assert!(flags.iter().all(|&f| f <= 1));
}

#[test]
fn bernoulli_extremes() {
    let never: Vec<u32> = random_data01(100, 0.0, 4);
    let always: Vec<u32> = random_data01(100, 1.0, 4);
    let nan: Vec<u32> = random_data01(100, f32::NAN, 4);
    assert!(never.iter().all(|&f| f == 0));
    assert!(always.iter().all(|&f| f == 1));
    assert_eq!(nan, never);
}
