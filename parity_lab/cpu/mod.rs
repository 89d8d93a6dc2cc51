//! CPU reference cases for the Parity Lab primitives.

use prim_core::random::{random_data, random_data01, random_value, RandomData};

pub mod load;
pub mod scan;

pub use load::LoadCase;
pub use scan::{FloatScanCase, ScanCase, ScanKind};

/// Inclusive bounds used for thread-load inputs.
pub const LOAD_BOUNDS: (u8, u8) = (2, 200);

/// Stream offsets so keys and seeds never reuse the value stream of the same seed.
const KEY_STREAM: u64 = 0x6B65_7973;
const INITIAL_STREAM: u64 = 0x696E_6974;

/// Segment keys: a new segment starts wherever a Bernoulli(`p`) flag fires.
pub fn generate_segment_keys(count: usize, p: f32, seed: u64) -> Vec<u32> {
    let flags: Vec<u32> = random_data01(count, p, seed ^ KEY_STREAM);
    flags
        .iter()
        .scan(0u32, |segment, &flag| {
            *segment += flag;
            Some(*segment)
        })
        .collect()
}

pub fn generate_initial_value(seed: u64) -> u32 {
    random_value(0, 100, seed ^ INITIAL_STREAM)
}

/// Generates `count` load inputs in [`LOAD_BOUNDS`].
pub fn generate_load_input<T>(count: usize, seed: u64) -> Vec<T>
where
    T: RandomData,
    T::Bound: From<u8>,
{
    random_data(
        count,
        T::Bound::from(LOAD_BOUNDS.0),
        T::Bound::from(LOAD_BOUNDS.1),
        seed,
    )
}

/// Element types the thread-load suite covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadElement {
    U8,
    U16,
    U32,
    U64,
    CustomU64,
    CustomF64,
}

impl LoadElement {
    pub const ALL: [LoadElement; 6] = [
        LoadElement::U8,
        LoadElement::U16,
        LoadElement::U32,
        LoadElement::U64,
        LoadElement::CustomU64,
        LoadElement::CustomF64,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LoadElement::U8 => "u8",
            LoadElement::U16 => "u16",
            LoadElement::U32 => "u32",
            LoadElement::U64 => "u64",
            LoadElement::CustomU64 => "custom_u64",
            LoadElement::CustomF64 => "custom_f64",
        }
    }
}
