//! Seeded input generation. Every call owns its engine, so identical
//! `(count, min, max, seed)` always yields a bit-identical sequence.

use std::fmt;
use std::marker::PhantomData;

use half::{bf16, f16};
use rand::distributions::uniform::SampleUniform;
use rand::distributions::{Distribution, Uniform};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::custom::CustomPair;
use crate::element::{ReducedFloat, Scalar};

/// Number of Bernoulli draws made by [`random_data01`]; longer sequences repeat
/// this block.
pub const MAX_RANDOM_SIZE: usize = 1024 * 1024;

/// Scalars that know how to build their uniform distribution over `[min, max]`.
pub trait RandomScalar: Scalar {
    type Sampler: Distribution<Self>;

    fn sampler(min: Self, max: Self) -> Self::Sampler;
}

/// Types that [`random_data`] can produce. `Bound` is the scalar the bounds are
/// expressed in (the component type for [`CustomPair`]).
pub trait RandomData: Sized {
    type Bound: Copy;

    fn random_data(count: usize, min: Self::Bound, max: Self::Bound, seed: u64) -> Vec<Self>;
}

/// Uniform real distribution over `[lo, hi]` that never panics.
///
/// Spans that fit the float width sample through [`Uniform`] directly. When
/// `hi - lo` overflows (e.g. `MIN..=MAX`) a unit draw `t` interpolates between
/// the halved bounds instead, so every finite pair of bounds yields finite
/// values. NaN or infinite bounds produce non-finite values.
pub enum FloatRange<F: SampleUniform> {
    Span(Uniform<F>),
    Halves { lo: F, hi: F, unit: Uniform<F> },
}

macro_rules! float_range {
    ($($ty:ty),* $(,)?) => {$(
        impl FloatRange<$ty> {
            pub fn new(min: $ty, max: $ty) -> Self {
                let (lo, hi) = ordered(min, max);
                if (hi - lo).is_finite() {
                    FloatRange::Span(Uniform::new_inclusive(lo, hi))
                } else {
                    FloatRange::Halves {
                        lo,
                        hi,
                        unit: Uniform::new_inclusive(0.0, 1.0),
                    }
                }
            }
        }

        impl Clone for FloatRange<$ty> {
            fn clone(&self) -> Self {
                match self {
                    FloatRange::Span(uniform) => FloatRange::Span(uniform.clone()),
                    FloatRange::Halves { lo, hi, unit } => FloatRange::Halves {
                        lo: *lo,
                        hi: *hi,
                        unit: unit.clone(),
                    },
                }
            }
        }

        impl fmt::Debug for FloatRange<$ty> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    FloatRange::Span(uniform) => f.debug_tuple("Span").field(uniform).finish(),
                    FloatRange::Halves { lo, hi, .. } => f
                        .debug_struct("Halves")
                        .field("lo", lo)
                        .field("hi", hi)
                        .finish(),
                }
            }
        }

        impl Distribution<$ty> for FloatRange<$ty> {
            fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> $ty {
                match *self {
                    FloatRange::Span(ref uniform) => uniform.sample(rng),
                    FloatRange::Halves { lo, hi, ref unit } => {
                        let t = unit.sample(rng);
                        let (half_lo, half_hi) = (lo * 0.5, hi * 0.5);
                        let v = (half_lo + t * (half_hi - half_lo)) * 2.0;
                        // rounding may step just outside the bounds
                        if v < lo {
                            lo
                        } else if v > hi {
                            hi
                        } else {
                            v
                        }
                    }
                }
            }
        }
    )*};
}

float_range!(f32, f64);

/// Uniform real distribution sampled in `f32` and narrowed to a reduced-precision type.
#[derive(Debug, Clone)]
pub struct Narrowing<T> {
    wide: FloatRange<f32>,
    marker: PhantomData<fn() -> T>,
}

impl<T: ReducedFloat> Distribution<T> for Narrowing<T> {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        T::from_f32(self.wide.sample(rng))
    }
}

fn ordered<T: PartialOrd>(min: T, max: T) -> (T, T) {
    if max < min {
        (max, min)
    } else {
        (min, max)
    }
}

macro_rules! uniform_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl RandomScalar for $ty {
            type Sampler = Uniform<$ty>;

            fn sampler(min: Self, max: Self) -> Self::Sampler {
                let (lo, hi) = ordered(min, max);
                Uniform::new_inclusive(lo, hi)
            }
        }

        impl RandomData for $ty {
            type Bound = $ty;

            fn random_data(count: usize, min: $ty, max: $ty, seed: u64) -> Vec<Self> {
                sample_scalars(count, min, max, seed)
            }
        }
    )*};
}

uniform_scalar!(u8, u16, u32, u64, i32, i64);

macro_rules! float_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl RandomScalar for $ty {
            type Sampler = FloatRange<$ty>;

            fn sampler(min: Self, max: Self) -> Self::Sampler {
                FloatRange::<$ty>::new(min, max)
            }
        }

        impl RandomData for $ty {
            type Bound = $ty;

            fn random_data(count: usize, min: $ty, max: $ty, seed: u64) -> Vec<Self> {
                sample_scalars(count, min, max, seed)
            }
        }
    )*};
}

float_scalar!(f32, f64);

macro_rules! narrowing_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl RandomScalar for $ty {
            type Sampler = Narrowing<$ty>;

            fn sampler(min: Self, max: Self) -> Self::Sampler {
                Narrowing {
                    wide: FloatRange::<f32>::new(min.to_f32(), max.to_f32()),
                    marker: PhantomData,
                }
            }
        }

        impl RandomData for $ty {
            type Bound = $ty;

            fn random_data(count: usize, min: $ty, max: $ty, seed: u64) -> Vec<Self> {
                sample_scalars(count, min, max, seed)
            }
        }
    )*};
}

narrowing_scalar!(f16, bf16);

fn sample_scalars<T: RandomScalar>(count: usize, min: T, max: T, seed: u64) -> Vec<T> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let distribution = T::sampler(min, max);
    (0..count).map(|_| distribution.sample(&mut rng)).collect()
}

impl<T: RandomScalar> RandomData for CustomPair<T> {
    type Bound = T;

    fn random_data(count: usize, min: T, max: T, seed: u64) -> Vec<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let distribution = T::sampler(min, max);
        (0..count)
            .map(|_| {
                let x = distribution.sample(&mut rng);
                let y = distribution.sample(&mut rng);
                CustomPair::new(x, y)
            })
            .collect()
    }
}

/// `count` values uniformly drawn from `[min, max]` (bounds given in reverse are swapped).
pub fn random_data<T: RandomData>(count: usize, min: T::Bound, max: T::Bound, seed: u64) -> Vec<T> {
    T::random_data(count, min, max, seed)
}

/// First element of `random_data(1, min, max, seed)`.
pub fn random_value<T: RandomData + Default>(min: T::Bound, max: T::Bound, seed: u64) -> T {
    T::random_data(1, min, max, seed)
        .into_iter()
        .next()
        .unwrap_or_default()
}

/// 0/1 sequence from a Bernoulli(`p`) distribution.
///
/// Only the first [`MAX_RANDOM_SIZE`] elements are drawn; beyond that the block
/// is tiled, so long sequences are periodic rather than independent. Kept that
/// way so a given seed keeps producing the same stream.
pub fn random_data01<T: From<bool> + Copy>(count: usize, p: f32, seed: u64) -> Vec<T> {
    let p = if p.is_nan() { 0.0 } else { f64::from(p.clamp(0.0, 1.0)) };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let drawn = count.min(MAX_RANDOM_SIZE);
    let mut data: Vec<T> = Vec::with_capacity(count);
    data.extend((0..drawn).map(|_| T::from(rng.gen_bool(p))));
    while data.len() < count {
        let take = (count - data.len()).min(drawn);
        data.extend_from_within(..take);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_respect_inclusive_bounds() {
        let data: Vec<u8> = random_data(4096, 2, 200, 7);
        assert_eq!(data.len(), 4096);
        assert!(data.iter().all(|v| (2..=200).contains(v)));
    }

    #[test]
    fn same_seed_same_stream() {
        let a: Vec<f64> = random_data(512, -1.0, 1.0, 0xA11CE);
        let b: Vec<f64> = random_data(512, -1.0, 1.0, 0xA11CE);
        assert_eq!(a, b);
        let c: Vec<f64> = random_data(512, -1.0, 1.0, 0xA11CF);
        assert_ne!(a, c);
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let data: Vec<i32> = random_data(256, 10, -10, 3);
        assert!(data.iter().all(|v| (-10..=10).contains(v)));
    }

    #[test]
    fn reduced_precision_is_narrowed_from_single() {
        let data: Vec<f16> = random_data(256, f16::from_f32(-4.0), f16::from_f32(4.0), 11);
        assert!(data.iter().all(|v| (-4.0..=4.0).contains(&v.to_f32())));

        let wide = Uniform::new_inclusive(-4.0f32, 4.0f32);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let expected: Vec<f16> = (0..256).map(|_| f16::from_f32(wide.sample(&mut rng))).collect();
        assert_eq!(data, expected);
    }

    #[test]
    fn full_range_float_bounds_stay_finite() {
        let singles: Vec<f32> = random_data(64, f32::MIN, f32::MAX, 1);
        assert!(singles.iter().all(|v| v.is_finite()));
        assert!(singles.iter().any(|v| v.abs() > 1.0e30));

        let lowest = CustomPair::<f64>::lowest();
        let highest = CustomPair::<f64>::max_value();
        let pairs: Vec<CustomPair<f64>> = random_data(64, lowest.x, highest.x, 1);
        assert!(pairs.iter().all(|p| p.x.is_finite() && p.y.is_finite()));

        let brains: Vec<bf16> = random_data(64, bf16::MIN, bf16::MAX, 2);
        assert!(brains.iter().all(|v| v.to_f32().is_finite()));
    }

    #[test]
    fn non_finite_float_bounds_do_not_panic() {
        let nan: Vec<f64> = random_data(4, f64::NAN, 1.0, 3);
        assert_eq!(nan.len(), 4);
        let infinite: Vec<f32> = random_data(4, f32::NEG_INFINITY, f32::INFINITY, 3);
        assert_eq!(infinite.len(), 4);
    }

    #[test]
    fn narrow_float_span_matches_plain_uniform() {
        let data: Vec<f64> = random_data(32, -2.0, 3.0, 8);
        let uniform = Uniform::new_inclusive(-2.0f64, 3.0);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let expected: Vec<f64> = (0..32).map(|_| uniform.sample(&mut rng)).collect();
        assert_eq!(data, expected);
    }

    #[test]
    fn custom_pairs_take_two_draws_per_element() {
        let pairs: Vec<CustomPair<u64>> = random_data(8, 2, 200, 5);
        let flat: Vec<u64> = random_data(16, 2, 200, 5);
        for (i, pair) in pairs.iter().enumerate() {
            assert_eq!(pair.x, flat[2 * i]);
            assert_eq!(pair.y, flat[2 * i + 1]);
        }
    }

    #[test]
    fn single_value_is_first_of_sequence() {
        let v: u32 = random_value(0, 1000, 99);
        let seq: Vec<u32> = random_data(4, 0, 1000, 99);
        assert_eq!(v, seq[0]);
    }

    #[test]
    fn bernoulli_extremes() {
        let zeros: Vec<u8> = random_data01(100, 0.0, 1);
        assert!(zeros.iter().all(|&v| v == 0));
        let ones: Vec<u8> = random_data01(100, 1.0, 1);
        assert!(ones.iter().all(|&v| v == 1));
        let nan: Vec<u8> = random_data01(10, f32::NAN, 1);
        assert!(nan.iter().all(|&v| v == 0));
    }

    #[test]
    fn bernoulli_tiles_beyond_cap() {
        let count = MAX_RANDOM_SIZE + 1000;
        let data: Vec<u8> = random_data01(count, 0.5, 42);
        assert_eq!(data.len(), count);
        assert_eq!(&data[MAX_RANDOM_SIZE..], &data[..1000]);
    }
}
