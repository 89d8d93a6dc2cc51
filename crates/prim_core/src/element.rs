//! Scalar element types and their conversion to a native comparison value.

use std::fmt::Debug;
use std::ops::{Add, Sub};

use half::{bf16, f16};

/// Value used by the oracle after converting out of the storage representation.
///
/// Reduced-precision floats widen to `Single`, so two encodings of the same value
/// compare equal regardless of their bits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Native {
    Exact(i128),
    Single(f32),
    Double(f64),
}

impl Native {
    pub fn as_f64(self) -> f64 {
        match self {
            Native::Exact(v) => v as f64,
            Native::Single(v) => f64::from(v),
            Native::Double(v) => v,
        }
    }
}

/// Scalar payload usable on its own or inside [`crate::CustomPair`].
pub trait Scalar:
    Copy + Debug + Default + PartialEq + PartialOrd + Add<Output = Self> + Sub<Output = Self> + Send + Sync + 'static
{
    /// Default tolerance fraction for approximate comparison.
    const PRECISION_THRESHOLD: f32;
    const MAX: Self;
    const LOWEST: Self;

    fn to_native(self) -> Native;

    /// Component values of `CustomPair::<Self>::default()`.
    fn pair_default() -> (Self, Self) {
        (Self::default(), Self::default())
    }
}

macro_rules! integral_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl Scalar for $ty {
            const PRECISION_THRESHOLD: f32 = 0.01;
            const MAX: Self = <$ty>::MAX;
            const LOWEST: Self = <$ty>::MIN;

            #[inline]
            fn to_native(self) -> Native {
                Native::Exact(i128::from(self))
            }
        }
    )*};
}

integral_scalar!(u8, u16, u32, u64, i32, i64);

impl Scalar for f32 {
    const PRECISION_THRESHOLD: f32 = 0.01;
    const MAX: Self = f32::MAX;
    const LOWEST: Self = f32::MIN;

    #[inline]
    fn to_native(self) -> Native {
        Native::Single(self)
    }
}

impl Scalar for f64 {
    const PRECISION_THRESHOLD: f32 = 0.01;
    const MAX: Self = f64::MAX;
    const LOWEST: Self = f64::MIN;

    #[inline]
    fn to_native(self) -> Native {
        Native::Double(self)
    }
}

/// Narrow float formats that are sampled and compared through `f32`.
pub trait ReducedFloat: Scalar {
    fn from_f32(value: f32) -> Self;
    fn to_f32(self) -> f32;
}

macro_rules! reduced_scalar {
    ($($ty:ident),* $(,)?) => {$(
        impl Scalar for $ty {
            const PRECISION_THRESHOLD: f32 = 0.075;
            const MAX: Self = $ty::MAX;
            const LOWEST: Self = $ty::MIN;

            #[inline]
            fn to_native(self) -> Native {
                Native::Single(self.to_f32())
            }

            // Non-zero so that `op(CustomPair::default(), v) != v` for scans and reductions.
            fn pair_default() -> (Self, Self) {
                ($ty::from_f32(12.0), $ty::from_f32(34.0))
            }
        }

        impl ReducedFloat for $ty {
            #[inline]
            fn from_f32(value: f32) -> Self {
                $ty::from_f32(value)
            }

            #[inline]
            fn to_f32(self) -> f32 {
                $ty::to_f32(self)
            }
        }
    )*};
}

reduced_scalar!(f16, bf16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduced_precision_widens_to_single() {
        assert_eq!(f16::from_f32(1.5).to_native(), Native::Single(1.5));
        assert_eq!(bf16::from_f32(-2.0).to_native(), Native::Single(-2.0));
    }

    #[test]
    fn integers_compare_exactly_across_widths() {
        assert_eq!(u64::MAX.to_native(), Native::Exact(i128::from(u64::MAX)));
        assert_eq!((-7i32).to_native(), Native::Exact(-7));
    }

    #[test]
    fn only_reduced_precision_uses_sentinel_defaults() {
        assert_eq!(u32::pair_default(), (0, 0));
        assert_eq!(f64::pair_default(), (0.0, 0.0));
        assert_eq!(
            f16::pair_default(),
            (f16::from_f32(12.0), f16::from_f32(34.0))
        );
        assert_eq!(
            bf16::pair_default(),
            (bf16::from_f32(12.0), bf16::from_f32(34.0))
        );
    }
}
