//! Two-component aggregate standing in for arbitrary user payload types.

use std::cmp::Ordering;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::element::Scalar;

/// Pair `(x, y)` of one scalar type with component-wise arithmetic and
/// lexicographic ordering (`x` first, `y` breaks ties).
///
/// `Default` is `(0, 0)` except for reduced-precision scalars, where it is the
/// sentinel `(12, 34)`; a default-initialized accumulator therefore never looks
/// like a correct scan seed.
#[repr(C)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CustomPair<T> {
    pub x: T,
    pub y: T,
}

// SAFETY: `repr(C)` with two fields of the same `Pod` type has no padding.
unsafe impl<T: bytemuck::Pod> bytemuck::Zeroable for CustomPair<T> {}
unsafe impl<T: bytemuck::Pod> bytemuck::Pod for CustomPair<T> {}

impl<T> CustomPair<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Copy> CustomPair<T> {
    pub const fn splat(xy: T) -> Self {
        Self { x: xy, y: xy }
    }

    /// Widens both components, e.g. `CustomPair<u8>` into `CustomPair<u32>`.
    pub fn convert<U: From<T>>(self) -> CustomPair<U> {
        CustomPair {
            x: U::from(self.x),
            y: U::from(self.y),
        }
    }
}

impl<T: Scalar> CustomPair<T> {
    pub fn max_value() -> Self {
        Self::splat(T::MAX)
    }

    pub fn lowest() -> Self {
        Self::splat(T::LOWEST)
    }
}

impl<T: Scalar> Default for CustomPair<T> {
    fn default() -> Self {
        let (x, y) = T::pair_default();
        Self { x, y }
    }
}

impl<T: Scalar> Add for CustomPair<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl<T: Scalar> Sub for CustomPair<T> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl<T: Scalar> PartialEq for CustomPair<T> {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl<T: Scalar> PartialOrd for CustomPair<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.x.partial_cmp(&other.x) {
            Some(Ordering::Equal) => self.y.partial_cmp(&other.y),
            ordering => ordering,
        }
    }
}
