//! Exact and tolerance-aware comparison of device output against host references.
//!
//! Every element goes through [`Comparable::components`], which converts it to
//! one or two [`Native`] values. The tolerance rule itself lives in exactly one
//! place ([`within_tolerance`]) and always runs in `f64`. Integral
//! components always compare exactly.
//!
//! Sequence comparisons never stop at the first mismatch: each failing index is
//! recorded in a [`ResultSink`] and the scan continues.

use std::fmt;

use half::{bf16, f16};

use crate::custom::CustomPair;
use crate::element::{Native, Scalar};

/// Which part of an element a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Value,
    X,
    Y,
}

/// Native view of one element: a plain scalar or the two halves of a pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Components {
    Scalar(Native),
    Pair(Native, Native),
}

impl Components {
    pub fn iter(self) -> impl Iterator<Item = (Component, Native)> {
        let (first, second) = match self {
            Components::Scalar(v) => ((Component::Value, v), None),
            Components::Pair(x, y) => ((Component::X, x), Some((Component::Y, y))),
        };
        std::iter::once(first).chain(second)
    }
}

/// Element types the oracle knows how to compare.
pub trait Comparable: Copy + fmt::Debug {
    /// Default tolerance fraction for [`compare_near`].
    const PRECISION_THRESHOLD: f32;

    fn components(&self) -> Components;
}

macro_rules! comparable_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl Comparable for $ty {
            const PRECISION_THRESHOLD: f32 = <$ty as Scalar>::PRECISION_THRESHOLD;

            #[inline]
            fn components(&self) -> Components {
                Components::Scalar(self.to_native())
            }
        }
    )*};
}

comparable_scalar!(u8, u16, u32, u64, i32, i64, f32, f64, f16, bf16);

impl<T: Scalar> Comparable for CustomPair<T> {
    const PRECISION_THRESHOLD: f32 = T::PRECISION_THRESHOLD;

    #[inline]
    fn components(&self) -> Components {
        Components::Pair(self.x.to_native(), self.y.to_native())
    }
}

/// Default tolerance for `T`: 1% for general types, 7.5% for `f16`/`bf16`.
pub fn precision_threshold<T: Comparable>() -> f32 {
    T::PRECISION_THRESHOLD
}

/// `max(|percent * expected|, percent)`: relative bound with an absolute floor near zero.
fn allowed_diff(expected: f64, percent: f64) -> f64 {
    (percent * expected).abs().max(percent)
}

/// Returns `Err(allowed)` when `|result - expected|` exceeds the allowed difference.
/// Always evaluated in `f64`, whatever the storage width.
fn within_tolerance(result: f64, expected: f64, percent: f32) -> Result<(), f64> {
    let allowed = allowed_diff(expected, f64::from(percent));
    if (result - expected).abs() <= allowed {
        Ok(())
    } else {
        Err(allowed)
    }
}

/// Approximate check of one native value. `Err` carries the allowed difference
/// (absent for exact components).
fn native_near(result: Native, expected: Native, percent: f32) -> Result<(), Option<f64>> {
    match (result, expected) {
        (Native::Exact(r), Native::Exact(e)) if r == e => Ok(()),
        (Native::Single(r), Native::Single(e)) => {
            within_tolerance(f64::from(r), f64::from(e), percent).map_err(Some)
        }
        (Native::Double(r), Native::Double(e)) => within_tolerance(r, e, percent).map_err(Some),
        _ => Err(None),
    }
}

fn native_eq(result: Native, expected: Native) -> bool {
    result == expected
}

/// One failing component.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Position within the sequence; `None` for scalar comparisons.
    pub index: Option<usize>,
    pub component: Component,
    pub result: Native,
    pub expected: Native,
    /// Allowed absolute difference when the comparison was approximate.
    pub allowed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    Length { result: usize, expected: usize },
    Value(Mismatch),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Length { result, expected } => {
                write!(f, "length mismatch: result has {result} elements, expected {expected}")
            }
            Failure::Value(m) => {
                let component = match m.component {
                    Component::Value => "",
                    Component::X => ".x",
                    Component::Y => ".y",
                };
                write!(
                    f,
                    "value{component} {:?} != expected {:?}",
                    m.result, m.expected
                )?;
                if let Some(allowed) = m.allowed {
                    write!(
                        f,
                        " (diff={:.3e}, allowed={allowed:.3e})",
                        (m.result.as_f64() - m.expected.as_f64()).abs()
                    )?;
                }
                if let Some(index) = m.index {
                    write!(f, " where index = {index}")?;
                }
                Ok(())
            }
        }
    }
}

/// Receives comparison failures; the oracle is its only producer.
pub trait ResultSink {
    fn record(&mut self, failure: Failure);

    /// Called once per compared element, failing or not.
    fn element_compared(&mut self) {}
}

/// Collecting sink used by the `check_*` / `assert_*` helpers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    checked: usize,
    failures: Vec<Failure>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn checked(&self) -> usize {
        self.checked
    }

    /// Indices with at least one failing component, in order and without repeats.
    pub fn failing_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .failures
            .iter()
            .filter_map(|f| match f {
                Failure::Value(m) => m.index,
                Failure::Length { .. } => None,
            })
            .collect();
        indices.dedup();
        indices
    }

    /// Panics listing every recorded failure.
    #[track_caller]
    pub fn assert_passed(&self) {
        if !self.passed() {
            panic!("{self}");
        }
    }
}

impl ResultSink for Report {
    fn record(&mut self, failure: Failure) {
        self.failures.push(failure);
    }

    fn element_compared(&mut self) {
        self.checked += 1;
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            return write!(f, "{} elements matched", self.checked);
        }
        writeln!(
            f,
            "{} failure(s) across {} compared elements:",
            self.failures.len(),
            self.checked
        )?;
        for failure in &self.failures {
            writeln!(f, "  {failure}")?;
        }
        Ok(())
    }
}

fn compare_components<T, S, F>(result: &T, expected: &T, index: Option<usize>, sink: &mut S, mut check: F)
where
    T: Comparable,
    S: ResultSink + ?Sized,
    F: FnMut(Native, Native) -> Result<(), Option<f64>>,
{
    sink.element_compared();
    for ((component, r), (_, e)) in result.components().iter().zip(expected.components().iter()) {
        if let Err(allowed) = check(r, e) {
            sink.record(Failure::Value(Mismatch {
                index,
                component,
                result: r,
                expected: e,
                allowed,
            }));
        }
    }
}

fn compare_sequences<T, S, F>(result: &[T], expected: &[T], limit: Option<usize>, sink: &mut S, mut check: F)
where
    T: Comparable,
    S: ResultSink + ?Sized,
    F: FnMut(Native, Native) -> Result<(), Option<f64>>,
{
    if limit.is_none() && result.len() != expected.len() {
        sink.record(Failure::Length {
            result: result.len(),
            expected: expected.len(),
        });
    }
    let pairs = result.iter().zip(expected).enumerate();
    let pairs = pairs.take(limit.unwrap_or(usize::MAX));
    for (i, (r, e)) in pairs {
        compare_components(r, e, Some(i), &mut *sink, &mut check);
    }
}

/// Exact comparison of a single value (reduced precision compared by value, not bits).
pub fn compare_eq<T: Comparable, S: ResultSink + ?Sized>(result: &T, expected: &T, sink: &mut S) {
    compare_components(result, expected, None, sink, |r, e| {
        if native_eq(r, e) {
            Ok(())
        } else {
            Err(None)
        }
    });
}

/// Approximate comparison of a single value; integral components ignore `percent`.
pub fn compare_near<T: Comparable, S: ResultSink + ?Sized>(
    result: &T,
    expected: &T,
    percent: f32,
    sink: &mut S,
) {
    compare_components(result, expected, None, sink, |r, e| native_near(r, e, percent));
}

pub fn compare_eq_slice<T: Comparable, S: ResultSink + ?Sized>(result: &[T], expected: &[T], sink: &mut S) {
    compare_sequences(result, expected, None, sink, |r, e| {
        if native_eq(r, e) {
            Ok(())
        } else {
            Err(None)
        }
    });
}

/// Exact comparison of the first `count` elements only; lengths are not checked.
pub fn compare_eq_prefix<T: Comparable, S: ResultSink + ?Sized>(
    result: &[T],
    expected: &[T],
    count: usize,
    sink: &mut S,
) {
    compare_sequences(result, expected, Some(count), sink, |r, e| {
        if native_eq(r, e) {
            Ok(())
        } else {
            Err(None)
        }
    });
}

pub fn compare_near_slice<T: Comparable, S: ResultSink + ?Sized>(
    result: &[T],
    expected: &[T],
    percent: f32,
    sink: &mut S,
) {
    compare_sequences(result, expected, None, sink, |r, e| native_near(r, e, percent));
}

pub fn check_eq_slice<T: Comparable>(result: &[T], expected: &[T]) -> Report {
    let mut report = Report::new();
    compare_eq_slice(result, expected, &mut report);
    report
}

pub fn check_near_slice<T: Comparable>(result: &[T], expected: &[T], percent: f32) -> Report {
    let mut report = Report::new();
    compare_near_slice(result, expected, percent, &mut report);
    report
}

#[track_caller]
pub fn assert_eq_value<T: Comparable>(result: &T, expected: &T) {
    let mut report = Report::new();
    compare_eq(result, expected, &mut report);
    report.assert_passed();
}

#[track_caller]
pub fn assert_near<T: Comparable>(result: &T, expected: &T, percent: f32) {
    let mut report = Report::new();
    compare_near(result, expected, percent, &mut report);
    report.assert_passed();
}

#[track_caller]
pub fn assert_eq_slice<T: Comparable>(result: &[T], expected: &[T]) {
    check_eq_slice(result, expected).assert_passed();
}

#[track_caller]
pub fn assert_near_slice<T: Comparable>(result: &[T], expected: &[T], percent: f32) {
    check_near_slice(result, expected, percent).assert_passed();
}
