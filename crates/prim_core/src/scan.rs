//! Sequential host reference scans.
//!
//! The accumulator type `R` is picked by the caller and every input element is
//! converted into it before `op` runs, so `u8` input scanned into `u32` output
//! accumulates in `u32`. `std`-style folds that keep the input width would wrap
//! early and could make a broken device scan look correct.
//!
//! The `_into` variants write `output[..input.len()]` and return the number of
//! elements written. Empty input leaves `output` untouched. An `output` (or
//! `keys`) slice shorter than `input` is a caller bug and panics.

/// `output[0] = input[0]`, `output[i] = op(output[i - 1], input[i])`.
pub fn host_inclusive_scan_into<T, R, F>(input: &[T], output: &mut [R], mut op: F) -> usize
where
    T: Copy + Into<R>,
    R: Clone,
    F: FnMut(R, R) -> R,
{
    let Some((&first, rest)) = input.split_first() else {
        return 0;
    };
    let output = &mut output[..input.len()];

    let mut sum: R = first.into();
    output[0] = sum.clone();
    for (slot, &value) in output[1..].iter_mut().zip(rest) {
        sum = op(sum, value.into());
        *slot = sum.clone();
    }
    input.len()
}

/// `output[0] = initial`, `output[i] = op(output[i - 1], input[i - 1])`.
pub fn host_exclusive_scan_into<T, R, F>(
    input: &[T],
    initial: R,
    output: &mut [R],
    mut op: F,
) -> usize
where
    T: Copy + Into<R>,
    R: Clone,
    F: FnMut(R, R) -> R,
{
    if input.is_empty() {
        return 0;
    }
    let output = &mut output[..input.len()];

    let mut sum = initial;
    output[0] = sum.clone();
    for (slot, &value) in output[1..].iter_mut().zip(input) {
        sum = op(sum, value.into());
        *slot = sum.clone();
    }
    input.len()
}

/// Exclusive scan that restarts from `initial` wherever
/// `same_segment(&keys[i - 1], &keys[i])` is false.
pub fn host_exclusive_scan_by_key_into<T, K, R, F, P>(
    input: &[T],
    keys: &[K],
    initial: R,
    output: &mut [R],
    mut op: F,
    mut same_segment: P,
) -> usize
where
    T: Copy + Into<R>,
    R: Clone,
    F: FnMut(R, R) -> R,
    P: FnMut(&K, &K) -> bool,
{
    if input.is_empty() {
        return 0;
    }
    let keys = &keys[..input.len()];
    let output = &mut output[..input.len()];

    let mut sum = initial.clone();
    output[0] = sum.clone();
    for (i, slot) in output.iter_mut().enumerate().skip(1) {
        sum = if same_segment(&keys[i - 1], &keys[i]) {
            op(sum, input[i - 1].into())
        } else {
            initial.clone()
        };
        *slot = sum.clone();
    }
    input.len()
}

pub fn host_inclusive_scan<T, R, F>(input: &[T], op: F) -> Vec<R>
where
    T: Copy + Into<R>,
    R: Clone,
    F: FnMut(R, R) -> R,
{
    let mut output: Vec<R> = input.iter().map(|&v| v.into()).collect();
    host_inclusive_scan_into(input, &mut output, op);
    output
}

pub fn host_exclusive_scan<T, R, F>(input: &[T], initial: R, op: F) -> Vec<R>
where
    T: Copy + Into<R>,
    R: Clone,
    F: FnMut(R, R) -> R,
{
    let mut output = vec![initial.clone(); input.len()];
    host_exclusive_scan_into(input, initial, &mut output, op);
    output
}

pub fn host_exclusive_scan_by_key<T, K, R, F, P>(
    input: &[T],
    keys: &[K],
    initial: R,
    op: F,
    same_segment: P,
) -> Vec<R>
where
    T: Copy + Into<R>,
    R: Clone,
    F: FnMut(R, R) -> R,
    P: FnMut(&K, &K) -> bool,
{
    let mut output = vec![initial.clone(); input.len()];
    host_exclusive_scan_by_key_into(input, keys, initial, &mut output, op, same_segment);
    output
}
