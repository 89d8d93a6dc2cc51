use prim_core::random::RandomData;

use super::generate_load_input;

/// Thread-load case: the device must hand back exactly what it was given.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadCase<T> {
    pub seed: u64,
    pub input: Vec<T>,
}

impl<T: Clone> LoadCase<T> {
    pub fn new(seed: u64, input: Vec<T>) -> Self {
        Self { seed, input }
    }

    /// Identity: expected output is a copy of the input.
    pub fn reference(&self) -> Vec<T> {
        self.input.clone()
    }
}

impl<T> LoadCase<T>
where
    T: RandomData + Clone,
    T::Bound: From<u8>,
{
    pub fn generate(count: usize, seed: u64) -> Self {
        Self::new(seed, generate_load_input(count, seed))
    }
}
