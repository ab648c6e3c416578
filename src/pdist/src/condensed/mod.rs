use std::ops::Deref;

use located_error::prelude::*;

mod error;
pub use error::CondensedError;

/// Number of unordered pairs among `n` samples: `n*(n-1)/2`
pub fn n_pairs(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Position of the pair `(i, j)` within a condensed vector of `n` samples. Requires `i < j < n`
pub fn condensed_index(n: usize, i: usize, j: usize) -> usize {
    debug_assert!(i < j && j < n, "invalid pair ({i}, {j}) for {n} samples");
    n * i - i * (i + 1) / 2 + (j - i - 1)
}

/// Recover the number of samples from the length of a condensed vector.
fn n_samples_of(len: usize) -> Option<usize> {
    // n = (1 + sqrt(1 + 8*len)) / 2, verified afterwards to dodge floating point rounding.
    let n = ((1.0 + (1.0 + 8.0 * len as f64).sqrt()) / 2.0).round() as usize;
    (n_pairs(n) == len).then_some(n.max(1))
}

/// Condensed pairwise distance matrix of `n` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct CondensedDistances {
    n_samples: usize,
    values   : Vec<f64>,
}

impl CondensedDistances {
    /// # Errors
    /// if `values.len()` is not a triangular number.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        let n_samples = n_samples_of(values.len())
            .ok_or(CondensedError::NotTriangular(values.len()))
            .loc("While building a condensed distance vector")?;
        Ok(Self { n_samples, values })
    }

    pub(crate) fn from_raw_parts(n_samples: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(n_pairs(n_samples), values.len());
        Self { n_samples, values }
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Distance between samples `i` and `j`. Symmetric, and null on the diagonal.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        match i.cmp(&j) {
            std::cmp::Ordering::Equal   => 0.0,
            std::cmp::Ordering::Less    => self.values[condensed_index(self.n_samples, i, j)],
            std::cmp::Ordering::Greater => self.values[condensed_index(self.n_samples, j, i)],
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }
}

impl Deref for CondensedDistances {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl AsRef<[f64]> for CondensedDistances {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}
