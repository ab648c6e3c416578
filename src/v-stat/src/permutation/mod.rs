use log::debug;

use located_error::prelude::*;
use pdist::CondensedDistances;

use crate::{VStatError, statistic::{v_statistic, variance}};

/// Summary of a permutation test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestOutcome {
    /// Observed V statistic
    pub statistic: f64,
    /// Two-sided permutation p-value
    pub p_value  : f64,
    pub num_perms: u32,
    /// Number of permuted statistics greater than or equal to the observed one
    pub n_greater: u32,
    /// Number of permuted statistics lower than or equal to the observed one
    pub n_lower  : u32,
}

/// Two-sided p-value of `observed` against a sample of its null distribution:
/// `min(1, 2 * min(#{V* >= V}, #{V* <= V}) / #{V*})`
///
/// # Errors
/// if `null` is empty.
pub fn p_value_from(observed: f64, null: impl IntoIterator<Item = f64>) -> Result<TestOutcome> {
    let (mut num_perms, mut n_greater, mut n_lower) = (0u32, 0u32, 0u32);
    for permuted in null {
        num_perms += 1;
        n_greater += u32::from(permuted >= observed);
        n_lower   += u32::from(permuted <= observed);
    }

    if num_perms == 0 {
        return Err(VStatError::NoPermutations).loc("While computing the permutation p-value")
    }

    let p_value = (2.0 * f64::from(n_greater.min(n_lower)) / f64::from(num_perms)).min(1.0);
    Ok(TestOutcome{statistic: observed, p_value, num_perms, n_greater, n_lower})
}

/// Permutation test of exchangeability over a collection of per-block distance vectors.
#[derive(Debug)]
pub struct DistDataTest<'a> {
    dist_list  : &'a [CondensedDistances],
    n_samples  : usize,
    row_offsets: Vec<usize>,
    observed   : f64,
}

impl<'a> DistDataTest<'a> {
    /// # Errors
    /// - if `dist_list` is empty
    /// - if the vectors do not span the same number of samples
    /// - if they span less than two samples.
    pub fn new(dist_list: &'a [CondensedDistances]) -> Result<Self> {
        use VStatError::{EmptyDistList, SampleCountMismatch, TooFewSamples};
        let n_samples = dist_list.first()
            .ok_or(EmptyDistList)
            .loc("While validating distance vectors")?
            .n_samples();

        if let Some((block, distances)) = dist_list.iter().enumerate().find(|(_, d)| d.n_samples() != n_samples) {
            return Err(SampleCountMismatch{block, expected: n_samples, got: distances.n_samples()})
                .loc("While validating distance vectors")
        }

        if n_samples < 2 {
            return Err(TooFewSamples(n_samples)).loc("While validating distance vectors")
        }

        // condensed index of (i, j), i < j  ==  row_offsets[i] + j - 1
        let row_offsets = (0..n_samples).map(|i| n_samples * i - i * (i + 1) / 2 - i).collect();
        let observed = v_statistic(dist_list);
        debug!("Observed V statistic: {observed} ({} blocks, {n_samples} samples)", dist_list.len());
        Ok(Self{dist_list, n_samples, row_offsets, observed})
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn n_blocks(&self) -> usize {
        self.dist_list.len()
    }

    pub fn observed(&self) -> f64 {
        self.observed
    }

    /// Lazily sample `num_perms` values of the V statistic under the null hypothesis.
    pub fn permutations<'s>(&'s self, num_perms: u32, rng: &'s mut fastrand::Rng) -> Permutations<'s> {
        Permutations {
            test      : self,
            rng,
            remaining : num_perms,
            labels    : (0..self.n_samples).collect(),
            aggregated: vec![0.0; self.dist_list[0].len()],
        }
    }

    /// Compare the observed statistic to `num_perms` permuted ones.
    ///
    /// # Errors
    /// - if `num_perms` is zero
    /// - if the observed statistic is not finite
    pub fn run(&self, num_perms: u32, rng: &mut fastrand::Rng) -> Result<TestOutcome> {
        self.run_with(self.permutations(num_perms, rng))
    }

    /// Same as [`DistDataTest::run`], with an already built null distribution. This lets callers wrap
    /// [`DistDataTest::permutations`] (e.g. with a progress bar).
    pub fn run_with(&self, null: impl IntoIterator<Item = f64>) -> Result<TestOutcome> {
        if ! self.observed.is_finite() {
            return Err(VStatError::NonFiniteStatistic(self.observed)).loc("While running the exchangeability test")
        }
        p_value_from(self.observed, null)
    }

    fn index(&self, a: usize, b: usize) -> usize {
        let (i, j) = if a < b { (a, b) } else { (b, a) };
        self.row_offsets[i] + j - 1
    }

    /// Independently relabel the samples of every block, and compute the V statistic of the result.
    fn permuted_statistic(&self, labels: &mut [usize], aggregated: &mut [f64], rng: &mut fastrand::Rng) -> f64 {
        aggregated.fill(0.0);
        for distances in self.dist_list {
            rng.shuffle(labels);
            let mut k = 0;
            for i in 0..self.n_samples {
                let a = labels[i];
                for &b in &labels[i + 1..] {
                    aggregated[k] += distances[self.index(a, b)];
                    k += 1;
                }
            }
        }
        variance(aggregated)
    }
}

/// Iterator over permuted V statistics. See [`DistDataTest::permutations`]
pub struct Permutations<'s> {
    test      : &'s DistDataTest<'s>,
    rng       : &'s mut fastrand::Rng,
    remaining : u32,
    labels    : Vec<usize>,
    aggregated: Vec<f64>,
}

impl Iterator for Permutations<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None
        }
        self.remaining -= 1;
        Some(self.test.permuted_statistic(&mut self.labels, &mut self.aggregated, self.rng))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Permutations<'_> {}
