//! Exchangeability test of samples, from a collection of per-block pairwise distance vectors.
//!
//! Each block (typically a chromosome) contributes one condensed distance vector over the same set of
//! samples. The V statistic is the variance, across sample pairs, of the block-aggregated distances.
//! Under the null hypothesis of exchangeable samples, relabeling the samples of each block independently
//! leaves the distribution of V unchanged: its observed value is thus compared to a permutation null.

mod error;
pub use error::VStatError;

mod statistic;
pub use statistic::{v_statistic, aggregate, variance};

mod permutation;
pub use permutation::{DistDataTest, Permutations, TestOutcome, p_value_from};

use located_error::prelude::*;
use pdist::CondensedDistances;

/// Two-sided permutation p-value of the V statistic, using `num_perms` permutations and a seeded RNG.
///
/// # Errors
/// - if `dist_list` is empty, or its vectors do not share the same number of samples.
/// - if `num_perms` is zero.
/// - if the observed statistic is not finite (e.g. distances computed from missing genotypes).
pub fn dist_data_p_value(dist_list: &[CondensedDistances], num_perms: u32, seed: u64) -> Result<f64> {
    let test = DistDataTest::new(dist_list).loc("While preparing the exchangeability test")?;
    let mut rng = fastrand::Rng::with_seed(seed);
    let outcome = test.run(num_perms, &mut rng)?;
    Ok(outcome.p_value)
}
