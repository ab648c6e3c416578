//! Pairwise distances between the rows of an observation matrix, stored as a condensed
//! (upper-triangular, row-major) vector.

mod condensed;
pub use condensed::{CondensedDistances, CondensedError, condensed_index, n_pairs};

mod metric;
pub use metric::Metric;

use itertools::Itertools;
use ndarray::ArrayView2;

/// Compute the condensed pairwise distance vector between all rows of `observations`.
///
/// Pairs are ordered as `(0,1), (0,2), ..., (0,n-1), (1,2), ..., (n-2,n-1)`: the same ordering as
/// `scipy.spatial.distance.pdist`. `NaN` values propagate to every distance involving them.
///
/// # Example
/// ```
/// use ndarray::array;
/// use pdist::{pdist, Metric};
/// let genotypes = array![[0., 1., 2.], [2., 1., 0.], [0., 0., 0.]];
/// let distances = pdist(genotypes.view(), Metric::Cityblock);
/// assert_eq!(distances.as_slice(), &[4., 3., 3.]);
/// ```
pub fn pdist(observations: ArrayView2<'_, f64>, metric: Metric) -> CondensedDistances {
    let n = observations.nrows();
    let values = (0..n).tuple_combinations()
        .map(|(i, j)| metric.distance(observations.row(i), observations.row(j)))
        .collect();
    CondensedDistances::from_raw_parts(n, values)
}
