use pdist::CondensedDistances;

/// Element-wise sum of condensed distance vectors. Vectors are expected to share the same length.
pub fn aggregate(dist_list: &[CondensedDistances]) -> Vec<f64> {
    let len = dist_list.first().map_or(0, |distances| distances.len());
    let mut aggregated = vec![0.0; len];
    for distances in dist_list {
        for (acc, d) in aggregated.iter_mut().zip(distances.iter()) {
            *acc += d;
        }
    }
    aggregated
}

/// Population variance (1/n denominator). `NaN` for an empty slice.
pub fn variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}

/// V statistic: variance, across sample pairs, of the pairwise distances summed over every block.
pub fn v_statistic(dist_list: &[CondensedDistances]) -> f64 {
    variance(&aggregate(dist_list))
}
