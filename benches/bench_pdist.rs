use pdist::{pdist, Metric};
use ndarray::Array2;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn mock_genotypes(n_samples: usize, n_variants: usize) -> Array2<f64> {
    let mut rng = fastrand::Rng::with_seed(42);
    Array2::from_shape_fn((n_samples, n_variants), |_| f64::from(rng.u8(0..=2)))
}

fn bench_pdist(c: &mut Criterion) {
    let mut group = c.benchmark_group("pdist");
    for n_samples in [10, 50, 100] {
        let genotypes = mock_genotypes(n_samples, 10_000);
        for metric in [Metric::Cityblock, Metric::Euclidean] {
            group.bench_with_input(BenchmarkId::new(metric.to_string(), n_samples), &genotypes, |b, genotypes| b.iter(|| {
                pdist(black_box(genotypes.view()), metric)
            }));
        }
    }
}

criterion_group!(benches, bench_pdist);
criterion_main!(benches);
