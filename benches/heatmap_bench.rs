use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use heatmap_sieve::algs::decay::modified_gaussian;
use heatmap_sieve::algs::heatmap::compute_heatmap;
use heatmap_sieve::algs::quantile::quantile_classify;
use heatmap_sieve::config::{GravityConfig, HeatmapConfig, HeatmapSettings};
use heatmap_sieve::data::samples::{CategorySamples, SampleStore};
use heatmap_sieve::data::segmentation::Segmentation;
use heatmap_sieve::io::codec;
use heatmap_sieve::io::travel_time_matrix::TravelTimeMatrix;

fn samples(seed: u64, n: usize) -> CategorySamples {
    let mut rng = SmallRng::seed_from_u64(seed);
    let cells = (n / 20).max(1) as i64;
    let grid_ids = (0..n).map(|_| rng.gen_range(0..cells)).collect();
    let travel_times = (0..n).map(|_| rng.gen_range(0u32..30) as f64).collect();
    CategorySamples::try_new(grid_ids, travel_times).expect("equal lengths")
}

const GRAVITY: GravityConfig = GravityConfig {
    weight: 1.0,
    sensitivity: 300_000.0,
    max_traveltime: 20.0,
};

fn bench_segmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation");
    for &n in &[10_000usize, 200_000] {
        let s = samples(1, n);
        group.bench_with_input(BenchmarkId::new("from_samples", n), &n, |b, _| {
            b.iter(|| black_box(Segmentation::from_samples(&s)));
        });
        let seg = Segmentation::from_samples(&s);
        group.bench_with_input(BenchmarkId::new("modified_gaussian", n), &n, |b, _| {
            b.iter(|| black_box(modified_gaussian(&seg, &GRAVITY)));
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let mut store = SampleStore::new();
    let mut map = std::collections::BTreeMap::new();
    for i in 0..6u64 {
        let name = format!("category_{i}");
        store.insert(name.clone(), samples(i, 50_000));
        map.insert(name, GRAVITY);
    }
    let settings = HeatmapSettings::new(HeatmapConfig::ModifiedGaussian(map));
    group.bench_function("six_categories", |b| {
        b.iter(|| black_box(compute_heatmap(&store, &settings)));
    });

    let scores: Vec<f64> = (0..100_000).map(|i| (i % 977) as f64 * 0.25).collect();
    group.bench_function("quantile_classify", |b| {
        b.iter(|| black_box(quantile_classify(&scores, 5)));
    });
    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let s = samples(9, 200_000);
    let (ids, times) = s.into_columns();
    let mut ids = ids;
    ids.sort_unstable();
    let matrix = TravelTimeMatrix::new(ids, times)
        .to_cached()
        .expect("equal lengths");
    let bytes = codec::encode(&matrix).expect("encodable");

    let mut group = c.benchmark_group("codec");
    group.bench_function("encode", |b| b.iter(|| black_box(codec::encode(&matrix))));
    group.bench_function("decode", |b| b.iter(|| black_box(codec::decode(&bytes))));
    group.finish();
}

criterion_group!(benches, bench_segmentation, bench_pipeline, bench_codec);
criterion_main!(benches);
