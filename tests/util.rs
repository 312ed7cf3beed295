#![allow(dead_code)]
use heatmap_sieve::data::samples::{CategorySamples, GridId};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// `n` samples over `cells` distinct grid ids in random order.
pub fn random_samples(seed: u64, n: usize, cells: i64) -> CategorySamples {
    let mut rng = SmallRng::seed_from_u64(seed);
    let grid_ids: Vec<GridId> = (0..n).map(|_| rng.gen_range(0..cells) * 7 + 1_000).collect();
    let travel_times: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..30.0)).collect();
    CategorySamples::try_new(grid_ids, travel_times).unwrap()
}

/// Deterministic permutation of `0..n`.
pub fn shuffled_indices(seed: u64, n: usize) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..n).collect();
    idx.shuffle(&mut SmallRng::seed_from_u64(seed));
    idx
}

/// Assert two float slices agree to `tol`, treating NaN as equal to NaN.
pub fn assert_close(got: &[f64], want: &[f64], tol: f64) {
    assert_eq!(got.len(), want.len(), "length\n got={:?}\nwant={:?}", got, want);
    for (i, (a, b)) in got.iter().zip(want).enumerate() {
        let same = (a.is_nan() && b.is_nan()) || (a - b).abs() <= tol;
        assert!(same, "index {i}: got {a}, want {b}");
    }
}
