//! Decay models: turning one cell's travel times into an accessibility score.
//!
//! Every model implements [`DecayModel`], whose default
//! [`apply`](DecayModel::apply) walks the segments of a shared
//! [`Segmentation`] and yields one score per grid cell, aligned with
//! [`Segmentation::unique_grid_ids`]. Empty input yields an empty score
//! vector.
//!
//! | Config                    | Model                                   |
//! |---------------------------|-----------------------------------------|
//! | [`GravityConfig`]         | modified gaussian                       |
//! | [`CombinedGravityConfig`] | saturated walk-in + modified gaussian   |
//! | [`CutoffConfig`]          | count within cutoff (connectivity)      |
//! | [`ClosestAverageConfig`]  | mean of the k closest within cutoff     |
//!
//! All arithmetic is `f64`. NaN travel times propagate into gaussian scores.

use crate::algs::reduction::mean_of;
use crate::config::{ClosestAverageConfig, CombinedGravityConfig, CutoffConfig, GravityConfig};
use crate::data::segmentation::Segmentation;

/// `exp(-t² / s)` for a scaled sensitivity `s > 0`.
#[inline]
pub fn gaussian_decay(t: f64, scaled_sensitivity: f64) -> f64 {
    (-t * t / scaled_sensitivity).exp()
}

/// A per-segment scoring kernel.
pub trait DecayModel {
    /// Score the travel times of a single grid cell.
    fn score_segment(&self, travel_times: &[f64]) -> f64;

    /// Score every segment, in grid id order.
    fn apply(&self, seg: &Segmentation) -> Vec<f64> {
        seg.map_segments(|s| self.score_segment(s))
    }
}

impl DecayModel for GravityConfig {
    /// `Σ exp(-t² / s)` over samples with `t <= max_traveltime`.
    fn score_segment(&self, travel_times: &[f64]) -> f64 {
        let s = self.scaled_sensitivity();
        // NaN passes the cutoff test so it reaches the sum.
        travel_times
            .iter()
            .filter(|&&t| !(t > self.max_traveltime))
            .map(|&t| gaussian_decay(t, s))
            .sum()
    }
}

impl DecayModel for CombinedGravityConfig {
    /// Samples past the cutoff score 0, samples within the static walk-in
    /// time score 1, the rest decay from the end of the walk-in.
    fn score_segment(&self, travel_times: &[f64]) -> f64 {
        let s = self.gravity().scaled_sensitivity();
        travel_times
            .iter()
            .filter(|&&t| !(t > self.max_traveltime))
            .map(|&t| {
                if t <= self.static_traveltime {
                    1.0
                } else {
                    gaussian_decay(t - self.static_traveltime, s)
                }
            })
            .sum()
    }
}

impl DecayModel for CutoffConfig {
    /// Number of samples with `t <= max_traveltime`.
    fn score_segment(&self, travel_times: &[f64]) -> f64 {
        travel_times
            .iter()
            .filter(|&&t| t <= self.max_traveltime)
            .count() as f64
    }
}

impl DecayModel for ClosestAverageConfig {
    /// Mean of the `max_count` smallest samples with `t <= max_traveltime`;
    /// `0.0` when nothing is reachable.
    fn score_segment(&self, travel_times: &[f64]) -> f64 {
        let mut reachable: Vec<f64> = travel_times
            .iter()
            .copied()
            .filter(|&t| t <= self.max_traveltime)
            .collect();
        if reachable.len() > self.max_count {
            reachable.select_nth_unstable_by(self.max_count - 1, f64::total_cmp);
            reachable.truncate(self.max_count);
        }
        mean_of(&reachable).unwrap_or(0.0)
    }
}

/// Modified-gaussian scores per cell.
pub fn modified_gaussian(seg: &Segmentation, cfg: &GravityConfig) -> Vec<f64> {
    cfg.apply(seg)
}

/// Combined (walk-in + gaussian) scores per cell.
pub fn combined_modified_gaussian(seg: &Segmentation, cfg: &CombinedGravityConfig) -> Vec<f64> {
    cfg.apply(seg)
}

/// Reachable-sample counts per cell, for connectivity and cumulative heatmaps.
pub fn connectivity(seg: &Segmentation, cfg: &CutoffConfig) -> Vec<f64> {
    cfg.apply(seg)
}

/// Closest-average travel time per cell.
pub fn closest_average(seg: &Segmentation, cfg: &ClosestAverageConfig) -> Vec<f64> {
    cfg.apply(seg)
}
