//! Quantile classification of per-cell scores into small integer classes.
//!
//! Scores that are zero, negative or NaN land in class `0`. The strictly
//! positive scores are split at `class_count - 1` data-driven breakpoints
//! (quantiles at `1/k, 2/k, …, (k-1)/k`) into classes `1..=class_count`.
//! Intervals are inclusive-low and exclusive-high:
//!
//! ```text
//!   v <  b[0]            -> 1
//!   b[i-1] <= v < b[i]   -> i + 1
//!   v >= b[k-2]          -> k
//! ```
//!
//! The class of a value depends only on that value and the multiset of
//! scores, never on positions, so permuting the input permutes the output.

use crate::heatmap_error::HeatmapError;

/// Quantile of an ascending, NaN-free slice using linear interpolation
/// between the two nearest order statistics (`h = (n - 1) * p`).
///
/// Returns `None` for an empty slice. `p` is clamped to `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let h = last as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(last);
    let frac = h - lo as f64;
    // equal neighbours skip the arithmetic so `inf - inf` never appears
    if frac == 0.0 || sorted[lo] == sorted[hi] {
        return Some(sorted[lo]);
    }
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// The `class_count - 1` breakpoints over the strictly positive scores.
///
/// Returns an empty vector when there are no strictly positive scores or
/// when `class_count <= 1`.
pub fn quantile_breakpoints(scores: &[f64], class_count: usize) -> Vec<f64> {
    let mut positive: Vec<f64> = scores.iter().copied().filter(|&v| v > 0.0).collect();
    if positive.is_empty() || class_count <= 1 {
        return Vec::new();
    }
    positive.sort_unstable_by(f64::total_cmp);
    (1..class_count)
        .filter_map(|i| quantile_sorted(&positive, i as f64 / class_count as f64))
        .collect()
}

/// Class of a single score against precomputed ascending breakpoints.
#[inline]
pub fn class_of(value: f64, breakpoints: &[f64]) -> u8 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    (1 + breakpoints.partition_point(|&b| b <= value)) as u8
}

/// Classify `scores` into `0..=class_count`.
///
/// # Errors
/// [`HeatmapError::InvalidClassCount`] unless `1 <= class_count <= 255`.
pub fn quantile_classify(scores: &[f64], class_count: usize) -> Result<Vec<u8>, HeatmapError> {
    if class_count == 0 || class_count > u8::MAX as usize {
        return Err(HeatmapError::InvalidClassCount(class_count));
    }
    if scores.is_empty() {
        return Ok(Vec::new());
    }
    if !scores.iter().any(|&v| v > 0.0) {
        return Ok(vec![0; scores.len()]);
    }

    let breakpoints = quantile_breakpoints(scores, class_count);
    log::debug!("quantile breakpoints for {} scores: {:?}", scores.len(), breakpoints);

    let mut classes: Vec<u8> = scores.iter().map(|&v| class_of(v, &breakpoints)).collect();
    for (class, v) in classes.iter_mut().zip(scores) {
        if v.is_nan() {
            *class = 0;
        }
    }
    Ok(classes)
}
