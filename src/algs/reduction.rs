//! Per-segment reduction primitives: `min`, `count`, `average`, `median`.
//!
//! Each reduction consumes a [`Segmentation`] and produces one value per grid
//! cell, aligned with [`Segmentation::unique_grid_ids`]. An empty
//! segmentation yields an empty vector. NaN travel times propagate into the
//! result of the segment that contains them.

use crate::data::segmentation::Segmentation;

/// Minimum of a slice, propagating NaN. `None` for an empty slice.
#[inline]
pub fn min_of(values: &[f64]) -> Option<f64> {
    let (&first, rest) = values.split_first()?;
    Some(rest.iter().fold(first, |acc, &t| {
        if acc.is_nan() || t.is_nan() {
            f64::NAN
        } else {
            acc.min(t)
        }
    }))
}

/// Arithmetic mean of a slice. `None` for an empty slice.
#[inline]
pub fn mean_of(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of a slice using the midpoint convention for even lengths.
/// `None` for an empty slice; NaN if any value is NaN.
pub fn median_of(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    if values.iter().any(|t| t.is_nan()) {
        return Some(f64::NAN);
    }
    let mut buf = values.to_vec();
    let mid = buf.len() / 2;
    let (_, &mut upper, _) = buf.select_nth_unstable_by(mid, f64::total_cmp);
    if buf.len() % 2 == 1 {
        return Some(upper);
    }
    // After selection every element left of `mid` is <= `upper`.
    let lower = buf[..mid]
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    Some((lower + upper) / 2.0)
}

/// Minimum travel time per cell.
pub fn mins(seg: &Segmentation) -> Vec<f64> {
    seg.map_segments(|s| min_of(s).unwrap_or(f64::NAN))
}

/// Number of samples per cell.
pub fn counts(seg: &Segmentation) -> Vec<usize> {
    seg.map_segments(<[f64]>::len)
}

/// Mean travel time per cell.
pub fn averages(seg: &Segmentation) -> Vec<f64> {
    seg.map_segments(|s| mean_of(s).unwrap_or(f64::NAN))
}

/// Median travel time per cell.
pub fn medians(seg: &Segmentation) -> Vec<f64> {
    seg.map_segments(|s| median_of(s).unwrap_or(f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::segmentation::aggregate;

    fn twelve(grid_ids: &[i64]) -> Segmentation {
        let times: Vec<f64> = (1..=12).map(f64::from).collect();
        aggregate(grid_ids, &times).unwrap()
    }

    #[test]
    fn four_equal_groups() {
        let seg = twelve(&[0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3]);
        assert_eq!(seg.unique_grid_ids().len(), 4);
        assert_eq!(medians(&seg), vec![2.0, 5.0, 8.0, 11.0]);
        assert_eq!(mins(&seg), vec![1.0, 4.0, 7.0, 10.0]);
        assert_eq!(counts(&seg), vec![3, 3, 3, 3]);
        assert_eq!(averages(&seg), vec![2.0, 5.0, 8.0, 11.0]);
    }

    #[test]
    fn uneven_groups_use_midpoint_median() {
        let seg = twelve(&[0, 0, 0, 1, 1, 2, 2, 2, 3, 3, 3, 3]);
        assert_eq!(counts(&seg), vec![3, 2, 3, 4]);
        assert_eq!(mins(&seg), vec![1.0, 4.0, 6.0, 9.0]);
        assert_eq!(medians(&seg), vec![2.0, 4.5, 7.0, 10.5]);
        assert_eq!(averages(&seg), vec![2.0, 4.5, 7.0, 10.5]);
    }

    #[test]
    fn empty_segmentation_reduces_to_nothing() {
        let seg = aggregate(&[], &[]).unwrap();
        assert!(mins(&seg).is_empty());
        assert!(counts(&seg).is_empty());
        assert!(averages(&seg).is_empty());
        assert!(medians(&seg).is_empty());
    }

    #[test]
    fn nan_propagates_per_segment() {
        let seg = aggregate(&[1, 1, 2], &[f64::NAN, 3.0, 4.0]).unwrap();
        let m = mins(&seg);
        assert!(m[0].is_nan());
        assert_eq!(m[1], 4.0);
        assert!(averages(&seg)[0].is_nan());
        assert!(medians(&seg)[0].is_nan());
    }

    #[test]
    fn median_of_unsorted_even_slice() {
        assert_eq!(median_of(&[9.0, 1.0, 4.0, 3.0]), Some(3.5));
        assert_eq!(median_of(&[]), None);
    }
}
