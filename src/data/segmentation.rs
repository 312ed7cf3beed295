//! Segmentation: grouping unsorted samples by grid cell.
//!
//! A [`Segmentation`] is an arena of samples stably sorted by grid id plus an
//! index of segment boundaries, one segment per distinct grid id. It is built
//! once per category and handed by reference to every reduction and decay
//! kernel, so no kernel ever re-sorts.
//!
//! ```text
//! sorted grid ids   : 3 3 3 | 8 8 | 11 11 11 11
//! unique grid ids   : 3       8     11
//! segment starts    : 0       3     5          (+ synthetic end = 9)
//! ```

use itertools::Itertools;

use crate::data::samples::{CategorySamples, GridId};
use crate::debug_invariants::DebugInvariants;
use crate::heatmap_error::HeatmapError;

/// Sorted samples and their per-cell segment boundaries.
///
/// # Invariants
///
/// - `unique_grid_ids` is strictly increasing and has the same length as
///   `offsets`.
/// - `offsets` is strictly increasing and starts at `0` when non-empty.
/// - Appending `sample_count()` to `offsets` yields the end of every segment;
///   segments therefore partition the sorted arrays with no gaps or overlaps.
/// - Every sample in segment `i` has grid id `unique_grid_ids[i]`.
///
/// These invariants are checked after construction in debug builds and when
/// the `check-invariants` feature is enabled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Segmentation {
    grid_ids: Vec<GridId>,
    travel_times: Vec<f64>,
    unique_grid_ids: Vec<GridId>,
    offsets: Vec<usize>,
}

impl Segmentation {
    /// Sort `(grid_ids, travel_times)` by grid id and derive segment boundaries.
    ///
    /// The sort is stable: samples sharing a grid id keep their input order,
    /// so identical input always produces identical output.
    ///
    /// # Errors
    /// [`HeatmapError::LengthMismatch`] if the columns differ in length.
    ///
    /// # Complexity
    /// **O(n log n)** for the sort, **O(n)** for segment extraction.
    pub fn try_from_columns(
        grid_ids: &[GridId],
        travel_times: &[f64],
    ) -> Result<Self, HeatmapError> {
        if grid_ids.len() != travel_times.len() {
            return Err(HeatmapError::LengthMismatch {
                grid_ids: grid_ids.len(),
                travel_times: travel_times.len(),
            });
        }

        let mut order: Vec<usize> = (0..grid_ids.len()).collect();
        order.sort_by_key(|&i| grid_ids[i]);

        let sorted_ids: Vec<GridId> = order.iter().map(|&i| grid_ids[i]).collect();
        let sorted_times: Vec<f64> = order.iter().map(|&i| travel_times[i]).collect();

        let mut unique_grid_ids = Vec::new();
        let mut offsets = Vec::new();
        let mut start = 0usize;
        for (count, id) in sorted_ids.iter().dedup_with_count() {
            unique_grid_ids.push(*id);
            offsets.push(start);
            start += count;
        }

        let seg = Self {
            grid_ids: sorted_ids,
            travel_times: sorted_times,
            unique_grid_ids,
            offsets,
        };
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        seg.debug_assert_invariants();
        Ok(seg)
    }

    /// Segment one category's samples.
    pub fn from_samples(samples: &CategorySamples) -> Self {
        // Columns of a `CategorySamples` are equal-length by construction.
        match Self::try_from_columns(samples.grid_ids(), samples.travel_times()) {
            Ok(seg) => seg,
            Err(_) => Self::default(),
        }
    }

    /// Number of segments (distinct grid ids).
    #[inline]
    pub fn len(&self) -> usize {
        self.unique_grid_ids.len()
    }

    /// Whether there are no samples at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.unique_grid_ids.is_empty()
    }

    /// Total number of samples across all segments.
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.travel_times.len()
    }

    /// Distinct grid ids in ascending order.
    #[inline]
    pub fn unique_grid_ids(&self) -> &[GridId] {
        &self.unique_grid_ids
    }

    /// Offset of the first sample of each segment in the sorted arrays.
    #[inline]
    pub fn segment_start_offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Grid ids, stably sorted.
    #[inline]
    pub fn sorted_grid_ids(&self) -> &[GridId] {
        &self.grid_ids
    }

    /// Travel times, reordered to match [`sorted_grid_ids`](Self::sorted_grid_ids).
    #[inline]
    pub fn sorted_travel_times(&self) -> &[f64] {
        &self.travel_times
    }

    /// `(offset, len)` of segment `i`.
    ///
    /// # Panics
    /// If `i >= self.len()`.
    #[inline]
    pub fn span(&self, i: usize) -> (usize, usize) {
        let start = self.offsets[i];
        let end = self
            .offsets
            .get(i + 1)
            .copied()
            .unwrap_or(self.travel_times.len());
        (start, end - start)
    }

    /// Travel times of segment `i`.
    ///
    /// # Panics
    /// If `i >= self.len()`.
    #[inline]
    pub fn segment(&self, i: usize) -> &[f64] {
        let (start, len) = self.span(i);
        &self.travel_times[start..start + len]
    }

    /// Borrowing iterator over the travel-time slice of each segment, in
    /// ascending grid id order.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        (0..self.len()).map(move |i| self.segment(i))
    }

    /// Borrowing iterator over `(grid_id, travel_times)` per segment.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (GridId, &[f64])> + '_ {
        self.unique_grid_ids
            .iter()
            .copied()
            .zip(self.segments())
    }

    /// Apply `f` to every segment, producing one value per grid cell in the
    /// order of [`unique_grid_ids`](Self::unique_grid_ids).
    ///
    /// The output is pre-sized to `self.len()`; an empty segmentation yields
    /// an empty vector.
    pub fn map_segments<T, F>(&self, mut f: F) -> Vec<T>
    where
        F: FnMut(&[f64]) -> T,
    {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.segments().map(&mut f));
        out
    }
}

/// Sort and segment two parallel sample columns.
///
/// Returns the [`Segmentation`], whose accessors expose the four results of
/// the classic "sort + unique with index" step: sorted grid ids, sorted
/// travel times, unique grid ids and segment start offsets.
pub fn aggregate(grid_ids: &[GridId], travel_times: &[f64]) -> Result<Segmentation, HeatmapError> {
    Segmentation::try_from_columns(grid_ids, travel_times)
}

impl DebugInvariants for Segmentation {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Segmentation");
    }

    fn validate_invariants(&self) -> Result<(), HeatmapError> {
        if self.grid_ids.len() != self.travel_times.len() {
            return Err(HeatmapError::InvalidSegmentation(format!(
                "{} sorted grid ids vs {} travel times",
                self.grid_ids.len(),
                self.travel_times.len()
            )));
        }
        if self.unique_grid_ids.len() != self.offsets.len() {
            return Err(HeatmapError::InvalidSegmentation(format!(
                "{} unique ids vs {} offsets",
                self.unique_grid_ids.len(),
                self.offsets.len()
            )));
        }
        match self.offsets.first() {
            None if !self.travel_times.is_empty() => {
                return Err(HeatmapError::InvalidSegmentation(
                    "samples present but no segments".into(),
                ));
            }
            Some(&first) if first != 0 => {
                return Err(HeatmapError::InvalidSegmentation(format!(
                    "first segment starts at {first}, expected 0"
                )));
            }
            _ => {}
        }
        for (w, ids) in self
            .offsets
            .windows(2)
            .zip(self.unique_grid_ids.windows(2))
        {
            if w[0] >= w[1] {
                return Err(HeatmapError::InvalidSegmentation(format!(
                    "offsets not strictly increasing: {} then {}",
                    w[0], w[1]
                )));
            }
            if ids[0] >= ids[1] {
                return Err(HeatmapError::InvalidSegmentation(format!(
                    "grid ids not strictly increasing: {} then {}",
                    ids[0], ids[1]
                )));
            }
        }
        if let Some(&last) = self.offsets.last() {
            if last >= self.travel_times.len() {
                return Err(HeatmapError::InvalidSegmentation(format!(
                    "last segment starts at {last} past {} samples",
                    self.travel_times.len()
                )));
            }
        }
        for i in 0..self.len() {
            let (start, len) = self.span(i);
            let id = self.unique_grid_ids[i];
            if let Some(bad) = self.grid_ids[start..start + len].iter().find(|&&g| g != id) {
                return Err(HeatmapError::InvalidSegmentation(format!(
                    "segment {i} for grid {id} contains grid {bad}"
                )));
            }
        }
        Ok(())
    }
}
