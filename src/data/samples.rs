//! Sample Store: per-category columnar `(grid_id, travel_time)` samples.
//!
//! Each destination category carries two parallel columns of equal length.
//! No ordering is assumed; ordering is established later by
//! [`Segmentation`](crate::data::segmentation::Segmentation).

use std::collections::BTreeMap;

use num_traits::ToPrimitive;

use crate::heatmap_error::HeatmapError;

/// Grid cell identifier (e.g. an H3 index or a square-tile id).
pub type GridId = i64;

/// Travel-time samples for one destination category.
///
/// # Invariants
/// `grid_ids.len() == travel_times.len()`; enforced by every constructor.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CategorySamples {
    grid_ids: Vec<GridId>,
    travel_times: Vec<f64>,
}

impl CategorySamples {
    /// Build from two parallel columns.
    ///
    /// # Errors
    /// [`HeatmapError::LengthMismatch`] if the columns differ in length.
    pub fn try_new(grid_ids: Vec<GridId>, travel_times: Vec<f64>) -> Result<Self, HeatmapError> {
        if grid_ids.len() != travel_times.len() {
            return Err(HeatmapError::LengthMismatch {
                grid_ids: grid_ids.len(),
                travel_times: travel_times.len(),
            });
        }
        Ok(Self {
            grid_ids,
            travel_times,
        })
    }

    /// Build from travel times of any primitive numeric type (integer minutes,
    /// `f32` seconds, ...). Values are widened to `f64`.
    pub fn try_from_primitive<T: ToPrimitive>(
        grid_ids: Vec<GridId>,
        travel_times: &[T],
    ) -> Result<Self, HeatmapError> {
        let travel_times = travel_times
            .iter()
            .map(|t| t.to_f64().unwrap_or(f64::NAN))
            .collect();
        Self::try_new(grid_ids, travel_times)
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.grid_ids.len()
    }

    /// True if there are no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.grid_ids.is_empty()
    }

    /// Grid id column, in input order.
    #[inline]
    pub fn grid_ids(&self) -> &[GridId] {
        &self.grid_ids
    }

    /// Travel-time column, aligned with [`grid_ids`](Self::grid_ids).
    #[inline]
    pub fn travel_times(&self) -> &[f64] {
        &self.travel_times
    }

    /// Append all samples of `other`.
    pub fn extend_from(&mut self, other: &CategorySamples) {
        self.grid_ids.extend_from_slice(&other.grid_ids);
        self.travel_times.extend_from_slice(&other.travel_times);
    }

    /// Consume into `(grid_ids, travel_times)`.
    pub fn into_columns(self) -> (Vec<GridId>, Vec<f64>) {
        (self.grid_ids, self.travel_times)
    }
}

/// Request-scoped collection of samples keyed by category name.
///
/// Categories iterate in name order so every downstream result is
/// independent of insertion order.
#[derive(Clone, Debug, Default)]
pub struct SampleStore {
    categories: BTreeMap<String, CategorySamples>,
}

impl SampleStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the samples of `category`, returning the previous ones.
    pub fn insert(
        &mut self,
        category: impl Into<String>,
        samples: CategorySamples,
    ) -> Option<CategorySamples> {
        self.categories.insert(category.into(), samples)
    }

    /// Convenience wrapper around [`CategorySamples::try_new`] + [`insert`](Self::insert).
    pub fn try_insert_columns(
        &mut self,
        category: impl Into<String>,
        grid_ids: Vec<GridId>,
        travel_times: Vec<f64>,
    ) -> Result<(), HeatmapError> {
        let samples = CategorySamples::try_new(grid_ids, travel_times)?;
        self.insert(category, samples);
        Ok(())
    }

    /// Samples of `category`, if present.
    pub fn get(&self, category: &str) -> Option<&CategorySamples> {
        self.categories.get(category)
    }

    /// Whether `category` has samples.
    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Category names in ascending order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// `(category, samples)` pairs in ascending category order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategorySamples)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// True if no category was inserted.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Sum of sample counts over all categories.
    pub fn total_samples(&self) -> usize {
        self.categories.values().map(CategorySamples::len).sum()
    }

    /// All categories concatenated in category-name order.
    ///
    /// Used by the heatmap types that apply one global cutoff instead of
    /// per-category configs.
    pub fn merged(&self) -> CategorySamples {
        let mut out = CategorySamples {
            grid_ids: Vec::with_capacity(self.total_samples()),
            travel_times: Vec::with_capacity(self.total_samples()),
        };
        for samples in self.categories.values() {
            out.extend_from(samples);
        }
        out
    }
}
