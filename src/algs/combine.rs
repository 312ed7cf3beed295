//! Cross-category combination of per-cell scores.
//!
//! For grid cell `g` the combined score is `Σ_c weight_c * score_c(g)` over
//! all categories `c`. A category that has no segment for `g` contributes
//! zero.

use hashbrown::HashMap;
use itertools::Itertools;

use crate::data::samples::GridId;
use crate::heatmap_error::HeatmapError;

/// Scores of one category, aligned with that category's unique grid ids.
///
/// Built only through [`try_new`](Self::try_new), so `grid_ids` and `scores`
/// always have the same length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryScores {
    category: String,
    weight: f64,
    grid_ids: Vec<GridId>,
    scores: Vec<f64>,
}

impl CategoryScores {
    /// # Errors
    /// [`HeatmapError::ScoreLengthMismatch`] if `grid_ids` and `scores`
    /// differ in length.
    pub fn try_new(
        category: impl Into<String>,
        weight: f64,
        grid_ids: Vec<GridId>,
        scores: Vec<f64>,
    ) -> Result<Self, HeatmapError> {
        let category = category.into();
        if grid_ids.len() != scores.len() {
            return Err(HeatmapError::ScoreLengthMismatch {
                category,
                grid_ids: grid_ids.len(),
                scores: scores.len(),
            });
        }
        Ok(Self {
            category,
            weight,
            grid_ids,
            scores,
        })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn grid_ids(&self) -> &[GridId] {
        &self.grid_ids
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn is_empty(&self) -> bool {
        self.grid_ids.is_empty()
    }
}

/// One score per grid cell, grid ids ascending. Callers that build one by
/// hand must keep `grid_ids` and `scores` the same length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellScores {
    pub grid_ids: Vec<GridId>,
    pub scores: Vec<f64>,
}

impl CellScores {
    pub fn len(&self) -> usize {
        self.grid_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid_ids.is_empty()
    }

    /// Score of `grid_id`, if the cell is present.
    pub fn get(&self, grid_id: GridId) -> Option<f64> {
        self.grid_ids
            .binary_search(&grid_id)
            .ok()
            .and_then(|i| self.scores.get(i).copied())
    }
}

/// Weighted sum of category scores over the union of their grid cells.
///
/// Each input's `grid_ids` must be strictly increasing, as produced by
/// [`Segmentation`](crate::data::segmentation::Segmentation). Categories are
/// accumulated in slice order, so the floating point result is reproducible
/// for a fixed input order.
pub fn combine_weighted(parts: &[CategoryScores]) -> CellScores {
    let grid_ids: Vec<GridId> = parts
        .iter()
        .map(|p| p.grid_ids.iter().copied())
        .kmerge()
        .dedup()
        .collect();
    let index: HashMap<GridId, usize> = grid_ids
        .iter()
        .enumerate()
        .map(|(i, &g)| (g, i))
        .collect();

    let mut scores = vec![0.0; grid_ids.len()];
    for part in parts {
        for (g, s) in part.grid_ids.iter().zip(&part.scores) {
            scores[index[g]] += part.weight * s;
        }
    }
    CellScores { grid_ids, scores }
}
