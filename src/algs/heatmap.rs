//! Heatmap pipeline: samples → segmentation → decay → combination → classes.
//!
//! Every category is segmented once and scored by the decay model its
//! config selects. Categories are independent; with the `rayon` feature
//! they are scored in parallel. Combination always runs in category-name
//! order, so both paths produce bit-identical scores.

use crate::algs::combine::{CategoryScores, CellScores, combine_weighted};
use crate::algs::decay::DecayModel;
use crate::algs::quantile::quantile_classify;
use crate::config::{CategoryConfig, CutoffConfig, HeatmapConfig, HeatmapSettings};
use crate::data::samples::{GridId, SampleStore};
use crate::data::segmentation::Segmentation;
use crate::heatmap_error::HeatmapError;
use std::collections::BTreeMap;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Output of one heatmap request, all vectors aligned by index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeatmapResult {
    /// Grid cells in ascending order.
    pub grid_ids: Vec<GridId>,
    /// Combined accessibility score per cell.
    pub scores: Vec<f64>,
    /// Quantile class per cell, in `0..=class_count`.
    pub classes: Vec<u8>,
}

impl HeatmapResult {
    pub fn len(&self) -> usize {
        self.grid_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid_ids.is_empty()
    }

    /// `(grid_id, score, class)` triples in grid id order.
    pub fn iter(&self) -> impl Iterator<Item = (GridId, f64, u8)> + '_ {
        self.grid_ids
            .iter()
            .zip(&self.scores)
            .zip(&self.classes)
            .map(|((&g, &s), &c)| (g, s, c))
    }
}

fn score_category<C>(
    store: &SampleStore,
    category: &str,
    cfg: &C,
) -> Result<CategoryScores, HeatmapError>
where
    C: DecayModel + CategoryConfig,
{
    let Some(samples) = store.get(category) else {
        log::warn!("no samples for configured category `{category}`; it contributes zero");
        return CategoryScores::try_new(category, cfg.weight(), Vec::new(), Vec::new());
    };
    let seg = Segmentation::from_samples(samples);
    let scores = cfg.apply(&seg);
    log::debug!(
        "category `{category}`: {} samples over {} cells",
        seg.sample_count(),
        seg.len()
    );
    CategoryScores::try_new(category, cfg.weight(), seg.unique_grid_ids().to_vec(), scores)
}

#[cfg(not(feature = "rayon"))]
fn score_categories<C>(
    store: &SampleStore,
    categories: &BTreeMap<String, C>,
) -> Result<Vec<CategoryScores>, HeatmapError>
where
    C: DecayModel + CategoryConfig,
{
    categories
        .iter()
        .map(|(category, cfg)| score_category(store, category, cfg))
        .collect()
}

#[cfg(feature = "rayon")]
fn score_categories<C>(
    store: &SampleStore,
    categories: &BTreeMap<String, C>,
) -> Result<Vec<CategoryScores>, HeatmapError>
where
    C: DecayModel + CategoryConfig + Sync,
{
    let entries: Vec<(&String, &C)> = categories.iter().collect();
    entries
        .par_iter()
        .map(|(category, cfg)| score_category(store, category, *cfg))
        .collect()
}

fn score_cutoff(store: &SampleStore, cfg: &CutoffConfig) -> CellScores {
    let merged = store.merged();
    let seg = Segmentation::from_samples(&merged);
    log::debug!(
        "cutoff {}: {} samples over {} cells",
        cfg.max_traveltime,
        seg.sample_count(),
        seg.len()
    );
    CellScores {
        scores: cfg.apply(&seg),
        grid_ids: seg.unique_grid_ids().to_vec(),
    }
}

/// Combined per-cell scores for `config`.
///
/// Per-category types score each configured category and combine them by
/// weight; connectivity and cumulative score all samples together against
/// one global cutoff. Sample categories without a config are ignored.
pub fn compute_scores(
    store: &SampleStore,
    config: &HeatmapConfig,
) -> Result<CellScores, HeatmapError> {
    config.validate()?;
    if config.heatmap_type().is_per_category() {
        let configured = config.categories();
        for category in store.categories().filter(|c| !configured.contains(c)) {
            log::debug!("ignoring samples of unconfigured category `{category}`");
        }
    }

    let combined = match config {
        HeatmapConfig::ModifiedGaussian(map) => combine_weighted(&score_categories(store, map)?),
        HeatmapConfig::CombinedModifiedGaussian(map) => {
            combine_weighted(&score_categories(store, map)?)
        }
        HeatmapConfig::ClosestAverage(map) => combine_weighted(&score_categories(store, map)?),
        HeatmapConfig::Connectivity(cfg) | HeatmapConfig::Cumulative(cfg) => {
            score_cutoff(store, cfg)
        }
    };

    let nan_cells = combined.scores.iter().filter(|s| s.is_nan()).count();
    if nan_cells > 0 {
        log::warn!("{nan_cells} cells scored NaN; they are classified as 0");
    }
    Ok(combined)
}

/// Run the full pipeline for one request.
pub fn compute_heatmap(
    store: &SampleStore,
    settings: &HeatmapSettings,
) -> Result<HeatmapResult, HeatmapError> {
    settings.validate()?;
    let CellScores { grid_ids, scores } = compute_scores(store, &settings.config)?;
    let classes = quantile_classify(&scores, settings.class_count)?;
    log::debug!(
        "{} heatmap: {} cells, {} classes",
        settings.config.heatmap_type(),
        grid_ids.len(),
        settings.class_count
    );
    Ok(HeatmapResult {
        grid_ids,
        scores,
        classes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GravityConfig, HeatmapType};
    use serde_json::json;

    fn store() -> SampleStore {
        let mut store = SampleStore::new();
        store
            .try_insert_columns("atm", vec![2, 1, 2], vec![0.0, 1.0, 2.0])
            .unwrap();
        store
            .try_insert_columns("bar", vec![3, 1], vec![0.0, 0.0])
            .unwrap();
        store
    }

    #[test]
    fn gravity_weights_are_applied() {
        let cfg = HeatmapConfig::from_json(
            HeatmapType::ModifiedGaussian,
            &json!({
                "atm": {"weight": 1, "sensitivity": 3600, "max_traveltime": 10},
                "bar": {"weight": 2, "sensitivity": 3600, "max_traveltime": 10}
            }),
        )
        .unwrap();
        let scores = compute_scores(&store(), &cfg).unwrap();
        assert_eq!(scores.grid_ids, vec![1, 2, 3]);
        let e1 = (-1.0f64).exp();
        let e4 = (-4.0f64).exp();
        assert!((scores.scores[0] - (e1 + 2.0)).abs() < 1e-12);
        assert!((scores.scores[1] - (1.0 + e4)).abs() < 1e-12);
        assert!((scores.scores[2] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn configured_category_without_samples_contributes_zero() {
        let mut map = BTreeMap::new();
        let g = GravityConfig {
            weight: 1.0,
            sensitivity: 3600.0,
            max_traveltime: 10.0,
        };
        map.insert("atm".to_string(), g);
        map.insert("museum".to_string(), g);
        let with_missing = compute_scores(&store(), &HeatmapConfig::ModifiedGaussian(map)).unwrap();

        let mut only_atm = BTreeMap::new();
        only_atm.insert("atm".to_string(), g);
        let alone = compute_scores(&store(), &HeatmapConfig::ModifiedGaussian(only_atm)).unwrap();
        assert_eq!(with_missing, alone);
    }

    #[test]
    fn connectivity_merges_all_categories() {
        let cfg = HeatmapConfig::Connectivity(CutoffConfig {
            max_traveltime: 1.0,
        });
        let scores = compute_scores(&store(), &cfg).unwrap();
        assert_eq!(scores.grid_ids, vec![1, 2, 3]);
        assert_eq!(scores.scores, vec![2.0, 1.0, 1.0]);
    }

    #[test]
    fn full_pipeline_classifies_cells() {
        let cfg = HeatmapConfig::Cumulative(CutoffConfig {
            max_traveltime: 20.0,
        });
        let settings = HeatmapSettings::new(cfg).with_class_count(2);
        let result = compute_heatmap(&store(), &settings).unwrap();
        // counts: cell1 = 2, cell2 = 2, cell3 = 1 ; breakpoint = 2
        assert_eq!(result.scores, vec![2.0, 2.0, 1.0]);
        assert_eq!(result.classes, vec![2, 2, 1]);
        assert_eq!(result.iter().count(), 3);
    }

    #[test]
    fn empty_store_yields_empty_result() {
        let cfg = HeatmapConfig::Connectivity(CutoffConfig {
            max_traveltime: 10.0,
        });
        let result = compute_heatmap(&SampleStore::new(), &HeatmapSettings::new(cfg)).unwrap();
        assert!(result.is_empty());
        assert!(result.classes.is_empty());
    }
}
