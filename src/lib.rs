#![cfg_attr(docsrs, feature(doc_cfg))]
//! # heatmap-sieve
//!
//! heatmap-sieve is the aggregation engine behind accessibility heatmaps. It
//! takes large unordered collections of `(grid_id, travel_time)` samples per
//! point-of-interest category, scores every grid cell under a decay model and
//! classifies the scores into quantile classes for rendering.
//!
//! ## Features
//! - Stable group-by of unsorted samples into per-cell segments, shared by all models
//! - Gravity, combined gravity, closest-average and cutoff-count decay models
//! - Quantile classification with explicit handling of zero and NaN scores
//! - A compressed columnar on-disk cache for raw travel-time matrices
//! - Optional parallel scoring of categories with the `rayon` feature
//!
//! ## Determinism
//!
//! Samples are sorted stably and categories are combined in name order, so
//! identical input produces bit-identical output with or without `rayon`.
//!
//! ## Usage
//!
//! ```
//! use heatmap_sieve::prelude::*;
//! use serde_json::json;
//!
//! let mut store = SampleStore::new();
//! store.try_insert_columns("atm", vec![7, 3, 7], vec![2.0, 5.0, 12.0])?;
//!
//! let config = HeatmapConfig::from_json(
//!     HeatmapType::Connectivity,
//!     &json!({"max_traveltime": 10}),
//! )?;
//! let result = compute_heatmap(&store, &HeatmapSettings::new(config))?;
//! assert_eq!(result.grid_ids, vec![3, 7]);
//! assert_eq!(result.scores, vec![1.0, 1.0]);
//! # Ok::<(), heatmap_sieve::heatmap_error::HeatmapError>(())
//! ```

pub mod algs;
pub mod config;
pub mod data;
pub mod debug_invariants;
pub mod heatmap_error;
pub mod io;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::combine::{CategoryScores, CellScores, combine_weighted};
    pub use crate::algs::decay::DecayModel;
    pub use crate::algs::heatmap::{HeatmapResult, compute_heatmap, compute_scores};
    pub use crate::algs::quantile::quantile_classify;
    pub use crate::config::{
        AnalysisUnit, ClosestAverageConfig, CombinedGravityConfig, CutoffConfig, GravityConfig,
        HeatmapConfig, HeatmapSettings, HeatmapType, TravelMode,
    };
    pub use crate::data::samples::{CategorySamples, GridId, SampleStore};
    pub use crate::data::segmentation::{Segmentation, aggregate};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::heatmap_error::HeatmapError;
    pub use crate::io::{CacheKey, CachedMatrix, MatrixCache, TravelTimeMatrix};
}
