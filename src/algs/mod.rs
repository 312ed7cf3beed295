//! Re-export public algorithms.

pub mod combine;
pub mod decay;
pub mod heatmap;
pub mod quantile;
pub mod reduction;

pub use combine::{CategoryScores, CellScores, combine_weighted};
pub use decay::DecayModel;
pub use heatmap::{HeatmapResult, compute_heatmap, compute_scores};
pub use quantile::quantile_classify;
