//! HeatmapError: Unified error type for heatmap-sieve public APIs
//!
//! Every fallible operation in the crate (configuration validation, sample
//! ingestion, segmentation checks and the travel-time matrix cache) reports
//! through this type instead of panicking.

use std::path::Path;
use thiserror::Error;

use crate::io::column::ColumnType;

/// Unified error type for heatmap-sieve operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HeatmapError {
    /// The two sample columns of a category differ in length.
    #[error("sample columns differ in length: {grid_ids} grid ids vs {travel_times} travel times")]
    LengthMismatch {
        grid_ids: usize,
        travel_times: usize,
    },
    /// Per-category scores are not aligned with their grid ids.
    #[error("scores of `{category}` misaligned: {grid_ids} grid ids vs {scores} scores")]
    ScoreLengthMismatch {
        category: String,
        grid_ids: usize,
        scores: usize,
    },
    /// A per-category (or global) decay configuration failed validation.
    #[error("invalid heatmap config for `{category}`: {reason}")]
    InvalidConfig { category: String, reason: String },
    /// The heatmap type key is not one of the known types.
    #[error("unknown heatmap type `{0}`")]
    UnknownHeatmapType(String),
    /// Quantile class count must fit in `1..=255`.
    #[error("class count must be in 1..=255, got {0}")]
    InvalidClassCount(usize),
    /// Requested H3 resolution lies outside the supported range.
    #[error("resolution {0} outside supported range 6..=10")]
    InvalidResolution(u8),
    /// A segmentation failed its structural invariants.
    #[error("invalid segmentation: {0}")]
    InvalidSegmentation(String),
    /// No cached matrix exists for the requested key.
    #[error("no cached travel-time matrix at {path}")]
    CacheNotFound { path: String },
    /// Reading or writing the cache failed at the filesystem level.
    #[error("cache storage error at {path}: {reason}")]
    CacheStorage { path: String, reason: String },
    /// A cache file is truncated, corrupt or from an unknown format version.
    #[error("malformed cache file: {0}")]
    CacheFormat(String),
    /// Mode or profile cannot be used as a path component.
    #[error("invalid cache key component `{0}`")]
    InvalidCacheKey(String),
    /// Columns of a cached matrix must all have the same length.
    #[error("column `{column}` has {found} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
    /// A column name was inserted twice.
    #[error("duplicate column `{0}`")]
    DuplicateColumn(String),
    /// A required column is absent.
    #[error("missing column `{0}`")]
    MissingColumn(String),
    /// A column exists but carries a different element type.
    #[error("column `{column}` has type {found:?}, expected {expected:?}")]
    ColumnTypeMismatch {
        column: String,
        expected: ColumnType,
        found: ColumnType,
    },
}

impl HeatmapError {
    /// Shorthand for [`HeatmapError::InvalidConfig`].
    pub(crate) fn config(category: impl Into<String>, reason: impl Into<String>) -> Self {
        HeatmapError::InvalidConfig {
            category: category.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an I/O failure at `path`, mapping `NotFound` to [`HeatmapError::CacheNotFound`].
    pub(crate) fn from_io(path: &Path, err: std::io::Error) -> Self {
        let path = path.display().to_string();
        if err.kind() == std::io::ErrorKind::NotFound {
            HeatmapError::CacheNotFound { path }
        } else {
            HeatmapError::CacheStorage {
                path,
                reason: err.to_string(),
            }
        }
    }

    /// Like [`from_io`](Self::from_io) but never reports not-found; used on the write path.
    pub(crate) fn storage(path: &Path, err: std::io::Error) -> Self {
        HeatmapError::CacheStorage {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}
