//! Per-category decay configuration shapes.
//!
//! Every shape validates itself once, when the surrounding
//! [`HeatmapConfig`](super::HeatmapConfig) is built, so decay kernels can
//! rely on a positive sensitivity and a non-negative cutoff.

use serde::{Deserialize, Serialize};

use crate::heatmap_error::HeatmapError;

/// Upper bound on the global cutoff of connectivity/cumulative heatmaps.
pub const MAX_CONNECTIVITY_TRAVELTIME: f64 = 25.0;

fn check_cutoff(category: &str, max_traveltime: f64) -> Result<(), HeatmapError> {
    if !max_traveltime.is_finite() || max_traveltime < 0.0 {
        return Err(HeatmapError::config(
            category,
            format!("max_traveltime must be finite and >= 0, got {max_traveltime}"),
        ));
    }
    Ok(())
}

fn check_weight(category: &str, weight: f64) -> Result<(), HeatmapError> {
    if !weight.is_finite() {
        return Err(HeatmapError::config(
            category,
            format!("weight must be finite, got {weight}"),
        ));
    }
    Ok(())
}

/// Modified-gaussian ("gravity") decay for one category.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GravityConfig {
    pub weight: f64,
    /// Decay sensitivity; divided by 3600 before use.
    pub sensitivity: f64,
    /// Samples slower than this contribute nothing.
    pub max_traveltime: f64,
}

impl GravityConfig {
    pub fn validate(&self, category: &str) -> Result<(), HeatmapError> {
        check_weight(category, self.weight)?;
        check_cutoff(category, self.max_traveltime)?;
        if !self.sensitivity.is_finite() || self.sensitivity <= 0.0 {
            return Err(HeatmapError::config(
                category,
                format!("sensitivity must be finite and > 0, got {}", self.sensitivity),
            ));
        }
        Ok(())
    }

    /// Sensitivity on the per-minute scale used by the kernel.
    #[inline]
    pub fn scaled_sensitivity(&self) -> f64 {
        self.sensitivity / 3600.0
    }
}

/// Gravity decay with a saturated "walk-in" phase below `static_traveltime`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombinedGravityConfig {
    pub weight: f64,
    pub sensitivity: f64,
    pub max_traveltime: f64,
    /// Samples at or below this travel time score a full `1.0`.
    pub static_traveltime: f64,
}

impl CombinedGravityConfig {
    pub fn validate(&self, category: &str) -> Result<(), HeatmapError> {
        self.gravity().validate(category)?;
        if !self.static_traveltime.is_finite()
            || self.static_traveltime < 0.0
            || self.static_traveltime > self.max_traveltime
        {
            return Err(HeatmapError::config(
                category,
                format!(
                    "static_traveltime must lie in [0, {}], got {}",
                    self.max_traveltime, self.static_traveltime
                ),
            ));
        }
        Ok(())
    }

    /// The gravity part of this config.
    #[inline]
    pub fn gravity(&self) -> GravityConfig {
        GravityConfig {
            weight: self.weight,
            sensitivity: self.sensitivity,
            max_traveltime: self.max_traveltime,
        }
    }
}

/// Average of the `max_count` closest reachable destinations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClosestAverageConfig {
    pub weight: f64,
    pub max_count: usize,
    pub max_traveltime: f64,
}

impl ClosestAverageConfig {
    pub fn validate(&self, category: &str) -> Result<(), HeatmapError> {
        check_weight(category, self.weight)?;
        check_cutoff(category, self.max_traveltime)?;
        if self.max_count == 0 {
            return Err(HeatmapError::config(category, "max_count must be >= 1"));
        }
        Ok(())
    }
}

/// Single global cutoff for connectivity and cumulative heatmaps.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CutoffConfig {
    pub max_traveltime: f64,
}

impl CutoffConfig {
    pub fn validate(&self, label: &str) -> Result<(), HeatmapError> {
        check_cutoff(label, self.max_traveltime)?;
        if self.max_traveltime > MAX_CONNECTIVITY_TRAVELTIME {
            return Err(HeatmapError::config(
                label,
                format!(
                    "max_traveltime must be <= {MAX_CONNECTIVITY_TRAVELTIME}, got {}",
                    self.max_traveltime
                ),
            ));
        }
        Ok(())
    }
}

/// Common accessors over the per-category shapes.
pub trait CategoryConfig {
    /// Multiplier applied when combining categories.
    fn weight(&self) -> f64;
    /// Validate, naming `category` in any error.
    fn check(&self, category: &str) -> Result<(), HeatmapError>;
}

impl CategoryConfig for GravityConfig {
    fn weight(&self) -> f64 {
        self.weight
    }
    fn check(&self, category: &str) -> Result<(), HeatmapError> {
        self.validate(category)
    }
}

impl CategoryConfig for CombinedGravityConfig {
    fn weight(&self) -> f64 {
        self.weight
    }
    fn check(&self, category: &str) -> Result<(), HeatmapError> {
        self.validate(category)
    }
}

impl CategoryConfig for ClosestAverageConfig {
    fn weight(&self) -> f64 {
        self.weight
    }
    fn check(&self, category: &str) -> Result<(), HeatmapError> {
        self.validate(category)
    }
}
