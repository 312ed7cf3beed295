//! Heatmap configuration: type keys, per-category decay configs and the
//! request-level settings around them.
//!
//! A request names its heatmap type with a string key and supplies a JSON
//! document whose shape depends on that key. [`HeatmapConfig::from_json`]
//! turns the pair into a tagged variant that carries only the fields its
//! type needs, validating everything up front.

pub mod decay_config;

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::heatmap_error::HeatmapError;

pub use decay_config::{
    CategoryConfig, ClosestAverageConfig, CombinedGravityConfig, CutoffConfig, GravityConfig,
    MAX_CONNECTIVITY_TRAVELTIME,
};

/// Default number of non-zero quantile classes.
pub const DEFAULT_CLASS_COUNT: usize = 5;

/// Supported H3 resolutions for heatmap cells.
pub const RESOLUTION_RANGE: std::ops::RangeInclusive<u8> = 6..=10;

/// Heatmap type key.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapType {
    ModifiedGaussian,
    CombinedCumulativeModifiedGaussian,
    Connectivity,
    Cumulative,
    ClosestAverage,
}

impl HeatmapType {
    /// All heatmap types, in declaration order.
    pub const ALL: [HeatmapType; 5] = [
        HeatmapType::ModifiedGaussian,
        HeatmapType::CombinedCumulativeModifiedGaussian,
        HeatmapType::Connectivity,
        HeatmapType::Cumulative,
        HeatmapType::ClosestAverage,
    ];

    /// Returns the stable string key for the heatmap type.
    pub fn as_str(self) -> &'static str {
        match self {
            HeatmapType::ModifiedGaussian => "modified_gaussian",
            HeatmapType::CombinedCumulativeModifiedGaussian => {
                "combined_cumulative_modified_gaussian"
            }
            HeatmapType::Connectivity => "connectivity",
            HeatmapType::Cumulative => "cumulative",
            HeatmapType::ClosestAverage => "closest_average",
        }
    }

    /// Parse a heatmap type from its string key.
    pub fn parse(key: &str) -> Result<Self, HeatmapError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| HeatmapError::UnknownHeatmapType(key.to_string()))
    }

    /// Whether this type is configured per destination category.
    pub fn is_per_category(self) -> bool {
        !matches!(self, HeatmapType::Connectivity | HeatmapType::Cumulative)
    }
}

impl std::fmt::Display for HeatmapType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated decay configuration for one heatmap request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum HeatmapConfig {
    ModifiedGaussian(BTreeMap<String, GravityConfig>),
    CombinedModifiedGaussian(BTreeMap<String, CombinedGravityConfig>),
    ClosestAverage(BTreeMap<String, ClosestAverageConfig>),
    Connectivity(CutoffConfig),
    Cumulative(CutoffConfig),
}

fn parse_categories<C>(value: &Value) -> Result<BTreeMap<String, C>, HeatmapError>
where
    C: DeserializeOwned + CategoryConfig,
{
    let obj = value.as_object().ok_or_else(|| {
        HeatmapError::config("heatmap_config", "expected an object keyed by category")
    })?;
    if obj.is_empty() {
        return Err(HeatmapError::config(
            "heatmap_config",
            "at least one category is required",
        ));
    }
    obj.iter()
        .map(|(category, raw)| {
            let cfg: C = serde_json::from_value(raw.clone())
                .map_err(|e| HeatmapError::config(category.as_str(), e.to_string()))?;
            cfg.check(category)?;
            Ok((category.clone(), cfg))
        })
        .collect()
}

fn check_categories<C: CategoryConfig>(map: &BTreeMap<String, C>) -> Result<(), HeatmapError> {
    if map.is_empty() {
        return Err(HeatmapError::config(
            "heatmap_config",
            "at least one category is required",
        ));
    }
    map.iter().try_for_each(|(category, cfg)| cfg.check(category))
}

impl HeatmapConfig {
    /// Build and validate a config from the request's `heatmap_config` JSON.
    ///
    /// A per-category map may be wrapped under a `"poi"` key; it is unwrapped
    /// before parsing.
    ///
    /// # Errors
    /// [`HeatmapError::InvalidConfig`] naming the offending category when a
    /// field is missing, mistyped or out of range.
    pub fn from_json(heatmap_type: HeatmapType, value: &Value) -> Result<Self, HeatmapError> {
        let value = match value.get("poi") {
            Some(inner) if inner.is_object() => inner,
            _ => value,
        };
        let cfg = match heatmap_type {
            HeatmapType::ModifiedGaussian => Self::ModifiedGaussian(parse_categories(value)?),
            HeatmapType::CombinedCumulativeModifiedGaussian => {
                Self::CombinedModifiedGaussian(parse_categories(value)?)
            }
            HeatmapType::ClosestAverage => Self::ClosestAverage(parse_categories(value)?),
            HeatmapType::Connectivity | HeatmapType::Cumulative => {
                let cutoff: CutoffConfig = serde_json::from_value(value.clone())
                    .map_err(|e| HeatmapError::config(heatmap_type.as_str(), e.to_string()))?;
                cutoff.validate(heatmap_type.as_str())?;
                if heatmap_type == HeatmapType::Connectivity {
                    Self::Connectivity(cutoff)
                } else {
                    Self::Cumulative(cutoff)
                }
            }
        };
        Ok(cfg)
    }

    /// Parse the heatmap type key, then the config document.
    pub fn from_json_keyed(heatmap_type: &str, value: &Value) -> Result<Self, HeatmapError> {
        Self::from_json(HeatmapType::parse(heatmap_type)?, value)
    }

    /// Re-run validation, e.g. after constructing a variant by hand.
    pub fn validate(&self) -> Result<(), HeatmapError> {
        match self {
            Self::ModifiedGaussian(map) => check_categories(map),
            Self::CombinedModifiedGaussian(map) => check_categories(map),
            Self::ClosestAverage(map) => check_categories(map),
            Self::Connectivity(cutoff) => cutoff.validate(HeatmapType::Connectivity.as_str()),
            Self::Cumulative(cutoff) => cutoff.validate(HeatmapType::Cumulative.as_str()),
        }
    }

    /// The type key of this config.
    pub fn heatmap_type(&self) -> HeatmapType {
        match self {
            Self::ModifiedGaussian(_) => HeatmapType::ModifiedGaussian,
            Self::CombinedModifiedGaussian(_) => HeatmapType::CombinedCumulativeModifiedGaussian,
            Self::ClosestAverage(_) => HeatmapType::ClosestAverage,
            Self::Connectivity(_) => HeatmapType::Connectivity,
            Self::Cumulative(_) => HeatmapType::Cumulative,
        }
    }

    /// Configured category names in ascending order; empty for the
    /// global-cutoff types.
    pub fn categories(&self) -> Vec<&str> {
        match self {
            Self::ModifiedGaussian(map) => map.keys().map(String::as_str).collect(),
            Self::CombinedModifiedGaussian(map) => map.keys().map(String::as_str).collect(),
            Self::ClosestAverage(map) => map.keys().map(String::as_str).collect(),
            Self::Connectivity(_) | Self::Cumulative(_) => Vec::new(),
        }
    }
}

/// Routing mode that produced the travel times.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Walking,
    Cycling,
}

impl TravelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Walking => "walking",
            TravelMode::Cycling => "cycling",
        }
    }

    /// Base speed in km/h.
    pub fn base_speed_kmh(self) -> f64 {
        match self {
            TravelMode::Walking => 5.0,
            TravelMode::Cycling => 15.0,
        }
    }
}

/// Spatial unit the scores are aggregated on.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisUnit {
    #[default]
    Hexagon,
    Square,
    Building,
    Point,
}

/// Everything the engine needs for one heatmap request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatmapSettings {
    pub config: HeatmapConfig,
    /// Number of non-zero quantile classes.
    pub class_count: usize,
    pub resolution: Option<u8>,
    pub analysis_unit: AnalysisUnit,
    pub mode: TravelMode,
}

#[derive(Deserialize)]
struct RawSettings {
    heatmap_type: String,
    heatmap_config: Value,
    #[serde(default)]
    class_count: Option<usize>,
    #[serde(default)]
    resolution: Option<u8>,
    #[serde(default)]
    analysis_unit: Option<AnalysisUnit>,
    #[serde(default)]
    mode: Option<TravelMode>,
}

impl HeatmapSettings {
    /// Settings with default class count, hexagon cells and walking mode.
    pub fn new(config: HeatmapConfig) -> Self {
        Self {
            config,
            class_count: DEFAULT_CLASS_COUNT,
            resolution: None,
            analysis_unit: AnalysisUnit::default(),
            mode: TravelMode::Walking,
        }
    }

    pub fn with_class_count(mut self, class_count: usize) -> Self {
        self.class_count = class_count;
        self
    }

    pub fn with_resolution(mut self, resolution: u8) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// Parse a full request body (`heatmap_type`, `heatmap_config` and the
    /// optional `class_count`, `resolution`, `analysis_unit`, `mode`).
    pub fn from_json(value: &Value) -> Result<Self, HeatmapError> {
        let raw: RawSettings = serde_json::from_value(value.clone())
            .map_err(|e| HeatmapError::config("settings", e.to_string()))?;
        let config = HeatmapConfig::from_json_keyed(&raw.heatmap_type, &raw.heatmap_config)?;
        let settings = Self {
            config,
            class_count: raw.class_count.unwrap_or(DEFAULT_CLASS_COUNT),
            resolution: raw.resolution,
            analysis_unit: raw.analysis_unit.unwrap_or_default(),
            mode: raw.mode.unwrap_or(TravelMode::Walking),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the config and the request-level fields.
    pub fn validate(&self) -> Result<(), HeatmapError> {
        self.config.validate()?;
        if self.class_count == 0 || self.class_count > u8::MAX as usize {
            return Err(HeatmapError::InvalidClassCount(self.class_count));
        }
        if let Some(res) = self.resolution {
            if !RESOLUTION_RANGE.contains(&res) {
                return Err(HeatmapError::InvalidResolution(res));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_keys_roundtrip() {
        for t in HeatmapType::ALL {
            assert_eq!(HeatmapType::parse(t.as_str()).unwrap(), t);
        }
        assert_eq!(
            HeatmapType::parse("isochrone"),
            Err(HeatmapError::UnknownHeatmapType("isochrone".into()))
        );
    }

    #[test]
    fn poi_wrapper_is_unwrapped() {
        let doc = json!({"poi": {
            "atm": {"weight": 1, "sensitivity": 250000, "max_traveltime": 20},
            "gym": {"weight": 2, "sensitivity": 350000, "max_traveltime": 20}
        }});
        let cfg = HeatmapConfig::from_json(HeatmapType::ModifiedGaussian, &doc).unwrap();
        assert_eq!(cfg.categories(), vec!["atm", "gym"]);
        let HeatmapConfig::ModifiedGaussian(map) = cfg else {
            panic!("wrong variant");
        };
        assert_eq!(map["gym"].weight, 2.0);
    }

    #[test]
    fn missing_field_names_the_category() {
        let doc = json!({"bar": {"weight": 1, "max_traveltime": 20}});
        let err = HeatmapConfig::from_json(HeatmapType::ModifiedGaussian, &doc).unwrap_err();
        match err {
            HeatmapError::InvalidConfig { category, reason } => {
                assert_eq!(category, "bar");
                assert!(reason.contains("sensitivity"), "{reason}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn connectivity_reads_global_cutoff() {
        let cfg = HeatmapConfig::from_json_keyed("connectivity", &json!({"max_traveltime": 10}))
            .unwrap();
        assert_eq!(
            cfg,
            HeatmapConfig::Connectivity(CutoffConfig {
                max_traveltime: 10.0
            })
        );
        assert!(cfg.categories().is_empty());
    }

    #[test]
    fn empty_category_map_is_rejected() {
        assert!(HeatmapConfig::from_json(HeatmapType::ClosestAverage, &json!({})).is_err());
    }

    #[test]
    fn settings_from_request_body() {
        let body = json!({
            "mode": "walking",
            "heatmap_type": "closest_average",
            "analysis_unit": "hexagon",
            "resolution": 9,
            "heatmap_config": {"poi": {"atm": {"weight": 1, "max_count": 1, "max_traveltime": 20}}}
        });
        let settings = HeatmapSettings::from_json(&body).unwrap();
        assert_eq!(settings.class_count, DEFAULT_CLASS_COUNT);
        assert_eq!(settings.resolution, Some(9));
        assert_eq!(settings.config.heatmap_type(), HeatmapType::ClosestAverage);
        assert_eq!(settings.mode, TravelMode::Walking);
        assert_eq!(settings.analysis_unit, AnalysisUnit::Hexagon);
    }

    #[test]
    fn request_mode_and_unit_are_read() {
        let body = json!({
            "mode": "cycling",
            "analysis_unit": "building",
            "heatmap_type": "connectivity",
            "heatmap_config": {"max_traveltime": 15}
        });
        let settings = HeatmapSettings::from_json(&body).unwrap();
        assert_eq!(settings.mode, TravelMode::Cycling);
        assert_eq!(settings.analysis_unit, AnalysisUnit::Building);
        assert_eq!(settings.resolution, None);
    }

    #[test]
    fn base_speeds_per_mode() {
        assert_eq!(TravelMode::Walking.base_speed_kmh(), 5.0);
        assert_eq!(TravelMode::Cycling.base_speed_kmh(), 15.0);
        assert_eq!(TravelMode::Cycling.as_str(), "cycling");
    }

    #[test]
    fn settings_reject_bad_resolution_and_class_count() {
        let cfg = HeatmapConfig::Cumulative(CutoffConfig {
            max_traveltime: 15.0,
        });
        let s = HeatmapSettings::new(cfg.clone()).with_resolution(11);
        assert_eq!(s.validate(), Err(HeatmapError::InvalidResolution(11)));
        let s = HeatmapSettings::new(cfg).with_class_count(0);
        assert_eq!(s.validate(), Err(HeatmapError::InvalidClassCount(0)));
    }

    #[test]
    fn config_json_roundtrip() {
        let doc = json!({"atm": {
            "weight": 1,
            "sensitivity": 250000,
            "max_traveltime": 20,
            "static_traveltime": 5
        }});
        let cfg = HeatmapConfig::from_json(HeatmapType::CombinedCumulativeModifiedGaussian, &doc)
            .unwrap();
        let s = serde_json::to_string(&cfg).unwrap();
        let back: HeatmapConfig = serde_json::from_str(&s).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn config_bincode_roundtrip() {
        let mut map = BTreeMap::new();
        map.insert(
            "gym".to_string(),
            ClosestAverageConfig {
                weight: 1.5,
                max_count: 3,
                max_traveltime: 20.0,
            },
        );
        let cfg = HeatmapConfig::ClosestAverage(map);
        let bytes = bincode::serialize(&cfg).unwrap();
        let back: HeatmapConfig = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, cfg);
    }
}
