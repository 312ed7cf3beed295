//! Travel-time matrices as produced by the bulk router, and their mapping
//! onto cache columns.

use crate::data::samples::{CategorySamples, GridId};
use crate::heatmap_error::HeatmapError;
use crate::io::column::{CachedMatrix, Column, ColumnType};

pub const COL_GRID_IDS: &str = "grid_ids";
pub const COL_TRAVEL_TIMES: &str = "travel_times";
pub const COL_WEST: &str = "west";
pub const COL_NORTH: &str = "north";
pub const COL_ZOOM: &str = "zoom";
pub const COL_WIDTH: &str = "width";
pub const COL_HEIGHT: &str = "height";

const PROVENANCE_COLUMNS: [&str; 5] = [COL_WEST, COL_NORTH, COL_ZOOM, COL_WIDTH, COL_HEIGHT];

/// Tile coordinates of the bulk-routing request that produced each row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BulkProvenance {
    pub west: Vec<i64>,
    pub north: Vec<i64>,
    pub zoom: Vec<i64>,
    pub width: Vec<i64>,
    pub height: Vec<i64>,
}

impl BulkProvenance {
    fn columns(&self) -> [(&'static str, &Vec<i64>); 5] {
        [
            (COL_WEST, &self.west),
            (COL_NORTH, &self.north),
            (COL_ZOOM, &self.zoom),
            (COL_WIDTH, &self.width),
            (COL_HEIGHT, &self.height),
        ]
    }
}

/// Raw `(grid_id, travel_time)` rows plus optional bulk provenance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TravelTimeMatrix {
    pub grid_ids: Vec<GridId>,
    pub travel_times: Vec<f64>,
    pub provenance: Option<BulkProvenance>,
}

impl TravelTimeMatrix {
    pub fn new(grid_ids: Vec<GridId>, travel_times: Vec<f64>) -> Self {
        Self {
            grid_ids,
            travel_times,
            provenance: None,
        }
    }

    pub fn with_provenance(mut self, provenance: BulkProvenance) -> Self {
        self.provenance = Some(provenance);
        self
    }

    /// Column bundle for the cache. Fails if any column length differs.
    pub fn to_cached(&self) -> Result<CachedMatrix, HeatmapError> {
        let mut m = CachedMatrix::new();
        m.try_insert(COL_GRID_IDS, self.grid_ids.clone())?;
        m.try_insert(COL_TRAVEL_TIMES, self.travel_times.clone())?;
        if let Some(p) = &self.provenance {
            for (name, values) in p.columns() {
                m.try_insert(name, values.clone())?;
            }
        }
        Ok(m)
    }

    /// Rebuild from cached columns.
    ///
    /// Integer travel-time columns are widened to `f64`. Provenance is
    /// restored only if all five provenance columns are present; a partial
    /// set is an error.
    pub fn from_cached(m: &CachedMatrix) -> Result<Self, HeatmapError> {
        let grid_ids = m.typed::<i64>(COL_GRID_IDS)?.to_vec();
        let travel_times = match m.get(COL_TRAVEL_TIMES) {
            Some(Column::Float(v)) => v.clone(),
            Some(Column::Int(v)) => v.iter().map(|&t| t as f64).collect(),
            Some(other) => {
                return Err(HeatmapError::ColumnTypeMismatch {
                    column: COL_TRAVEL_TIMES.into(),
                    expected: ColumnType::Float,
                    found: other.column_type(),
                });
            }
            None => return Err(HeatmapError::MissingColumn(COL_TRAVEL_TIMES.into())),
        };

        let present = PROVENANCE_COLUMNS
            .iter()
            .filter(|name| m.contains(name))
            .count();
        let provenance = match present {
            0 => None,
            5 => Some(BulkProvenance {
                west: m.typed::<i64>(COL_WEST)?.to_vec(),
                north: m.typed::<i64>(COL_NORTH)?.to_vec(),
                zoom: m.typed::<i64>(COL_ZOOM)?.to_vec(),
                width: m.typed::<i64>(COL_WIDTH)?.to_vec(),
                height: m.typed::<i64>(COL_HEIGHT)?.to_vec(),
            }),
            _ => {
                let missing = PROVENANCE_COLUMNS
                    .iter()
                    .find(|name| !m.contains(name))
                    .copied()
                    .unwrap_or(COL_WEST);
                return Err(HeatmapError::MissingColumn(missing.into()));
            }
        };

        Ok(Self {
            grid_ids,
            travel_times,
            provenance,
        })
    }

    /// Samples for the aggregation stage.
    pub fn into_samples(self) -> Result<CategorySamples, HeatmapError> {
        CategorySamples::try_new(self.grid_ids, self.travel_times)
    }
}
