//! Travel-time matrix cache: typed columns, the binary codec and the
//! keyed on-disk store.

pub mod codec;
pub mod column;
pub mod matrix_cache;
pub mod travel_time_matrix;

pub use column::{CachedMatrix, Column, ColumnScalar, ColumnType};
pub use matrix_cache::{CACHE_FILE_EXTENSION, CacheKey, MatrixCache};
pub use travel_time_matrix::{BulkProvenance, TravelTimeMatrix};
