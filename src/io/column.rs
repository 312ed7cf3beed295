//! Typed columns and the named, equal-length column bundle stored in the
//! travel-time matrix cache.

use std::collections::BTreeMap;

use crate::heatmap_error::HeatmapError;

/// Element type tag stored next to each column name.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ColumnType {
    Int,
    Float,
    Str,
}

impl ColumnType {
    /// Returns a stable string label for the column type.
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Str => "str",
        }
    }

    /// Parse a column type from a string label.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "int" => Some(ColumnType::Int),
            "float" => Some(ColumnType::Float),
            "str" => Some(ColumnType::Str),
            _ => None,
        }
    }

    /// On-disk tag byte.
    pub fn tag(self) -> u8 {
        match self {
            ColumnType::Int => 0,
            ColumnType::Float => 1,
            ColumnType::Str => 2,
        }
    }

    /// Inverse of [`tag`](Self::tag).
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(ColumnType::Int),
            1 => Some(ColumnType::Float),
            2 => Some(ColumnType::Str),
            _ => None,
        }
    }
}

/// One column of values. String columns hold opaque per-row text, e.g.
/// serialized metadata.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Str(Vec<String>),
}

impl Column {
    /// Type tag of this column.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Int(_) => ColumnType::Int,
            Column::Float(_) => ColumnType::Float,
            Column::Str(_) => ColumnType::Str,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Column::Int(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Str(v) => v.len(),
        }
    }

    /// Return true if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<i64>> for Column {
    fn from(v: Vec<i64>) -> Self {
        Column::Int(v)
    }
}

impl From<Vec<f64>> for Column {
    fn from(v: Vec<f64>) -> Self {
        Column::Float(v)
    }
}

impl From<Vec<String>> for Column {
    fn from(v: Vec<String>) -> Self {
        Column::Str(v)
    }
}

/// Trait to map element types to column variants for typed accessors.
pub trait ColumnScalar: Sized + 'static {
    /// Column type tag for this concrete type.
    const COLUMN_TYPE: ColumnType;

    /// Borrow the values if the column has this element type.
    fn unwrap(column: &Column) -> Option<&[Self]>;
}

impl ColumnScalar for i64 {
    const COLUMN_TYPE: ColumnType = ColumnType::Int;

    fn unwrap(column: &Column) -> Option<&[Self]> {
        if let Column::Int(v) = column {
            Some(v)
        } else {
            None
        }
    }
}

impl ColumnScalar for f64 {
    const COLUMN_TYPE: ColumnType = ColumnType::Float;

    fn unwrap(column: &Column) -> Option<&[Self]> {
        if let Column::Float(v) = column {
            Some(v)
        } else {
            None
        }
    }
}

impl ColumnScalar for String {
    const COLUMN_TYPE: ColumnType = ColumnType::Str;

    fn unwrap(column: &Column) -> Option<&[Self]> {
        if let Column::Str(v) = column {
            Some(v)
        } else {
            None
        }
    }
}

/// Named bundle of equal-length columns, keyed and ordered by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CachedMatrix {
    columns: BTreeMap<String, Column>,
}

impl CachedMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column.
    ///
    /// # Errors
    /// [`HeatmapError::DuplicateColumn`] if `name` exists;
    /// [`HeatmapError::ColumnLengthMismatch`] if its length differs from the
    /// columns already present.
    pub fn try_insert(
        &mut self,
        name: impl Into<String>,
        column: impl Into<Column>,
    ) -> Result<(), HeatmapError> {
        let name = name.into();
        let column = column.into();
        if self.columns.contains_key(&name) {
            return Err(HeatmapError::DuplicateColumn(name));
        }
        if let Some(rows) = self.rows() {
            if column.len() != rows {
                return Err(HeatmapError::ColumnLengthMismatch {
                    column: name,
                    expected: rows,
                    found: column.len(),
                });
            }
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Builder-style [`try_insert`](Self::try_insert).
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        column: impl Into<Column>,
    ) -> Result<Self, HeatmapError> {
        self.try_insert(name, column)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Borrow a column as a typed slice.
    ///
    /// # Errors
    /// [`HeatmapError::MissingColumn`] or [`HeatmapError::ColumnTypeMismatch`].
    pub fn typed<T: ColumnScalar>(&self, name: &str) -> Result<&[T], HeatmapError> {
        let column = self
            .columns
            .get(name)
            .ok_or_else(|| HeatmapError::MissingColumn(name.to_string()))?;
        T::unwrap(column).ok_or_else(|| HeatmapError::ColumnTypeMismatch {
            column: name.to_string(),
            expected: T::COLUMN_TYPE,
            found: column.column_type(),
        })
    }

    /// Column names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Shared row count, or `None` when there are no columns.
    pub fn rows(&self) -> Option<usize> {
        self.columns.values().next().map(Column::len)
    }
}
