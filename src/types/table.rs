//! Identity-carrying wrapper around a polars `DataFrame`
//!
//! Every column is either numeric (`Float64`) or categorical (`String`);
//! construction casts integer columns up and anything else to text. Missing
//! cells are nulls.

use crate::error::{AttritionError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

/// Identity of a loaded or derived table.
///
/// Tables are immutable, so the id doubles as a cache key for anything
/// derived from a table's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableId(Uuid);

impl TableId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(v) => Some(*v),
            FeatureValue::Text(_) => None,
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Number(v)
    }
}

impl From<u32> for FeatureValue {
    fn from(v: u32) -> Self {
        FeatureValue::Number(v as f64)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::Text(v.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        FeatureValue::Text(v)
    }
}

/// True for the columns a [`Table`] stores as numbers
pub fn is_numeric(column: &Column) -> bool {
    column.dtype() == &DataType::Float64
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int32
            | DataType::Int64
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Cast every column to `Float64` or `String`
fn normalize(frame: &DataFrame) -> Result<DataFrame> {
    let columns = frame
        .get_columns()
        .iter()
        .map(|column| {
            let target = if is_numeric_dtype(column.dtype()) {
                DataType::Float64
            } else {
                DataType::String
            };
            if column.dtype() == &target {
                Ok(column.clone())
            } else {
                column.cast(&target)
            }
        })
        .collect::<PolarsResult<Vec<Column>>>()?;
    Ok(DataFrame::new(columns)?)
}

/// Immutable table over a polars `DataFrame`.
///
/// Every transformation returns a new table with a fresh [`TableId`].
#[derive(Debug, Clone)]
pub struct Table {
    id: TableId,
    frame: DataFrame,
}

impl PartialEq for Table {
    /// Content equality; identities are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.frame.equals_missing(&other.frame)
    }
}

impl Table {
    /// Build a table from columns of equal length
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        if let Some(column) = columns.iter().find(|c| c.len() != n_rows) {
            return Err(AttritionError::RaggedColumn {
                column: column.name().to_string(),
                expected: n_rows,
                actual: column.len(),
            });
        }
        Self::from_frame(DataFrame::new(columns)?)
    }

    /// Wrap a frame under a fresh identity
    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        Ok(Self {
            id: TableId::new(),
            frame: normalize(&frame)?,
        })
    }

    /// Build a table from row records. Column types follow the first record's values.
    pub fn from_records(records: &[BTreeMap<String, FeatureValue>]) -> Result<Self> {
        let Some(first) = records.first() else {
            return Table::new(Vec::new());
        };

        let mut columns = Vec::with_capacity(first.len());
        for (name, sample) in first {
            let column = match sample {
                FeatureValue::Number(_) => {
                    let values = records
                        .iter()
                        .map(|r| match r.get(name) {
                            Some(FeatureValue::Number(v)) => Ok(*v),
                            _ => Err(AttritionError::ColumnType {
                                column: name.clone(),
                                expected: "numeric",
                            }),
                        })
                        .collect::<Result<Vec<f64>>>()?;
                    Column::new(name.as_str().into(), values)
                }
                FeatureValue::Text(_) => {
                    let values = records
                        .iter()
                        .map(|r| match r.get(name) {
                            Some(FeatureValue::Text(s)) => Ok(s.clone()),
                            _ => Err(AttritionError::ColumnType {
                                column: name.clone(),
                                expected: "categorical",
                            }),
                        })
                        .collect::<Result<Vec<String>>>()?;
                    Column::new(name.as_str().into(), values)
                }
            };
            columns.push(column);
        }

        Table::new(columns)
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn n_rows(&self) -> usize {
        self.frame.height()
    }

    pub fn n_columns(&self) -> usize {
        self.frame.width()
    }

    pub fn columns(&self) -> &[Column] {
        self.frame.get_columns()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// The named column, or `ColumnNotFound`
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.frame
            .column(name)
            .map_err(|_| AttritionError::ColumnNotFound(name.to_string()))
    }

    pub fn is_numeric(&self, name: &str) -> Result<bool> {
        Ok(is_numeric(self.require(name)?))
    }

    pub fn numeric(&self, name: &str) -> Result<&Float64Chunked> {
        self.require(name)?
            .as_materialized_series()
            .f64()
            .map_err(|_| AttritionError::ColumnType {
                column: name.to_string(),
                expected: "numeric",
            })
    }

    pub fn categorical(&self, name: &str) -> Result<&StringChunked> {
        self.require(name)?
            .as_materialized_series()
            .str()
            .map_err(|_| AttritionError::ColumnType {
                column: name.to_string(),
                expected: "categorical",
            })
    }

    /// Median of the non-null values of a numeric column
    pub fn median(&self, name: &str) -> Result<Option<f64>> {
        Ok(self.numeric(name)?.median())
    }

    pub fn mean(&self, name: &str) -> Result<Option<f64>> {
        Ok(self.numeric(name)?.mean())
    }

    pub fn min(&self, name: &str) -> Result<Option<f64>> {
        Ok(self.numeric(name)?.min())
    }

    pub fn max(&self, name: &str) -> Result<Option<f64>> {
        Ok(self.numeric(name)?.max())
    }

    /// Row counts per distinct non-null value of a categorical column
    pub fn value_counts(&self, name: &str) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for value in self.categorical(name)?.into_iter().flatten() {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Most frequent category. Ties go to the smallest value in sort order.
    pub fn mode(&self, name: &str) -> Result<Option<String>> {
        let mut best: Option<(String, usize)> = None;
        // Sorted iteration, so the first maximum wins ties
        for (value, count) in self.value_counts(name)? {
            if best.as_ref().map_or(true, |(_, c)| count > *c) {
                best = Some((value, count));
            }
        }
        Ok(best.map(|(value, _)| value))
    }

    /// Distinct non-null categories in sort order
    pub fn unique_categories(&self, name: &str) -> Result<Vec<String>> {
        let unique = self.require(name)?.as_materialized_series().unique()?;
        let values: BTreeSet<String> = unique
            .str()
            .map_err(|_| AttritionError::ColumnType {
                column: name.to_string(),
                expected: "categorical",
            })?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        Ok(values.into_iter().collect())
    }

    /// Distinct non-null numbers in ascending order
    pub fn unique_numbers(&self, name: &str) -> Result<Vec<f64>> {
        let unique = self.require(name)?.as_materialized_series().unique()?;
        let mut values: Vec<f64> = unique
            .f64()
            .map_err(|_| AttritionError::ColumnType {
                column: name.to_string(),
                expected: "numeric",
            })?
            .into_iter()
            .flatten()
            .collect();
        values.sort_by(|a, b| a.total_cmp(b));
        Ok(values)
    }

    /// Copy of this table without the named columns. Absent names are ignored.
    pub fn drop_columns(&self, names: &[&str]) -> Table {
        Table {
            id: TableId::new(),
            frame: self.frame.drop_many(names.iter().copied()),
        }
    }

    /// Copy of this table with `column` appended, or replaced if the name exists
    pub fn with_column(&self, column: Column) -> Result<Table> {
        let actual = column.len();
        if self.n_columns() > 0 && actual != self.n_rows() {
            return Err(AttritionError::RaggedColumn {
                column: column.name().to_string(),
                expected: self.n_rows(),
                actual,
            });
        }
        let mut frame = self.frame.clone();
        frame.with_column(column)?;
        Table::from_frame(frame)
    }

    /// Copy of this table restricted to the given rows, in the given order
    pub fn take_rows(&self, indices: &[usize]) -> Result<Table> {
        let idx = IdxCa::from_vec(
            "idx".into(),
            indices.iter().map(|&i| i as IdxSize).collect(),
        );
        Ok(Table {
            id: TableId::new(),
            frame: self.frame.take(&idx)?,
        })
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Table {
        Table {
            id: TableId::new(),
            frame: self.frame.head(Some(n)),
        }
    }
}
