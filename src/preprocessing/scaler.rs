//! Standard (z-score) scaling for numeric feature columns

use crate::error::Result;
use crate::types::table::Table;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Fitted centre and scale for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    mean: f64,
    scale: f64,
}

/// Standardizes numeric columns to zero mean and unit variance.
///
/// Uses the population standard deviation. Constant columns get a scale of 1
/// and nulls map to 0 (the column mean) after scaling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    columns: Vec<String>,
    params: Vec<ScalerParams>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit on the given columns of `table`
    pub fn fit(&mut self, table: &Table, columns: &[String]) -> Result<&mut Self> {
        let mut params = Vec::with_capacity(columns.len());
        for name in columns {
            params.push(compute_params(table.numeric(name)?));
        }

        self.columns = columns.to_vec();
        self.params = params;
        Ok(self)
    }

    /// Scale the fitted columns of `table`, one output column per input column
    pub fn transform(&self, table: &Table) -> Result<Array2<f64>> {
        let mut out = Array2::zeros((table.n_rows(), self.columns.len()));
        for (j, (name, params)) in self.columns.iter().zip(&self.params).enumerate() {
            for (i, value) in table.numeric(name)?.into_iter().enumerate() {
                out[[i, j]] = match value {
                    Some(v) => (v - params.mean) / params.scale,
                    None => 0.0,
                };
            }
        }
        Ok(out)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_outputs(&self) -> usize {
        self.columns.len()
    }
}

fn compute_params(values: &Float64Chunked) -> ScalerParams {
    let mean = values.mean().unwrap_or(0.0);
    let std = values.std(0).unwrap_or(0.0);

    ScalerParams {
        mean,
        scale: if std == 0.0 || std.is_nan() { 1.0 } else { std },
    }
}
