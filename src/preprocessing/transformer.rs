//! Column transformer: numeric branch + categorical branch side by side

use super::encoder::OneHotEncoder;
use super::scaler::StandardScaler;
use crate::error::{Result, TrainingError};
use crate::types::table::Table;
use ndarray::{concatenate, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Applies [`StandardScaler`] to numeric columns and [`OneHotEncoder`] to
/// categorical columns, stacking numeric outputs first.
///
/// Either branch may be empty, in which case it contributes no output columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnTransformer {
    numeric: StandardScaler,
    categorical: OneHotEncoder,
}

impl ColumnTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(
        &mut self,
        table: &Table,
        numeric_columns: &[String],
        categorical_columns: &[String],
    ) -> Result<&mut Self> {
        self.numeric.fit(table, numeric_columns)?;
        self.categorical.fit(table, categorical_columns)?;
        Ok(self)
    }

    pub fn transform(&self, table: &Table) -> Result<Array2<f64>> {
        let numeric = self.numeric.transform(table)?;
        let categorical = self.categorical.transform(table)?;
        concatenate(Axis(1), &[numeric.view(), categorical.view()]).map_err(|e| {
            TrainingError::Shape {
                expected: format!("{} rows in both branches", table.n_rows()),
                actual: e.to_string(),
            }
            .into()
        })
    }

    pub fn fit_transform(
        &mut self,
        table: &Table,
        numeric_columns: &[String],
        categorical_columns: &[String],
    ) -> Result<Array2<f64>> {
        self.fit(table, numeric_columns, categorical_columns)?;
        self.transform(table)
    }

    pub fn numeric_columns(&self) -> &[String] {
        self.numeric.columns()
    }

    pub fn categorical_columns(&self) -> &[String] {
        self.categorical.columns()
    }

    pub fn n_outputs(&self) -> usize {
        self.numeric.n_outputs() + self.categorical.n_outputs()
    }

    /// Names of the transformed features, in output order
    pub fn feature_names(&self) -> Vec<String> {
        self.numeric
            .columns()
            .iter()
            .cloned()
            .chain(self.categorical.feature_names())
            .collect()
    }
}
