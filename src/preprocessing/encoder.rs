//! One-hot encoding for categorical feature columns

use crate::error::Result;
use crate::types::table::Table;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// One-hot encoder that ignores categories it was not fitted on.
///
/// Categories are kept in sort order per column. A value never seen during
/// fitting, or a null, encodes as an all-zero block for its column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, table: &Table, columns: &[String]) -> Result<&mut Self> {
        let mut categories = Vec::with_capacity(columns.len());
        for name in columns {
            categories.push(table.unique_categories(name)?);
        }

        self.columns = columns.to_vec();
        self.categories = categories;
        Ok(self)
    }

    pub fn transform(&self, table: &Table) -> Result<Array2<f64>> {
        let mut out = Array2::zeros((table.n_rows(), self.n_outputs()));
        let mut offset = 0;
        for (name, categories) in self.columns.iter().zip(&self.categories) {
            for (i, value) in table.categorical(name)?.into_iter().enumerate() {
                let Some(value) = value else { continue };
                if let Ok(k) = categories.binary_search_by(|c| c.as_str().cmp(value)) {
                    out[[i, offset + k]] = 1.0;
                }
            }
            offset += categories.len();
        }
        Ok(out)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_outputs(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Output names as `Column=Category`
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(name, cats)| cats.iter().map(move |c| format!("{}={}", name, c)))
            .collect()
    }
}
