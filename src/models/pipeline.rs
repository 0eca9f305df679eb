//! Fitted preprocessing + classification pipeline

use crate::error::{AttritionError, Result};
use crate::models::logistic::LogisticRegression;
use crate::preprocessing::ColumnTransformer;
use crate::types::table::{is_numeric, Table};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// A fitted [`ColumnTransformer`] followed by a fitted [`LogisticRegression`].
///
/// Immutable once built. Every call checks that the input table carries exactly
/// the columns, with the same types, that the pipeline was fitted on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedPipeline {
    preprocessor: ColumnTransformer,
    classifier: LogisticRegression,
    decision_threshold: f64,
}

impl TrainedPipeline {
    /// Fit the preprocessor and then the classifier on `train`
    pub fn fit(
        train: &Table,
        labels: &Array1<f64>,
        numeric_columns: &[String],
        categorical_columns: &[String],
        mut classifier: LogisticRegression,
        decision_threshold: f64,
    ) -> Result<Self> {
        let mut preprocessor = ColumnTransformer::new();
        let design = preprocessor.fit_transform(train, numeric_columns, categorical_columns)?;
        classifier.fit(&design, labels)?;

        Ok(Self {
            preprocessor,
            classifier,
            decision_threshold,
        })
    }

    /// Positive-class (resign) probability per row
    pub fn predict_proba(&self, table: &Table) -> Result<Array1<f64>> {
        self.check_schema(table)?;
        let design = self.preprocessor.transform(table)?;
        self.classifier.predict_proba(&design)
    }

    /// Class label per row: 1 = resign, 0 = stay.
    ///
    /// A row is positive only when its probability is strictly above the threshold.
    pub fn predict(&self, table: &Table) -> Result<Array1<u8>> {
        let proba = self.predict_proba(table)?;
        Ok(proba.mapv(|p| u8::from(p > self.decision_threshold)))
    }

    /// Reject tables whose columns differ from the fitted schema
    pub fn check_schema(&self, table: &Table) -> Result<()> {
        let numeric = self.preprocessor.numeric_columns();
        let categorical = self.preprocessor.categorical_columns();

        let mut missing = Vec::new();
        let mut mistyped = Vec::new();
        for (name, want_numeric) in numeric
            .iter()
            .map(|n| (n, true))
            .chain(categorical.iter().map(|n| (n, false)))
        {
            match table.frame().column(name).ok() {
                None => missing.push(name.clone()),
                Some(column) if is_numeric(column) != want_numeric => {
                    mistyped.push(name.clone())
                }
                Some(_) => {}
            }
        }

        let unexpected: Vec<String> = table
            .column_names()
            .into_iter()
            .filter(|name| !numeric.iter().chain(categorical).any(|n| n.as_str() == *name))
            .map(str::to_string)
            .collect();

        if missing.is_empty() && unexpected.is_empty() && mistyped.is_empty() {
            Ok(())
        } else {
            Err(AttritionError::SchemaMismatch {
                missing,
                unexpected,
                mistyped,
            })
        }
    }

    pub fn numeric_columns(&self) -> &[String] {
        self.preprocessor.numeric_columns()
    }

    pub fn categorical_columns(&self) -> &[String] {
        self.preprocessor.categorical_columns()
    }

    pub fn preprocessor(&self) -> &ColumnTransformer {
        &self.preprocessor
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }

    pub fn decision_threshold(&self) -> f64 {
        self.decision_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use polars::prelude::Column;

    fn fitted() -> (TrainedPipeline, Table) {
        let table = Table::new(vec![
            Column::new("Age".into(), vec![22.0, 25.0, 28.0, 45.0, 50.0, 55.0]),
            Column::new("OverTime".into(), ["Yes", "Yes", "No", "No", "Yes", "No"]),
        ])
        .unwrap();
        let y = array![1.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let pipeline = TrainedPipeline::fit(
            &table,
            &y,
            &["Age".to_string()],
            &["OverTime".to_string()],
            LogisticRegression::new(),
            0.5,
        )
        .unwrap();
        (pipeline, table)
    }

    #[test]
    fn test_predict_on_training_schema() {
        let (pipeline, table) = fitted();
        let proba = pipeline.predict_proba(&table).unwrap();
        assert_eq!(proba.len(), 6);
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!(proba[0] > proba[3]);
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let (pipeline, table) = fitted();
        let reordered = Table::new(vec![
            table.require("OverTime").unwrap().clone(),
            table.require("Age").unwrap().clone(),
        ])
        .unwrap();
        assert_eq!(
            pipeline.predict_proba(&table).unwrap(),
            pipeline.predict_proba(&reordered).unwrap()
        );
    }

    #[test]
    fn test_schema_mismatch_is_reported() {
        let (pipeline, _) = fitted();
        let wrong = Table::new(vec![
            Column::new("Age".into(), ["young"]),
            Column::new("Salary".into(), vec![1000.0]),
        ])
        .unwrap();

        match pipeline.predict(&wrong).unwrap_err() {
            AttritionError::SchemaMismatch {
                missing,
                unexpected,
                mistyped,
            } => {
                assert_eq!(missing, vec!["OverTime"]);
                assert_eq!(unexpected, vec!["Salary"]);
                assert_eq!(mistyped, vec!["Age"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_probability_at_threshold_predicts_stay() {
        // Constant features and balanced labels put every probability at exactly 0.5
        let table = Table::new(vec![Column::new("Age".into(), vec![30.0; 4])]).unwrap();
        let y = array![1.0, 0.0, 1.0, 0.0];
        let pipeline = TrainedPipeline::fit(
            &table,
            &y,
            &["Age".to_string()],
            &[],
            LogisticRegression::new(),
            0.5,
        )
        .unwrap();

        let proba = pipeline.predict_proba(&table).unwrap();
        assert!(proba.iter().all(|&p| (p - 0.5).abs() < 1e-9));
        assert_eq!(pipeline.predict(&table).unwrap().to_vec(), vec![0, 0, 0, 0]);
    }
}
