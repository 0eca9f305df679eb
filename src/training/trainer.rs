//! Cleaning, feature partitioning, fitting and hold-out evaluation

use super::split::{stratified_split, SplitIndices};
use crate::config::TrainingConfig;
use crate::error::{AttritionError, Result, TrainingError};
use crate::metrics::EvaluationMetrics;
use crate::models::logistic::LogisticRegression;
use crate::models::pipeline::TrainedPipeline;
use crate::types::table::{is_numeric, Table, TableId};
use ndarray::Array1;
use polars::prelude::Column;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::{debug, info};

/// Identifier and constant columns removed before training
pub const DROPPED_COLUMNS: [&str; 4] = ["EmployeeCount", "EmployeeNumber", "Over18", "StandardHours"];

/// Raw label column ("Yes" / "No")
pub const LABEL_COLUMN: &str = "Attrition";

/// Numeric label column added during cleaning (1 = resigned)
pub const FLAG_COLUMN: &str = "Attrition_flag";

/// Feature columns with their numeric / categorical partition.
///
/// The two name lists are disjoint and together cover every column of `table`.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub table: Table,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
}

impl FeatureSet {
    /// Partition every column of `table` by its type, keeping table order
    pub fn from_table(table: Table) -> Self {
        let (numeric, categorical): (Vec<&Column>, Vec<&Column>) =
            table.columns().iter().partition(|c| is_numeric(c));
        let numeric_columns = numeric.iter().map(|c| c.name().to_string()).collect();
        let categorical_columns = categorical.iter().map(|c| c.name().to_string()).collect();
        Self {
            table,
            numeric_columns,
            categorical_columns,
        }
    }

    pub fn n_features(&self) -> usize {
        self.numeric_columns.len() + self.categorical_columns.len()
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.numeric_columns.iter().any(|c| c == name)
    }

    pub fn is_categorical(&self, name: &str) -> bool {
        self.categorical_columns.iter().any(|c| c == name)
    }
}

/// Everything produced by one training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Identity of the table this outcome was trained from
    pub source: TableId,
    pub pipeline: TrainedPipeline,
    /// Feature columns (X)
    pub features: FeatureSet,
    /// Labels (y), 1 = resigned
    pub labels: Vec<u8>,
    /// Input minus dropped columns, plus the numeric label flag
    pub cleaned: Table,
    pub split: SplitIndices,
    pub metrics: EvaluationMetrics,
}

/// Drop identifier/constant columns and add the numeric label flag
pub fn clean(table: &Table) -> Result<Table> {
    let missing: Vec<&str> = DROPPED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !table.has_column(c))
        .collect();
    if !missing.is_empty() {
        debug!(columns = ?missing, "Columns slated for removal are absent");
    }

    let labels = table.categorical(LABEL_COLUMN).map_err(|e| match e {
        AttritionError::ColumnNotFound(c) => TrainingError::MissingColumn(c).into(),
        other => other,
    })?;
    let flags = labels
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some("Yes") => Ok(1.0),
            Some("No") => Ok(0.0),
            _ => Err(TrainingError::InvalidLabel {
                row,
                value: value.unwrap_or_default().to_string(),
            }),
        })
        .collect::<std::result::Result<Vec<f64>, _>>()?;

    table
        .drop_columns(&DROPPED_COLUMNS)
        .with_column(Column::new(FLAG_COLUMN.into(), flags))
}

/// Separate a cleaned table into features (X) and labels (y)
pub fn split_features(cleaned: &Table) -> Result<(FeatureSet, Vec<u8>)> {
    let labels: Vec<u8> = cleaned
        .numeric(FLAG_COLUMN)?
        .into_iter()
        .map(|v| u8::from(v.unwrap_or_default() >= 0.5))
        .collect();
    let features = FeatureSet::from_table(cleaned.drop_columns(&[LABEL_COLUMN, FLAG_COLUMN]));
    if features.n_features() == 0 {
        return Err(TrainingError::NoFeatures.into());
    }
    Ok((features, labels))
}

/// Trains the attrition pipeline and memoizes the outcome per table identity
pub struct ModelTrainer {
    config: TrainingConfig,
    cache: RwLock<HashMap<TableId, Arc<TrainingOutcome>>>,
}

impl ModelTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Train on `table`, or return the cached outcome if this table was trained on before
    pub fn train(&self, table: &Table) -> Result<Arc<TrainingOutcome>> {
        {
            let cache = self
                .cache
                .read()
                .map_err(|e| AttritionError::Lock(e.to_string()))?;
            if let Some(outcome) = cache.get(&table.id()) {
                debug!(table_id = %table.id(), "Training cache hit");
                return Ok(Arc::clone(outcome));
            }
        }

        let outcome = Arc::new(self.fit(table)?);

        let mut cache = self
            .cache
            .write()
            .map_err(|e| AttritionError::Lock(e.to_string()))?;
        Ok(cache.entry(table.id()).or_insert(outcome).clone())
    }

    /// Run the full training procedure without consulting the cache
    pub fn fit(&self, table: &Table) -> Result<TrainingOutcome> {
        let start = Instant::now();
        info!(table_id = %table.id(), rows = table.n_rows(), "Training attrition model");

        let cleaned = clean(table)?;
        let (features, labels) = split_features(&cleaned)?;
        info!(
            numeric = features.numeric_columns.len(),
            categorical = features.categorical_columns.len(),
            "Feature columns partitioned"
        );

        let split = stratified_split(&labels, self.config.test_size, self.config.random_seed)?;
        let train_x = features.table.take_rows(&split.train)?;
        let test_x = features.table.take_rows(&split.test)?;
        let train_y: Array1<f64> = split.train.iter().map(|&i| labels[i] as f64).collect();
        let test_y: Vec<u8> = split.test.iter().map(|&i| labels[i]).collect();

        let classifier = LogisticRegression::new()
            .with_c(self.config.c)
            .with_class_weight(self.config.class_weight)
            .with_solver(self.config.solver)
            .with_max_iter(self.config.max_iter)
            .with_tol(self.config.tolerance)
            .with_learning_rate(self.config.learning_rate);

        let pipeline = TrainedPipeline::fit(
            &train_x,
            &train_y,
            &features.numeric_columns,
            &features.categorical_columns,
            classifier,
            self.config.decision_threshold,
        )?;

        let predicted = pipeline.predict(&test_x)?.to_vec();
        let metrics = EvaluationMetrics::evaluate(&test_y, &predicted);

        info!(
            train_rows = split.train.len(),
            test_rows = split.test.len(),
            accuracy = format!("{:.3}", metrics.accuracy),
            precision = format!("{:.3}", metrics.precision),
            recall = format!("{:.3}", metrics.recall),
            f1 = format!("{:.3}", metrics.f1),
            iterations = pipeline.classifier().n_iter(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Attrition model trained"
        );

        Ok(TrainingOutcome {
            source: table.id(),
            pipeline,
            features,
            labels,
            cleaned,
            split,
            metrics,
        })
    }
}

impl Default for ModelTrainer {
    fn default() -> Self {
        Self::new(TrainingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Twenty employees; overtime and youth drive attrition
    fn small_table() -> Table {
        let n = 20;
        let ages: Vec<f64> = (0..n).map(|i| 20.0 + 2.0 * i as f64).collect();
        let overtime: Vec<&str> = (0..n).map(|i| if i % 3 == 0 { "Yes" } else { "No" }).collect();
        let attrition: Vec<&str> = (0..n)
            .map(|i| if i % 3 == 0 || i < 2 { "Yes" } else { "No" })
            .collect();
        Table::new(vec![
            Column::new("Age".into(), ages),
            Column::new("Attrition".into(), attrition),
            Column::new("EmployeeCount".into(), vec![1i64; n]),
            Column::new("EmployeeNumber".into(), (0..n as i64).collect::<Vec<_>>()),
            Column::new("Over18".into(), vec!["Y"; n]),
            Column::new("OverTime".into(), overtime),
            Column::new("StandardHours".into(), vec![80i64; n]),
        ])
        .unwrap()
    }

    #[test]
    fn test_clean_drops_identifiers_and_flags_label() {
        let cleaned = clean(&small_table()).unwrap();
        assert_eq!(
            cleaned.column_names(),
            vec!["Age", "Attrition", "OverTime", "Attrition_flag"]
        );
        let flags = cleaned.numeric(FLAG_COLUMN).unwrap();
        assert_eq!(flags.get(0), Some(1.0));
        assert_eq!(flags.get(4), Some(0.0));
    }

    #[test]
    fn test_clean_rejects_unknown_label() {
        let table = Table::new(vec![
            Column::new("Age".into(), vec![30.0, 40.0]),
            Column::new("Attrition".into(), ["Yes", "Maybe"]),
        ])
        .unwrap();
        let err = clean(&table).unwrap_err();
        assert!(matches!(
            err,
            AttritionError::Training(TrainingError::InvalidLabel { row: 1, .. })
        ));
    }

    #[test]
    fn test_clean_requires_label_column() {
        let table = Table::new(vec![Column::new("Age".into(), vec![30.0])]).unwrap();
        assert!(matches!(
            clean(&table).unwrap_err(),
            AttritionError::Training(TrainingError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_feature_partition_is_strict() {
        let cleaned = clean(&small_table()).unwrap();
        let (features, labels) = split_features(&cleaned).unwrap();

        assert_eq!(features.numeric_columns, vec!["Age"]);
        assert_eq!(features.categorical_columns, vec!["OverTime"]);
        assert_eq!(labels.len(), 20);
        for name in features.table.column_names() {
            assert!(features.is_numeric(name) ^ features.is_categorical(name));
        }
    }

    #[test]
    fn test_no_features_is_an_error() {
        let table =
            Table::new(vec![Column::new("Attrition".into(), ["Yes", "No", "Yes", "No"])]).unwrap();
        assert!(matches!(
            ModelTrainer::default().fit(&table).unwrap_err(),
            AttritionError::Training(TrainingError::NoFeatures)
        ));
    }

    #[test]
    fn test_degenerate_labels() {
        let table = Table::new(vec![
            Column::new("Age".into(), vec![30.0, 40.0, 50.0]),
            Column::new("Attrition".into(), ["No", "No", "No"]),
        ])
        .unwrap();
        assert!(matches!(
            ModelTrainer::default().fit(&table).unwrap_err(),
            AttritionError::Training(TrainingError::DegenerateLabels(1))
        ));
    }

    #[test]
    fn test_confusion_matrix_covers_test_split() {
        let outcome = ModelTrainer::default().fit(&small_table()).unwrap();
        assert_eq!(outcome.metrics.test_rows(), outcome.split.test.len());
        assert_eq!(
            outcome.split.train.len() + outcome.split.test.len(),
            outcome.labels.len()
        );
    }

    #[test]
    fn test_numeric_only_features_train() {
        let table = Table::new(vec![
            Column::new("Age".into(), (0..10).map(|i| 20.0 + 4.0 * i as f64).collect::<Vec<_>>()),
            Column::new(
                "Attrition".into(),
                ["Yes", "Yes", "Yes", "No", "Yes", "No", "No", "No", "No", "No"],
            ),
        ])
        .unwrap();
        let outcome = ModelTrainer::default().fit(&table).unwrap();
        assert!(outcome.features.categorical_columns.is_empty());
        assert_eq!(outcome.metrics.test_rows(), 2);
    }

    #[test]
    fn test_train_is_memoized_per_table() {
        let trainer = ModelTrainer::default();
        let table = small_table();

        let first = trainer.train(&table).unwrap();
        let second = trainer.train(&table).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // A content-identical copy under a new identity retrains with identical results
        let copy = table.take_rows(&(0..table.n_rows()).collect::<Vec<_>>()).unwrap();
        let third = trainer.train(&copy).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(first.metrics, third.metrics);
    }
}
