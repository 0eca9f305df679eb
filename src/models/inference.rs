//! Single-employee prediction on top of a trained pipeline

use crate::error::{AttritionError, Result};
use crate::explainer::{explain, ReferenceStats};
use crate::training::TrainingOutcome;
use crate::types::assessment::RiskAssessment;
use crate::types::form::EmployeeForm;
use crate::types::table::{is_numeric, FeatureValue, Table};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// A full feature record keyed by column name
pub type Record = BTreeMap<String, FeatureValue>;

/// Scores employee profiles against a trained outcome.
///
/// Any feature the caller does not supply is filled from a baseline row
/// holding the median of each numeric feature and the mode of each
/// categorical feature over the cleaned dataset.
pub struct PredictionEngine {
    outcome: Arc<TrainingOutcome>,
    baseline: Record,
    reference: ReferenceStats,
}

impl PredictionEngine {
    pub fn new(outcome: Arc<TrainingOutcome>) -> Result<Self> {
        let features = &outcome.features.table;
        let mut baseline = Record::new();
        for column in features.columns() {
            let name = column.name().as_str();
            let value = if is_numeric(column) {
                features.median(name)?.map(FeatureValue::Number)
            } else {
                features.mode(name)?.map(FeatureValue::Text)
            };
            let value = value.ok_or_else(|| AttritionError::ColumnType {
                column: name.to_string(),
                expected: "at least one non-missing value",
            })?;
            baseline.insert(name.to_string(), value);
        }

        let reference = ReferenceStats::from_table(&outcome.cleaned)?;

        info!(
            table_id = %outcome.source,
            features = baseline.len(),
            median_age = reference.median_age,
            median_income = reference.median_income,
            "Prediction engine initialized"
        );

        Ok(Self {
            outcome,
            baseline,
            reference,
        })
    }

    /// Median/mode record used for unspecified features
    pub fn baseline(&self) -> &Record {
        &self.baseline
    }

    pub fn reference(&self) -> &ReferenceStats {
        &self.reference
    }

    pub fn outcome(&self) -> &TrainingOutcome {
        &self.outcome
    }

    /// Baseline record with `overrides` applied on top
    pub fn build_input(&self, overrides: &Record) -> Record {
        let mut record = self.baseline.clone();
        for (name, value) in overrides {
            record.insert(name.clone(), value.clone());
        }
        record
    }

    /// Predicted class and resignation probability for one full record
    pub fn predict_input(&self, record: &Record) -> Result<(u8, f64)> {
        let table = Table::from_records(std::slice::from_ref(record))?;
        let pipeline = &self.outcome.pipeline;
        let probability = pipeline
            .predict_proba(&table)?
            .first()
            .copied()
            .unwrap_or_default();
        let class = u8::from(probability > pipeline.decision_threshold());

        debug!(class, probability, "Scored employee record");
        Ok((class, probability))
    }

    /// Predict for the baseline row with `overrides` applied
    pub fn predict(&self, overrides: &Record) -> Result<(u8, f64)> {
        self.predict_input(&self.build_input(overrides))
    }

    /// Score a form and attach the rule-based explanation
    pub fn assess(&self, form: &EmployeeForm) -> Result<RiskAssessment> {
        let (class, probability) = self.predict(&form.to_overrides())?;
        let explanation = explain(form, &self.reference);

        let assessment = RiskAssessment::new(class, probability, explanation);
        info!(
            assessment_id = %assessment.assessment_id,
            label = %assessment.label,
            probability = format!("{:.4}", probability),
            risk_factors = assessment.explanation.increasing.len(),
            protective_factors = assessment.explanation.decreasing.len(),
            "Employee assessed"
        );
        Ok(assessment)
    }
}
