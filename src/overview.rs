//! Descriptive statistics for the loaded dataset

use crate::error::Result;
use crate::training::trainer::LABEL_COLUMN;
use crate::types::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Number of sample rows kept in the overview
pub const SAMPLE_ROWS: usize = 5;

/// Yes/No attrition counts for one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttritionCounts {
    pub yes: usize,
    pub no: usize,
}

/// Dataset summary shown before training
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataOverview {
    pub total_employees: usize,
    /// Share of "Yes" labels, in percent, two decimals
    pub attrition_rate_percent: f64,
    /// One decimal
    pub average_age: f64,
    pub attrition_by_department: BTreeMap<String, AttritionCounts>,
    pub distribution: AttritionCounts,
    #[serde(skip)]
    pub sample: Table,
}

impl DataOverview {
    pub fn from_table(table: &Table) -> Result<Self> {
        let labels = table.categorical(LABEL_COLUMN)?;
        let departments = table.categorical("Department")?;
        let average_age = table.mean("Age")?.unwrap_or(0.0);

        let label_counts = table.value_counts(LABEL_COLUMN)?;
        let distribution = AttritionCounts {
            yes: label_counts.get("Yes").copied().unwrap_or(0),
            no: label_counts.get("No").copied().unwrap_or(0),
        };

        let mut attrition_by_department: BTreeMap<String, AttritionCounts> = BTreeMap::new();
        for (label, department) in labels.into_iter().zip(departments) {
            let Some(department) = department else { continue };
            let counts = attrition_by_department
                .entry(department.to_string())
                .or_default();
            match label {
                Some("Yes") => counts.yes += 1,
                Some("No") => counts.no += 1,
                _ => {}
            }
        }

        let total_employees = table.n_rows();
        let rate = if total_employees == 0 {
            0.0
        } else {
            distribution.yes as f64 / total_employees as f64 * 100.0
        };

        Ok(Self {
            total_employees,
            attrition_rate_percent: round_to(rate, 2),
            average_age: round_to(average_age, 1),
            attrition_by_department,
            distribution,
            sample: table.head(SAMPLE_ROWS),
        })
    }

    pub fn log_summary(&self) {
        info!(
            total_employees = self.total_employees,
            attrition_rate = format!("{:.2}%", self.attrition_rate_percent),
            average_age = format!("{:.1}", self.average_age),
            resigned = self.distribution.yes,
            stayed = self.distribution.no,
            "Dataset overview"
        );
        for (department, counts) in &self.attrition_by_department {
            info!(
                department = %department,
                yes = counts.yes,
                no = counts.no,
                "Attrition by department"
            );
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
