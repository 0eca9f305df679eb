//! Caller-owned form state for single-employee risk simulation

use crate::error::{AttritionError, Result};
use crate::types::table::{FeatureValue, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Age slider bounds
pub const AGE_RANGE: RangeInclusive<u32> = 18..=60;

/// The ten profile fields exposed to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeForm {
    pub age: u32,
    pub monthly_income: u32,
    pub years_at_company: u32,
    pub distance_from_home: u32,
    pub job_level: u32,
    pub overtime: String,
    pub job_role: String,
    pub marital_status: String,
    pub business_travel: String,
    pub department: String,
}

impl EmployeeForm {
    /// Column names, in field order
    pub const COLUMNS: [&'static str; 10] = [
        "Age",
        "MonthlyIncome",
        "YearsAtCompany",
        "DistanceFromHome",
        "JobLevel",
        "OverTime",
        "JobRole",
        "MaritalStatus",
        "BusinessTravel",
        "Department",
    ];

    /// Defaults from the dataset: truncated medians for numbers, modes for categories
    pub fn from_dataset(table: &Table) -> Result<Self> {
        let median = |name: &str| -> Result<u32> {
            let value = table.median(name)?.ok_or_else(|| {
                AttritionError::ColumnType {
                    column: name.to_string(),
                    expected: "numeric with at least one value",
                }
            })?;
            Ok(value.max(0.0) as u32)
        };
        let mode = |name: &str| -> Result<String> {
            table.mode(name)?.ok_or_else(|| AttritionError::ColumnType {
                column: name.to_string(),
                expected: "categorical with at least one value",
            })
        };

        Ok(Self {
            age: median("Age")?,
            monthly_income: median("MonthlyIncome")?,
            years_at_company: median("YearsAtCompany")?,
            distance_from_home: median("DistanceFromHome")?,
            job_level: median("JobLevel")?,
            overtime: mode("OverTime")?,
            job_role: mode("JobRole")?,
            marital_status: mode("MaritalStatus")?,
            business_travel: mode("BusinessTravel")?,
            department: mode("Department")?,
        })
    }

    /// Profile with the characteristics most associated with resignation
    pub fn high_risk_example() -> Self {
        Self {
            age: 22,
            monthly_income: 2000,
            years_at_company: 1,
            distance_from_home: 25,
            job_level: 1,
            overtime: "Yes".to_string(),
            job_role: "Sales Representative".to_string(),
            marital_status: "Single".to_string(),
            business_travel: "Travel_Frequently".to_string(),
            department: "Sales".to_string(),
        }
    }

    /// Replace every field with the high-risk example
    pub fn with_high_risk_example(self) -> Self {
        Self::high_risk_example()
    }

    /// Field values keyed by column name, ready to overlay onto a baseline row
    pub fn to_overrides(&self) -> BTreeMap<String, FeatureValue> {
        let values: [FeatureValue; 10] = [
            self.age.into(),
            self.monthly_income.into(),
            self.years_at_company.into(),
            self.distance_from_home.into(),
            self.job_level.into(),
            self.overtime.clone().into(),
            self.job_role.clone().into(),
            self.marital_status.clone().into(),
            self.business_travel.clone().into(),
            self.department.clone().into(),
        ];
        Self::COLUMNS
            .iter()
            .map(|c| c.to_string())
            .zip(values)
            .collect()
    }
}

/// Inclusive bounds for a numeric control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: u32,
    pub max: u32,
}

/// Control bounds and choices for the prediction form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub age: NumericRange,
    pub monthly_income: NumericRange,
    pub years_at_company: NumericRange,
    pub distance_from_home: NumericRange,
    /// Distinct job levels, ascending
    pub job_levels: Vec<u32>,
    pub overtime: Vec<String>,
    pub job_roles: Vec<String>,
    pub marital_statuses: Vec<String>,
    pub business_travel: Vec<String>,
    pub departments: Vec<String>,
}

impl FormSchema {
    pub fn from_table(table: &Table) -> Result<Self> {
        let range = |name: &str| -> Result<(u32, u32)> {
            match (table.min(name)?, table.max(name)?) {
                (Some(min), Some(max)) => Ok((min.max(0.0) as u32, max.max(0.0) as u32)),
                _ => Err(AttritionError::ColumnType {
                    column: name.to_string(),
                    expected: "numeric with at least one value",
                }),
            }
        };
        let options = |name: &str| -> Result<Vec<String>> {
            table.unique_categories(name)
        };

        let (income_min, income_max) = range("MonthlyIncome")?;
        let (_, years_max) = range("YearsAtCompany")?;
        let (distance_min, distance_max) = range("DistanceFromHome")?;

        Ok(Self {
            age: NumericRange {
                min: *AGE_RANGE.start(),
                max: *AGE_RANGE.end(),
            },
            monthly_income: NumericRange {
                min: income_min,
                max: income_max,
            },
            years_at_company: NumericRange {
                min: 0,
                max: years_max,
            },
            distance_from_home: NumericRange {
                min: distance_min,
                max: distance_max,
            },
            job_levels: table
                .unique_numbers("JobLevel")?
                .into_iter()
                .map(|v| v.max(0.0) as u32)
                .collect(),
            overtime: options("OverTime")?,
            job_roles: options("JobRole")?,
            marital_statuses: options("MaritalStatus")?,
            business_travel: options("BusinessTravel")?,
            departments: options("Department")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    fn table() -> Table {
        Table::new(vec![
            Column::new("Age".into(), vec![30.0, 41.0, 25.0, 52.0]),
            Column::new("MonthlyIncome".into(), vec![3000.0, 5000.5, 4000.0, 9000.0]),
            Column::new("YearsAtCompany".into(), vec![1.0, 10.0, 3.0, 20.0]),
            Column::new("DistanceFromHome".into(), vec![1.0, 5.0, 10.0, 29.0]),
            Column::new("JobLevel".into(), vec![1.0, 2.0, 1.0, 4.0]),
            Column::new("OverTime".into(), ["No", "Yes", "No", "Yes"]),
            Column::new(
                "JobRole".into(),
                ["Sales Executive", "Manager", "Sales Executive", "Manager"],
            ),
            Column::new("MaritalStatus".into(), ["Single", "Married", "Married", "Divorced"]),
            Column::new(
                "BusinessTravel".into(),
                ["Travel_Rarely", "Travel_Rarely", "Non-Travel", "Travel_Frequently"],
            ),
            Column::new(
                "Department".into(),
                ["Sales", "Sales", "Research & Development", "Sales"],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_defaults_from_dataset() {
        let form = EmployeeForm::from_dataset(&table()).unwrap();
        assert_eq!(form.age, 35); // median 35.5, truncated
        assert_eq!(form.monthly_income, 4500);
        assert_eq!(form.years_at_company, 6);
        assert_eq!(form.job_level, 1);
        assert_eq!(form.overtime, "No"); // tie broken by sort order
        assert_eq!(form.job_role, "Manager");
        assert_eq!(form.marital_status, "Married");
        assert_eq!(form.department, "Sales");
    }

    #[test]
    fn test_reset_to_example_is_pure() {
        let form = EmployeeForm::from_dataset(&table()).unwrap();
        let original = form.clone();
        let example = form.with_high_risk_example();
        assert_eq!(example, EmployeeForm::high_risk_example());
        assert_ne!(example, original);
    }

    #[test]
    fn test_overrides_cover_every_field() {
        let overrides = EmployeeForm::high_risk_example().to_overrides();
        assert_eq!(overrides.len(), 10);
        assert_eq!(overrides["Age"], FeatureValue::Number(22.0));
        assert_eq!(overrides["OverTime"], FeatureValue::Text("Yes".into()));
        assert_eq!(
            overrides["BusinessTravel"],
            FeatureValue::Text("Travel_Frequently".into())
        );
    }

    #[test]
    fn test_schema_bounds_and_options() {
        let schema = FormSchema::from_table(&table()).unwrap();
        assert_eq!(schema.age, NumericRange { min: 18, max: 60 });
        assert_eq!(schema.monthly_income, NumericRange { min: 3000, max: 9000 });
        assert_eq!(schema.years_at_company, NumericRange { min: 0, max: 20 });
        assert_eq!(schema.job_levels, vec![1, 2, 4]);
        assert_eq!(
            schema.business_travel,
            vec!["Non-Travel", "Travel_Frequently", "Travel_Rarely"]
        );
    }
}
