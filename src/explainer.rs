//! Rule-based risk factor explanations.
//!
//! The rules compare a profile against dataset medians and a few categorical
//! values with known high or low turnover. They are independent of the fitted
//! classifier, so their verdict can disagree with the predicted probability.

use crate::error::{AttritionError, Result};
use crate::types::form::EmployeeForm;
use crate::types::table::Table;
use serde::{Deserialize, Serialize};

/// Job roles with historically high turnover
pub const HIGH_TURNOVER_ROLES: [&str; 2] = ["Sales Representative", "Laboratory Technician"];

/// Job roles with historically low turnover
pub const LOW_TURNOVER_ROLES: [&str; 2] = ["Manager", "Research Director"];

/// Tenure (years) at or below which tenure counts as a risk factor
pub const SHORT_TENURE_YEARS: f64 = 2.0;

/// Dataset medians the rules compare against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceStats {
    pub median_age: f64,
    pub median_income: f64,
    pub median_distance: f64,
    pub median_years: f64,
}

impl ReferenceStats {
    /// Medians of Age, MonthlyIncome, DistanceFromHome and YearsAtCompany
    pub fn from_table(table: &Table) -> Result<Self> {
        let median = |name: &str| -> Result<f64> {
            table
                .median(name)?
                .ok_or_else(|| AttritionError::ColumnType {
                    column: name.to_string(),
                    expected: "numeric with at least one value",
                })
        };
        Ok(Self {
            median_age: median("Age")?,
            median_income: median("MonthlyIncome")?,
            median_distance: median("DistanceFromHome")?,
            median_years: median("YearsAtCompany")?,
        })
    }
}

/// Profile dimension a factor speaks about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Age,
    Income,
    Tenure,
    Distance,
    OverTime,
    BusinessTravel,
    MaritalStatus,
    Department,
    JobRole,
}

/// One human-readable statement about a dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub dimension: Dimension,
    pub statement: String,
}

/// Ordered factor lists for one profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Factors that raise resignation risk
    pub increasing: Vec<Factor>,
    /// Protective factors
    pub decreasing: Vec<Factor>,
}

impl Explanation {
    fn up(&mut self, dimension: Dimension, statement: impl Into<String>) {
        self.increasing.push(Factor {
            dimension,
            statement: statement.into(),
        });
    }

    fn down(&mut self, dimension: Dimension, statement: impl Into<String>) {
        self.decreasing.push(Factor {
            dimension,
            statement: statement.into(),
        });
    }

    pub fn has_risk_factors(&self) -> bool {
        !self.increasing.is_empty()
    }
}

/// Explain a profile against the reference statistics
pub fn explain(form: &EmployeeForm, stats: &ReferenceStats) -> Explanation {
    let mut out = Explanation::default();

    if (form.age as f64) < stats.median_age {
        out.up(Dimension::Age, "Younger than the typical employee.");
    } else {
        out.down(Dimension::Age, "More senior than the typical employee (tends to be more stable).");
    }

    if (form.monthly_income as f64) < stats.median_income {
        out.up(Dimension::Income, "Monthly income is below the company median.");
    } else {
        out.down(Dimension::Income, "Monthly income is at or above the company median.");
    }

    // Between the short-tenure cut-off and the median neither branch fires
    let years = form.years_at_company as f64;
    if years <= SHORT_TENURE_YEARS {
        out.up(Dimension::Tenure, "Very short tenure at the company.");
    } else if years > stats.median_years {
        out.down(Dimension::Tenure, "Long enough tenure at the company.");
    }

    if (form.distance_from_home as f64) > stats.median_distance {
        out.up(Dimension::Distance, "Lives relatively far from the office.");
    } else {
        out.down(Dimension::Distance, "Lives relatively close to the office.");
    }

    if form.overtime == "Yes" {
        out.up(Dimension::OverTime, "Works overtime frequently (OverTime = Yes).");
    } else {
        out.down(Dimension::OverTime, "Does not work overtime (OverTime = No).");
    }

    match form.business_travel.as_str() {
        "Travel_Frequently" => {
            out.up(Dimension::BusinessTravel, "Travels frequently for business (Travel_Frequently).")
        }
        "Non-Travel" => out.down(Dimension::BusinessTravel, "No business travel (Non-Travel)."),
        _ => {}
    }

    if form.marital_status == "Single" {
        out.up(
            Dimension::MaritalStatus,
            "Single (more flexible to change jobs).",
        );
    } else {
        out.down(
            Dimension::MaritalStatus,
            "Not single (tends to be more stable).",
        );
    }

    match form.department.as_str() {
        "Sales" => out.up(
            Dimension::Department,
            "Works in Sales, a department with historically higher attrition.",
        ),
        "Human Resources" => out.up(
            Dimension::Department,
            "Works in Human Resources, a department under heavy coordination pressure.",
        ),
        _ => {}
    }

    let role = form.job_role.as_str();
    if HIGH_TURNOVER_ROLES.contains(&role) {
        out.up(
            Dimension::JobRole,
            format!("Job role {} has relatively high historical turnover.", role),
        );
    } else if LOW_TURNOVER_ROLES.contains(&role) {
        out.down(
            Dimension::JobRole,
            format!("Job role {} tends to be more stable than other roles.", role),
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn stats() -> ReferenceStats {
        ReferenceStats {
            median_age: 36.0,
            median_income: 4919.0,
            median_distance: 7.0,
            median_years: 5.0,
        }
    }

    fn dims(factors: &[Factor]) -> Vec<Dimension> {
        factors.iter().map(|f| f.dimension).collect()
    }

    #[test]
    fn test_high_risk_example_is_all_risk() {
        let explanation = explain(&EmployeeForm::high_risk_example(), &stats());
        assert_eq!(
            dims(&explanation.increasing),
            vec![
                Dimension::Age,
                Dimension::Income,
                Dimension::Tenure,
                Dimension::Distance,
                Dimension::OverTime,
                Dimension::BusinessTravel,
                Dimension::MaritalStatus,
                Dimension::Department,
                Dimension::JobRole,
            ]
        );
        assert!(explanation.decreasing.is_empty());
    }

    #[test]
    fn test_protective_profile() {
        let form = EmployeeForm {
            age: 45,
            monthly_income: 12000,
            years_at_company: 10,
            distance_from_home: 2,
            job_level: 4,
            overtime: "No".into(),
            job_role: "Manager".into(),
            marital_status: "Married".into(),
            business_travel: "Non-Travel".into(),
            department: "Research & Development".into(),
        };
        let explanation = explain(&form, &stats());
        assert!(!explanation.has_risk_factors());
        assert_eq!(explanation.decreasing.len(), 8);
        assert!(!dims(&explanation.decreasing).contains(&Dimension::Department));
    }

    #[test]
    fn test_tenure_gap_is_silent() {
        let mut form = EmployeeForm::high_risk_example();
        for years in [3, 4, 5] {
            form.years_at_company = years;
            let explanation = explain(&form, &stats());
            assert!(!dims(&explanation.increasing).contains(&Dimension::Tenure));
            assert!(!dims(&explanation.decreasing).contains(&Dimension::Tenure));
        }
        form.years_at_company = 6;
        assert!(dims(&explain(&form, &stats()).decreasing).contains(&Dimension::Tenure));
    }

    #[test]
    fn test_rarely_travelling_is_silent() {
        let mut form = EmployeeForm::high_risk_example();
        form.business_travel = "Travel_Rarely".into();
        let explanation = explain(&form, &stats());
        assert!(!dims(&explanation.increasing).contains(&Dimension::BusinessTravel));
        assert!(!dims(&explanation.decreasing).contains(&Dimension::BusinessTravel));
    }

    #[test]
    fn test_no_dimension_in_both_lists() {
        let roles = ["Sales Representative", "Manager", "Research Scientist"];
        let travel = ["Travel_Frequently", "Travel_Rarely", "Non-Travel"];
        let departments = ["Sales", "Human Resources", "Research & Development"];
        for age in [18, 36, 60] {
            for years in [0, 2, 4, 5, 20] {
                for role in roles {
                    for t in travel {
                        for d in departments {
                            let form = EmployeeForm {
                                age,
                                years_at_company: years,
                                job_role: role.into(),
                                business_travel: t.into(),
                                department: d.into(),
                                ..EmployeeForm::high_risk_example()
                            };
                            let e = explain(&form, &stats());
                            let up: HashSet<_> = dims(&e.increasing).into_iter().collect();
                            let down: HashSet<_> = dims(&e.decreasing).into_iter().collect();
                            assert!(up.is_disjoint(&down));
                            assert_eq!(up.len(), e.increasing.len());
                            assert_eq!(down.len(), e.decreasing.len());
                        }
                    }
                }
            }
        }
    }
}
