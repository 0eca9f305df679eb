//! Type definitions for the attrition risk engine

pub mod assessment;
pub mod form;
pub mod table;

pub use assessment::{RiskAssessment, RiskLabel};
pub use form::{EmployeeForm, FormSchema, NumericRange};
pub use table::{FeatureValue, Table, TableId};
